// src/foundry/mod.rs

// Core execution primitives
pub mod exec;
pub mod models;
pub mod options;
pub mod rpc;
pub mod validate;

// Node lifecycle
pub mod node;

// Per-tool operations
pub mod services;

// Re-export commonly used types
pub use models::{CommandResult, FoundryError, NodeInstance, NodeSummary, ToolOutput};
pub use node::{NodeManager, DEFAULT_NODE_PORT};
pub use options::CommandOptions;
