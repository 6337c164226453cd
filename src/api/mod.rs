//! # API Module
//!
//! HTTP handlers for the server's non-stdio mode. The MCP dispatch itself
//! is transport-agnostic; these endpoints expose it over HTTP alongside a
//! couple of operational views.
//!
//! ## Available Endpoints
//!
//! - `POST /api/rpc` - JSON-RPC 2.0 endpoint speaking the same MCP dialect
//!   as the stdio transport
//! - `GET /api/health` - Liveness check
//! - `GET /api/nodes` - Snapshot of the anvil node registry, with a live
//!   probe per tracked node

pub mod health;
pub mod nodes;
pub mod rpc;
