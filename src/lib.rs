#![recursion_limit = "256"]
// src/lib.rs

// Re-export modules
pub mod api;
pub mod config;
pub mod foundry;
pub mod mcp;
pub mod utils;

/// Application state shared across all request handlers.
///
/// This is the explicit context object the dispatch layer runs against:
/// the node registry and docs cache live here instead of in globals, so
/// tests can build fresh instances at will.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: config::Config,
    /// Shared HTTP client for the RPC bridge and the docs fetcher
    pub http: reqwest::Client,
    /// Registry of locally started anvil nodes
    pub nodes: foundry::NodeManager,
    /// Cached documentation fetcher
    pub docs: foundry::services::docs::DocsService,
}

impl AppState {
    pub fn new(config: config::Config) -> Self {
        let http = reqwest::Client::new();
        let nodes = foundry::NodeManager::new(http.clone());
        let docs = foundry::services::docs::DocsService::new(
            http.clone(),
            config.docs_url.clone(),
            config.docs_ttl_secs,
        );
        Self {
            config,
            http,
            nodes,
            docs,
        }
    }
}
