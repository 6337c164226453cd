// src/foundry/services/docs.rs

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::foundry::models::ToolOutput;

/// Where the documentation index is fetched from when the environment does
/// not override it.
pub const DEFAULT_DOCS_URL: &str =
    "https://raw.githubusercontent.com/foundry-rs/book/master/src/SUMMARY.md";

/// One cached fetch. Replaced only by a newer successful fetch.
#[derive(Debug, Clone)]
struct DocsCache {
    content: String,
    fetched_at: DateTime<Utc>,
}

/// On-demand documentation fetcher with a single cache slot.
///
/// Staleness is evaluated lazily on access; there is no background refresh.
/// A failed refresh serves the previous content unchanged rather than
/// dropping it.
#[derive(Clone)]
pub struct DocsService {
    client: Client,
    url: String,
    ttl_secs: i64,
    cache: Arc<Mutex<Option<DocsCache>>>,
}

impl DocsService {
    pub fn new(client: Client, url: String, ttl_secs: u64) -> Self {
        Self {
            client,
            url,
            ttl_secs: ttl_secs as i64,
            cache: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the documentation text, from cache when fresh.
    pub async fn get(&self) -> ToolOutput {
        let mut slot = self.cache.lock().await;

        if let Some(cache) = slot.as_ref() {
            if (Utc::now() - cache.fetched_at).num_seconds() < self.ttl_secs {
                debug!("serving documentation from cache");
                return ToolOutput::success(cache.content.clone());
            }
        }

        match self.fetch().await {
            Ok(content) => {
                *slot = Some(DocsCache {
                    content: content.clone(),
                    fetched_at: Utc::now(),
                });
                ToolOutput::success(content)
            }
            Err(err) => match slot.as_ref() {
                Some(cache) => {
                    warn!(%err, "documentation fetch failed; serving cached copy");
                    ToolOutput::success(cache.content.clone())
                }
                None => ToolOutput::failure(format!("failed to fetch documentation: {}", err)),
            },
        }
    }

    async fn fetch(&self) -> Result<String> {
        debug!(url = %self.url, "fetching documentation");
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.url))?
            .error_for_status()
            .context("documentation source returned an error status")?;
        resp.text()
            .await
            .context("failed to read documentation body")
    }
}
