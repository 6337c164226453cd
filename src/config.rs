// src/config.rs

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};

use crate::foundry::services::docs::DEFAULT_DOCS_URL;

// A struct to hold all configuration, loaded once at startup from the .env
// file and passed into every dispatch call as ambient defaults.
#[derive(Clone, Debug)]
pub struct Config {
    // Server settings
    pub port: u16,

    /// Default RPC endpoint for chain-interaction commands. Omitted flags
    /// fall back to this; when it is unset too, the tools apply their own
    /// defaults.
    pub rpc_url: Option<String>,

    /// Default signing credential for commands that submit transactions.
    pub private_key: Option<SecretString>,

    /// Working directory for every subprocess invocation (usually the
    /// Foundry project root).
    pub workdir: Option<PathBuf>,

    // Documentation cache settings
    pub docs_url: String,
    pub docs_ttl_secs: u64,
}

impl Config {
    /// The default signing key, exposed for handing to a subprocess. The
    /// secret leaves its wrapper only here.
    pub fn default_private_key(&self) -> Option<String> {
        self.private_key
            .as_ref()
            .map(|key| key.expose_secret().clone())
    }

    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load variables from the .env file into the environment
        dotenvy::dotenv().ok();

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse()
            .context("PORT must be a valid number")?;

        let rpc_url = env::var("FOUNDRY_RPC_URL").ok().filter(|s| !s.is_empty());
        let private_key = env::var("FOUNDRY_PRIVATE_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .map(SecretString::new);
        let workdir = env::var("FOUNDRY_WORKDIR")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let docs_url =
            env::var("FOUNDRY_DOCS_URL").unwrap_or_else(|_| DEFAULT_DOCS_URL.to_string());
        let docs_ttl_secs = env::var("FOUNDRY_DOCS_TTL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()
            .context("FOUNDRY_DOCS_TTL_SECS must be a valid number")?;

        Ok(Config {
            port,
            rpc_url,
            private_key,
            workdir,
            docs_url,
            docs_ttl_secs,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 3001,
            rpc_url: None,
            private_key: None,
            workdir: None,
            docs_url: DEFAULT_DOCS_URL.to_string(),
            docs_ttl_secs: 3600,
        }
    }
}
