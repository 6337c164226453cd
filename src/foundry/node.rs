// src/foundry/node.rs
//
// Lifecycle management for locally started anvil nodes. The registry is the
// only shared mutable state in the crate apart from the docs cache; it is
// mutated by start/stop and, through self-healing, by status reads.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use dashmap::DashMap;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::process::Command;
use tracing::{info, warn};

use super::models::{NodeInstance, NodeSummary, ToolOutput};
use super::options::CommandOptions;
use super::rpc;

/// Port assumed for node-control operations when none is given.
pub const DEFAULT_NODE_PORT: u16 = 8545;

/// Delay between spawning anvil and the first liveness probe.
const STARTUP_WAIT: Duration = Duration::from_millis(800);

fn default_port() -> u16 {
    DEFAULT_NODE_PORT
}

/// Launch parameters for one anvil instance.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeStartConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    pub fork_url: Option<String>,
    pub block_time: Option<u64>,
    pub accounts: Option<u32>,
    pub mnemonic: Option<String>,
}

/// Tracks anvil processes started by this server, keyed by listening port.
///
/// At most one instance per port; entries leave the registry on explicit
/// stop or when a liveness probe finds them dead. Children are spawned with
/// kill-on-drop so nodes never outlive the server process.
#[derive(Clone)]
pub struct NodeManager {
    nodes: Arc<DashMap<u16, NodeInstance>>,
    client: Client,
    binary: String,
    warmup: Duration,
}

impl NodeManager {
    pub fn new(client: Client) -> Self {
        Self {
            nodes: Arc::new(DashMap::new()),
            client,
            binary: "anvil".to_string(),
            warmup: STARTUP_WAIT,
        }
    }

    /// Replaces the node binary. Tests use this to force spawn failures.
    pub fn with_binary(mut self, binary: &str) -> Self {
        self.binary = binary.to_string();
        self
    }

    /// Shortens the warm-up delay. Tests use this to avoid real waits.
    pub fn with_warmup(mut self, warmup: Duration) -> Self {
        self.warmup = warmup;
        self
    }

    /// Ports with a tracked instance, in no particular order.
    pub fn tracked_ports(&self) -> Vec<u16> {
        self.nodes.iter().map(|entry| *entry.key()).collect()
    }

    /// Spawns a node and registers it once a liveness probe confirms it.
    ///
    /// Starting a port that is already tracked is an idempotent no-op. A
    /// node that spawns but never answers the probe is killed and not
    /// registered, so failed startups leave nothing behind.
    pub async fn start(&self, cfg: NodeStartConfig, workdir: Option<&Path>) -> ToolOutput {
        let port = cfg.port;
        if self.nodes.contains_key(&port) {
            return ToolOutput::success(format!(
                "Anvil node already running on port {}",
                port
            ));
        }

        let args = CommandOptions::new()
            .arg("port", port)
            .arg_opt("fork-url", cfg.fork_url.as_deref())
            .arg_opt("block-time", cfg.block_time)
            .arg_opt("accounts", cfg.accounts)
            .arg_opt("mnemonic", cfg.mnemonic.as_deref())
            .to_args();

        let mut cmd = Command::new(&self.binary);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .env("NO_COLOR", "1")
            .env("FORCE_COLOR", "0")
            .kill_on_drop(true);
        if let Some(dir) = workdir {
            cmd.current_dir(dir);
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                return ToolOutput::failure(format!("Failed to start anvil: {}", err));
            }
        };
        let process_id = child.id().unwrap_or_default();

        tokio::time::sleep(self.warmup).await;

        match self.probe(port).await {
            Ok(chain_id) => {
                info!(port, process_id, %chain_id, "anvil node started");
                let fork_url = cfg.fork_url.clone();
                self.nodes.insert(
                    port,
                    NodeInstance {
                        port,
                        process_id,
                        fork_url: cfg.fork_url,
                        child,
                    },
                );
                let mut text = format!(
                    "Anvil node started on port {} (pid {}, chain id {})",
                    port, process_id, chain_id
                );
                if let Some(fork) = fork_url {
                    text.push_str(&format!(", forking {}", fork));
                }
                ToolOutput::success(text)
            }
            Err(err) => {
                warn!(port, %err, "anvil did not answer liveness probe, killing it");
                let _ = child.kill().await;
                ToolOutput::failure(format!(
                    "Anvil node on port {} did not become ready: {}",
                    port, err
                ))
            }
        }
    }

    /// Terminates a tracked node. Untracked ports are reported, not errors;
    /// the entry is removed even when signal delivery fails so the registry
    /// never keeps a handle it cannot use.
    pub async fn stop(&self, port: u16) -> ToolOutput {
        match self.nodes.remove(&port) {
            Some((_, mut instance)) => match instance.child.kill().await {
                Ok(()) => {
                    info!(port, "anvil node stopped");
                    ToolOutput::success(format!("Anvil node on port {} stopped", port))
                }
                Err(err) => {
                    warn!(port, %err, "termination signal failed; entry removed anyway");
                    ToolOutput::success(format!(
                        "Anvil node on port {} removed from registry, but the termination signal failed: {}",
                        port, err
                    ))
                }
            },
            None => ToolOutput::success(format!("No anvil node tracked on port {}", port)),
        }
    }

    /// Reports on one port, or on every tracked instance when `port` is
    /// absent. Status reads re-probe and drop entries that stopped
    /// answering.
    pub async fn status(&self, port: Option<u16>) -> ToolOutput {
        match port {
            Some(port) => self.status_one(port).await,
            None => self.status_all().await,
        }
    }

    async fn status_one(&self, port: u16) -> ToolOutput {
        // Copy the metadata out so no map guard is held across the probe.
        let tracked = self
            .nodes
            .get(&port)
            .map(|entry| (entry.process_id, entry.fork_url.clone()));

        match tracked {
            Some((process_id, fork_url)) => match self.probe(port).await {
                Ok(chain_id) => {
                    let mut text = format!(
                        "Anvil node on port {} is running (pid {}, chain id {})",
                        port, process_id, chain_id
                    );
                    if let Some(fork) = fork_url {
                        text.push_str(&format!(", forking {}", fork));
                    }
                    ToolOutput::success(text)
                }
                Err(_) => {
                    self.nodes.remove(&port);
                    warn!(port, "tracked node stopped responding; removed");
                    ToolOutput::success(format!(
                        "Anvil node on port {} is not responding; removed from registry",
                        port
                    ))
                }
            },
            // The node may be running without us having started it; probe
            // directly but never register it.
            None => match self.probe(port).await {
                Ok(chain_id) => ToolOutput::success(format!(
                    "No tracked instance on port {}, but a node is responding there (chain id {})",
                    port, chain_id
                )),
                Err(_) => ToolOutput::success(format!("No anvil instance on port {}", port)),
            },
        }
    }

    async fn status_all(&self) -> ToolOutput {
        let summaries = self.summaries().await;
        if summaries.is_empty() {
            return ToolOutput::success("No anvil nodes tracked".to_string());
        }
        let lines: Vec<String> = summaries
            .iter()
            .map(|s| {
                if s.responsive {
                    let chain = s.chain_id.as_deref().unwrap_or("?");
                    match &s.fork_url {
                        Some(fork) => format!(
                            "port {}: running (pid {}, chain id {}, forking {})",
                            s.port, s.process_id, chain, fork
                        ),
                        None => format!(
                            "port {}: running (pid {}, chain id {})",
                            s.port, s.process_id, chain
                        ),
                    }
                } else {
                    format!(
                        "port {}: not responding, removed from registry",
                        s.port
                    )
                }
            })
            .collect();
        ToolOutput::success(lines.join("\n"))
    }

    /// Probes every tracked instance and returns a serializable snapshot.
    /// Entries that fail the probe are removed as a side effect.
    pub async fn summaries(&self) -> Vec<NodeSummary> {
        let ports = self.tracked_ports();
        let mut out = Vec::with_capacity(ports.len());
        for port in ports {
            let meta = match self.nodes.get(&port) {
                Some(entry) => (entry.process_id, entry.fork_url.clone()),
                // Raced with a concurrent stop; nothing to report.
                None => continue,
            };
            let (process_id, fork_url) = meta;
            match self.probe(port).await {
                Ok(chain_id) => out.push(NodeSummary {
                    port,
                    process_id,
                    fork_url,
                    responsive: true,
                    chain_id: Some(chain_id),
                }),
                Err(_) => {
                    self.nodes.remove(&port);
                    warn!(port, "tracked node stopped responding; removed");
                    out.push(NodeSummary {
                        port,
                        process_id,
                        fork_url,
                        responsive: false,
                        chain_id: None,
                    });
                }
            }
        }
        out
    }

    /// Liveness probe: one `eth_chainId` round trip, decoded to decimal.
    async fn probe(&self, port: u16) -> Result<String> {
        let result = rpc::rpc_call(
            &self.client,
            &rpc::endpoint_for_port(port),
            "eth_chainId",
            json!([]),
        )
        .await?;
        let hex = result
            .as_str()
            .ok_or_else(|| anyhow!("unexpected eth_chainId result: {}", result))?;
        let decoded = u64::from_str_radix(hex.trim_start_matches("0x"), 16)
            .map(|n| n.to_string())
            .unwrap_or_else(|_| hex.to_string());
        Ok(decoded)
    }
}
