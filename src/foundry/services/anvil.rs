// src/foundry/services/anvil.rs
//
// Anvil lifecycle operations (backed by the node registry) and node-control
// operations (single RPC round trips against a running instance).

use serde::Deserialize;
use serde_json::{json, Value};

use crate::foundry::models::{FoundryError, ToolOutput};
use crate::foundry::node::{NodeStartConfig, DEFAULT_NODE_PORT};
use crate::foundry::{rpc, validate};
use crate::AppState;

fn default_node_port() -> u16 {
    DEFAULT_NODE_PORT
}

fn default_blocks() -> u64 {
    1
}

/// Picks the endpoint for a node-control call: an explicit URL wins,
/// otherwise the loopback endpoint for the given (or default) port.
fn resolve_endpoint(rpc_url: Option<&str>, port: Option<u16>) -> Result<String, FoundryError> {
    match rpc_url {
        Some(url) => {
            validate::ensure_url(url)?;
            Ok(url.to_string())
        }
        None => Ok(rpc::endpoint_for_port(port.unwrap_or(DEFAULT_NODE_PORT))),
    }
}

// --- Lifecycle ---

pub async fn start(state: &AppState, params: NodeStartConfig) -> Result<ToolOutput, FoundryError> {
    if let Some(fork) = params.fork_url.as_deref() {
        validate::ensure_url(fork)?;
    }
    Ok(state
        .nodes
        .start(params, state.config.workdir.as_deref())
        .await)
}

#[derive(Debug, Deserialize)]
pub struct AnvilStopParams {
    #[serde(default = "default_node_port")]
    pub port: u16,
}

pub async fn stop(state: &AppState, params: AnvilStopParams) -> Result<ToolOutput, FoundryError> {
    Ok(state.nodes.stop(params.port).await)
}

#[derive(Debug, Default, Deserialize)]
pub struct AnvilStatusParams {
    pub port: Option<u16>,
}

pub async fn status(
    state: &AppState,
    params: AnvilStatusParams,
) -> Result<ToolOutput, FoundryError> {
    Ok(state.nodes.status(params.port).await)
}

// --- Node control over RPC ---

#[derive(Debug, Deserialize)]
pub struct MineParams {
    #[serde(default = "default_blocks")]
    pub blocks: u64,
    pub interval: Option<u64>,
    pub port: Option<u16>,
    pub rpc_url: Option<String>,
}

pub async fn mine(state: &AppState, params: MineParams) -> Result<ToolOutput, FoundryError> {
    let endpoint = resolve_endpoint(params.rpc_url.as_deref(), params.port)?;
    let mut rpc_params = vec![json!(format!("0x{:x}", params.blocks))];
    if let Some(interval) = params.interval {
        rpc_params.push(json!(format!("0x{:x}", interval)));
    }
    match rpc::rpc_call(&state.http, &endpoint, "anvil_mine", Value::Array(rpc_params)).await {
        Ok(_) => Ok(ToolOutput::success(match params.interval {
            Some(interval) => format!(
                "Mined {} block(s) with {}s between blocks",
                params.blocks, interval
            ),
            None => format!("Mined {} block(s)", params.blocks),
        })),
        Err(err) => Ok(ToolOutput::failure(err.to_string())),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetParams {
    pub fork_url: Option<String>,
    pub block_number: Option<u64>,
    pub port: Option<u16>,
    pub rpc_url: Option<String>,
}

pub async fn reset(state: &AppState, params: ResetParams) -> Result<ToolOutput, FoundryError> {
    let endpoint = resolve_endpoint(params.rpc_url.as_deref(), params.port)?;
    // With a fork origin the node re-forks from it; without one it resets to
    // a fresh state. blockNumber rides inside the forking config object and
    // is plain JSON there, not a quantity string.
    let rpc_params = match params.fork_url.as_deref() {
        Some(fork) => {
            validate::ensure_url(fork)?;
            let mut forking = json!({ "jsonRpcUrl": fork });
            if let Some(block) = params.block_number {
                forking["blockNumber"] = json!(block);
            }
            json!([{ "forking": forking }])
        }
        None => json!([]),
    };
    match rpc::rpc_call(&state.http, &endpoint, "anvil_reset", rpc_params).await {
        Ok(_) => Ok(ToolOutput::success(match params.fork_url {
            Some(fork) => match params.block_number {
                Some(block) => format!("Node reset, forking {} at block {}", fork, block),
                None => format!("Node reset, forking {}", fork),
            },
            None => "Node state reset".to_string(),
        })),
        Err(err) => Ok(ToolOutput::failure(err.to_string())),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SnapshotParams {
    pub port: Option<u16>,
    pub rpc_url: Option<String>,
}

pub async fn snapshot(
    state: &AppState,
    params: SnapshotParams,
) -> Result<ToolOutput, FoundryError> {
    let endpoint = resolve_endpoint(params.rpc_url.as_deref(), params.port)?;
    match rpc::rpc_call(&state.http, &endpoint, "evm_snapshot", json!([])).await {
        Ok(result) => {
            let id = result
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| result.to_string());
            Ok(ToolOutput::success(format!("Snapshot created: {}", id)))
        }
        Err(err) => Ok(ToolOutput::failure(err.to_string())),
    }
}

#[derive(Debug, Deserialize)]
pub struct RevertParams {
    pub snapshot_id: String,
    pub port: Option<u16>,
    pub rpc_url: Option<String>,
}

pub async fn revert(state: &AppState, params: RevertParams) -> Result<ToolOutput, FoundryError> {
    validate::ensure_non_empty("snapshot_id", &params.snapshot_id)?;
    let endpoint = resolve_endpoint(params.rpc_url.as_deref(), params.port)?;
    let id = rpc::to_quantity(&params.snapshot_id);
    match rpc::rpc_call(&state.http, &endpoint, "evm_revert", json!([id])).await {
        Ok(result) => {
            if result.as_bool() == Some(false) {
                return Ok(ToolOutput::failure(format!(
                    "snapshot {} not found (already reverted or never taken)",
                    params.snapshot_id
                )));
            }
            Ok(ToolOutput::success(format!(
                "Reverted to snapshot {}",
                params.snapshot_id
            )))
        }
        Err(err) => Ok(ToolOutput::failure(err.to_string())),
    }
}

#[derive(Debug, Deserialize)]
pub struct SetBalanceParams {
    pub address: String,
    pub balance: String,
    pub port: Option<u16>,
    pub rpc_url: Option<String>,
}

pub async fn set_balance(
    state: &AppState,
    params: SetBalanceParams,
) -> Result<ToolOutput, FoundryError> {
    validate::ensure_address(&params.address)?;
    validate::ensure_non_empty("balance", &params.balance)?;
    let endpoint = resolve_endpoint(params.rpc_url.as_deref(), params.port)?;
    let balance = rpc::to_quantity(&params.balance);
    match rpc::rpc_call(
        &state.http,
        &endpoint,
        "anvil_setBalance",
        json!([params.address, balance]),
    )
    .await
    {
        Ok(_) => Ok(ToolOutput::success(format!(
            "Balance of {} set to {} wei",
            params.address, params.balance
        ))),
        Err(err) => Ok(ToolOutput::failure(err.to_string())),
    }
}

#[derive(Debug, Deserialize)]
pub struct IncreaseTimeParams {
    pub seconds: u64,
    pub port: Option<u16>,
    pub rpc_url: Option<String>,
}

pub async fn increase_time(
    state: &AppState,
    params: IncreaseTimeParams,
) -> Result<ToolOutput, FoundryError> {
    let endpoint = resolve_endpoint(params.rpc_url.as_deref(), params.port)?;
    match rpc::rpc_call(
        &state.http,
        &endpoint,
        "evm_increaseTime",
        json!([format!("0x{:x}", params.seconds)]),
    )
    .await
    {
        Ok(_) => Ok(ToolOutput::success(format!(
            "Advanced node time by {} seconds",
            params.seconds
        ))),
        Err(err) => Ok(ToolOutput::failure(err.to_string())),
    }
}

#[derive(Debug, Deserialize)]
pub struct SetNextTimestampParams {
    pub timestamp: u64,
    pub port: Option<u16>,
    pub rpc_url: Option<String>,
}

pub async fn set_next_timestamp(
    state: &AppState,
    params: SetNextTimestampParams,
) -> Result<ToolOutput, FoundryError> {
    let endpoint = resolve_endpoint(params.rpc_url.as_deref(), params.port)?;
    match rpc::rpc_call(
        &state.http,
        &endpoint,
        "evm_setNextBlockTimestamp",
        json!([format!("0x{:x}", params.timestamp)]),
    )
    .await
    {
        Ok(_) => Ok(ToolOutput::success(format!(
            "Next block timestamp set to {}",
            params.timestamp
        ))),
        Err(err) => Ok(ToolOutput::failure(err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_rpc_url_wins_over_port() {
        let endpoint = resolve_endpoint(Some("http://10.0.0.5:9999"), Some(8545)).unwrap();
        assert_eq!(endpoint, "http://10.0.0.5:9999");
    }

    #[test]
    fn port_fallback_builds_loopback_endpoint() {
        assert_eq!(resolve_endpoint(None, Some(9001)).unwrap(), "http://127.0.0.1:9001");
        assert_eq!(resolve_endpoint(None, None).unwrap(), "http://127.0.0.1:8545");
    }

    #[test]
    fn malformed_rpc_url_is_rejected() {
        assert!(resolve_endpoint(Some("not a url"), None).is_err());
    }
}
