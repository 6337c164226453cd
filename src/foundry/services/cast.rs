// src/foundry/services/cast.rs
//
// Chain-interaction operations. Each builds a `cast` argument vector from a
// typed parameter struct; subprocess exit status flows back through the
// rendered `ToolOutput`, never as an error.

use serde::Deserialize;

use crate::foundry::models::{FoundryError, ToolOutput};
use crate::foundry::options::CommandOptions;
use crate::foundry::{exec, validate};
use crate::AppState;

/// Shared fallback: an explicit `rpc_url` wins, otherwise the configured
/// default endpoint, otherwise no flag at all (the tool applies its own
/// default).
fn resolve_rpc_url(state: &AppState, rpc_url: Option<String>) -> Result<Option<String>, FoundryError> {
    if let Some(url) = rpc_url.as_deref() {
        validate::ensure_url(url)?;
    }
    Ok(rpc_url.or_else(|| state.config.rpc_url.clone()))
}

async fn run_cast(state: &AppState, argv: Vec<String>) -> ToolOutput {
    let result = exec::run_command("cast", &argv, state.config.workdir.as_deref()).await;
    ToolOutput::from_result(&result)
}

#[derive(Debug, Deserialize)]
pub struct CastCallParams {
    pub contract_address: String,
    pub function_signature: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub rpc_url: Option<String>,
    pub block: Option<String>,
    pub from: Option<String>,
}

/// `cast call`: read-only contract invocation.
pub async fn call(state: &AppState, params: CastCallParams) -> Result<ToolOutput, FoundryError> {
    validate::ensure_address(&params.contract_address)?;
    validate::ensure_non_empty("function_signature", &params.function_signature)?;
    if let Some(from) = params.from.as_deref() {
        validate::ensure_address(from)?;
    }
    let rpc_url = resolve_rpc_url(state, params.rpc_url)?;

    let mut argv = vec![
        "call".to_string(),
        params.contract_address,
        params.function_signature,
    ];
    argv.extend(params.args);
    argv.extend(
        CommandOptions::new()
            .arg_opt("rpc-url", rpc_url)
            .arg_opt("block", params.block)
            .arg_opt("from", params.from)
            .to_args(),
    );
    Ok(run_cast(state, argv).await)
}

#[derive(Debug, Deserialize)]
pub struct CastSendParams {
    pub contract_address: String,
    pub function_signature: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    pub value: Option<String>,
    pub rpc_url: Option<String>,
    pub private_key: Option<String>,
    pub gas_limit: Option<String>,
    pub gas_price: Option<String>,
    #[serde(default)]
    pub legacy: bool,
}

/// `cast send`: signed state-changing transaction. The private key falls
/// back to the configured default; without either the call is rejected
/// before anything spawns.
pub async fn send(state: &AppState, params: CastSendParams) -> Result<ToolOutput, FoundryError> {
    validate::ensure_address(&params.contract_address)?;
    if let Some(sig) = params.function_signature.as_deref() {
        validate::ensure_non_empty("function_signature", sig)?;
    }
    let private_key = match params.private_key.or_else(|| state.config.default_private_key()) {
        Some(key) => key,
        None => {
            return Err(FoundryError::InvalidParams(
                "no private_key provided and no default key configured".to_string(),
            ))
        }
    };
    validate::ensure_private_key(&private_key)?;
    let rpc_url = resolve_rpc_url(state, params.rpc_url)?;

    let mut argv = vec!["send".to_string(), params.contract_address];
    if let Some(sig) = params.function_signature {
        argv.push(sig);
    }
    argv.extend(params.args);
    argv.extend(
        CommandOptions::new()
            .arg_opt("rpc-url", rpc_url)
            .arg_opt("value", params.value)
            .arg_opt("gas-limit", params.gas_limit)
            .arg_opt("gas-price", params.gas_price)
            .flag("legacy", params.legacy)
            .arg("private-key", private_key)
            .to_args(),
    );
    Ok(run_cast(state, argv).await)
}

#[derive(Debug, Deserialize)]
pub struct CastBalanceParams {
    pub address: String,
    pub rpc_url: Option<String>,
    pub block: Option<String>,
    #[serde(default)]
    pub ether: bool,
}

/// `cast balance`: account balance, in wei or ether.
pub async fn balance(
    state: &AppState,
    params: CastBalanceParams,
) -> Result<ToolOutput, FoundryError> {
    validate::ensure_address(&params.address)?;
    let rpc_url = resolve_rpc_url(state, params.rpc_url)?;

    let mut argv = vec!["balance".to_string(), params.address];
    argv.extend(
        CommandOptions::new()
            .arg_opt("rpc-url", rpc_url)
            .arg_opt("block", params.block)
            .flag("ether", params.ether)
            .to_args(),
    );
    Ok(run_cast(state, argv).await)
}

#[derive(Debug, Deserialize)]
pub struct CastReceiptParams {
    pub tx_hash: String,
    pub field: Option<String>,
    pub rpc_url: Option<String>,
    pub confirmations: Option<u64>,
}

/// `cast receipt`: transaction receipt, optionally a single field of it.
pub async fn receipt(
    state: &AppState,
    params: CastReceiptParams,
) -> Result<ToolOutput, FoundryError> {
    validate::ensure_tx_hash(&params.tx_hash)?;
    let rpc_url = resolve_rpc_url(state, params.rpc_url)?;

    let mut argv = vec!["receipt".to_string(), params.tx_hash];
    if let Some(field) = params.field {
        argv.push(field);
    }
    argv.extend(
        CommandOptions::new()
            .arg_opt("rpc-url", rpc_url)
            .arg_opt("confirmations", params.confirmations)
            .to_args(),
    );
    Ok(run_cast(state, argv).await)
}

#[derive(Debug, Deserialize)]
pub struct CastStorageParams {
    pub address: String,
    pub slot: String,
    pub rpc_url: Option<String>,
    pub block: Option<String>,
}

/// `cast storage`: raw storage slot read.
pub async fn storage(
    state: &AppState,
    params: CastStorageParams,
) -> Result<ToolOutput, FoundryError> {
    validate::ensure_address(&params.address)?;
    validate::ensure_non_empty("slot", &params.slot)?;
    let rpc_url = resolve_rpc_url(state, params.rpc_url)?;

    let mut argv = vec!["storage".to_string(), params.address, params.slot];
    argv.extend(
        CommandOptions::new()
            .arg_opt("rpc-url", rpc_url)
            .arg_opt("block", params.block)
            .to_args(),
    );
    Ok(run_cast(state, argv).await)
}

#[derive(Debug, Deserialize)]
pub struct CastRunParams {
    pub tx_hash: String,
    pub rpc_url: Option<String>,
    #[serde(default)]
    pub quick: bool,
}

/// `cast run`: replay a transaction locally for tracing.
pub async fn run_tx(state: &AppState, params: CastRunParams) -> Result<ToolOutput, FoundryError> {
    validate::ensure_tx_hash(&params.tx_hash)?;
    let rpc_url = resolve_rpc_url(state, params.rpc_url)?;

    let mut argv = vec!["run".to_string(), params.tx_hash];
    argv.extend(
        CommandOptions::new()
            .arg_opt("rpc-url", rpc_url)
            .flag("quick", params.quick)
            .to_args(),
    );
    Ok(run_cast(state, argv).await)
}

#[derive(Debug, Deserialize)]
pub struct CastLogsParams {
    pub signature: String,
    #[serde(default)]
    pub topics: Vec<String>,
    pub address: Option<String>,
    pub from_block: Option<String>,
    pub to_block: Option<String>,
    pub rpc_url: Option<String>,
}

/// `cast logs`: fetch logs matching an event signature.
pub async fn logs(state: &AppState, params: CastLogsParams) -> Result<ToolOutput, FoundryError> {
    validate::ensure_non_empty("signature", &params.signature)?;
    if let Some(address) = params.address.as_deref() {
        validate::ensure_address(address)?;
    }
    let rpc_url = resolve_rpc_url(state, params.rpc_url)?;

    let mut argv = vec!["logs".to_string(), params.signature];
    argv.extend(params.topics);
    argv.extend(
        CommandOptions::new()
            .arg_opt("address", params.address)
            .arg_opt("from-block", params.from_block)
            .arg_opt("to-block", params.to_block)
            .arg_opt("rpc-url", rpc_url)
            .to_args(),
    );
    Ok(run_cast(state, argv).await)
}

#[derive(Debug, Deserialize)]
pub struct CastSigParams {
    pub signature: String,
    #[serde(default)]
    pub event: bool,
}

/// `cast sig` / `cast sig-event`: selector for a function or event
/// signature. Purely local, no endpoint involved.
pub async fn sig(state: &AppState, params: CastSigParams) -> Result<ToolOutput, FoundryError> {
    validate::ensure_non_empty("signature", &params.signature)?;
    let subcommand = if params.event { "sig-event" } else { "sig" };
    let argv = vec![subcommand.to_string(), params.signature];
    Ok(run_cast(state, argv).await)
}
