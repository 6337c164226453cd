//! # MCP Handler Module
//!
//! Implements the Model Context Protocol surface of the Foundry server:
//! request dispatch, the tool catalog, and the prompt templates. Tool calls
//! are routed to the implementations in `crate::foundry`; their outcomes
//! travel back in the MCP `content`/`isError` result shape, so a failing
//! `forge` run is a result, not a protocol error.
//!
//! ## Supported Tools
//!
//! ### Anvil lifecycle
//! - `anvil_start` - Launch a local node, optionally forking a remote chain
//! - `anvil_stop` - Terminate a tracked node and forget it
//! - `anvil_status` - Probe one tracked node, or all of them
//!
//! ### Anvil node control
//! - `anvil_mine` - Mine blocks on demand
//! - `anvil_reset` - Reset chain state, optionally re-forking
//! - `anvil_snapshot` - Capture a state snapshot
//! - `anvil_revert` - Revert to a snapshot
//! - `anvil_set_balance` - Overwrite an account balance
//! - `anvil_increase_time` - Advance the node clock
//! - `anvil_set_next_timestamp` - Pin the next block's timestamp
//!
//! ### Chain interaction (cast)
//! - `cast_call` - Read-only contract call
//! - `cast_send` - Signed state-changing transaction
//! - `cast_balance` - Account balance query
//! - `cast_receipt` - Transaction receipt lookup
//! - `cast_storage` - Raw storage slot read
//! - `cast_run` - Replay a transaction locally
//! - `cast_logs` - Fetch event logs
//! - `cast_sig` - Function or event selector
//!
//! ### Project tooling (forge)
//! - `forge_build` - Compile the project
//! - `forge_test` - Run the test suite
//! - `forge_script` - Execute a Solidity script
//! - `forge_install` - Install a dependency
//! - `forge_remove` - Remove a dependency
//!
//! ### REPL (chisel)
//! - `chisel_eval` - Evaluate an inline snippet
//! - `chisel_run` - Run multi-line source via a temp file
//!
//! ### Toolchain meta
//! - `foundry_versions` - Report installed binary versions
//! - `list_commands` - Scan a binary's `--help` subcommand list
//! - `foundry_docs` - Fetch the Foundry book index (cached)

use crate::{
    foundry::{
        models::{FoundryError, ToolOutput},
        node::NodeStartConfig,
        services::{anvil, cast, chisel, forge, help, version},
    },
    mcp::protocol::{error_codes, Request, Response},
    utils, AppState,
};
use serde_json::{json, Value};
use tracing::info;

// Tool names double as direct JSON-RPC methods for CLI convenience; such
// calls are rewritten into tools/call to reuse the same dispatch.
const TOOL_METHODS: &[&str] = &[
    "anvil_start",
    "anvil_stop",
    "anvil_status",
    "anvil_mine",
    "anvil_reset",
    "anvil_snapshot",
    "anvil_revert",
    "anvil_set_balance",
    "anvil_increase_time",
    "anvil_set_next_timestamp",
    "cast_call",
    "cast_send",
    "cast_balance",
    "cast_receipt",
    "cast_storage",
    "cast_run",
    "cast_logs",
    "cast_sig",
    "forge_build",
    "forge_test",
    "forge_script",
    "forge_install",
    "forge_remove",
    "chisel_eval",
    "chisel_run",
    "foundry_versions",
    "list_commands",
    "foundry_docs",
];

/// Wraps a tool outcome in the MCP tools/call result shape. Command
/// failures stay inside the result (`isError: true`); only malformed
/// requests become JSON-RPC errors.
fn make_tool_result(output: ToolOutput) -> Value {
    json!({
        "content": [{ "type": "text", "text": output.text }],
        "isError": output.is_error
    })
}

fn error_for(req_id: &Value, err: &FoundryError) -> Response {
    Response::error(req_id.clone(), err.code(), err.to_string())
}

pub async fn handle_mcp_request(req: Request, state: AppState) -> Option<Response> {
    info!("Handling MCP request for method: {}", req.method);

    if req.is_notification() {
        return None;
    }

    let response = match req.method.as_str() {
        "initialize" => handle_initialize(&req),
        "tools/list" => handle_tools_list(&req),
        "tools/call" => handle_tool_call(req, state).await,
        "prompts/list" => handle_prompts_list(&req),
        "prompts/get" => handle_prompt_get(&req),
        m if TOOL_METHODS.contains(&m) => {
            let wrapped = Request {
                jsonrpc: req.jsonrpc.clone(),
                id: req.id.clone(),
                method: "tools/call".to_string(),
                params: Some(json!({
                    "name": req.method.clone(),
                    "arguments": req.params.clone().unwrap_or_else(|| json!({}))
                })),
            };
            handle_tool_call(wrapped, state).await
        }
        _ => Response::error(
            req.id,
            error_codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", req.method),
        ),
    };

    Some(response)
}

/// Handles a 'tools/call' request by dispatching it to the correct tool logic.
async fn handle_tool_call(req: Request, state: AppState) -> Response {
    let params = match req.params.as_ref() {
        Some(p) => p,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'params' object".into(),
            )
        }
    };

    let tool_name = match params.get("name").and_then(|n| n.as_str()) {
        Some(name) => name,
        None => {
            return Response::error(
                req.id,
                error_codes::INVALID_PARAMS,
                "Missing 'name' field in params".into(),
            )
        }
    };

    let empty_args = json!({});
    let args = params.get("arguments").unwrap_or(&empty_args);
    let req_id = &req.id;

    match tool_name {
        // --- Anvil lifecycle ---
        "anvil_start" => {
            let res: Result<Response, Response> = (async {
                let params: NodeStartConfig = utils::parse_params(args, req_id)?;
                let output = anvil::start(&state, params)
                    .await
                    .map_err(|e| error_for(req_id, &e))?;
                Ok(Response::success(req_id.clone(), make_tool_result(output)))
            })
            .await;
            match res {
                Ok(r) => r,
                Err(e) => e,
            }
        }
        "anvil_stop" => {
            let res: Result<Response, Response> = (async {
                let params: anvil::AnvilStopParams = utils::parse_params(args, req_id)?;
                let output = anvil::stop(&state, params)
                    .await
                    .map_err(|e| error_for(req_id, &e))?;
                Ok(Response::success(req_id.clone(), make_tool_result(output)))
            })
            .await;
            match res {
                Ok(r) => r,
                Err(e) => e,
            }
        }
        "anvil_status" => {
            let res: Result<Response, Response> = (async {
                let params: anvil::AnvilStatusParams = utils::parse_params(args, req_id)?;
                let output = anvil::status(&state, params)
                    .await
                    .map_err(|e| error_for(req_id, &e))?;
                Ok(Response::success(req_id.clone(), make_tool_result(output)))
            })
            .await;
            match res {
                Ok(r) => r,
                Err(e) => e,
            }
        }

        // --- Anvil node control ---
        "anvil_mine" => {
            let res: Result<Response, Response> = (async {
                let params: anvil::MineParams = utils::parse_params(args, req_id)?;
                let output = anvil::mine(&state, params)
                    .await
                    .map_err(|e| error_for(req_id, &e))?;
                Ok(Response::success(req_id.clone(), make_tool_result(output)))
            })
            .await;
            match res {
                Ok(r) => r,
                Err(e) => e,
            }
        }
        "anvil_reset" => {
            let res: Result<Response, Response> = (async {
                let params: anvil::ResetParams = utils::parse_params(args, req_id)?;
                let output = anvil::reset(&state, params)
                    .await
                    .map_err(|e| error_for(req_id, &e))?;
                Ok(Response::success(req_id.clone(), make_tool_result(output)))
            })
            .await;
            match res {
                Ok(r) => r,
                Err(e) => e,
            }
        }
        "anvil_snapshot" => {
            let res: Result<Response, Response> = (async {
                let params: anvil::SnapshotParams = utils::parse_params(args, req_id)?;
                let output = anvil::snapshot(&state, params)
                    .await
                    .map_err(|e| error_for(req_id, &e))?;
                Ok(Response::success(req_id.clone(), make_tool_result(output)))
            })
            .await;
            match res {
                Ok(r) => r,
                Err(e) => e,
            }
        }
        "anvil_revert" => {
            let res: Result<Response, Response> = (async {
                let params: anvil::RevertParams = utils::parse_params(args, req_id)?;
                let output = anvil::revert(&state, params)
                    .await
                    .map_err(|e| error_for(req_id, &e))?;
                Ok(Response::success(req_id.clone(), make_tool_result(output)))
            })
            .await;
            match res {
                Ok(r) => r,
                Err(e) => e,
            }
        }
        "anvil_set_balance" => {
            let res: Result<Response, Response> = (async {
                let params: anvil::SetBalanceParams = utils::parse_params(args, req_id)?;
                let output = anvil::set_balance(&state, params)
                    .await
                    .map_err(|e| error_for(req_id, &e))?;
                Ok(Response::success(req_id.clone(), make_tool_result(output)))
            })
            .await;
            match res {
                Ok(r) => r,
                Err(e) => e,
            }
        }
        "anvil_increase_time" => {
            let res: Result<Response, Response> = (async {
                let params: anvil::IncreaseTimeParams = utils::parse_params(args, req_id)?;
                let output = anvil::increase_time(&state, params)
                    .await
                    .map_err(|e| error_for(req_id, &e))?;
                Ok(Response::success(req_id.clone(), make_tool_result(output)))
            })
            .await;
            match res {
                Ok(r) => r,
                Err(e) => e,
            }
        }
        "anvil_set_next_timestamp" => {
            let res: Result<Response, Response> = (async {
                let params: anvil::SetNextTimestampParams = utils::parse_params(args, req_id)?;
                let output = anvil::set_next_timestamp(&state, params)
                    .await
                    .map_err(|e| error_for(req_id, &e))?;
                Ok(Response::success(req_id.clone(), make_tool_result(output)))
            })
            .await;
            match res {
                Ok(r) => r,
                Err(e) => e,
            }
        }

        // --- Chain interaction ---
        "cast_call" => {
            let res: Result<Response, Response> = (async {
                let params: cast::CastCallParams = utils::parse_params(args, req_id)?;
                let output = cast::call(&state, params)
                    .await
                    .map_err(|e| error_for(req_id, &e))?;
                Ok(Response::success(req_id.clone(), make_tool_result(output)))
            })
            .await;
            match res {
                Ok(r) => r,
                Err(e) => e,
            }
        }
        "cast_send" => {
            let res: Result<Response, Response> = (async {
                let params: cast::CastSendParams = utils::parse_params(args, req_id)?;
                let output = cast::send(&state, params)
                    .await
                    .map_err(|e| error_for(req_id, &e))?;
                Ok(Response::success(req_id.clone(), make_tool_result(output)))
            })
            .await;
            match res {
                Ok(r) => r,
                Err(e) => e,
            }
        }
        "cast_balance" => {
            let res: Result<Response, Response> = (async {
                let params: cast::CastBalanceParams = utils::parse_params(args, req_id)?;
                let output = cast::balance(&state, params)
                    .await
                    .map_err(|e| error_for(req_id, &e))?;
                Ok(Response::success(req_id.clone(), make_tool_result(output)))
            })
            .await;
            match res {
                Ok(r) => r,
                Err(e) => e,
            }
        }
        "cast_receipt" => {
            let res: Result<Response, Response> = (async {
                let params: cast::CastReceiptParams = utils::parse_params(args, req_id)?;
                let output = cast::receipt(&state, params)
                    .await
                    .map_err(|e| error_for(req_id, &e))?;
                Ok(Response::success(req_id.clone(), make_tool_result(output)))
            })
            .await;
            match res {
                Ok(r) => r,
                Err(e) => e,
            }
        }
        "cast_storage" => {
            let res: Result<Response, Response> = (async {
                let params: cast::CastStorageParams = utils::parse_params(args, req_id)?;
                let output = cast::storage(&state, params)
                    .await
                    .map_err(|e| error_for(req_id, &e))?;
                Ok(Response::success(req_id.clone(), make_tool_result(output)))
            })
            .await;
            match res {
                Ok(r) => r,
                Err(e) => e,
            }
        }
        "cast_run" => {
            let res: Result<Response, Response> = (async {
                let params: cast::CastRunParams = utils::parse_params(args, req_id)?;
                let output = cast::run_tx(&state, params)
                    .await
                    .map_err(|e| error_for(req_id, &e))?;
                Ok(Response::success(req_id.clone(), make_tool_result(output)))
            })
            .await;
            match res {
                Ok(r) => r,
                Err(e) => e,
            }
        }
        "cast_logs" => {
            let res: Result<Response, Response> = (async {
                let params: cast::CastLogsParams = utils::parse_params(args, req_id)?;
                let output = cast::logs(&state, params)
                    .await
                    .map_err(|e| error_for(req_id, &e))?;
                Ok(Response::success(req_id.clone(), make_tool_result(output)))
            })
            .await;
            match res {
                Ok(r) => r,
                Err(e) => e,
            }
        }
        "cast_sig" => {
            let res: Result<Response, Response> = (async {
                let params: cast::CastSigParams = utils::parse_params(args, req_id)?;
                let output = cast::sig(&state, params)
                    .await
                    .map_err(|e| error_for(req_id, &e))?;
                Ok(Response::success(req_id.clone(), make_tool_result(output)))
            })
            .await;
            match res {
                Ok(r) => r,
                Err(e) => e,
            }
        }

        // --- Project tooling ---
        "forge_build" => {
            let res: Result<Response, Response> = (async {
                let params: forge::ForgeBuildParams = utils::parse_params(args, req_id)?;
                let output = forge::build(&state, params)
                    .await
                    .map_err(|e| error_for(req_id, &e))?;
                Ok(Response::success(req_id.clone(), make_tool_result(output)))
            })
            .await;
            match res {
                Ok(r) => r,
                Err(e) => e,
            }
        }
        "forge_test" => {
            let res: Result<Response, Response> = (async {
                let params: forge::ForgeTestParams = utils::parse_params(args, req_id)?;
                let output = forge::test(&state, params)
                    .await
                    .map_err(|e| error_for(req_id, &e))?;
                Ok(Response::success(req_id.clone(), make_tool_result(output)))
            })
            .await;
            match res {
                Ok(r) => r,
                Err(e) => e,
            }
        }
        "forge_script" => {
            let res: Result<Response, Response> = (async {
                let params: forge::ForgeScriptParams = utils::parse_params(args, req_id)?;
                let output = forge::script(&state, params)
                    .await
                    .map_err(|e| error_for(req_id, &e))?;
                Ok(Response::success(req_id.clone(), make_tool_result(output)))
            })
            .await;
            match res {
                Ok(r) => r,
                Err(e) => e,
            }
        }
        "forge_install" => {
            let res: Result<Response, Response> = (async {
                let params: forge::ForgeInstallParams = utils::parse_params(args, req_id)?;
                let output = forge::install(&state, params)
                    .await
                    .map_err(|e| error_for(req_id, &e))?;
                Ok(Response::success(req_id.clone(), make_tool_result(output)))
            })
            .await;
            match res {
                Ok(r) => r,
                Err(e) => e,
            }
        }
        "forge_remove" => {
            let res: Result<Response, Response> = (async {
                let params: forge::ForgeRemoveParams = utils::parse_params(args, req_id)?;
                let output = forge::remove(&state, params)
                    .await
                    .map_err(|e| error_for(req_id, &e))?;
                Ok(Response::success(req_id.clone(), make_tool_result(output)))
            })
            .await;
            match res {
                Ok(r) => r,
                Err(e) => e,
            }
        }

        // --- REPL ---
        "chisel_eval" => {
            let res: Result<Response, Response> = (async {
                let params: chisel::ChiselEvalParams = utils::parse_params(args, req_id)?;
                let output = chisel::eval(&state, params)
                    .await
                    .map_err(|e| error_for(req_id, &e))?;
                Ok(Response::success(req_id.clone(), make_tool_result(output)))
            })
            .await;
            match res {
                Ok(r) => r,
                Err(e) => e,
            }
        }
        "chisel_run" => {
            let res: Result<Response, Response> = (async {
                let params: chisel::ChiselRunParams = utils::parse_params(args, req_id)?;
                let output = chisel::run(&state, params)
                    .await
                    .map_err(|e| error_for(req_id, &e))?;
                Ok(Response::success(req_id.clone(), make_tool_result(output)))
            })
            .await;
            match res {
                Ok(r) => r,
                Err(e) => e,
            }
        }

        // --- Toolchain meta ---
        "foundry_versions" => {
            let res: Result<Response, Response> = (async {
                let output = version::versions(&state)
                    .await
                    .map_err(|e| error_for(req_id, &e))?;
                Ok(Response::success(req_id.clone(), make_tool_result(output)))
            })
            .await;
            match res {
                Ok(r) => r,
                Err(e) => e,
            }
        }
        "list_commands" => {
            let res: Result<Response, Response> = (async {
                let params: help::ListCommandsParams = utils::parse_params(args, req_id)?;
                let output = help::list_commands(&state, params)
                    .await
                    .map_err(|e| error_for(req_id, &e))?;
                Ok(Response::success(req_id.clone(), make_tool_result(output)))
            })
            .await;
            match res {
                Ok(r) => r,
                Err(e) => e,
            }
        }
        "foundry_docs" => {
            let output = state.docs.get().await;
            Response::success(req_id.clone(), make_tool_result(output))
        }

        _ => Response::error(
            req.id,
            error_codes::METHOD_NOT_FOUND,
            format!("Tool not found: {}", tool_name),
        ),
    }
}

/// Handles the 'initialize' request.
fn handle_initialize(req: &Request) -> Response {
    let server_info = json!({
        "name": "foundry_mcp",
        "version": env!("CARGO_PKG_VERSION")
    });
    let capabilities = json!({
        "tools": { "listChanged": false },
        "prompts": { "listChanged": false }
    });
    let instructions = "Foundry toolchain MCP server: manage local anvil nodes, interact with chains via cast, build and test with forge, and evaluate Solidity with chisel.";

    Response::success(
        req.id.clone(),
        json!({
            "serverInfo": server_info,
            "protocolVersion": "2025-06-18",
            "capabilities": capabilities,
            "instructions": instructions
        }),
    )
}

/// Handles the 'tools/list' request by returning a JSON definition of all available tools.
fn handle_tools_list(req: &Request) -> Response {
    let tools = json!([
        {
            "name": "anvil_start",
            "description": "Start a local anvil node, optionally forking a remote chain.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "port": {"type": "number", "description": "Port to listen on (default 8545)."},
                    "fork_url": {"type": "string", "description": "RPC endpoint to fork from."},
                    "block_time": {"type": "number", "description": "Seconds per block; omit for instant mining."},
                    "accounts": {"type": "number", "description": "Number of dev accounts to generate."},
                    "mnemonic": {"type": "string", "description": "BIP-39 mnemonic for the dev accounts."}
                },
                "additionalProperties": false
            }
        },
        {
            "name": "anvil_stop",
            "description": "Stop a tracked anvil node and remove it from the registry.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "port": {"type": "number", "description": "Port of the node to stop (default 8545)."}
                },
                "additionalProperties": false
            }
        },
        {
            "name": "anvil_status",
            "description": "Probe a tracked anvil node, or all tracked nodes when no port is given.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "port": {"type": "number", "description": "Port to check; omit to list every tracked node."}
                },
                "additionalProperties": false
            }
        },
        {
            "name": "anvil_mine",
            "description": "Mine one or more blocks on a running anvil node.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "blocks": {"type": "number", "description": "Number of blocks to mine (default 1)."},
                    "interval": {"type": "number", "description": "Seconds between mined blocks."},
                    "port": {"type": "number", "description": "Port of the target node (default 8545)."},
                    "rpc_url": {"type": "string", "description": "Explicit endpoint; overrides the port."}
                },
                "additionalProperties": false
            }
        },
        {
            "name": "anvil_reset",
            "description": "Reset an anvil node's state, optionally re-forking from a remote chain.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "fork_url": {"type": "string", "description": "RPC endpoint to fork from after the reset."},
                    "block_number": {"type": "number", "description": "Fork at this block instead of the latest."},
                    "port": {"type": "number", "description": "Port of the target node (default 8545)."},
                    "rpc_url": {"type": "string", "description": "Explicit endpoint; overrides the port."}
                },
                "additionalProperties": false
            }
        },
        {
            "name": "anvil_snapshot",
            "description": "Capture a snapshot of the node state and return its id.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "port": {"type": "number", "description": "Port of the target node (default 8545)."},
                    "rpc_url": {"type": "string", "description": "Explicit endpoint; overrides the port."}
                },
                "additionalProperties": false
            }
        },
        {
            "name": "anvil_revert",
            "description": "Revert the node to a previously captured snapshot.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "snapshot_id": {"type": "string", "description": "Snapshot id returned by anvil_snapshot."},
                    "port": {"type": "number", "description": "Port of the target node (default 8545)."},
                    "rpc_url": {"type": "string", "description": "Explicit endpoint; overrides the port."}
                },
                "required": ["snapshot_id"],
                "additionalProperties": false
            }
        },
        {
            "name": "anvil_set_balance",
            "description": "Overwrite the balance of an account on a running anvil node.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "address": {"type": "string", "description": "The 0x... account address."},
                    "balance": {"type": "string", "description": "New balance in wei, decimal or 0x-hex."},
                    "port": {"type": "number", "description": "Port of the target node (default 8545)."},
                    "rpc_url": {"type": "string", "description": "Explicit endpoint; overrides the port."}
                },
                "required": ["address", "balance"],
                "additionalProperties": false
            }
        },
        {
            "name": "anvil_increase_time",
            "description": "Advance the node clock by a number of seconds.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "seconds": {"type": "number", "description": "Seconds to advance."},
                    "port": {"type": "number", "description": "Port of the target node (default 8545)."},
                    "rpc_url": {"type": "string", "description": "Explicit endpoint; overrides the port."}
                },
                "required": ["seconds"],
                "additionalProperties": false
            }
        },
        {
            "name": "anvil_set_next_timestamp",
            "description": "Pin the timestamp of the next mined block.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "timestamp": {"type": "number", "description": "Unix timestamp for the next block."},
                    "port": {"type": "number", "description": "Port of the target node (default 8545)."},
                    "rpc_url": {"type": "string", "description": "Explicit endpoint; overrides the port."}
                },
                "required": ["timestamp"],
                "additionalProperties": false
            }
        },
        {
            "name": "cast_call",
            "description": "Call a contract function without sending a transaction.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "contract_address": {"type": "string", "description": "The 0x... contract address."},
                    "function_signature": {"type": "string", "description": "Signature, e.g. 'balanceOf(address)(uint256)'."},
                    "args": {"type": "array", "items": {"type": "string"}, "description": "Positional call arguments."},
                    "rpc_url": {"type": "string", "description": "Endpoint; falls back to the configured default."},
                    "block": {"type": "string", "description": "Block tag or number to query at."},
                    "from": {"type": "string", "description": "Sender address for the simulated call."}
                },
                "required": ["contract_address", "function_signature"],
                "additionalProperties": false
            }
        },
        {
            "name": "cast_send",
            "description": "Sign and send a transaction.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "contract_address": {"type": "string", "description": "The 0x... recipient address."},
                    "function_signature": {"type": "string", "description": "Function to call; omit for a plain value transfer."},
                    "args": {"type": "array", "items": {"type": "string"}, "description": "Positional call arguments."},
                    "value": {"type": "string", "description": "Value to attach, e.g. '1ether' or a wei amount."},
                    "rpc_url": {"type": "string", "description": "Endpoint; falls back to the configured default."},
                    "private_key": {"type": "string", "description": "Signing key; falls back to the configured default."},
                    "gas_limit": {"type": "string", "description": "Gas limit override."},
                    "gas_price": {"type": "string", "description": "Gas price override."},
                    "legacy": {"type": "boolean", "description": "Send a pre-EIP-1559 transaction."}
                },
                "required": ["contract_address"],
                "additionalProperties": false
            }
        },
        {
            "name": "cast_balance",
            "description": "Get the balance of an account.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "address": {"type": "string", "description": "The 0x... account address."},
                    "rpc_url": {"type": "string", "description": "Endpoint; falls back to the configured default."},
                    "block": {"type": "string", "description": "Block tag or number to query at."},
                    "ether": {"type": "boolean", "description": "Report in ether instead of wei."}
                },
                "required": ["address"],
                "additionalProperties": false
            }
        },
        {
            "name": "cast_receipt",
            "description": "Get the receipt of a mined transaction.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "tx_hash": {"type": "string", "description": "The 0x... transaction hash."},
                    "field": {"type": "string", "description": "Single receipt field to print, e.g. 'status'."},
                    "rpc_url": {"type": "string", "description": "Endpoint; falls back to the configured default."},
                    "confirmations": {"type": "number", "description": "Confirmations to wait for before returning."}
                },
                "required": ["tx_hash"],
                "additionalProperties": false
            }
        },
        {
            "name": "cast_storage",
            "description": "Read a raw storage slot of a contract.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "address": {"type": "string", "description": "The 0x... contract address."},
                    "slot": {"type": "string", "description": "Storage slot, decimal or 0x-hex."},
                    "rpc_url": {"type": "string", "description": "Endpoint; falls back to the configured default."},
                    "block": {"type": "string", "description": "Block tag or number to query at."}
                },
                "required": ["address", "slot"],
                "additionalProperties": false
            }
        },
        {
            "name": "cast_run",
            "description": "Replay a transaction locally and print its trace.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "tx_hash": {"type": "string", "description": "The 0x... transaction hash."},
                    "rpc_url": {"type": "string", "description": "Endpoint; falls back to the configured default."},
                    "quick": {"type": "boolean", "description": "Skip replaying preceding transactions in the block."}
                },
                "required": ["tx_hash"],
                "additionalProperties": false
            }
        },
        {
            "name": "cast_logs",
            "description": "Fetch event logs matching a signature.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "signature": {"type": "string", "description": "Event signature, e.g. 'Transfer(address,address,uint256)'."},
                    "topics": {"type": "array", "items": {"type": "string"}, "description": "Indexed topic filters after the signature."},
                    "address": {"type": "string", "description": "Restrict to logs emitted by this contract."},
                    "from_block": {"type": "string", "description": "Start of the block range."},
                    "to_block": {"type": "string", "description": "End of the block range."},
                    "rpc_url": {"type": "string", "description": "Endpoint; falls back to the configured default."}
                },
                "required": ["signature"],
                "additionalProperties": false
            }
        },
        {
            "name": "cast_sig",
            "description": "Compute the selector of a function or event signature.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "signature": {"type": "string", "description": "Function or event signature."},
                    "event": {"type": "boolean", "description": "Treat the signature as an event (32-byte topic)."}
                },
                "required": ["signature"],
                "additionalProperties": false
            }
        },
        {
            "name": "forge_build",
            "description": "Compile the project's contracts.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "root": {"type": "string", "description": "Project root; defaults to the configured workdir."},
                    "force": {"type": "boolean", "description": "Recompile everything, ignoring the cache."},
                    "sizes": {"type": "boolean", "description": "Print contract sizes after compiling."}
                },
                "additionalProperties": false
            }
        },
        {
            "name": "forge_test",
            "description": "Run the project's test suite.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "match_test": {"type": "string", "description": "Only run test functions matching this pattern."},
                    "match_contract": {"type": "string", "description": "Only run tests in contracts matching this pattern."},
                    "match_path": {"type": "string", "description": "Only run tests in files matching this glob."},
                    "fork_url": {"type": "string", "description": "Fork this endpoint for the test run."},
                    "verbosity": {"type": "number", "description": "Trace verbosity, 1 to 5."},
                    "gas_report": {"type": "boolean", "description": "Print a gas report."}
                },
                "additionalProperties": false
            }
        },
        {
            "name": "forge_script",
            "description": "Run a Solidity script, optionally broadcasting its transactions.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "script_path": {"type": "string", "description": "Path to the script, e.g. 'script/Deploy.s.sol'."},
                    "sig": {"type": "string", "description": "Function to run (default 'run()')."},
                    "rpc_url": {"type": "string", "description": "Endpoint to broadcast against."},
                    "broadcast": {"type": "boolean", "description": "Submit transactions instead of simulating."},
                    "private_key": {"type": "string", "description": "Signing key; falls back to the configured default."}
                },
                "required": ["script_path"],
                "additionalProperties": false
            }
        },
        {
            "name": "forge_install",
            "description": "Install a project dependency.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "dependency": {"type": "string", "description": "Dependency spec, 'org/repo' or 'org/repo@tag'."},
                    "no_commit": {"type": "boolean", "description": "Skip the git submodule commit."}
                },
                "required": ["dependency"],
                "additionalProperties": false
            }
        },
        {
            "name": "forge_remove",
            "description": "Remove an installed dependency.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "dependency": {"type": "string", "description": "Name of the dependency to remove."}
                },
                "required": ["dependency"],
                "additionalProperties": false
            }
        },
        {
            "name": "chisel_eval",
            "description": "Evaluate an inline Solidity snippet in the chisel REPL.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "source": {"type": "string", "description": "Solidity source to evaluate."}
                },
                "required": ["source"],
                "additionalProperties": false
            }
        },
        {
            "name": "chisel_run",
            "description": "Run multi-line Solidity source through the chisel REPL.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "source": {"type": "string", "description": "Multi-line Solidity source."}
                },
                "required": ["source"],
                "additionalProperties": false
            }
        },
        {
            "name": "foundry_versions",
            "description": "Report the installed versions of forge, cast, anvil and chisel.",
            "inputSchema": { "type": "object", "properties": {}, "additionalProperties": false }
        },
        {
            "name": "list_commands",
            "description": "List the subcommands of a Foundry binary from its --help output.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "tool": {"type": "string", "enum": ["forge", "cast", "anvil", "chisel"], "description": "Which binary to inspect."}
                },
                "required": ["tool"],
                "additionalProperties": false
            }
        },
        {
            "name": "foundry_docs",
            "description": "Fetch the Foundry book chapter index (cached between calls).",
            "inputSchema": { "type": "object", "properties": {}, "additionalProperties": false }
        }
    ]);

    Response::success(req.id.clone(), json!({ "tools": tools }))
}

/// Handles the 'prompts/list' request.
fn handle_prompts_list(req: &Request) -> Response {
    let prompts = json!([
        {
            "name": "setup_local_fork",
            "description": "Start an anvil fork of a remote chain and verify it is ready.",
            "arguments": [
                {"name": "fork_url", "description": "RPC endpoint of the chain to fork.", "required": true},
                {"name": "port", "description": "Local port for the fork (default 8545).", "required": false}
            ]
        },
        {
            "name": "debug_transaction",
            "description": "Investigate a failed or suspicious transaction step by step.",
            "arguments": [
                {"name": "tx_hash", "description": "Hash of the transaction to investigate.", "required": true},
                {"name": "rpc_url", "description": "Endpoint the transaction lives on.", "required": false}
            ]
        },
        {
            "name": "test_contract",
            "description": "Build the project and run its tests with useful verbosity.",
            "arguments": [
                {"name": "contract", "description": "Contract name to focus the test run on.", "required": false}
            ]
        }
    ]);

    Response::success(req.id.clone(), json!({ "prompts": prompts }))
}

/// Handles the 'prompts/get' request.
fn handle_prompt_get(req: &Request) -> Response {
    let params = match req.params.as_ref() {
        Some(p) => p,
        None => {
            return Response::error(
                req.id.clone(),
                error_codes::INVALID_PARAMS,
                "Missing 'params' object".into(),
            )
        }
    };
    let name = match params.get("name").and_then(|n| n.as_str()) {
        Some(name) => name,
        None => {
            return Response::error(
                req.id.clone(),
                error_codes::INVALID_PARAMS,
                "Missing 'name' field in params".into(),
            )
        }
    };
    let empty_args = json!({});
    let args = params.get("arguments").unwrap_or(&empty_args);
    let arg = |key: &str| args.get(key).and_then(|v| v.as_str()).map(str::to_string);

    let (description, text) = match name {
        "setup_local_fork" => {
            let fork_url = match utils::get_required_arg::<String>(args, "fork_url", &req.id) {
                Ok(url) => url,
                Err(resp) => return resp,
            };
            let port = arg("port").unwrap_or_else(|| "8545".to_string());
            (
                "Start an anvil fork of a remote chain and verify it is ready.",
                format!(
                    "Set up a local fork for testing:\n\
                     1. Call anvil_start with fork_url '{fork_url}' and port {port}.\n\
                     2. Call anvil_status for port {port} and confirm the node responds.\n\
                     3. Use cast_balance on a known account to confirm forked state is visible.\n\
                     4. Report the chain id and the port the fork is listening on."
                ),
            )
        }
        "debug_transaction" => {
            let tx_hash = match utils::get_required_arg::<String>(args, "tx_hash", &req.id) {
                Ok(hash) => hash,
                Err(resp) => return resp,
            };
            let endpoint = arg("rpc_url")
                .map(|url| format!(" (rpc_url '{url}')"))
                .unwrap_or_default();
            (
                "Investigate a failed or suspicious transaction step by step.",
                format!(
                    "Debug transaction {tx_hash}{endpoint}:\n\
                     1. Call cast_receipt for the transaction and note status, gas used and logs.\n\
                     2. Call cast_run to replay it locally and inspect the trace for the revert point.\n\
                     3. If state context matters, read the involved contract slots with cast_storage.\n\
                     4. Summarize the failure cause and suggest a fix."
                ),
            )
        }
        "test_contract" => {
            let focus = arg("contract")
                .map(|c| format!(" with match_contract '{c}'"))
                .unwrap_or_default();
            (
                "Build the project and run its tests with useful verbosity.",
                format!(
                    "Build and test the project:\n\
                     1. Call forge_build and fix any compilation errors before continuing.\n\
                     2. Call forge_test{focus} and verbosity 3.\n\
                     3. For failing tests, re-run with the failing test's name in match_test and verbosity 4.\n\
                     4. Summarize passes, failures and gas usage."
                ),
            )
        }
        _ => {
            return Response::error(
                req.id.clone(),
                error_codes::INVALID_PARAMS,
                format!("Unknown prompt: {}", name),
            )
        }
    };

    Response::success(
        req.id.clone(),
        json!({
            "description": description,
            "messages": [{
                "role": "user",
                "content": { "type": "text", "text": text }
            }]
        }),
    )
}
