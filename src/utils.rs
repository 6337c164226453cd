//! Utility functions for the Foundry MCP server

use serde::de::DeserializeOwned;
use serde_json::{from_value, Value};

use crate::mcp::protocol::{error_codes, Response};

/// Helper function to extract a required argument from a JSON object
pub fn get_required_arg<T: DeserializeOwned>(
    args: &Value,
    key: &str,
    req_id: &Value,
) -> Result<T, Response> {
    from_value(args.get(key).cloned().unwrap_or(Value::Null)).map_err(|_| {
        Response::error(
            req_id.clone(),
            error_codes::INVALID_PARAMS,
            format!("Missing or invalid required argument: '{}'", key),
        )
    })
}

/// Deserializes a whole arguments object into one typed parameter struct,
/// turning any shape mismatch into an invalid-params response.
pub fn parse_params<T: DeserializeOwned>(args: &Value, req_id: &Value) -> Result<T, Response> {
    from_value(args.clone()).map_err(|err| {
        Response::error(
            req_id.clone(),
            error_codes::INVALID_PARAMS,
            format!("Invalid tool arguments: {}", err),
        )
    })
}
