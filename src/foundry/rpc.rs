// src/foundry/rpc.rs

use anyhow::{anyhow, Context, Result};
use ethers_core::types::U256;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

/// Endpoint a locally started node listens on.
pub fn endpoint_for_port(port: u16) -> String {
    format!("http://127.0.0.1:{}", port)
}

/// Converts a numeric parameter into the protocol's `0x`-prefixed quantity
/// form. Already-prefixed input passes through unchanged, as does anything
/// that is not a plain decimal (block tags like `latest`, opaque ids).
pub fn to_quantity(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.starts_with("0x") || trimmed.starts_with("0X") {
        return trimmed.to_string();
    }
    match U256::from_dec_str(trimmed) {
        Ok(n) => format!("{:#x}", n),
        Err(_) => trimmed.to_string(),
    }
}

/// Issues one JSON-RPC call and returns the `result` field.
///
/// A body carrying an `error` object fails with exactly that error's
/// message, so remote failures surface the same way transport failures do.
/// One round trip per call: no pooling beyond the shared client, no retry,
/// no extra timeout.
pub async fn rpc_call(client: &Client, url: &str, method: &str, params: Value) -> Result<Value> {
    debug!(url, method, "issuing rpc call");
    let payload = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": method,
        "params": params,
    });

    let resp = client
        .post(url)
        .json(&payload)
        .send()
        .await
        .with_context(|| format!("RPC request to {} failed", url))?;
    let body: Value = resp
        .json()
        .await
        .context("invalid JSON-RPC response body")?;

    if let Some(err) = body.get("error") {
        let message = err
            .get("message")
            .and_then(|m| m.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| err.to_string());
        return Err(anyhow!(message));
    }

    Ok(body.get("result").cloned().unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_becomes_prefixed_hex() {
        assert_eq!(to_quantity("0"), "0x0");
        assert_eq!(to_quantity("1"), "0x1");
        assert_eq!(to_quantity("31337"), "0x7a69");
    }

    #[test]
    fn wei_scale_values_convert_without_overflow() {
        assert_eq!(
            to_quantity("1000000000000000000"),
            "0xde0b6b3a7640000"
        );
    }

    #[test]
    fn prefixed_input_passes_through() {
        assert_eq!(to_quantity("0x7a69"), "0x7a69");
        assert_eq!(to_quantity("  0xde0b6b3a7640000 "), "0xde0b6b3a7640000");
    }

    #[test]
    fn non_numeric_input_passes_through() {
        assert_eq!(to_quantity("latest"), "latest");
    }

    #[test]
    fn default_endpoint_is_loopback() {
        assert_eq!(endpoint_for_port(8545), "http://127.0.0.1:8545");
    }
}
