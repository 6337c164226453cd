//! Tests for the JSON-RPC bridge against a stub endpoint

use reqwest::Client;
use serde_json::{json, Value};

use foundry_mcp_server::foundry::rpc::rpc_call;

#[tokio::test]
async fn result_field_passes_through() {
    let m = mockito::mock("POST", "/ok")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x1"}"#)
        .create();

    let url = format!("{}/ok", mockito::server_url());
    let result = rpc_call(&Client::new(), &url, "eth_chainId", json!([]))
        .await
        .unwrap();

    assert_eq!(result, json!("0x1"));
    m.assert();
}

#[tokio::test]
async fn remote_error_message_surfaces_verbatim() {
    let _m = mockito::mock("POST", "/boom")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"boom"}}"#)
        .create();

    let url = format!("{}/boom", mockito::server_url());
    let err = rpc_call(&Client::new(), &url, "evm_revert", json!(["0x1"]))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "boom");
}

#[tokio::test]
async fn request_body_is_a_proper_jsonrpc_envelope() {
    let m = mockito::mock("POST", "/envelope")
        .match_header("content-type", "application/json")
        .match_body(mockito::Matcher::Json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "anvil_mine",
            "params": ["0x2"]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":null}"#)
        .create();

    let url = format!("{}/envelope", mockito::server_url());
    let result = rpc_call(&Client::new(), &url, "anvil_mine", json!(["0x2"]))
        .await
        .unwrap();

    assert_eq!(result, Value::Null);
    m.assert();
}

#[tokio::test]
async fn transport_failure_names_the_endpoint() {
    // Nothing listens on this port.
    let err = rpc_call(
        &Client::new(),
        "http://127.0.0.1:59901",
        "eth_chainId",
        json!([]),
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("http://127.0.0.1:59901"));
}
