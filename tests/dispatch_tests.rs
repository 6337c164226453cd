//! Tests for the MCP dispatch layer over the HTTP transport

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use foundry_mcp_server::{
    api::{health::health_handler, nodes::list_nodes_handler, rpc::rpc_handler},
    config::Config,
    AppState,
};

fn create_test_app() -> Router {
    let state = AppState::new(Config::default());

    let api_router = Router::new()
        .route("/health", get(health_handler))
        .route("/nodes", get(list_nodes_handler))
        .route("/rpc", post(rpc_handler));

    Router::new().nest("/api", api_router).with_state(state)
}

async fn rpc(app: Router, payload: Value) -> Value {
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/rpc")
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_vec(&payload).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn initialize_reports_protocol_and_capabilities() {
    let app = create_test_app();
    let resp = rpc(
        app,
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"}),
    )
    .await;

    assert_eq!(resp["id"], 1);
    let result = &resp["result"];
    assert_eq!(result["protocolVersion"], "2025-06-18");
    assert_eq!(result["serverInfo"]["name"], "foundry_mcp");
    assert!(result["capabilities"]["tools"].is_object());
    assert!(result["capabilities"]["prompts"].is_object());
}

#[tokio::test]
async fn tools_list_covers_the_whole_catalog() {
    let app = create_test_app();
    let resp = rpc(
        app,
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
    )
    .await;

    let tools = resp["result"]["tools"].as_array().unwrap();
    let names: Vec<&str> = tools
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();

    assert_eq!(tools.len(), 28);
    for expected in [
        "anvil_start",
        "anvil_revert",
        "cast_call",
        "cast_send",
        "forge_build",
        "forge_script",
        "chisel_eval",
        "foundry_versions",
        "list_commands",
        "foundry_docs",
    ] {
        assert!(names.contains(&expected), "missing tool {}", expected);
    }

    // Every entry carries an object schema.
    for tool in tools {
        assert_eq!(tool["inputSchema"]["type"], "object", "{}", tool["name"]);
    }
}

#[tokio::test]
async fn unknown_method_maps_to_method_not_found() {
    let app = create_test_app();
    let resp = rpc(
        app,
        json!({"jsonrpc": "2.0", "id": 3, "method": "resources/list"}),
    )
    .await;
    assert_eq!(resp["error"]["code"], -32601);
}

#[tokio::test]
async fn unknown_tool_maps_to_method_not_found() {
    let app = create_test_app();
    let resp = rpc(
        app,
        json!({
            "jsonrpc": "2.0", "id": 4, "method": "tools/call",
            "params": {"name": "no_such_tool", "arguments": {}}
        }),
    )
    .await;
    assert_eq!(resp["error"]["code"], -32601);
    assert!(resp["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Tool not found"));
}

#[tokio::test]
async fn tool_call_without_params_is_invalid() {
    let app = create_test_app();
    let resp = rpc(
        app,
        json!({"jsonrpc": "2.0", "id": 5, "method": "tools/call"}),
    )
    .await;
    assert_eq!(resp["error"]["code"], -32602);
}

#[tokio::test]
async fn malformed_address_is_rejected_before_anything_runs() {
    let app = create_test_app();
    let resp = rpc(
        app,
        json!({
            "jsonrpc": "2.0", "id": 6, "method": "tools/call",
            "params": {"name": "cast_balance", "arguments": {"address": "not-an-address"}}
        }),
    )
    .await;
    assert_eq!(resp["error"]["code"], -32602);
    assert!(resp["error"]["message"].as_str().unwrap().contains("address"));
}

#[tokio::test]
async fn send_without_any_key_is_rejected_before_anything_runs() {
    // Config::default() carries no signing key, so cast_send must refuse
    // up front instead of spawning a doomed subprocess.
    let app = create_test_app();
    let resp = rpc(
        app,
        json!({
            "jsonrpc": "2.0", "id": 7, "method": "tools/call",
            "params": {"name": "cast_send", "arguments": {
                "contract_address": "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045"
            }}
        }),
    )
    .await;
    assert_eq!(resp["error"]["code"], -32602);
    assert!(resp["error"]["message"]
        .as_str()
        .unwrap()
        .contains("private_key"));
}

#[tokio::test]
async fn unknown_help_tool_is_rejected() {
    let app = create_test_app();
    let resp = rpc(
        app,
        json!({
            "jsonrpc": "2.0", "id": 8, "method": "tools/call",
            "params": {"name": "list_commands", "arguments": {"tool": "hammer"}}
        }),
    )
    .await;
    assert_eq!(resp["error"]["code"], -32602);
    assert!(resp["error"]["message"]
        .as_str()
        .unwrap()
        .contains("unknown tool"));
}

#[tokio::test]
async fn tool_results_use_the_content_shape() {
    // anvil_status against an empty registry answers without touching any
    // process or socket, so it exercises the full result framing.
    let app = create_test_app();
    let resp = rpc(
        app,
        json!({
            "jsonrpc": "2.0", "id": 9, "method": "tools/call",
            "params": {"name": "anvil_status", "arguments": {}}
        }),
    )
    .await;

    let result = &resp["result"];
    assert_eq!(result["isError"], false);
    assert_eq!(result["content"][0]["type"], "text");
    assert_eq!(result["content"][0]["text"], "No anvil nodes tracked");
}

#[tokio::test]
async fn tool_name_works_as_a_direct_method() {
    let app = create_test_app();
    let resp = rpc(
        app,
        json!({"jsonrpc": "2.0", "id": 10, "method": "anvil_status", "params": {}}),
    )
    .await;
    assert_eq!(
        resp["result"]["content"][0]["text"],
        "No anvil nodes tracked"
    );
}

#[tokio::test]
async fn notifications_are_rejected_over_http() {
    // A null id marks a notification; the stdio transport stays silent, but
    // an HTTP POST needs a body, so the handler answers with an error.
    let app = create_test_app();
    let resp = rpc(
        app,
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
    )
    .await;
    assert_eq!(resp["error"]["code"], -32600);
}

#[tokio::test]
async fn prompts_list_and_get_round_trip() {
    let app = create_test_app();
    let resp = rpc(
        app.clone(),
        json!({"jsonrpc": "2.0", "id": 11, "method": "prompts/list"}),
    )
    .await;
    let prompts = resp["result"]["prompts"].as_array().unwrap();
    assert_eq!(prompts.len(), 3);

    let resp = rpc(
        app,
        json!({
            "jsonrpc": "2.0", "id": 12, "method": "prompts/get",
            "params": {"name": "setup_local_fork", "arguments": {"fork_url": "https://eth.example.org"}}
        }),
    )
    .await;
    let text = resp["result"]["messages"][0]["content"]["text"]
        .as_str()
        .unwrap();
    assert!(text.contains("anvil_start"));
    assert!(text.contains("https://eth.example.org"));
}

#[tokio::test]
async fn prompt_get_validates_name_and_arguments() {
    let app = create_test_app();
    let resp = rpc(
        app.clone(),
        json!({
            "jsonrpc": "2.0", "id": 13, "method": "prompts/get",
            "params": {"name": "setup_local_fork", "arguments": {}}
        }),
    )
    .await;
    assert_eq!(resp["error"]["code"], -32602);

    let resp = rpc(
        app,
        json!({
            "jsonrpc": "2.0", "id": 14, "method": "prompts/get",
            "params": {"name": "write_a_poem"}
        }),
    )
    .await;
    assert_eq!(resp["error"]["code"], -32602);
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = create_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let health: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health, json!({"status": "ok"}));
}

#[tokio::test]
async fn nodes_endpoint_reports_an_empty_registry() {
    let app = create_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri("/api/nodes")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let nodes: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(nodes["count"], 0);
    assert_eq!(nodes["nodes"], json!([]));
}
