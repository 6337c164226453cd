use crate::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;

// Defines the structure for the JSON output returned by our API.
#[derive(Debug, Serialize)]
pub struct NodesOutput {
    pub count: usize,
    pub nodes: Vec<crate::foundry::NodeSummary>,
}

// The handler function for the GET /nodes endpoint. Probes every tracked
// node, so the snapshot never reports an instance that has already died.
pub async fn list_nodes_handler(State(state): State<AppState>) -> impl IntoResponse {
    let nodes = state.nodes.summaries().await;
    Json(NodesOutput {
        count: nodes.len(),
        nodes,
    })
}
