//! Tests for the anvil node registry, with the liveness probe answered by a
//! stub RPC endpoint instead of a real node. The node binary is swapped for
//! `sleep` so nothing real listens on the spawned side.

use std::time::Duration;

use reqwest::Client;

use foundry_mcp_server::foundry::node::NodeStartConfig;
use foundry_mcp_server::foundry::NodeManager;

fn stub_port() -> u16 {
    mockito::server_url()
        .rsplit(':')
        .next()
        .unwrap()
        .parse()
        .unwrap()
}

fn test_manager() -> NodeManager {
    NodeManager::new(Client::new())
        .with_binary("sleep")
        .with_warmup(Duration::from_millis(10))
}

// One narrative covering idempotent start, self-healing status reads (one
// port and all ports), and stop. Kept as a single test because mockito's
// server is global to the process and the reset() in the middle would
// clobber mocks of a parallel test.
#[tokio::test]
async fn registry_tracks_heals_and_stops_nodes() {
    let port = stub_port();
    let probe = mockito::mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x7a69"}"#)
        .expect(1)
        .create();

    let manager = test_manager();
    let cfg = NodeStartConfig {
        port,
        ..Default::default()
    };

    let started = manager.start(cfg.clone(), None).await;
    assert!(!started.is_error, "{}", started.text);
    assert!(started.text.contains(&format!("port {}", port)));
    assert!(started.text.contains("chain id 31337"));
    assert_eq!(manager.tracked_ports(), vec![port]);

    // Second start on the same port short-circuits before any probe, so
    // the stub must still have seen exactly one request.
    let again = manager.start(cfg.clone(), None).await;
    assert!(!again.is_error);
    assert!(again.text.contains("already running"));
    assert_eq!(manager.tracked_ports().len(), 1);
    probe.assert();

    // Take the stub away: the next status probe fails and the entry is
    // dropped, and the port then reads as vacant.
    mockito::reset();
    let status = manager.status(Some(port)).await;
    assert!(status.text.contains("not responding"));
    assert!(manager.tracked_ports().is_empty());

    let vacant = manager.status(Some(port)).await;
    assert!(vacant
        .text
        .contains(&format!("No anvil instance on port {}", port)));

    // Bring the stub back and start again: the registry-wide views should
    // report one live entry.
    let _probe = mockito::mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x7a69"}"#)
        .create();
    let restarted = manager.start(cfg.clone(), None).await;
    assert!(!restarted.is_error, "{}", restarted.text);

    let live = manager.summaries().await;
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].port, port);
    assert!(live[0].responsive);
    assert_eq!(live[0].chain_id.as_deref(), Some("31337"));

    let all = manager.status(None).await;
    assert!(!all.is_error);
    assert!(all.text.contains(&format!("port {}: running", port)));

    let stopped = manager.stop(port).await;
    assert!(!stopped.is_error);
    assert!(stopped.text.contains(&port.to_string()));
    assert!(manager.tracked_ports().is_empty());

    // One more start, then take the stub away again: the all-ports status
    // probes the tracked entry, finds it dead and drops it in the same read.
    let relaunched = manager.start(cfg, None).await;
    assert!(!relaunched.is_error, "{}", relaunched.text);
    assert_eq!(manager.tracked_ports(), vec![port]);

    mockito::reset();
    let healed = manager.status(None).await;
    assert!(!healed.is_error);
    assert!(healed.text.contains(&format!(
        "port {}: not responding, removed from registry",
        port
    )));
    assert!(manager.tracked_ports().is_empty());

    let none_left = manager.status(None).await;
    assert_eq!(none_left.text, "No anvil nodes tracked");
}

#[tokio::test]
async fn missing_binary_reports_failure_without_registering() {
    let manager = NodeManager::new(Client::new())
        .with_binary("definitely-not-anvil")
        .with_warmup(Duration::from_millis(1));

    let out = manager
        .start(
            NodeStartConfig {
                port: 59999,
                ..Default::default()
            },
            None,
        )
        .await;

    assert!(out.is_error);
    assert!(out.text.contains("Failed to start anvil"));
    assert!(manager.tracked_ports().is_empty());
}

#[tokio::test]
async fn unready_node_is_killed_and_not_registered() {
    // Port 59900 has no listener, so the probe gets connection refused.
    let manager = test_manager();
    let out = manager
        .start(
            NodeStartConfig {
                port: 59900,
                ..Default::default()
            },
            None,
        )
        .await;

    assert!(out.is_error);
    assert!(out.text.contains("did not become ready"));
    assert!(manager.tracked_ports().is_empty());
}

#[tokio::test]
async fn stopping_an_untracked_port_is_reported_not_an_error() {
    let manager = test_manager();
    let out = manager.stop(59998).await;
    assert!(!out.is_error);
    assert!(out.text.contains("No anvil node tracked on port 59998"));
}
