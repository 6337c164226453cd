//! Tests for the documentation cache against a stub source

use reqwest::Client;

use foundry_mcp_server::foundry::services::docs::DocsService;

#[tokio::test]
async fn fresh_cache_prevents_a_second_fetch() {
    let source = mockito::mock("GET", "/docs-fresh")
        .with_status(200)
        .with_body("# Foundry Book\n- [Getting Started](start.md)\n")
        .expect(1)
        .create();

    let docs = DocsService::new(
        Client::new(),
        format!("{}/docs-fresh", mockito::server_url()),
        3600,
    );

    let first = docs.get().await;
    assert!(!first.is_error);
    assert!(first.text.contains("Foundry Book"));

    let second = docs.get().await;
    assert_eq!(second.text, first.text);
    source.assert();
}

#[tokio::test]
async fn failed_refresh_serves_the_cached_copy() {
    let _ok = mockito::mock("GET", "/docs-stale")
        .with_status(200)
        .with_body("cached contents")
        .create();

    // Zero TTL: every call considers the cache stale and refetches.
    let docs = DocsService::new(
        Client::new(),
        format!("{}/docs-stale", mockito::server_url()),
        0,
    );

    let first = docs.get().await;
    assert!(!first.is_error);
    assert_eq!(first.text, "cached contents");

    // The newest mock wins for an identical matcher, so the refresh now
    // fails; the previous content must come back unchanged.
    let _err = mockito::mock("GET", "/docs-stale").with_status(500).create();

    let second = docs.get().await;
    assert!(!second.is_error);
    assert_eq!(second.text, "cached contents");
}

#[tokio::test]
async fn fetch_failure_with_no_cache_is_a_failure_result() {
    let _m = mockito::mock("GET", "/docs-missing").with_status(404).create();

    let docs = DocsService::new(
        Client::new(),
        format!("{}/docs-missing", mockito::server_url()),
        3600,
    );

    let out = docs.get().await;
    assert!(out.is_error);
    assert!(out.text.contains("failed to fetch documentation"));
}
