//! Failure injection tests for the relay.

use api_relay::config::ProxyConfig;
use api_relay::RouteTable;

mod common;

#[tokio::test]
async fn test_mapped_upstream_down() {
    let down = common::closed_addr().await;
    let relay = common::start_relay_for(&format!("http://{}", down)).await;

    let res = common::client()
        .get(relay.url("/groq/v1/chat"))
        .header("Authorization", "Bearer sk-secret")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    assert_eq!(res.text().await.unwrap(), "Internal Server Error");
}

#[tokio::test]
async fn test_generic_upstream_down() {
    let down = common::closed_addr().await;
    let relay = common::start_relay(RouteTable::builtin(), ProxyConfig::default()).await;

    let res = common::client()
        .get(relay.url(&format!("/proxy/http://{}/x", down)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    let body = res.text().await.unwrap();
    assert_eq!(body, "Proxy Request Failed");
    assert!(!body.contains(&down.to_string()));
}

#[tokio::test]
async fn test_upstream_deadline() {
    let upstream = common::start_mock_upstream().await;
    let table = RouteTable::new([("/groq", upstream.url())]).unwrap();
    let mut config = ProxyConfig::default();
    config.timeouts.upstream_secs = 1;

    let relay = common::start_relay(table, config).await;

    let res = common::client()
        .get(relay.url("/groq/slow"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    assert_eq!(res.text().await.unwrap(), "Internal Server Error");
    // Exactly one attempt, no retries.
    assert_eq!(upstream.hits(), 1);
}

#[tokio::test]
async fn test_upstream_error_status_passes_through() {
    let upstream = common::start_mock_upstream().await;
    let relay = common::start_relay_for(&upstream.url()).await;

    let res = common::client()
        .get(relay.url("/openai/busy"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 503);
    assert_eq!(res.headers()["x-frame-options"], "DENY");
    assert_eq!(res.text().await.unwrap(), "busy");
    assert_eq!(upstream.hits(), 1);
}
