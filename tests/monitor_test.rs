//! Monitoring API tests using wiremock for isolated mocking

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hostpilot::monitor::{
    DataOrigin, FallbackMetricsSource, HttpMetricsSource, MetricsSource, Severity,
};

// =============================================================================
// HELPERS
// =============================================================================

const TIMEOUT: Duration = Duration::from_secs(2);

async fn mount_json(server: &MockServer, endpoint: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn healthy_server() -> MockServer {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "/api/metrics",
        json!([
            {"name": "cpu", "value": 42.5, "unit": "%"},
            {"name": "load1", "value": 0.7}
        ]),
    )
    .await;
    mount_json(
        &server,
        "/api/events",
        json!([
            {"timestamp": "2026-10-18T10:00:00Z", "severity": "warning", "message": "disk 81%"}
        ]),
    )
    .await;
    mount_json(
        &server,
        "/api/entities",
        json!([{"id": "nginx", "kind": "service", "status": "running"}]),
    )
    .await;
    server
}

// =============================================================================
// LIVE SOURCE
// =============================================================================

#[tokio::test]
async fn test_fetches_all_three_endpoints() {
    let server = healthy_server().await;
    let source = HttpMetricsSource::new(&server.uri(), TIMEOUT).unwrap();

    let snapshot = source.fetch().await.unwrap();

    assert_eq!(snapshot.origin, DataOrigin::Live);
    assert_eq!(snapshot.metrics.len(), 2);
    assert_eq!(snapshot.metrics[0].name, "cpu");
    assert_eq!(snapshot.metrics[1].unit, "");
    assert_eq!(snapshot.events[0].severity, Severity::Warning);
    assert_eq!(snapshot.entities[0].status, "running");
}

#[tokio::test]
async fn test_base_path_is_kept() {
    let server = MockServer::start().await;
    for endpoint in ["metrics", "events", "entities"] {
        mount_json(&server, &format!("/monitor/api/{}", endpoint), json!([])).await;
    }
    let source = HttpMetricsSource::new(&format!("{}/monitor", server.uri()), TIMEOUT).unwrap();

    let snapshot = source.fetch().await.unwrap();
    assert!(snapshot.metrics.is_empty());
}

#[tokio::test]
async fn test_sends_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(3)
        .mount(&server)
        .await;

    let source = HttpMetricsSource::new(&server.uri(), TIMEOUT).unwrap();
    assert!(source.fetch().await.is_ok());
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let source = HttpMetricsSource::new(&server.uri(), TIMEOUT).unwrap();
    let err = source.fetch().await.unwrap_err();

    assert_eq!(err.code(), "HP-050");
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_malformed_json_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let source = HttpMetricsSource::new(&server.uri(), TIMEOUT).unwrap();
    let err = source.fetch().await.unwrap_err();
    assert_eq!(err.code(), "HP-050");
    assert!(err.to_string().contains("malformed JSON"), "{}", err);
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_millis(800)),
        )
        .mount(&server)
        .await;

    let source = HttpMetricsSource::new(&server.uri(), Duration::from_millis(200)).unwrap();
    let err = source.fetch().await.unwrap_err();
    assert!(err.to_string().contains("timed out"), "{}", err);
}

// =============================================================================
// FALLBACK
// =============================================================================

#[tokio::test]
async fn test_fallback_prefers_live_data() {
    let server = healthy_server().await;
    let source = FallbackMetricsSource::from_url(&server.uri(), TIMEOUT);

    let snapshot = source.fetch().await.unwrap();
    assert!(snapshot.origin.is_live());
}

#[tokio::test]
async fn test_fallback_on_server_error_is_synthetic() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let source = FallbackMetricsSource::from_url(&server.uri(), TIMEOUT);
    let snapshot = source.fetch().await.unwrap();

    match &snapshot.origin {
        DataOrigin::Synthetic { reason } => assert!(reason.contains("503"), "{}", reason),
        other => panic!("expected synthetic data, got {:?}", other),
    }
    assert!(!snapshot.metrics.is_empty());
    assert!(!snapshot.entities.is_empty());
}

#[tokio::test]
async fn test_fallback_when_nothing_listens() {
    // bind and drop to get a port with no listener
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let source = FallbackMetricsSource::from_url(&format!("http://127.0.0.1:{}", port), TIMEOUT);

    let snapshot = source.fetch().await.unwrap();
    assert!(!snapshot.origin.is_live());
}
