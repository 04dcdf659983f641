//! HTTP boundary tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use logsift_core::config::EngineConfig;
use logsift_daemon::server::{AppState, router};
use logsift_engine::{DecoderEngine, MemoryRuleStore, YamlRuleStore};
use serde_json::{Value, json};
use tower::ServiceExt;

const SHIPPED_RULES: &[u8] = include_bytes!("../../rules/decoders.yml");

fn app_with_config(config: &EngineConfig) -> Router {
    let rules = std::str::from_utf8(SHIPPED_RULES).expect("rules are utf-8");
    let store = MemoryRuleStore::from_yaml(rules).expect("shipped rules are valid");
    router(Arc::new(AppState::new(DecoderEngine::new(store, config))))
}

fn app() -> Router {
    app_with_config(&EngineConfig::default())
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_owned()))
        .expect("valid request")
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_process_batch_classifies_lines_in_order() {
    // Given: two recognisable lines around an unknown one
    let body = json!({
        "logs": "Aug 1 host sshd[42]: Failed password for root from 10.0.0.5 port 22 ssh2\n\
                 something unrelated\r\n\
                 Aug 1 host sshd[7]: Accepted publickey for deploy from 10.0.0.7 port 50000 ssh2\n"
    })
    .to_string();

    // When
    let (status, json) = send(app(), post_json("/api/decoders/process-batch", &body)).await;

    // Then
    assert_eq!(status, StatusCode::OK);
    let results = json.as_array().expect("array of results");
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["decoderName"], "FailedPassword");
    assert_eq!(results[0]["fields"]["user"], "root");
    assert_eq!(results[1]["status"], "No Match");
    assert_eq!(results[1]["serviceName"], "Unknown");
    assert_eq!(results[1]["decoderName"], "N/A");
    assert!(results[1]["fields"].is_null());
    assert_eq!(results[2]["decoderName"], "Accepted");
    assert_eq!(results[2]["fields"]["method"], "publickey");
}

#[tokio::test]
async fn test_process_batch_rejects_missing_or_blank_logs() {
    for body in [r#"{}"#, r#"{"logs": ""}"#, r#"{"logs": "  \n \r\n"}"#, r#"{"logs": null}"#] {
        let (status, json) = send(app(), post_json("/api/decoders/process-batch", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
        assert_eq!(json, json!({ "error": "No logs provided" }), "body {body}");
    }
}

#[tokio::test]
async fn test_process_batch_rejects_malformed_json() {
    let (status, json) = send(app(), post_json("/api/decoders/process-batch", "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string(), "rejection text is returned: {json}");
}

#[tokio::test]
async fn test_process_batch_input_over_limit_is_413() {
    let config = EngineConfig {
        max_input_bytes: 64,
        max_line_bytes: 64,
        ..EngineConfig::default()
    };
    let body = json!({ "logs": "sshd ".repeat(40) }).to_string();

    let (status, json) = send(
        app_with_config(&config),
        post_json("/api/decoders/process-batch", &body),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_store_failure_is_503() {
    let store = YamlRuleStore::new("/nonexistent/rules.yml");
    let app = router(Arc::new(AppState::new(DecoderEngine::new(
        store,
        &EngineConfig::default(),
    ))));

    let body = json!({ "logs": "Aug 1 host sshd[1]: hello" }).to_string();
    let (status, json) = send(app, post_json("/api/decoders/process-batch", &body)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"], "rule store unavailable");
}

#[tokio::test]
async fn test_run_integrity_test_reports_shipped_rules() {
    let (status, json) = send(app(), post_json("/api/decoders/run-integrity-test", "")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["passed"], 5);
    assert_eq!(json["failed"], 0);
    assert_eq!(json["failures"], json!([]));
    assert_eq!(json["untested"][0]["decoderName"], "AuthFailure");
    assert_eq!(json["untested"][0]["serviceName"], "Sudo");
}

#[tokio::test]
async fn test_run_single_decoder_tests() {
    let (status, json) = send(
        app(),
        post_json("/api/decoders/ssh-failed-password/run-tests", ""),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["passed"], 1);
    assert_eq!(json["failed"], 0);
}

#[tokio::test]
async fn test_run_unknown_decoder_tests_is_404() {
    let (status, json) = send(app(), post_json("/api/decoders/nope/run-tests", "")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(
        json["error"].as_str().is_some_and(|e| e.contains("nope")),
        "error names the decoder: {json}"
    );
}

#[tokio::test]
async fn test_health_reports_rule_counts() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("valid request");
    let (status, json) = send(app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "Healthy");
    assert_eq!(json["rules"]["services"], 3);
    assert_eq!(json["rules"]["decoders"], 5);
}

#[tokio::test]
async fn test_health_unhealthy_when_store_unreadable() {
    let store = YamlRuleStore::new("/nonexistent/rules.yml");
    let app = router(Arc::new(AppState::new(DecoderEngine::new(
        store,
        &EngineConfig::default(),
    ))));
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("valid request");

    let (status, json) = send(app, request).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"]["Unhealthy"], "rule store unavailable");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let request = Request::builder()
        .uri("/api/unknown")
        .body(Body::empty())
        .expect("valid request");
    let response = app().oneshot(request).await.expect("router is infallible");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
