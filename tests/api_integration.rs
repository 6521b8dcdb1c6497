//! Integration tests for the HTTP surface.
//!
//! The router runs without workers so admitted jobs stay in the queue.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{body_json, idle_app, sample_payload};
use tower::ServiceExt;

fn post_alert(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/alerts/grafana")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_webhook_accepts_payload() {
    let (app, state) = idle_app(4, vec!["zeta".to_string(), "alpha".to_string()]);

    let response = app
        .oneshot(post_alert(sample_payload("{}:{alertname=\"HighJitter\"}").to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_json(response).await;
    assert_eq!(json["status"], "queued");
    assert_eq!(json["alerts"], 2);
    assert_eq!(json["backends"], serde_json::json!(["alpha", "zeta"]));

    let job_id = json["job_id"].as_str().unwrap();
    assert!(job_id.ends_with("-{}-{alertname=\"HighJitter\"}"));
    assert_eq!(state.queue.depth(), 1);
}

#[tokio::test]
async fn test_webhook_rejects_invalid_json() {
    let (app, state) = idle_app(4, vec![]);

    let response = app.oneshot(post_alert("{not json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "invalid json body");
    assert_eq!(state.queue.depth(), 0);
}

#[tokio::test]
async fn test_webhook_rejects_wrong_shape() {
    let (app, _state) = idle_app(4, vec![]);

    let response = app
        .oneshot(post_alert(r#"{"alerts": "not-a-list"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_method_not_allowed() {
    let (app, _state) = idle_app(4, vec![]);

    let response = app.oneshot(get("/alerts/grafana")).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_webhook_queue_full_returns_503() {
    let (app, state) = idle_app(1, vec![]);

    let first = app
        .clone()
        .oneshot(post_alert(sample_payload("a").to_string()))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::ACCEPTED);

    let second = app
        .oneshot(post_alert(sample_payload("b").to_string()))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(second).await;
    assert_eq!(json["error"]["message"], "queue full");

    assert_eq!(state.queue.depth(), 1);
}

#[tokio::test]
async fn test_healthz_reports_counters() {
    let (app, _state) = idle_app(8, vec!["local".to_string()]);

    for key in ["a", "b"] {
        let response = app
            .clone()
            .oneshot(post_alert(sample_payload(key).to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    for uri in ["/healthz", "/readyz"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["providers"], serde_json::json!(["local"]));
        assert_eq!(json["prometheus_url"], "http://host.k3d.internal:9090");
        assert_eq!(json["queue_depth"], 2);
        assert_eq!(json["worker_count"], 2);
        assert_eq!(json["stored_analyses"], 0);
    }
}

#[tokio::test]
async fn test_latest_analyses_empty() {
    let (app, _state) = idle_app(4, vec![]);

    let response = app.oneshot(get("/analyses/latest")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json, serde_json::json!({"items": []}));
}

#[tokio::test]
async fn test_metrics_without_recorder() {
    let (app, _state) = idle_app(4, vec![]);

    let response = app.oneshot(get("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
}

#[tokio::test]
async fn test_unknown_route_404() {
    let (app, _state) = idle_app(4, vec![]);

    let response = app.oneshot(get("/v1/models")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let (app, state) = idle_app(4, vec![]);
    let limit = state.config.server.max_body_bytes;
    let body = vec![b' '; limit + 1];

    let response = app.oneshot(post_alert(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(state.queue.depth(), 0);
}
