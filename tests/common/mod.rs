//! Shared test utilities for alert receiver integration tests.

#![allow(dead_code)]

use alert_receiver::api::{create_router, AppState};
use alert_receiver::config::ReceiverConfig;
use alert_receiver::metrics::NoopSink;
use alert_receiver::queue::JobQueue;
use alert_receiver::store::{AnalysisRecord, RecordStore};
use std::sync::Arc;
use std::time::Duration;

/// A firing alert group with two alerts, keyed by `group_key`.
pub fn sample_payload(group_key: &str) -> serde_json::Value {
    serde_json::json!({
        "receiver": "ai-analysis",
        "status": "firing",
        "groupKey": group_key,
        "groupLabels": {"alertname": "HighJitter"},
        "commonLabels": {"alertname": "HighJitter", "severity": "warning"},
        "commonAnnotations": {"summary": "Jitter above 30ms"},
        "externalURL": "http://grafana:3000",
        "version": "1",
        "alerts": [
            {
                "status": "firing",
                "labels": {"alertname": "HighJitter", "target": "1.1.1.1"},
                "annotations": {"summary": "Jitter above 30ms"},
                "startsAt": "2024-05-01T10:00:00Z",
                "endsAt": "0001-01-01T00:00:00Z",
                "fingerprint": "abc123"
            },
            {
                "status": "firing",
                "labels": {"alertname": "HighJitter", "target": "8.8.8.8"},
                "startsAt": "2024-05-01T09:55:00Z"
            }
        ]
    })
}

/// Router over a queue with no workers attached, so admitted jobs stay queued.
pub fn idle_app(queue_capacity: usize, providers: Vec<String>) -> (axum::Router, Arc<AppState>) {
    let mut config = ReceiverConfig::default();
    config.pipeline.queue_capacity = queue_capacity;
    let queue = Arc::new(JobQueue::new(queue_capacity, Arc::new(NoopSink)));
    let store = Arc::new(RecordStore::new(config.pipeline.max_stored_analyses));
    let state = Arc::new(AppState::new(Arc::new(config), queue, store, providers));
    (create_router(Arc::clone(&state)), state)
}

/// Poll `store` until it holds `count` records or `timeout` elapses.
pub async fn wait_for_records(
    store: &RecordStore,
    count: usize,
    timeout: Duration,
) -> Vec<AnalysisRecord> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let records = store.list();
        if records.len() >= count || tokio::time::Instant::now() >= deadline {
            return records;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Read a response body as JSON.
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
