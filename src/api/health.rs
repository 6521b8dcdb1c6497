//! Health check endpoint handler.

use crate::api::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub providers: Vec<String>,
    pub prometheus_url: String,
    pub queue_depth: usize,
    pub worker_count: usize,
    pub stored_analyses: usize,
}

/// GET /healthz and /readyz - always `ok` once the server is serving.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        providers: state.provider_names.clone(),
        prometheus_url: state.prometheus_url().to_string(),
        queue_depth: state.queue.depth(),
        worker_count: state.worker_count(),
        stored_analyses: state.store.len(),
    })
}
