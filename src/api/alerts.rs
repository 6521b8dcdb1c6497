//! Alert-group webhook handler.

use crate::alert::AlertGroupPayload;
use crate::api::{ApiError, AppState};
use crate::queue::QueueError;
use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Body of a 202 admission response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedResponse {
    pub job_id: String,
    pub status: String,
    pub alerts: usize,
    pub backends: Vec<String>,
}

/// POST /alerts/grafana - decode and admit one alert group.
///
/// The response never reflects the analysis outcome.
pub async fn handle(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<QueuedResponse>), ApiError> {
    let payload: AlertGroupPayload = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected undecodable webhook body");
        ApiError::invalid_json()
    })?;

    let alerts = payload.alerts.len();
    let receiver = payload.receiver.clone();
    let status = payload.status.clone();

    match state.queue.submit(payload) {
        Ok(job_id) => {
            tracing::info!(
                job_id = %job_id,
                receiver = %receiver,
                status = %status,
                alerts,
                "Alert queued"
            );
            Ok((
                StatusCode::ACCEPTED,
                Json(QueuedResponse {
                    job_id,
                    status: "queued".to_string(),
                    alerts,
                    backends: state.provider_names.clone(),
                }),
            ))
        }
        Err(QueueError::Full { capacity }) => {
            tracing::warn!(receiver = %receiver, capacity, "Job queue full, rejecting alert");
            Err(ApiError::queue_full())
        }
        Err(QueueError::Closed) => {
            tracing::warn!(receiver = %receiver, "Job queue closed, rejecting alert");
            Err(ApiError::shutting_down())
        }
    }
}
