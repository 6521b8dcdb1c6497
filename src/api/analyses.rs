//! Stored analysis listing.

use crate::api::AppState;
use crate::store::AnalysisRecord;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestAnalysesResponse {
    pub items: Vec<AnalysisRecord>,
}

/// GET /analyses/latest - newest first, at most the store capacity.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<LatestAnalysesResponse> {
    Json(LatestAnalysesResponse {
        items: state.store.list(),
    })
}
