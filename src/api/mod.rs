//! # HTTP API
//!
//! Webhook intake and read-only views over the pipeline.
//!
//! ## Endpoints
//!
//! - `POST /alerts/grafana` - Admit an alert-group payload for analysis
//! - `GET /analyses/latest` - Stored analysis records, newest first
//! - `GET /healthz`, `GET /readyz` - Liveness plus queue and store counters
//! - `GET /metrics` - Prometheus exposition
//!
//! ## Example
//!
//! ```no_run
//! use alert_receiver::api::{create_router, AppState};
//! use alert_receiver::config::ReceiverConfig;
//! use alert_receiver::metrics::NoopSink;
//! use alert_receiver::queue::JobQueue;
//! use alert_receiver::store::RecordStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(ReceiverConfig::default());
//! let queue = Arc::new(JobQueue::new(32, Arc::new(NoopSink)));
//! let store = Arc::new(RecordStore::new(25));
//!
//! let state = Arc::new(AppState::new(config, queue, store, vec![]));
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:9094").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Admission failures are returned as
//! ```json
//! { "error": { "message": "queue full", "type": "server_error", "code": "queue_full" } }
//! ```
//! Everything that happens after admission is visible only on the stored record.

mod alerts;
mod analyses;
mod error;
mod health;

pub use alerts::QueuedResponse;
pub use analyses::LatestAnalysesResponse;
pub use error::{ApiError, ApiErrorBody};
pub use health::HealthResponse;

use crate::config::ReceiverConfig;
use crate::queue::JobQueue;
use crate::store::RecordStore;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub config: Arc<ReceiverConfig>,
    pub queue: Arc<JobQueue>,
    pub store: Arc<RecordStore>,
    /// Configured backend names, sorted.
    pub provider_names: Vec<String>,
    /// Rendered on `GET /metrics` when a recorder is installed.
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        config: Arc<ReceiverConfig>,
        queue: Arc<JobQueue>,
        store: Arc<RecordStore>,
        mut provider_names: Vec<String>,
    ) -> Self {
        provider_names.sort();
        Self {
            config,
            queue,
            store,
            provider_names,
            metrics_handle: None,
        }
    }

    pub fn with_metrics_handle(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }

    pub fn worker_count(&self) -> usize {
        self.config.pipeline.worker_count
    }

    pub fn prometheus_url(&self) -> &str {
        &self.config.evidence.prometheus_url
    }
}

/// Create the main API router with all endpoints configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.server.max_body_bytes;
    Router::new()
        .route("/alerts/grafana", post(alerts::handle))
        .route("/analyses/latest", get(analyses::handle))
        .route("/healthz", get(health::handle))
        .route("/readyz", get(health::handle))
        .route("/metrics", get(crate::metrics::handler::metrics_handler))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
