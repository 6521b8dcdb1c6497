//! Analysis pipeline configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Queue, worker and store sizing plus the per-backend timeout.
///
/// # Example
///
/// ```toml
/// [pipeline]
/// queue_capacity = 32
/// worker_count = 2
/// max_stored_analyses = 25
/// backend_timeout = "30s"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Jobs admitted before the webhook answers 503.
    pub queue_capacity: usize,

    pub worker_count: usize,

    /// Records kept for `GET /analyses/latest`, newest first.
    pub max_stored_analyses: usize,

    /// Deadline applied independently to every backend call.
    #[serde(with = "humantime_serde")]
    pub backend_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 32,
            worker_count: 2,
            max_stored_analyses: 25,
            backend_timeout: Duration::from_secs(30),
        }
    }
}
