//! Evidence enrichment configuration

use crate::evidence::{default_queries, MetricQuery};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Prometheus connection and query set.
///
/// An empty `prometheus_url` disables enrichment entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceConfig {
    pub prometheus_url: String,

    /// Added to the alert onset to anchor the query time; also sizes the
    /// range selectors of the built-in queries.
    #[serde(with = "humantime_serde")]
    pub lookback: Duration,

    /// HTTP timeout for each Prometheus query.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Ordered query list. Empty means the built-in set.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub queries: Vec<MetricQuery>,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            prometheus_url: "http://host.k3d.internal:9090".to_string(),
            lookback: Duration::from_secs(30 * 60),
            timeout: Duration::from_secs(10),
            queries: Vec::new(),
        }
    }
}

impl EvidenceConfig {
    pub fn is_enabled(&self) -> bool {
        !self.prometheus_url.trim().is_empty()
    }

    /// Configured queries, or the defaults sized to `lookback`.
    pub fn effective_queries(&self) -> Vec<MetricQuery> {
        if self.queries.is_empty() {
            default_queries(self.lookback)
        } else {
            self.queries.clone()
        }
    }
}
