//! # Evidence Collection
//!
//! Enriches each job with point-in-time metric snapshots. Every configured
//! [`MetricQuery`] is evaluated once per job at a query time anchored to the
//! onset of the alert group:
//!
//! ```text
//! query_time = min(earliest startsAt, else arrival) + lookback, clamped to now
//! ```
//!
//! Queries are independent. A failing query yields a snapshot carrying only
//! its identity and an error string; the remaining queries still run.

mod defaults;
mod error;
mod prometheus;
mod types;

pub use defaults::{default_queries, prom_duration};
pub use error::EvidenceError;
pub use prometheus::PrometheusClient;
pub use types::{summarize_series, MetricQuery, MetricSeries, MetricSnapshot};

use crate::metrics::{MetricsSink, Outcome};
use crate::queue::AnalysisJob;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// A metrics backend able to evaluate one instant query.
#[async_trait]
pub trait EvidenceSource: Send + Sync + 'static {
    async fn instant_query(
        &self,
        query: &MetricQuery,
        at: DateTime<Utc>,
    ) -> Result<MetricSnapshot, EvidenceError>;
}

/// Anchor the evidence query time for a job.
pub fn query_time(
    earliest_start: Option<DateTime<Utc>>,
    arrival: DateTime<Utc>,
    lookback: Duration,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    let anchor = earliest_start.unwrap_or(arrival);
    let lookback = chrono::Duration::from_std(lookback).unwrap_or(chrono::Duration::zero());
    let at = anchor.checked_add_signed(lookback).unwrap_or(now);
    at.min(now)
}

/// Runs the configured query list against an optional [`EvidenceSource`].
///
/// With no source configured, [`collect`](Self::collect) returns no
/// snapshots and the prompt is built from the alert payload alone.
#[derive(Clone)]
pub struct EvidenceCollector {
    source: Option<Arc<dyn EvidenceSource>>,
    queries: Arc<Vec<MetricQuery>>,
    lookback: Duration,
    sink: Arc<dyn MetricsSink>,
}

impl EvidenceCollector {
    pub fn new(
        source: Option<Arc<dyn EvidenceSource>>,
        queries: Vec<MetricQuery>,
        lookback: Duration,
        sink: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            source,
            queries: Arc::new(queries),
            lookback,
            sink,
        }
    }

    pub fn lookback(&self) -> Duration {
        self.lookback
    }

    pub fn queries(&self) -> &[MetricQuery] {
        &self.queries
    }

    pub fn is_enabled(&self) -> bool {
        self.source.is_some()
    }

    /// Evaluate every query for `job`, in configuration order.
    pub async fn collect(&self, job: &AnalysisJob) -> Vec<MetricSnapshot> {
        let Some(source) = &self.source else {
            return Vec::new();
        };

        let at = query_time(
            job.payload.earliest_start(),
            job.received_at,
            self.lookback,
            Utc::now(),
        );

        let mut snapshots = Vec::with_capacity(self.queries.len());
        for query in self.queries.iter() {
            match source.instant_query(query, at).await {
                Ok(snapshot) => {
                    self.sink.evidence_query(&query.name, Outcome::Success);
                    snapshots.push(snapshot);
                }
                Err(e) => {
                    tracing::warn!(
                        job_id = %job.id,
                        query = %query.name,
                        error = %e,
                        "Evidence query failed"
                    );
                    self.sink.evidence_query(&query.name, Outcome::Error);
                    snapshots.push(MetricSnapshot::failed(query, e));
                }
            }
        }

        tracing::debug!(
            job_id = %job.id,
            query_time = %at,
            queries = snapshots.len(),
            failed = snapshots.iter().filter(|s| s.is_error()).count(),
            "Evidence collected"
        );

        snapshots
    }
}
