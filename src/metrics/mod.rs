//! # Instrumentation
//!
//! Pipeline components report counters and gauges through the [`MetricsSink`]
//! trait instead of touching process-wide state directly. The production sink
//! forwards to the `metrics` facade, which the Prometheus exporter renders on
//! `GET /metrics`.
//!
//! ## Metrics Emitted
//!
//! **Counters:**
//! - `alert_receiver_alerts_received_total{status}` - Accepted webhook payloads
//! - `alert_receiver_jobs_total{result}` - Jobs by result (`processed`, `queue_full`)
//! - `alert_receiver_provider_requests_total{provider, result}` - Backend calls
//! - `alert_receiver_prometheus_queries_total{query, result}` - Evidence queries
//!
//! **Histograms:**
//! - `alert_receiver_job_duration_seconds` - End-to-end job processing time
//!
//! **Gauges:**
//! - `alert_receiver_queue_depth` - Jobs waiting for a worker

pub mod handler;

use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Result label for a single external call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Error,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Error => "error",
        }
    }
}

/// Final disposition of a submitted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobResult {
    Processed,
    QueueFull,
}

impl JobResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobResult::Processed => "processed",
            JobResult::QueueFull => "queue_full",
        }
    }
}

/// Observer for pipeline events.
///
/// Implementations must be cheap and non-blocking; they are called from
/// request handlers and from inside the fan-out tasks.
pub trait MetricsSink: Send + Sync + 'static {
    fn alert_received(&self, status: &str);
    fn job_result(&self, result: JobResult);
    fn queue_depth(&self, depth: usize);
    fn job_duration(&self, elapsed: Duration);
    fn backend_request(&self, backend: &str, outcome: Outcome);
    fn evidence_query(&self, query: &str, outcome: Outcome);
}

/// Sink that forwards to the global `metrics` recorder.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusSink;

impl MetricsSink for PrometheusSink {
    fn alert_received(&self, status: &str) {
        metrics::counter!("alert_receiver_alerts_received_total",
            "status" => status.to_string()
        )
        .increment(1);
    }

    fn job_result(&self, result: JobResult) {
        metrics::counter!("alert_receiver_jobs_total", "result" => result.as_str()).increment(1);
    }

    fn queue_depth(&self, depth: usize) {
        metrics::gauge!("alert_receiver_queue_depth").set(depth as f64);
    }

    fn job_duration(&self, elapsed: Duration) {
        metrics::histogram!("alert_receiver_job_duration_seconds").record(elapsed.as_secs_f64());
    }

    fn backend_request(&self, backend: &str, outcome: Outcome) {
        metrics::counter!("alert_receiver_provider_requests_total",
            "provider" => backend.to_string(),
            "result" => outcome.as_str()
        )
        .increment(1);
    }

    fn evidence_query(&self, query: &str, outcome: Outcome) {
        metrics::counter!("alert_receiver_prometheus_queries_total",
            "query" => query.to_string(),
            "result" => outcome.as_str()
        )
        .increment(1);
    }
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn alert_received(&self, _status: &str) {}
    fn job_result(&self, _result: JobResult) {}
    fn queue_depth(&self, _depth: usize) {}
    fn job_duration(&self, _elapsed: Duration) {}
    fn backend_request(&self, _backend: &str, _outcome: Outcome) {}
    fn evidence_query(&self, _query: &str, _outcome: Outcome) {}
}

/// Install the Prometheus recorder globally.
///
/// Job durations are dominated by LLM latency, so buckets run from 100ms up
/// to five minutes.
pub fn setup_metrics() -> Result<PrometheusHandle, BuildError> {
    let duration_buckets = &[
        0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0,
    ];

    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("alert_receiver_job_duration_seconds".to_string()),
            duration_buckets,
        )?
        .install_recorder()
}
