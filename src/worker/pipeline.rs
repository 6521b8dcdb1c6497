//! Per-job pipeline: enrichment, prompt, fan-out, record.

use crate::evidence::{EvidenceCollector, MetricSnapshot};
use crate::fanout::{BackendResult, FanOut};
use crate::logging::outcome_counts;
use crate::metrics::{JobResult, MetricsSink};
use crate::prompt::{self, PromptError};
use crate::queue::AnalysisJob;
use crate::store::{AnalysisRecord, RecordStore};
use chrono::Utc;
use std::any::Any;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinError;

/// Runs one job end to end and stores the resulting record.
pub struct Analyzer {
    evidence: EvidenceCollector,
    fanout: FanOut,
    store: Arc<RecordStore>,
    sink: Arc<dyn MetricsSink>,
}

/// What the stages produced for one job.
#[derive(Default)]
struct StageOutput {
    metrics: Vec<MetricSnapshot>,
    providers: Vec<BackendResult>,
    error: Option<String>,
}

impl StageOutput {
    /// Fan-out is skipped; the failure is the record's only provider entry.
    fn prompt_failed(metrics: Vec<MetricSnapshot>, e: &PromptError) -> Self {
        Self {
            metrics,
            providers: vec![BackendResult::synthetic("prompt-builder", "internal", e)],
            error: Some(e.to_string()),
        }
    }

    fn panicked(message: &str) -> Self {
        Self {
            error: Some(format!("job panicked: {}", message)),
            ..Default::default()
        }
    }
}

impl Analyzer {
    pub fn new(
        evidence: EvidenceCollector,
        fanout: FanOut,
        store: Arc<RecordStore>,
        sink: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            evidence,
            fanout,
            store,
            sink,
        }
    }

    pub fn fanout(&self) -> &FanOut {
        &self.fanout
    }

    /// Process `job` and store its record. Always produces a record, even if
    /// a stage panics.
    ///
    /// The stages run in their own task so a panic surfaces as a
    /// [`JoinError`] here instead of unwinding through the worker.
    pub async fn process(self: &Arc<Self>, job: AnalysisJob, worker: usize) -> AnalysisRecord {
        let start = Instant::now();
        let job_id = job.id.clone();
        tracing::info!(
            job_id = %job_id,
            worker,
            alerts = job.payload.alerts.len(),
            "Processing alert job"
        );

        let record = AnalysisRecord::from_job(&job);
        let stages = Arc::clone(self);
        let output = match tokio::spawn(async move { stages.run(&job).await }).await {
            Ok(output) => output,
            Err(e) => {
                let message = join_error_message(e);
                tracing::error!(job_id = %job_id, worker, panic = %message, "Alert job panicked");
                StageOutput::panicked(&message)
            }
        };

        self.finish(record, output, start, worker)
    }

    /// Attach stage output to `record`, stamp completion and store it.
    fn finish(
        &self,
        mut record: AnalysisRecord,
        output: StageOutput,
        start: Instant,
        worker: usize,
    ) -> AnalysisRecord {
        record.metrics = output.metrics;
        record.providers = output.providers;
        record.error = output.error;
        record.completed_at = Utc::now();
        let elapsed = start.elapsed();
        self.sink.job_duration(elapsed);
        self.sink.job_result(JobResult::Processed);
        self.store.add(record.clone());

        let (succeeded, failed) = outcome_counts(&record.providers);
        tracing::info!(
            job_id = %record.id,
            worker,
            duration_ms = elapsed.as_millis() as u64,
            succeeded,
            failed,
            "Alert job completed"
        );
        record
    }

    async fn run(&self, job: &AnalysisJob) -> StageOutput {
        let metrics = self.evidence.collect(job).await;

        match prompt::build_request(job, &metrics, self.evidence.lookback()) {
            Ok(request) => StageOutput {
                metrics,
                providers: self.fanout.dispatch(&request).await,
                error: None,
            },
            Err(e) => {
                tracing::warn!(job_id = %job.id, error = %e, "Prompt construction failed");
                StageOutput::prompt_failed(metrics, &e)
            }
        }
    }
}

fn join_error_message(e: JoinError) -> String {
    if !e.is_panic() {
        return e.to_string();
    }
    let panic = e.into_panic();
    panic_message(panic.as_ref())
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
