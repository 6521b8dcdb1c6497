//! Job admission queue
//!
//! Bounded FIFO hand-off between the webhook handler and the worker pool.
//! Admission never blocks: a full queue rejects immediately so the sender
//! sees backpressure instead of a hung request.

use crate::alert::AlertGroupPayload;
use crate::metrics::{JobResult, MetricsSink};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// One admitted alert group awaiting analysis.
#[derive(Debug, Clone)]
pub struct AnalysisJob {
    /// `<unix nanos>-<sanitized group key>`
    pub id: String,
    pub received_at: DateTime<Utc>,
    pub payload: AlertGroupPayload,
}

impl AnalysisJob {
    pub fn new(payload: AlertGroupPayload) -> Self {
        Self::with_arrival(payload, Utc::now())
    }

    pub fn with_arrival(payload: AlertGroupPayload, received_at: DateTime<Utc>) -> Self {
        let nanos = received_at
            .timestamp_nanos_opt()
            .unwrap_or_else(|| received_at.timestamp_micros().saturating_mul(1000));
        Self {
            id: format!("{}-{}", nanos, sanitize_id(&payload.group_key)),
            received_at,
            payload,
        }
    }
}

/// Make a group key safe for use in identifiers.
pub fn sanitize_id(value: &str) -> String {
    let out: String = value
        .trim()
        .chars()
        .map(|c| match c {
            '/' | ':' | ' ' | '\n' | '\t' => '-',
            other => other,
        })
        .collect();
    if out.is_empty() {
        "alert".to_string()
    } else {
        out
    }
}

/// Errors from queue operations
#[derive(Debug, Error)]
pub enum QueueError {
    /// Queue is at capacity
    #[error("queue full ({capacity} jobs)")]
    Full { capacity: usize },

    /// All receivers are gone
    #[error("queue closed")]
    Closed,
}

/// Bounded job queue shared by admission and workers.
pub struct JobQueue {
    tx: mpsc::Sender<AnalysisJob>,
    rx: tokio::sync::Mutex<mpsc::Receiver<AnalysisJob>>,
    capacity: usize,
    sink: Arc<dyn MetricsSink>,
}

impl JobQueue {
    /// Create a queue holding at most `capacity` jobs (minimum 1).
    pub fn new(capacity: usize, sink: Arc<dyn MetricsSink>) -> Self {
        let capacity = capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx,
            rx: tokio::sync::Mutex::new(rx),
            capacity,
            sink,
        }
    }

    /// Admit a payload without blocking. Returns the job id on success.
    ///
    /// Counts the alert as received on success and as `queue_full` on
    /// rejection.
    pub fn submit(&self, payload: AlertGroupPayload) -> Result<String, QueueError> {
        let job = AnalysisJob::new(payload);
        let id = job.id.clone();
        let status = job.payload.status.clone();

        match self.tx.try_send(job) {
            Ok(()) => {
                self.sink.alert_received(&status);
                self.sink.queue_depth(self.depth());
                Ok(id)
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.sink.job_result(JobResult::QueueFull);
                Err(QueueError::Full {
                    capacity: self.capacity,
                })
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(QueueError::Closed),
        }
    }

    /// Wait for the next job. `None` once the queue is closed and drained.
    ///
    /// Cancellation-safe: a job is only removed from the channel when this
    /// future completes.
    pub async fn dequeue(&self) -> Option<AnalysisJob> {
        let job = {
            let mut rx = self.rx.lock().await;
            rx.recv().await
        }?;
        self.sink.queue_depth(self.depth());
        Some(job)
    }

    /// Jobs waiting for a worker.
    pub fn depth(&self) -> usize {
        self.capacity - self.tx.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
