//! # Worker Pool
//!
//! A fixed number of long-lived tasks drain the [`JobQueue`]. Each worker
//! runs one job to completion before taking the next. Cancellation is only
//! observed between jobs, so shutdown never abandons a job halfway.

mod pipeline;

pub use pipeline::Analyzer;

use crate::queue::JobQueue;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `count` workers (minimum 1). Worker ids start at 1.
    pub fn start(
        count: usize,
        queue: Arc<JobQueue>,
        analyzer: Arc<Analyzer>,
        cancel: CancellationToken,
    ) -> Self {
        let handles = (1..=count.max(1))
            .map(|id| {
                tokio::spawn(worker_loop(
                    id,
                    Arc::clone(&queue),
                    Arc::clone(&analyzer),
                    cancel.clone(),
                ))
            })
            .collect();
        Self { handles }
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Wait for every worker to exit after cancellation.
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Worker task failed");
            }
        }
    }
}

async fn worker_loop(
    id: usize,
    queue: Arc<JobQueue>,
    analyzer: Arc<Analyzer>,
    cancel: CancellationToken,
) {
    tracing::debug!(worker = id, "Worker started");

    loop {
        let job = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            job = queue.dequeue() => match job {
                Some(job) => job,
                None => break,
            },
        };
        analyzer.process(job, id).await;
    }

    tracing::debug!(worker = id, "Worker stopped");
}
