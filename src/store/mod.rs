//! Recent analysis store
//!
//! Bounded, newest-first buffer of completed analyses served by
//! `GET /analyses/latest`. Records live only for the process lifetime.

use std::collections::VecDeque;
use std::sync::RwLock;

use crate::alert::{AlertSummary, LabelMap};
use crate::evidence::MetricSnapshot;
use crate::fanout::BackendResult;
use crate::queue::AnalysisJob;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything known about one processed job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: String,
    pub received_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub alert_status: String,
    pub receiver: String,
    pub group_key: String,
    pub common_labels: LabelMap,
    pub common_annotations: LabelMap,
    pub alerts: Vec<AlertSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metrics: Vec<MetricSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub providers: Vec<BackendResult>,
    /// Set only when the job failed before fan-out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisRecord {
    /// Start a record from the job's denormalized alert-group fields.
    /// `completed_at` is provisional until the worker finalizes it.
    pub fn from_job(job: &AnalysisJob) -> Self {
        let payload = &job.payload;
        Self {
            id: job.id.clone(),
            received_at: job.received_at,
            completed_at: job.received_at,
            alert_status: payload.status.clone(),
            receiver: payload.receiver.clone(),
            group_key: payload.group_key.clone(),
            common_labels: payload.common_labels.clone(),
            common_annotations: payload.common_annotations.clone(),
            alerts: payload.summarize_alerts(),
            metrics: Vec::new(),
            providers: Vec::new(),
            error: None,
        }
    }
}

/// Fixed-capacity store, newest first. Oldest records are evicted from the
/// tail.
pub struct RecordStore {
    records: RwLock<VecDeque<AnalysisRecord>>,
    capacity: usize,
}

impl RecordStore {
    /// Creates a store holding at most `capacity` records (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Prepend a record, evicting the oldest beyond capacity.
    pub fn add(&self, record: AnalysisRecord) {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.push_front(record);
        records.truncate(self.capacity);
    }

    /// Snapshot copy of all records, newest first.
    pub fn list(&self) -> Vec<AnalysisRecord> {
        self.records
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
