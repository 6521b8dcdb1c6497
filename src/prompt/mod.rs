//! Prompt construction.
//!
//! Renders a job and its evidence into one backend-agnostic
//! [`InferenceRequest`]. The output is a pure function of its inputs: label
//! maps are ordered and the payload struct has a fixed field order, so the
//! same job and snapshots always produce byte-identical prompts.

use crate::agent::InferenceRequest;
use crate::alert::{AlertSummary, LabelMap};
use crate::evidence::MetricSnapshot;
use crate::queue::AnalysisJob;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Instruction sent as the system prompt unless a backend overrides it.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You analyze edge network alerts using only the provided evidence.
Return strict JSON with this shape:
{
  "summary": "short incident summary",
  "likely_issue": "most likely root cause",
  "confidence": 0.0,
  "evidence": ["bullet evidence"],
  "potential_fix": ["ordered remediation ideas"],
  "next_checks": ["additional checks if evidence is insufficient"]
}
Do not invent radio-level evidence if it is not present in the metrics."#;

const USER_PROMPT_PREFIX: &str = "Evaluate this Grafana alert incident and summarize the issue, likely cause, and potential fix using only the evidence below.\n\n";

pub const DEFAULT_MAX_TOKENS: u32 = 900;
pub const DEFAULT_TEMPERATURE: f64 = 0.2;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("marshal prompt payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct PromptPayload<'a> {
    received_at: DateTime<Utc>,
    alert_status: &'a str,
    receiver: &'a str,
    group_key: &'a str,
    group_labels: &'a LabelMap,
    common_labels: &'a LabelMap,
    common_annotations: &'a LabelMap,
    alerts: Vec<AlertSummary>,
    metric_snapshots: &'a [MetricSnapshot],
    analysis_window: String,
}

/// Build the inference request for `job`.
///
/// Only fails if the payload cannot be serialized.
pub fn build_request(
    job: &AnalysisJob,
    snapshots: &[MetricSnapshot],
    lookback: Duration,
) -> Result<InferenceRequest, PromptError> {
    let payload = &job.payload;
    let body = serde_json::to_string_pretty(&PromptPayload {
        received_at: job.received_at,
        alert_status: &payload.status,
        receiver: &payload.receiver,
        group_key: &payload.group_key,
        group_labels: &payload.group_labels,
        common_labels: &payload.common_labels,
        common_annotations: &payload.common_annotations,
        alerts: payload.summarize_alerts(),
        metric_snapshots: snapshots,
        analysis_window: humantime::format_duration(lookback).to_string(),
    })?;

    Ok(InferenceRequest {
        system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        user_prompt: format!("{}{}", USER_PROMPT_PREFIX, body),
        max_tokens: DEFAULT_MAX_TOKENS,
        temperature: DEFAULT_TEMPERATURE,
    })
}
