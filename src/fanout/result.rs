//! Per-backend results and structured analysis parsing.

use crate::alert::null_as_default;
use serde::{Deserialize, Serialize};

/// The analysis shape backends are asked to return.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredAnalysis {
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub likely_issue: String,
    /// 0.0 to 1.0
    #[serde(default, deserialize_with = "null_as_default")]
    pub confidence: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub evidence: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub potential_fix: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub next_checks: Vec<String>,
}

impl StructuredAnalysis {
    /// Parse raw backend text. `None` unless it decodes and has a summary.
    /// Fields sent as `null` take their zero value.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str::<Self>(raw)
            .ok()
            .filter(|parsed| !parsed.summary.is_empty())
    }
}

/// Outcome of one backend call within a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendResult {
    pub provider: String,
    #[serde(rename = "type")]
    pub family: String,
    pub model: String,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed: Option<StructuredAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BackendResult {
    /// An error entry not tied to a configured backend.
    pub fn synthetic(provider: &str, family: &str, error: impl ToString) -> Self {
        Self {
            provider: provider.to_string(),
            family: family.to_string(),
            error: Some(error.to_string()),
            ..Default::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
