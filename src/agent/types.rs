//! Supporting types for agent operations.

use crate::config::BackendFamily;
use serde::{Deserialize, Serialize};

/// Backend-agnostic completion request, built once per job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

/// Adapter-level overrides applied on top of a caller's request.
///
/// Zero or blank values mean "inherit": an override never clears a value
/// the caller supplied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOverrides {
    pub system_prompt: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl RequestOverrides {
    pub fn is_empty(&self) -> bool {
        self.system_prompt.trim().is_empty() && self.max_tokens == 0 && self.temperature <= 0.0
    }
}

impl InferenceRequest {
    /// Derive a copy with `overrides` applied.
    pub fn with_overrides(&self, overrides: &RequestOverrides) -> Self {
        let mut out = self.clone();
        if !overrides.system_prompt.trim().is_empty() {
            out.system_prompt = overrides.system_prompt.clone();
        }
        if overrides.max_tokens > 0 {
            out.max_tokens = overrides.max_tokens;
        }
        if overrides.temperature > 0.0 {
            out.temperature = overrides.temperature;
        }
        out
    }
}

/// Name, family and model of a configured adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentIdentity {
    pub name: String,
    pub family: BackendFamily,
    pub model: String,
}
