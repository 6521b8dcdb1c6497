//! # Fan-out
//!
//! Dispatches one [`InferenceRequest`] to every configured agent at once and
//! waits for all of them. Each call runs in its own task under its own
//! timeout, so a slow or failing backend only affects its own slot. Results
//! come back in configuration order regardless of completion order.

mod result;

pub use result::{BackendResult, StructuredAnalysis};

use crate::agent::{AgentError, InferenceAgent, InferenceRequest};
use crate::metrics::{MetricsSink, Outcome};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

pub const NO_BACKENDS_ERROR: &str = "no LLM backends configured";

/// Wait-all coordinator over the ordered agent list.
#[derive(Clone)]
pub struct FanOut {
    agents: Arc<Vec<Arc<dyn InferenceAgent>>>,
    timeout: Duration,
    sink: Arc<dyn MetricsSink>,
}

impl FanOut {
    pub fn new(
        agents: Vec<Arc<dyn InferenceAgent>>,
        timeout: Duration,
        sink: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            agents: Arc::new(agents),
            timeout,
            sink,
        }
    }

    pub fn agents(&self) -> &[Arc<dyn InferenceAgent>] {
        &self.agents
    }

    /// Configured agent names, sorted.
    pub fn provider_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.agents.iter().map(|a| a.name().to_string()).collect();
        names.sort();
        names
    }

    /// Call every agent and return one result per agent, in order.
    ///
    /// With no agents configured, returns a single synthetic error entry.
    pub async fn dispatch(&self, request: &InferenceRequest) -> Vec<BackendResult> {
        if self.agents.is_empty() {
            return vec![BackendResult::synthetic("none", "none", NO_BACKENDS_ERROR)];
        }

        let handles: Vec<_> = self
            .agents
            .iter()
            .map(|agent| {
                let agent = Arc::clone(agent);
                let sink = Arc::clone(&self.sink);
                let request = agent.customize(request);
                let timeout = self.timeout;
                let span = tracing::debug_span!("backend", backend = %agent.name());
                tokio::spawn(call_agent(agent, request, timeout, sink).instrument(span))
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (agent, handle) in self.agents.iter().zip(handles) {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(backend = %agent.name(), error = %e, "Backend task failed");
                    self.sink.backend_request(agent.name(), Outcome::Error);
                    let identity = agent.identity();
                    BackendResult {
                        provider: identity.name,
                        family: identity.family.to_string(),
                        model: identity.model,
                        error: Some(format!("backend task failed: {}", e)),
                        ..Default::default()
                    }
                }
            };
            results.push(result);
        }
        results
    }
}

async fn call_agent(
    agent: Arc<dyn InferenceAgent>,
    request: InferenceRequest,
    timeout: Duration,
    sink: Arc<dyn MetricsSink>,
) -> BackendResult {
    let identity = agent.identity();
    let start = Instant::now();

    let outcome = match tokio::time::timeout(timeout, agent.complete(&request, timeout)).await {
        Ok(result) => result,
        Err(_) => Err(AgentError::Timeout(timeout.as_millis() as u64)),
    };
    let duration_ms = start.elapsed().as_millis() as u64;

    let mut result = BackendResult {
        provider: identity.name,
        family: identity.family.to_string(),
        model: identity.model,
        duration_ms,
        ..Default::default()
    };

    match outcome {
        Ok(text) => {
            sink.backend_request(&result.provider, Outcome::Success);
            tracing::debug!(
                duration_ms,
                preview = %crate::logging::preview(&text, 120),
                "Backend call succeeded"
            );
            result.parsed = StructuredAnalysis::parse(&text);
            result.response = Some(text);
        }
        Err(e) => {
            sink.backend_request(&result.provider, Outcome::Error);
            tracing::warn!(duration_ms, error = %e, "Backend call failed");
            result.error = Some(e.to_string());
        }
    }
    result
}
