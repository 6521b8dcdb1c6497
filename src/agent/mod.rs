//! Inference agent abstraction layer.
//!
//! This module provides the `InferenceAgent` trait and the concrete adapters
//! for each backend family. Agents are constructed once at startup by
//! [`factory::create_agents`]; construction fails fast on missing model,
//! credential, or region so a misconfigured backend list never serves traffic.

use async_trait::async_trait;
use std::time::Duration;

pub mod bedrock;
pub mod error;
pub mod factory;
pub mod ollama;
pub mod openai;
pub mod types;

pub use error::AgentError;
pub use types::{AgentIdentity, InferenceRequest, RequestOverrides};

use crate::config::BackendFamily;

/// Unified interface for all inference backends.
///
/// # Object Safety
///
/// This trait is object-safe and designed to be used as `Arc<dyn InferenceAgent>`.
/// All async methods use `async_trait` for compatibility with trait objects.
///
/// # Cancellation Safety
///
/// `complete` is cancellation-safe. Dropping the future aborts the in-flight
/// HTTP request.
#[async_trait]
pub trait InferenceAgent: Send + Sync + 'static {
    /// Configured name, used in results and metric labels.
    fn name(&self) -> &str;

    fn family(&self) -> BackendFamily;

    fn model(&self) -> &str;

    fn identity(&self) -> AgentIdentity {
        AgentIdentity {
            name: self.name().to_string(),
            family: self.family(),
            model: self.model().to_string(),
        }
    }

    /// Adapter-level overrides. Defaults to none.
    fn overrides(&self) -> Option<&RequestOverrides> {
        None
    }

    /// Derive this adapter's request from the shared one.
    fn customize(&self, request: &InferenceRequest) -> InferenceRequest {
        match self.overrides() {
            Some(overrides) => request.with_overrides(overrides),
            None => request.clone(),
        }
    }

    /// Execute one completion and return the trimmed response text.
    ///
    /// # Returns
    ///
    /// - `Err(AgentError::Upstream)` if the backend returned a non-success status
    /// - `Err(AgentError::Network)` if the connection failed
    /// - `Err(AgentError::Timeout)` if the request exceeded `deadline`
    /// - `Err(AgentError::InvalidResponse)` if the response envelope is malformed
    async fn complete(
        &self,
        request: &InferenceRequest,
        deadline: Duration,
    ) -> Result<String, AgentError>;
}

/// Read a response body, turning any status >= 300 into `Upstream` with the
/// trimmed body as message.
pub(crate) async fn read_success_body(
    response: reqwest::Response,
    deadline_ms: u64,
) -> Result<String, AgentError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| AgentError::from_reqwest(e, deadline_ms))?;

    if status.as_u16() >= 300 {
        return Err(AgentError::Upstream {
            status: status.as_u16(),
            message: body.trim().to_string(),
        });
    }
    Ok(body)
}
