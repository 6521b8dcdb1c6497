//! Error types for agent operations.

use thiserror::Error;

/// Errors that can occur during agent construction or inference.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Network connectivity error (DNS, connection refused, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded deadline.
    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    /// Backend returned a non-success status.
    #[error("Backend error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Backend response doesn't match expected format.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Agent configuration error (missing model, credential, or region).
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AgentError {
    /// Map a reqwest send/read failure, distinguishing deadline expiry.
    pub(crate) fn from_reqwest(e: reqwest::Error, deadline_ms: u64) -> Self {
        if e.is_timeout() {
            AgentError::Timeout(deadline_ms)
        } else {
            AgentError::Network(e.to_string())
        }
    }
}
