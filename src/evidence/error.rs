//! Error types for evidence queries.

use thiserror::Error;

/// Errors from a single instant query.
#[derive(Error, Debug)]
pub enum EvidenceError {
    /// Connection failure, DNS error, or broken body.
    #[error("query Prometheus: {0}")]
    Network(String),

    /// Query exceeded the client timeout.
    #[error("Prometheus query timed out after {0}ms")]
    Timeout(u64),

    /// Non-success HTTP status.
    #[error("Prometheus status {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Response body did not match the query API envelope.
    #[error("decode Prometheus response: {0}")]
    Decode(String),

    /// API envelope reported `status != "success"`.
    #[error("Prometheus {error_type}: {error}")]
    Query { error_type: String, error: String },
}
