//! HTTP error responses for the admission path.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error envelope returned by the API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub error: ApiErrorBody,
}

/// Error details.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorBody {
    pub message: String,
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ApiError {
    /// Request body could not be decoded (400).
    pub fn invalid_json() -> Self {
        Self {
            error: ApiErrorBody {
                message: "invalid json body".to_string(),
                r#type: "invalid_request_error".to_string(),
                code: Some("invalid_json".to_string()),
            },
        }
    }

    /// Admission rejected because the job queue is at capacity (503).
    pub fn queue_full() -> Self {
        Self {
            error: ApiErrorBody {
                message: "queue full".to_string(),
                r#type: "server_error".to_string(),
                code: Some("queue_full".to_string()),
            },
        }
    }

    /// Queue no longer accepts jobs because the process is shutting down (503).
    pub fn shutting_down() -> Self {
        Self {
            error: ApiErrorBody {
                message: "shutting down".to_string(),
                r#type: "server_error".to_string(),
                code: Some("shutting_down".to_string()),
            },
        }
    }

    /// Get the HTTP status code for this error.
    fn status_code(&self) -> StatusCode {
        match self.error.code.as_deref() {
            Some("invalid_json") => StatusCode::BAD_REQUEST,
            Some("queue_full") | Some("shutting_down") => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}
