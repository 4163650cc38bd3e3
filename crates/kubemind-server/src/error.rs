//! Error handling for the HTTP server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;
use tracing::error;

use kubemind_core::error::KubeMindError;

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    // Common error constructors
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<KubeMindError> for ApiError {
    fn from(err: KubeMindError) -> Self {
        let code = err.code().as_str();
        let suggestion = err.suggestion().map(|s| serde_json::json!({ "suggestion": s }));

        let api_error = match err {
            KubeMindError::Validation { message, .. } => {
                ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, code, message)
            }
            KubeMindError::NotFound { message, .. } => {
                ApiError::new(StatusCode::NOT_FOUND, code, message)
            }
            KubeMindError::Cancelled(operation) => {
                ApiError::unavailable(format!("Shutting down, {} cancelled", operation))
            }
            KubeMindError::BufferClosed => {
                ApiError::unavailable("Memory consolidation has stopped")
            }
            KubeMindError::UnsupportedProvider { provider } => {
                ApiError::bad_request(format!("Unsupported provider: {}", provider))
            }
            err @ (KubeMindError::DedupStore { .. }
            | KubeMindError::VectorStore { .. }
            | KubeMindError::Embedding { .. }
            | KubeMindError::Network { .. }) => {
                error!(error = %err, "Backend failure");
                ApiError::new(StatusCode::BAD_GATEWAY, code, err.to_string())
            }
            other => {
                error!(error = %other, "Internal failure");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, code, other.to_string())
            }
        };

        match suggestion {
            Some(details) => api_error.with_details(details),
            None => api_error,
        }
    }
}

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
