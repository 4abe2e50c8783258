//! API error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// API error with HTTP status code
///
/// Serialized as `{"error": <message>, "code": <CODE>}`. Messages are short
/// fixed strings; the underlying cause is logged, never returned.
#[derive(Debug, Clone, Serialize, Error)]
pub struct ApiError {
    /// HTTP status code
    #[serde(skip)]
    pub status: StatusCode,

    /// Error message
    #[serde(rename = "error")]
    pub message: String,

    /// Machine-readable error code
    pub code: String,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code: code.into(),
        }
    }

    /// 400 Bad Request
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "INVALID_INPUT")
    }

    /// 500 Internal Server Error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message, "INTERNAL_ERROR")
    }

    /// 503 Service Unavailable
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message, "SERVICE_UNAVAILABLE")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[{:?}] [{}] {}", self.status, self.code, self.message)
    }
}

impl From<lerecherche::Error> for ApiError {
    fn from(err: lerecherche::Error) -> Self {
        let code = err.reason().to_ascii_uppercase();
        match err {
            lerecherche::Error::InvalidInput(_) => ApiError::new(
                StatusCode::BAD_REQUEST,
                "Query parameter 'q' is required",
                code,
            ),
            lerecherche::Error::EmbeddingFailure(cause) => {
                error!("Failed to get query embedding: {}", cause);
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to get query embedding",
                    code,
                )
            }
            lerecherche::Error::StoreFailure(cause) => {
                error!("Database query failed: {}", cause);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Database query failed", code)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}
