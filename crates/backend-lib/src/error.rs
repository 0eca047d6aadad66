// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use goaltrack_common::ErrorBody;
use thiserror::Error;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    /// Request failed field validation; the message names the first
    /// failing field.
    #[error("{0}")]
    Validation(String),

    /// Uniqueness violation (duplicate email or username)
    #[error("{0}")]
    Conflict(String),

    /// Login failed. Unknown email and wrong password intentionally
    /// share this single variant so the caller cannot tell which
    /// emails are registered.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Authorization gate rejection
    #[error("Authentication failed: {0}")]
    Unauthenticated(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            // Clients depend on bad login credentials coming back as
            // 404, not 401.
            AppError::InvalidCredentials | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VAL_001",
            AppError::Conflict(_) => "CONFLICT_001",
            AppError::InvalidCredentials => "AUTH_001",
            AppError::Unauthenticated(_) => "AUTH_002",
            AppError::NotFound(_) => "NF_001",
            AppError::Internal(_) => "INT_001",
            AppError::Io(_) => "IO_001",
            AppError::Json(_) => "JSON_001",
        }
    }

    /// Message suitable for the response body. Internal failure detail
    /// stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Internal(_) | AppError::Io(_) | AppError::Json(_) => {
                "An internal server error occurred".to_string()
            },
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.error_code(), error = %self, "request rejected");
        }

        let body = ErrorBody {
            message: self.public_message(),
            code: status.as_u16(),
            status_text: status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}

// Catch boundary: unknown failures collapse to Internal; already
// structured errors never take this path.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}
