//! Error handling for the bookshelf HTTP layer

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Body of every non-2xx response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable description of the failure
    pub message: String,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {message}")]
    Validation { message: String, code: String },

    #[error("not found: {message}")]
    NotFound { message: String, code: String },

    #[error("bad request: {message}")]
    BadRequest {
        message: String,
        code: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    #[error("timeout: {message}")]
    Timeout { message: String },

    #[error("internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Create a validation error; the message reaches the client verbatim
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: "validation_error".to_string(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            code: "not_found".to_string(),
        }
    }

    /// Create a bad request error whose cause is logged but not returned
    pub fn bad_request_from(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::BadRequest {
            message: message.into(),
            code: "bad_request".to_string(),
            source: Some(source.into()),
        }
    }

    /// Create an error for a request that outlived the server deadline
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Create an internal error; only `message` is returned to the client
    pub fn internal(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            message: message.into(),
            source: source.into(),
        }
    }

    /// HTTP status this error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Timeout { .. } => StatusCode::REQUEST_TIMEOUT,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let status = self.status();

        let (error_code, message, cause) = match self {
            AppError::Validation { message, code } | AppError::NotFound { message, code } => {
                (code, message, None)
            }
            AppError::BadRequest {
                message,
                code,
                source,
            } => (code, message, source),
            AppError::Timeout { message } => ("timeout".to_string(), message, None),
            AppError::Internal { message, source } => {
                ("internal_error".to_string(), message, Some(source))
            }
        };

        match cause {
            Some(cause) => tracing::error!(
                error_id = %error_id,
                error_code = %error_code,
                status_code = %status.as_u16(),
                cause = %format!("{cause:#}"),
                "Request error"
            ),
            None => tracing::warn!(
                error_id = %error_id,
                error_code = %error_code,
                status_code = %status.as_u16(),
                reason = %message,
                "Request rejected"
            ),
        }

        (status, Json(ErrorBody { message })).into_response()
    }
}
