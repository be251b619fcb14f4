//! Error types for mindwell-api
//!
//! [`Error`] covers startup (configuration, storage, mail setup). [`ApiError`]
//! is what handlers return; it renders as `{"error": <kind>, "message": <text>}`.

use std::path::PathBuf;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mindwell_auth::AuthError;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for mindwell-api startup operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or starting the server
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error with path context
    #[error("I/O error at {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Error from mindwell-storage
    #[error("Storage error: {0}")]
    Storage(#[from] mindwell_storage::Error),

    /// Error from mindwell-mail
    #[error("Mail error: {0}")]
    Mail(#[from] mindwell_mail::Error),

    /// Error from mindwell-core
    #[error("{0}")]
    Core(#[from] mindwell_core::Error),

    /// Binding or serving failed
    #[error("Server error: {0}")]
    Server(#[source] std::io::Error),
}

impl Error {
    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config(message.into())
    }

    /// Creates an I/O error carrying the path that failed.
    pub fn io_with_path(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable kind.
    pub error: &'static str,
    /// Human-readable explanation.
    pub message: String,
}

/// Handler error, rendered as a JSON response.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 400: invalid input.
    #[error("Bad request: {0}")]
    BadRequest(String),
    /// 401: missing or invalid credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// 403: authenticated, but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// 404: no such resource.
    #[error("{0} not found")]
    NotFound(String),
    /// 409: duplicate or state conflict.
    #[error("Conflict: {0}")]
    Conflict(String),
    /// 500: everything else.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience alias for handler results.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// 400 with `message`.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// 403 with `message`.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// 404 for `resource`, e.g. `not_found("Appointment")`.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    /// 409 with `message`.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// 500 with `message`.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status and error kind.
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    fn message(self) -> String {
        match self {
            ApiError::NotFound(resource) => format!("{resource} not found"),
            ApiError::BadRequest(m)
            | ApiError::Unauthorized(m)
            | ApiError::Forbidden(m)
            | ApiError::Conflict(m)
            | ApiError::Internal(m) => m,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = self.status();
        if status.is_server_error() {
            tracing::error!("{self}");
        } else {
            tracing::debug!("{self}");
        }
        let body = ErrorResponse {
            error,
            message: self.message(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<mindwell_core::Error> for ApiError {
    fn from(err: mindwell_core::Error) -> Self {
        match err {
            mindwell_core::Error::InvalidTransition { .. } => Self::Conflict(err.message()),
            mindwell_core::Error::Forbidden(message) => Self::Forbidden(message),
            other => Self::BadRequest(other.message()),
        }
    }
}

impl From<mindwell_storage::Error> for ApiError {
    fn from(err: mindwell_storage::Error) -> Self {
        match err {
            mindwell_storage::Error::Duplicate { .. } => Self::Conflict(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err.status() {
            StatusCode::FORBIDDEN => Self::Forbidden(err.to_string()),
            StatusCode::UNAUTHORIZED => Self::Unauthorized(err.to_string()),
            _ => Self::Internal(err.to_string()),
        }
    }
}
