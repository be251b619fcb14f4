//! Auth-specific error types.

use axum::response::{IntoResponse, Response};
use http::StatusCode;

/// Errors that can occur during authentication.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header or bearer token present.
    #[error("missing authentication token")]
    MissingToken,

    /// Token format is invalid (not a valid JWT).
    #[error("invalid token format: {0}")]
    InvalidFormat(String),

    /// JWT signature verification failed.
    #[error("invalid token signature")]
    InvalidSignature,

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Token carries claims this service does not understand.
    #[error("invalid token claims: {0}")]
    InvalidClaims(String),

    /// Email or password did not match.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The user is authenticated but lacks the required role.
    #[error("{0}")]
    Forbidden(String),

    /// Signing a token failed.
    #[error("failed to issue token: {0}")]
    Signing(String),

    /// Hashing a password failed.
    #[error("failed to hash password: {0}")]
    Hashing(String),

    /// A stored password hash could not be parsed.
    #[error("malformed password hash")]
    MalformedHash,
}

impl AuthError {
    /// Whether this error should result in a 4xx (vs. a 500).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken
                | AuthError::InvalidFormat(_)
                | AuthError::InvalidSignature
                | AuthError::Expired
                | AuthError::InvalidClaims(_)
                | AuthError::InvalidCredentials
                | AuthError::Forbidden(_)
        )
    }

    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            e if e.is_client_error() => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable kind, used as the `error` field of responses.
    pub fn kind(&self) -> &'static str {
        match self.status() {
            StatusCode::FORBIDDEN => "forbidden",
            StatusCode::UNAUTHORIZED => "unauthorized",
            _ => "internal_error",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("Authentication error: {self}");
        }
        let body = serde_json::json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        let mut response = (status, axum::Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                http::header::WWW_AUTHENTICATE,
                http::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}
