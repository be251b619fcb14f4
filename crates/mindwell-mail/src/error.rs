//! Error types for mindwell-mail

use thiserror::Error;

/// Result type alias for mindwell-mail operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while delivering mail
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The mail service answered with a non-success status
    #[error("Mail service rejected message with status {status}: {body}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body, for diagnostics
        body: String,
    },

    /// The mailer is misconfigured
    #[error("Mail configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config(message.into())
    }
}
