//! Error types for mindwell-core

use thiserror::Error;

use crate::model::AppointmentStatus;

/// Result type alias for mindwell-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by domain rules.
///
/// Storage and transport failures live in their own crates; everything here
/// is caused by the caller's input or by the current state of a document.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Input failed validation
    #[error("Validation error: {message}")]
    Validation {
        /// Field that failed validation, if a single one is to blame
        field: Option<String>,
        /// What went wrong
        message: String,
    },

    /// The requested action is not possible from the current appointment status
    #[error("Cannot {action} an appointment that is {status}")]
    InvalidTransition {
        /// Status the appointment is currently in
        status: AppointmentStatus,
        /// Action that was attempted
        action: &'static str,
    },

    /// The actor is not allowed to perform the action
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl Error {
    /// Creates a new validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Error::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Creates a new validation error with a field name.
    pub fn validation_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Creates a new forbidden error.
    pub fn forbidden<S: Into<String>>(message: S) -> Self {
        Error::Forbidden(message.into())
    }

    /// Returns the human-readable message without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            Error::Validation {
                field: Some(field),
                message,
            } => format!("{field}: {message}"),
            Error::Validation {
                field: None,
                message,
            } => message.clone(),
            Error::InvalidTransition { .. } => self.to_string(),
            Error::Forbidden(message) => message.clone(),
        }
    }
}
