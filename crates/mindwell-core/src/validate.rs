//! Field-level input checks shared by the models and the API.

use crate::{Error, Result};

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Require a value that is non-empty after trimming; returns the trimmed value.
pub fn non_blank(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation_field(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Normalize an email address (trim + lowercase) and check its shape.
///
/// Only the shape is checked: one `@`, a non-empty local part, and a domain
/// containing an inner dot.
pub fn email(value: &str) -> Result<String> {
    let normalized = value.trim().to_lowercase();
    let invalid = || Error::validation_field("email", "is not a valid address");

    let (local, domain) = normalized.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || normalized.contains(char::is_whitespace) {
        return Err(invalid());
    }
    let dot = domain.find('.').ok_or_else(invalid)?;
    if dot == 0 || domain.ends_with('.') {
        return Err(invalid());
    }
    Ok(normalized)
}

/// Check a new password against the length rule.
pub fn password(value: &str) -> Result<()> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::validation_field(
            "password",
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

/// Trim an optional free-text field, mapping blank strings to `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
