//! Fire-and-log email delivery.

use mindwell_core::User;
use mindwell_mail::{Email, EmailTemplate};

use crate::AppState;

/// Render and send `template` to `to`. Delivery failures are logged, never returned.
pub async fn send(state: &AppState, to: &User, template: EmailTemplate) {
    let email = Email::render(&to.email, &template, &state.clinic);
    match state.mailer.send(&email).await {
        Ok(()) => tracing::debug!(template = %email.template, to = %email.to, "Email sent"),
        Err(e) => tracing::warn!(
            template = %email.template,
            to = %email.to,
            mailer = state.mailer.name(),
            "Email delivery failed: {e}"
        ),
    }
}
