//! Notification templates.
//!
//! Times are rendered in the clinic's timezone via [`ClinicHours::format`].

use chrono::{DateTime, Utc};
use mindwell_core::ClinicHours;
use serde::{Deserialize, Serialize};

/// Every notification the platform sends.
///
/// `name` is always the recipient's first name.
#[derive(Clone, Debug, PartialEq)]
pub enum EmailTemplate {
    /// Sent after registration.
    Welcome {
        /// Recipient first name.
        name: String,
    },
    /// Carries a password-reset token.
    PasswordReset {
        /// Recipient first name.
        name: String,
        /// Plain reset token.
        token: String,
        /// Minutes until the token expires.
        valid_minutes: i64,
    },
    /// To the patient, after booking.
    AppointmentRequested {
        /// Recipient first name.
        name: String,
        /// Psychologist's full name.
        psychologist: String,
        /// Requested start.
        start: DateTime<Utc>,
    },
    /// To the psychologist, after a patient books.
    AppointmentReceived {
        /// Recipient first name.
        name: String,
        /// Patient's full name.
        patient: String,
        /// Requested start.
        start: DateTime<Utc>,
    },
    /// To the patient, once the psychologist confirms.
    AppointmentConfirmed {
        /// Recipient first name.
        name: String,
        /// Psychologist's full name.
        psychologist: String,
        /// Confirmed start.
        start: DateTime<Utc>,
    },
    /// To the other participant when an appointment is cancelled.
    AppointmentCancelled {
        /// Recipient first name.
        name: String,
        /// Full name of whoever cancelled.
        cancelled_by: String,
        /// Start of the cancelled appointment.
        start: DateTime<Utc>,
        /// Optional reason.
        reason: Option<String>,
    },
    /// To the other participant when a new time is proposed.
    RescheduleRequested {
        /// Recipient first name.
        name: String,
        /// Full name of whoever asked.
        requested_by: String,
        /// Current start.
        current_start: DateTime<Utc>,
        /// Proposed start.
        proposed_start: DateTime<Utc>,
    },
    /// To the requester when the new time is accepted.
    RescheduleAccepted {
        /// Recipient first name.
        name: String,
        /// Full name of whoever accepted.
        accepted_by: String,
        /// New start.
        start: DateTime<Utc>,
    },
    /// To the requester when the new time is declined.
    RescheduleDeclined {
        /// Recipient first name.
        name: String,
        /// Full name of whoever declined.
        declined_by: String,
        /// Start that stays in place.
        start: DateTime<Utc>,
    },
    /// To the user after submitting a test.
    TestCompleted {
        /// Recipient first name.
        name: String,
        /// Test title.
        test_title: String,
        /// Total score.
        score: i32,
        /// Matched outcome title, if any bucket matched.
        outcome: Option<String>,
    },
}

impl EmailTemplate {
    /// Stable template name.
    pub fn kind(&self) -> &'static str {
        match self {
            EmailTemplate::Welcome { .. } => "welcome",
            EmailTemplate::PasswordReset { .. } => "password_reset",
            EmailTemplate::AppointmentRequested { .. } => "appointment_requested",
            EmailTemplate::AppointmentReceived { .. } => "appointment_received",
            EmailTemplate::AppointmentConfirmed { .. } => "appointment_confirmed",
            EmailTemplate::AppointmentCancelled { .. } => "appointment_cancelled",
            EmailTemplate::RescheduleRequested { .. } => "reschedule_requested",
            EmailTemplate::RescheduleAccepted { .. } => "reschedule_accepted",
            EmailTemplate::RescheduleDeclined { .. } => "reschedule_declined",
            EmailTemplate::TestCompleted { .. } => "test_completed",
        }
    }

    /// Render `(subject, body)`.
    pub fn render(&self, hours: &ClinicHours) -> (String, String) {
        let at = |instant: &DateTime<Utc>| hours.format(*instant);
        match self {
            EmailTemplate::Welcome { name } => (
                "Welcome to Mindwell".to_string(),
                format!(
                    "Hello {name},\n\nYour Mindwell account is ready. You can now book \
                     appointments with our psychologists and take self-assessment tests."
                ),
            ),
            EmailTemplate::PasswordReset {
                name,
                token,
                valid_minutes,
            } => (
                "Reset your Mindwell password".to_string(),
                format!(
                    "Hello {name},\n\nUse the following code to choose a new password:\n\n    \
                     {token}\n\nThe code expires in {valid_minutes} minutes. If you did not \
                     ask for a reset, ignore this message."
                ),
            ),
            EmailTemplate::AppointmentRequested {
                name,
                psychologist,
                start,
            } => (
                "Appointment requested".to_string(),
                format!(
                    "Hello {name},\n\nYour appointment with {psychologist} on {} has been \
                     requested. You will hear from us once it is confirmed.",
                    at(start)
                ),
            ),
            EmailTemplate::AppointmentReceived {
                name,
                patient,
                start,
            } => (
                "New appointment request".to_string(),
                format!(
                    "Hello {name},\n\n{patient} has requested an appointment on {}. \
                     Please confirm or cancel it.",
                    at(start)
                ),
            ),
            EmailTemplate::AppointmentConfirmed {
                name,
                psychologist,
                start,
            } => (
                "Appointment confirmed".to_string(),
                format!(
                    "Hello {name},\n\n{psychologist} has confirmed your appointment on {}.",
                    at(start)
                ),
            ),
            EmailTemplate::AppointmentCancelled {
                name,
                cancelled_by,
                start,
                reason,
            } => {
                let reason = reason
                    .as_deref()
                    .map(|r| format!("\n\nReason: {r}"))
                    .unwrap_or_default();
                (
                    "Appointment cancelled".to_string(),
                    format!(
                        "Hello {name},\n\n{cancelled_by} has cancelled the appointment on {}.{reason}",
                        at(start)
                    ),
                )
            }
            EmailTemplate::RescheduleRequested {
                name,
                requested_by,
                current_start,
                proposed_start,
            } => (
                "Reschedule requested".to_string(),
                format!(
                    "Hello {name},\n\n{requested_by} would like to move the appointment on {} \
                     to {}. Please accept or decline the new time.",
                    at(current_start),
                    at(proposed_start)
                ),
            ),
            EmailTemplate::RescheduleAccepted {
                name,
                accepted_by,
                start,
            } => (
                "Reschedule accepted".to_string(),
                format!(
                    "Hello {name},\n\n{accepted_by} accepted the new time. Your appointment \
                     is now on {}.",
                    at(start)
                ),
            ),
            EmailTemplate::RescheduleDeclined {
                name,
                declined_by,
                start,
            } => (
                "Reschedule declined".to_string(),
                format!(
                    "Hello {name},\n\n{declined_by} declined the new time. The appointment \
                     stays on {}.",
                    at(start)
                ),
            ),
            EmailTemplate::TestCompleted {
                name,
                test_title,
                score,
                outcome,
            } => {
                let outcome = outcome
                    .as_deref()
                    .map(|o| format!("Result: {o}"))
                    .unwrap_or_else(|| "No result band matched this score.".to_string());
                (
                    format!("Your results for {test_title}"),
                    format!(
                        "Hello {name},\n\nThank you for completing \"{test_title}\".\n\n\
                         Score: {score}\n{outcome}"
                    ),
                )
            }
        }
    }
}

/// A rendered message, ready for delivery.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    /// Recipient address.
    pub to: String,
    /// Template name, see [`EmailTemplate::kind`].
    pub template: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

impl Email {
    /// Render `template` for `to`.
    pub fn render(to: &str, template: &EmailTemplate, hours: &ClinicHours) -> Self {
        let (subject, body) = template.render(hours);
        Self {
            to: to.to_string(),
            template: template.kind().to_string(),
            subject,
            body,
        }
    }
}
