use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Document, Role, new_id};
use crate::schedule::slot_length;
use crate::{Error, Result, validate};

/// Lifecycle of an appointment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Booked by the patient, waiting for the psychologist.
    Pending,
    /// Accepted by the psychologist.
    Confirmed,
    /// One party proposed a new time; the other has to answer.
    RescheduleRequested,
    /// Called off by either party. Terminal.
    Cancelled,
    /// Took place. Terminal.
    Completed,
}

impl AppointmentStatus {
    /// Stable string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::RescheduleRequested => "reschedule_requested",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Whether the appointment still occupies its slot.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            Self::Pending | Self::Confirmed | Self::RescheduleRequested
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "reschedule_requested" => Ok(Self::RescheduleRequested),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            other => Err(Error::validation_field(
                "status",
                format!("unknown status '{other}'"),
            )),
        }
    }
}

/// Who cancelled and why.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cancellation {
    /// User id of the canceller.
    pub by: String,
    /// Free-text reason.
    pub reason: Option<String>,
    /// When it was cancelled.
    pub at: DateTime<Utc>,
}

/// An outstanding proposal to move an appointment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RescheduleRequest {
    /// Proposed new start.
    pub proposed_start: DateTime<Utc>,
    /// User id of the party that asked.
    pub requested_by: String,
    /// Status to return to if the proposal is declined.
    pub previous_status: AppointmentStatus,
    /// When the proposal was made.
    pub requested_at: DateTime<Utc>,
}

/// The user acting on an appointment.
#[derive(Clone, Copy, Debug)]
pub struct Actor<'a> {
    /// User id.
    pub id: &'a str,
    /// Role from the user's token.
    pub role: Role,
}

impl<'a> Actor<'a> {
    /// Create an actor.
    pub fn new(id: &'a str, role: Role) -> Self {
        Self { id, role }
    }
}

/// A one-hour session between a patient and a psychologist.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    /// Document id.
    pub id: String,
    /// Patient user id.
    pub patient_id: String,
    /// Psychologist user id.
    pub psychologist_id: String,
    /// Start instant.
    pub start: DateTime<Utc>,
    /// End instant, one hour after `start`.
    pub end: DateTime<Utc>,
    /// Current status.
    pub status: AppointmentStatus,
    /// Notes left by the patient when booking.
    #[serde(default)]
    pub notes: Option<String>,
    /// Set once cancelled.
    #[serde(default)]
    pub cancellation: Option<Cancellation>,
    /// Set while a reschedule is pending.
    #[serde(default)]
    pub reschedule: Option<RescheduleRequest>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Document for Appointment {
    const COLLECTION: &'static str = "appointments";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Appointment {
    /// A new pending appointment starting at `start`.
    pub fn new(
        patient_id: impl Into<String>,
        psychologist_id: impl Into<String>,
        start: DateTime<Utc>,
        notes: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            patient_id: patient_id.into(),
            psychologist_id: psychologist_id.into(),
            start,
            end: start + slot_length(),
            status: AppointmentStatus::Pending,
            notes: validate::optional_text(notes),
            cancellation: None,
            reschedule: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `user_id` is the patient or the psychologist.
    pub fn is_participant(&self, user_id: &str) -> bool {
        self.patient_id == user_id || self.psychologist_id == user_id
    }

    /// Whether the actor may see this appointment.
    pub fn visible_to(&self, actor: Actor<'_>) -> bool {
        actor.role == Role::Admin || self.is_participant(actor.id)
    }

    /// The other participant, from `user_id`'s point of view.
    pub fn counterpart_of(&self, user_id: &str) -> &str {
        if self.patient_id == user_id {
            &self.psychologist_id
        } else {
            &self.patient_id
        }
    }

    /// Instants this appointment keeps from being booked again.
    pub fn blocked_starts(&self) -> Vec<DateTime<Utc>> {
        if !self.status.is_active() {
            return Vec::new();
        }
        let mut starts = vec![self.start];
        if let Some(request) = &self.reschedule {
            starts.push(request.proposed_start);
        }
        starts
    }

    /// Psychologist accepts a pending booking.
    pub fn confirm(&mut self, actor: Actor<'_>) -> Result<()> {
        if actor.id != self.psychologist_id {
            return Err(Error::forbidden(
                "only the appointment's psychologist may confirm it",
            ));
        }
        self.require(&[AppointmentStatus::Pending], "confirm")?;
        self.status = AppointmentStatus::Confirmed;
        self.touch();
        Ok(())
    }

    /// Either participant, or an admin, calls the appointment off.
    pub fn cancel(&mut self, actor: Actor<'_>, reason: Option<String>) -> Result<()> {
        if actor.role != Role::Admin && !self.is_participant(actor.id) {
            return Err(Error::forbidden("not a participant of this appointment"));
        }
        self.require(
            &[
                AppointmentStatus::Pending,
                AppointmentStatus::Confirmed,
                AppointmentStatus::RescheduleRequested,
            ],
            "cancel",
        )?;
        let now = Utc::now();
        self.status = AppointmentStatus::Cancelled;
        self.reschedule = None;
        self.cancellation = Some(Cancellation {
            by: actor.id.to_string(),
            reason: validate::optional_text(reason),
            at: now,
        });
        self.updated_at = now;
        Ok(())
    }

    /// Psychologist marks a confirmed appointment as held.
    pub fn complete(&mut self, actor: Actor<'_>, now: DateTime<Utc>) -> Result<()> {
        if actor.id != self.psychologist_id {
            return Err(Error::forbidden(
                "only the appointment's psychologist may complete it",
            ));
        }
        self.require(&[AppointmentStatus::Confirmed], "complete")?;
        if now < self.start {
            return Err(Error::validation(
                "an appointment cannot be completed before it starts",
            ));
        }
        self.status = AppointmentStatus::Completed;
        self.touch();
        Ok(())
    }

    /// A participant proposes a new start time.
    ///
    /// Slot validity and availability are checked by the caller.
    pub fn request_reschedule(
        &mut self,
        actor: Actor<'_>,
        proposed_start: DateTime<Utc>,
    ) -> Result<()> {
        if !self.is_participant(actor.id) {
            return Err(Error::forbidden("not a participant of this appointment"));
        }
        self.require(
            &[AppointmentStatus::Pending, AppointmentStatus::Confirmed],
            "reschedule",
        )?;
        if proposed_start == self.start {
            return Err(Error::validation_field(
                "proposed_start",
                "is the current start time",
            ));
        }
        let now = Utc::now();
        self.reschedule = Some(RescheduleRequest {
            proposed_start,
            requested_by: actor.id.to_string(),
            previous_status: self.status,
            requested_at: now,
        });
        self.status = AppointmentStatus::RescheduleRequested;
        self.updated_at = now;
        Ok(())
    }

    /// The other participant accepts the proposed time.
    pub fn accept_reschedule(&mut self, actor: Actor<'_>) -> Result<()> {
        let request = self.answerable_request(actor, "accept a reschedule for")?;
        self.start = request.proposed_start;
        self.end = request.proposed_start + slot_length();
        self.status = AppointmentStatus::Confirmed;
        self.reschedule = None;
        self.touch();
        Ok(())
    }

    /// The other participant declines; the previous status comes back.
    pub fn decline_reschedule(&mut self, actor: Actor<'_>) -> Result<()> {
        let request = self.answerable_request(actor, "decline a reschedule for")?;
        self.status = request.previous_status;
        self.reschedule = None;
        self.touch();
        Ok(())
    }

    fn answerable_request(
        &self,
        actor: Actor<'_>,
        action: &'static str,
    ) -> Result<RescheduleRequest> {
        if !self.is_participant(actor.id) {
            return Err(Error::forbidden("not a participant of this appointment"));
        }
        self.require(&[AppointmentStatus::RescheduleRequested], action)?;
        let request = self
            .reschedule
            .clone()
            .ok_or(Error::InvalidTransition {
                status: self.status,
                action,
            })?;
        if request.requested_by == actor.id {
            return Err(Error::forbidden(
                "the reschedule must be answered by the other participant",
            ));
        }
        Ok(request)
    }

    fn require(&self, allowed: &[AppointmentStatus], action: &'static str) -> Result<()> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(Error::InvalidTransition {
                status: self.status,
                action,
            })
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
