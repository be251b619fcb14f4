//! Stored documents.
//!
//! Every entity is a serde struct with a string id that lives in a named
//! collection of the document store. The [`Document`] trait ties the two
//! together so storage can stay generic.

mod appointment;
mod blog;
mod category;
mod history;
mod question;
mod user;

pub use appointment::{Actor, Appointment, AppointmentStatus, Cancellation, RescheduleRequest};
pub use blog::BlogPost;
pub use category::Category;
pub use history::{SubmittedAnswer, TestHistory};
pub use question::{Answer, MAX_POINTS, MAX_POSITION, Question};
pub use test::{Outcome, Test};
pub use user::{Role, User, UserProfile};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A value persisted in a named collection of the document store.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection the documents of this type are stored in.
    const COLLECTION: &'static str;

    /// Unique id of this document inside its collection.
    fn id(&self) -> &str;
}

/// Generate a fresh document id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
