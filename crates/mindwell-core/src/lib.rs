//! Mindwell Core: domain models, validation, scheduling and scoring.
//!
//! This crate provides the foundational types used across all Mindwell crates.
//! It has no internal Mindwell dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`model`]: Stored documents (users, appointments, tests, ...)
//! - [`schedule`]: Clinic hours and one-hour slot generation
//! - [`scoring`]: Test submission scoring and outcome lookup
//! - [`validate`]: Field-level input checks
//! - [`util`]: Slug helpers

#![doc = include_str!("../README.md")]

pub mod error;
pub mod model;
pub mod schedule;
pub mod scoring;
pub mod util;
pub mod validate;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use model::{
    Actor, Answer, Appointment, AppointmentStatus, BlogPost, Category, Document, Outcome,
    Question, Role, SubmittedAnswer, Test, TestHistory, User, UserProfile,
};
pub use schedule::{ClinicHours, Slot};
pub use util::ids::{slugify, unique_slug};
