//! Small helpers shared across the crate.
//!
//! # Modules
//!
//! - [`ids`]: Slug computation for human-readable identifiers

pub mod ids;
