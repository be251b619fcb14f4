//! # mindwell-storage
//!
//! Storage backend implementations for Mindwell.
//!
//! This crate provides:
//! - The [`DocumentStore`] abstraction: JSON documents in named collections
//! - [`SqliteStore`]: SQLite-backed store (via sqlx)
//! - [`MemoryStore`]: in-memory store (for tests and local development)
//! - [`Repository`]: typed access to one collection of a [`Document`] type
//!
//! [`Document`]: mindwell_core::Document

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod database;
pub mod error;
pub mod memory;
pub mod repository;
pub mod traits;

pub use database::SqliteStore;
pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use repository::Repository;
pub use traits::DocumentStore;

use std::sync::Arc;

/// Open the store named by `url`.
///
/// `"memory"` gives a fresh [`MemoryStore`]; anything else is handed to
/// [`SqliteStore::connect`].
pub async fn open(url: &str) -> Result<Arc<dyn DocumentStore>> {
    if url == "memory" {
        log::info!("Using in-memory document store");
        return Ok(Arc::new(MemoryStore::new()));
    }
    log::info!("Opening SQLite document store at {url}");
    Ok(Arc::new(SqliteStore::connect(url).await?))
}
