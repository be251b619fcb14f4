//! # mindwell-api
//!
//! HTTP API server for the Mindwell clinic platform.
//!
//! This crate provides:
//! - [`MindwellConfig`]: TOML configuration with environment overrides
//! - [`AppState`]: shared store, mailer, token keys and clinic hours
//! - [`routes::router`]: every REST endpoint, behind optional bearer auth
//! - [`ApiError`]: mapping of domain, storage and auth failures to HTTP
//! - [`Server`]: listener setup and graceful shutdown

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod accounts;
pub mod config;
pub mod error;
pub mod extract;
pub mod notify;
pub mod routes;
pub mod server;
pub mod state;

pub use config::MindwellConfig;
pub use error::{ApiError, ApiResult, Error, Result};
pub use server::Server;
pub use state::AppState;
