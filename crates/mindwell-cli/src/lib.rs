//! # mindwell-cli
//!
//! Command-line entry point for Mindwell:
//! - `serve`: run the HTTP API
//! - `config`: inspect and edit the TOML configuration
//! - `user create-admin`: bootstrap the first administrator

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config_handlers;

pub use cli::{Args, Command, ConfigAction, UserAction};
