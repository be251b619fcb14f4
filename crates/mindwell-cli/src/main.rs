//! Mindwell CLI
//!
//! Runs the API server and handles configuration and account administration.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use mindwell_cli::config_handlers::handle_config_command;
use mindwell_cli::{Args, Command, commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,mindwell=debug".into()),
        )
        .init();

    let args = Args::parse();
    let config = args.config.as_deref();

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => commands::serve(config).await,
        Command::Config { action } => Ok(handle_config_command(config, action)?),
        Command::User { action } => commands::handle_user_command(config, action).await,
    }
}
