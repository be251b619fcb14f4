//! Argument definitions.

use clap::{Parser, Subcommand};

/// Mindwell - psychology clinic platform
#[derive(Parser, Debug)]
#[command(name = "mindwell")]
#[command(about = "Mindwell clinic platform server and administration tool", long_about = None)]
#[command(version)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, env = "MINDWELL_CONFIG", global = true)]
    pub config: Option<String>,

    /// Subcommand; `serve` when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API server
    Serve,
    /// Configuration file operations
    Config {
        /// What to do with the configuration
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Account administration
    User {
        /// What to do with accounts
        #[command(subcommand)]
        action: UserAction,
    },
}

/// `mindwell config ...`
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the resolved config file path
    Path,
    /// Print a value by dotted key, e.g. `server.port`
    Get {
        /// Dotted key
        key: String,
    },
    /// Set a value by dotted key in the config file
    Set {
        /// Dotted key
        key: String,
        /// New value; booleans and numbers are detected
        value: String,
    },
    /// Write a default config file
    Init {
        /// Where to write it (defaults to the platform config dir)
        #[arg(long)]
        file: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the settings that have environment overrides
    Export {
        /// Format as `--env KEY=VALUE` for `docker run`
        #[arg(long)]
        docker_env: bool,
    },
}

/// `mindwell user ...`
#[derive(Subcommand, Debug)]
pub enum UserAction {
    /// Create an administrator account
    CreateAdmin {
        /// Login email
        #[arg(long)]
        email: String,
        /// Given name
        #[arg(long)]
        name: String,
        /// Family name
        #[arg(long)]
        surname: String,
        /// Password (at least 8 characters)
        #[arg(long, env = "MINDWELL_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
}
