//! Server configuration.
//!
//! Loaded from TOML. The file is found through, in order: an explicit path,
//! the `MINDWELL_CONFIG` environment variable, and
//! `<config dir>/mindwell/config.toml`. A missing file yields the defaults.
//! A handful of `MINDWELL_*` variables override individual settings after
//! the file is read.

use std::path::{Path, PathBuf};

use mindwell_core::ClinicHours;
use mindwell_mail::MailProvider;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Project name, used for the config directory and in messages.
pub const PROJECT_NAME: &str = "mindwell";

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "MINDWELL_CONFIG";

/// Secret used when none is configured. The server warns about it on startup.
pub const DEV_JWT_SECRET: &str = "mindwell-dev-secret-change-me";

/// Longest allowed session token lifetime (one year).
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// Longest allowed password-reset token lifetime (one week).
pub const MAX_RESET_TTL_MINUTES: i64 = 7 * 24 * 60;

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MindwellConfig {
    /// Listener settings.
    pub server: ServerConfig,
    /// Storage backend.
    pub database: DatabaseConfig,
    /// Token and password-reset settings.
    pub auth: AuthSettings,
    /// Mail delivery.
    pub mail: MailConfig,
    /// Opening hours used for slot generation.
    pub clinic: ClinicHours,
}

/// `[server]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// `[database]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `memory` or a `sqlite:` URL.
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://mindwell.db".to_string(),
        }
    }
}

/// `[auth]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HS256 signing secret.
    pub jwt_secret: String,
    /// Session token lifetime.
    pub token_ttl_hours: i64,
    /// Password-reset token lifetime.
    pub reset_ttl_minutes: i64,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_hours: 24,
            reset_ttl_minutes: 60,
        }
    }
}

/// `[mail]`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// Delivery backend.
    pub provider: MailProvider,
    /// HTTP endpoint for the `http` provider.
    pub endpoint: Option<String>,
    /// Bearer key for the `http` provider.
    pub api_key: Option<String>,
    /// Sender address.
    pub from: String,
    /// Request timeout for the `http` provider.
    pub timeout_secs: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            provider: MailProvider::Log,
            endpoint: None,
            api_key: None,
            from: "Mindwell <no-reply@mindwell.local>".to_string(),
            timeout_secs: 10,
        }
    }
}

impl MindwellConfig {
    /// Default config file location for this platform.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(PROJECT_NAME).join("config.toml"))
    }

    /// Resolve the config file path: explicit, then `MINDWELL_CONFIG`, then default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var(CONFIG_ENV)
            && !path.is_empty()
        {
            return Some(PathBuf::from(path));
        }
        Self::default_config_path()
    }

    /// Load, apply environment overrides and validate.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        let mut config = match Self::resolve_config_path(explicit) {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                tracing::debug!("No config file at {}, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file without applying overrides.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        toml::from_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Apply `MINDWELL_*` overrides, reading variables through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("MINDWELL_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("MINDWELL_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::config(format!("MINDWELL_PORT is not a port: '{port}'")))?;
        }
        if let Some(url) = lookup("MINDWELL_DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(secret) = lookup("MINDWELL_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(endpoint) = lookup("MINDWELL_MAIL_ENDPOINT") {
            self.mail.endpoint = Some(endpoint);
        }
        if let Some(key) = lookup("MINDWELL_MAIL_API_KEY") {
            self.mail.api_key = Some(key);
        }
        Ok(())
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(Error::config("auth.jwt_secret must not be empty"));
        }
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&self.auth.token_ttl_hours) {
            return Err(Error::config(format!(
                "auth.token_ttl_hours must be between 1 and {MAX_TOKEN_TTL_HOURS}"
            )));
        }
        if !(1..=MAX_RESET_TTL_MINUTES).contains(&self.auth.reset_ttl_minutes) {
            return Err(Error::config(format!(
                "auth.reset_ttl_minutes must be between 1 and {MAX_RESET_TTL_MINUTES}"
            )));
        }
        if self.mail.timeout_secs == 0 {
            return Err(Error::config("mail.timeout_secs must be positive"));
        }
        if self.mail.provider == MailProvider::Http
            && self.mail.endpoint.as_deref().is_none_or(|e| e.trim().is_empty())
        {
            return Err(Error::config(
                "mail.endpoint is required when mail.provider = \"http\"",
            ));
        }
        self.clinic
            .validate()
            .map_err(|e| Error::config(format!("clinic: {}", e.message())))
    }

    /// Whether the built-in development secret is in use.
    pub fn uses_dev_secret(&self) -> bool {
        self.auth.jwt_secret == DEV_JWT_SECRET
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Serialize as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// The settings that have an environment override, as `(name, value)` pairs.
    pub fn to_env_vars(&self) -> Vec<(String, String)> {
        let mut vars = vec![
            ("MINDWELL_HOST".to_string(), self.server.host.clone()),
            ("MINDWELL_PORT".to_string(), self.server.port.to_string()),
            ("MINDWELL_DATABASE_URL".to_string(), self.database.url.clone()),
            ("MINDWELL_JWT_SECRET".to_string(), self.auth.jwt_secret.clone()),
        ];
        if let Some(endpoint) = &self.mail.endpoint {
            vars.push(("MINDWELL_MAIL_ENDPOINT".to_string(), endpoint.clone()));
        }
        if let Some(key) = &self.mail.api_key {
            vars.push(("MINDWELL_MAIL_API_KEY".to_string(), key.clone()));
        }
        vars
    }
}
