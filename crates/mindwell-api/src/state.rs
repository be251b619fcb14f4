//! Shared application state.

use std::sync::Arc;

use chrono::Duration;
use mindwell_auth::JwtKeys;
use mindwell_core::{
    Appointment, BlogPost, Category, ClinicHours, Document, Question, Test, TestHistory, User,
};
use mindwell_mail::{HttpMailer, LogMailer, MailProvider, Mailer};
use mindwell_storage::{DocumentStore, Repository};
use tokio::sync::Mutex;

use crate::config::MindwellConfig;
use crate::{ApiError, ApiResult, Result};

/// Serializes check-then-write sequences that must not interleave.
#[derive(Debug, Default)]
pub struct WriteLocks {
    /// Email uniqueness on account creation and email changes.
    pub users: Mutex<()>,
    /// Slot conflicts on booking and rescheduling.
    pub bookings: Mutex<()>,
    /// Blog slug uniqueness.
    pub slugs: Mutex<()>,
    /// Category name uniqueness.
    pub categories: Mutex<()>,
}

/// Everything a handler needs, shared behind an `Arc`.
pub struct AppState {
    /// Document store backing every repository.
    pub store: Arc<dyn DocumentStore>,
    /// Outgoing mail.
    pub mailer: Arc<dyn Mailer>,
    /// Session token keys.
    pub jwt: Arc<JwtKeys>,
    /// Opening hours.
    pub clinic: ClinicHours,
    /// Password-reset token lifetime.
    pub reset_ttl: Duration,
    /// See [`WriteLocks`].
    pub locks: WriteLocks,
}

impl AppState {
    /// Assemble state from its parts.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        mailer: Arc<dyn Mailer>,
        jwt: JwtKeys,
        clinic: ClinicHours,
        reset_ttl: Duration,
    ) -> Self {
        Self {
            store,
            mailer,
            jwt: Arc::new(jwt),
            clinic,
            reset_ttl,
            locks: WriteLocks::default(),
        }
    }

    /// Build state from configuration: opens the store and the mailer.
    pub async fn from_config(config: &MindwellConfig) -> Result<Self> {
        config.validate()?;
        let store = mindwell_storage::open(&config.database.url).await?;
        let mailer = build_mailer(config)?;
        tracing::info!(
            storage = store.backend(),
            mailer = mailer.name(),
            timezone = %config.clinic.timezone,
            "Application state ready"
        );
        Ok(Self::new(
            store,
            mailer,
            JwtKeys::new(
                config.auth.jwt_secret.as_bytes(),
                Duration::hours(config.auth.token_ttl_hours),
            ),
            config.clinic.clone(),
            Duration::minutes(config.auth.reset_ttl_minutes),
        ))
    }

    /// Typed repository for any document type.
    pub fn repo<T: Document>(&self) -> Repository<T> {
        Repository::new(self.store.clone())
    }

    /// Users.
    pub fn users(&self) -> Repository<User> {
        self.repo()
    }

    /// Appointments.
    pub fn appointments(&self) -> Repository<Appointment> {
        self.repo()
    }

    /// Categories.
    pub fn categories(&self) -> Repository<Category> {
        self.repo()
    }

    /// Tests.
    pub fn tests(&self) -> Repository<Test> {
        self.repo()
    }

    /// Questions.
    pub fn questions(&self) -> Repository<Question> {
        self.repo()
    }

    /// Test history.
    pub fn history(&self) -> Repository<TestHistory> {
        self.repo()
    }

    /// Blog posts.
    pub fn posts(&self) -> Repository<BlogPost> {
        self.repo()
    }

    /// Write back a loaded document; 404 when it was deleted in the meantime.
    pub async fn replace<T: Document>(&self, doc: &T, resource: &str) -> ApiResult<()> {
        if !self.repo::<T>().update(doc).await? {
            return Err(ApiError::not_found(resource));
        }
        Ok(())
    }

    /// Load a user or fail with 404.
    pub async fn user(&self, id: &str) -> ApiResult<User> {
        self.users()
            .get(id)
            .await?
            .ok_or_else(|| ApiError::not_found("User"))
    }
}

fn build_mailer(config: &MindwellConfig) -> Result<Arc<dyn Mailer>> {
    Ok(match config.mail.provider {
        MailProvider::Log => Arc::new(LogMailer),
        MailProvider::Http => Arc::new(HttpMailer::new(
            config.mail.endpoint.as_deref().unwrap_or_default(),
            config.mail.api_key.clone(),
            &config.mail.from,
            std::time::Duration::from_secs(config.mail.timeout_secs),
        )?),
    })
}
