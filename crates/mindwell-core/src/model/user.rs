use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Document, new_id};
use crate::{Error, Result, validate};

/// Account role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Books appointments and takes tests.
    Patient,
    /// Receives appointments, authors tests and blog posts.
    Psychologist,
    /// Manages accounts and categories; can do anything staff can.
    Admin,
}

impl Role {
    /// Stable string form, as used on the wire and in tokens.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Psychologist => "psychologist",
            Role::Admin => "admin",
        }
    }

    /// Psychologists and admins.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Psychologist | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "patient" => Ok(Role::Patient),
            "psychologist" => Ok(Role::Psychologist),
            "admin" => Ok(Role::Admin),
            other => Err(Error::validation_field(
                "role",
                format!("unknown role '{other}'"),
            )),
        }
    }
}

/// A registered account.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Document id.
    pub id: String,
    /// Given name.
    pub name: String,
    /// Family name.
    pub surname: String,
    /// Login email, trimmed and lower-cased. Unique across users.
    pub email: String,
    /// Encoded password hash (see `mindwell-auth`).
    pub password_hash: String,
    /// Account role.
    pub role: Role,
    /// Contact phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Public biography (psychologists).
    #[serde(default)]
    pub bio: Option<String>,
    /// Area of practice (psychologists).
    #[serde(default)]
    pub specialization: Option<String>,
    /// Hash of the outstanding password-reset token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_token_hash: Option<String>,
    /// When the outstanding password-reset token stops being valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_expires_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Document for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> &str {
        &self.id
    }
}

impl User {
    /// Create a validated user. The email is normalized.
    pub fn new(
        name: &str,
        surname: &str,
        email: &str,
        password_hash: impl Into<String>,
        role: Role,
    ) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: new_id(),
            name: validate::non_blank("name", name)?,
            surname: validate::non_blank("surname", surname)?,
            email: validate::email(email)?,
            password_hash: password_hash.into(),
            role,
            phone: None,
            bio: None,
            specialization: None,
            reset_token_hash: None,
            reset_expires_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// "Name Surname".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }

    /// Public view without credentials.
    pub fn profile(&self) -> UserProfile {
        UserProfile::from(self)
    }

    /// Bump `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Record a password-reset token hash that expires at `expires_at`.
    pub fn set_reset_token(&mut self, token_hash: String, expires_at: DateTime<Utc>) {
        self.reset_token_hash = Some(token_hash);
        self.reset_expires_at = Some(expires_at);
        self.touch();
    }

    /// Forget any outstanding password-reset token.
    pub fn clear_reset_token(&mut self) {
        self.reset_token_hash = None;
        self.reset_expires_at = None;
        self.touch();
    }

    /// Whether `token_hash` matches an unexpired reset token.
    pub fn reset_token_matches(&self, token_hash: &str, now: DateTime<Utc>) -> bool {
        match (&self.reset_token_hash, self.reset_expires_at) {
            (Some(stored), Some(expires_at)) => stored == token_hash && now < expires_at,
            _ => false,
        }
    }
}

/// A user as shown to API clients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Document id.
    pub id: String,
    /// Given name.
    pub name: String,
    /// Family name.
    pub surname: String,
    /// Login email.
    pub email: String,
    /// Account role.
    pub role: Role,
    /// Contact phone number.
    pub phone: Option<String>,
    /// Public biography.
    pub bio: Option<String>,
    /// Area of practice.
    pub specialization: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            surname: user.surname.clone(),
            email: user.email.clone(),
            role: user.role,
            phone: user.phone.clone(),
            bio: user.bio.clone(),
            specialization: user.specialization.clone(),
            created_at: user.created_at,
        }
    }
}
