//! Authenticated user identity and extraction helpers.

use axum::extract::FromRequestParts;
use http::request::Parts;
use mindwell_core::{Actor, Role};

use crate::AuthError;

/// An authenticated user identity, extracted from a validated token.
///
/// Stored in HTTP request extensions by the auth middleware. Handlers take it
/// as an extractor; requests without one are rejected with 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Id of the user document (the token's `sub` claim).
    pub user_id: String,
    /// The user's email address.
    pub email: String,
    /// Role at the time the token was issued.
    pub role: Role,
}

impl AuthenticatedUser {
    /// The user as an actor in appointment transitions.
    pub fn actor(&self) -> Actor<'_> {
        Actor::new(&self.user_id, self.role)
    }

    /// Whether the user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fail with 403 unless the user has `role`. Admins pass every check.
    pub fn require_role(&self, role: Role) -> Result<(), AuthError> {
        if self.role == role || self.is_admin() {
            Ok(())
        } else {
            Err(AuthError::Forbidden(format!("requires the {role} role")))
        }
    }

    /// Fail with 403 unless the user is a psychologist or an admin.
    pub fn require_staff(&self) -> Result<(), AuthError> {
        if self.role.is_staff() {
            Ok(())
        } else {
            Err(AuthError::Forbidden("requires a staff role".to_string()))
        }
    }

    /// Fail with 403 unless the user is an admin.
    pub fn require_admin(&self) -> Result<(), AuthError> {
        self.require_role(Role::Admin)
    }
}

/// Extract the `AuthenticatedUser` from HTTP request `Parts`, if present.
pub fn user_from_parts(parts: &Parts) -> Option<&AuthenticatedUser> {
    parts.extensions.get::<AuthenticatedUser>()
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_from_parts(parts).cloned().ok_or(AuthError::MissingToken)
    }
}
