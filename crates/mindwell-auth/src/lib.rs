//! Authentication primitives for Mindwell.
//!
//! Provides:
//! - [`AuthenticatedUser`]: identity extracted from a validated token
//! - [`TokenValidator`]: trait for async token validation
//! - [`JwtKeys`]: HS256 token issuing and validation
//! - [`AuthLayer`] / [`AuthService`]: Tower middleware parameterised over `TokenValidator`
//! - [`AuthConfig`]: configuration for the auth layer
//! - [`AuthError`]: auth-specific error types
//! - [`password`]: password hashing and reset tokens

mod error;
mod jwt;
mod middleware;
pub mod password;
mod user;

pub use error::AuthError;
pub use jwt::{Claims, JwtKeys};
pub use middleware::{AuthLayer, AuthService};
pub use user::{AuthenticatedUser, user_from_parts};

/// Configuration for the auth middleware.
///
/// The default requires a bearer token on every request.
#[derive(Clone, Debug, Default)]
pub struct AuthConfig {
    /// When true, requests without a bearer token pass through anonymously;
    /// a token that is present must still be valid.
    pub optional: bool,
}

impl AuthConfig {
    /// Let anonymous requests through to handlers that decide for
    /// themselves whether a user is required.
    pub fn optional() -> Self {
        Self { optional: true }
    }
}

/// Trait for validating tokens and extracting user identity.
///
/// The middleware calls `validate()` with the bearer token and stores the
/// authenticated user in the request extensions on success.
pub trait TokenValidator: Send + Sync + 'static {
    /// Validate a token and return the authenticated user.
    fn validate(
        &self,
        token: &str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<AuthenticatedUser, AuthError>> + Send + '_>,
    >;
}
