//! HTTP routes.
//!
//! Every route sits behind the bearer-token layer in optional mode: requests
//! without a token reach the handler anonymously and an invalid token is
//! rejected with 401. Handlers that need a user take [`AuthenticatedUser`]
//! as an extractor, which rejects anonymous requests.
//!
//! [`AuthenticatedUser`]: mindwell_auth::AuthenticatedUser

pub mod appointments;
pub mod auth;
pub mod blog;
pub mod categories;
pub mod health;
pub mod history;
pub mod psychologists;
pub mod questions;
pub mod users;

use std::sync::Arc;

use axum::Router;
use mindwell_auth::{AuthConfig, AuthLayer};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the complete API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(users::router())
        .merge(psychologists::router())
        .merge(appointments::router())
        .merge(categories::router())
        .merge(tests::router())
        .merge(questions::router())
        .merge(history::router())
        .merge(blog::router())
        .layer(AuthLayer::new(state.jwt.clone(), AuthConfig::optional()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
