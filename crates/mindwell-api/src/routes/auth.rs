//! Registration, login and password reset.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use mindwell_auth::password::{hash_password, hash_reset_token, new_reset_token, verify_password};
use mindwell_auth::{AuthError, AuthenticatedUser};
use mindwell_core::{Role, User, UserProfile, validate};
use mindwell_mail::EmailTemplate;
use serde::{Deserialize, Serialize};

use crate::accounts::{self, NewAccount};
use crate::extract::ValidJson;
use crate::{ApiError, ApiResult, AppState, notify};

/// `/auth/*`
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/password/forgot", post(forgot_password))
        .route("/auth/password/reset", post(reset_password))
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    name: String,
    surname: String,
    email: String,
    password: String,
    #[serde(default)]
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct ForgotRequest {
    email: String,
}

#[derive(Debug, Deserialize)]
struct ResetRequest {
    token: String,
    password: String,
}

/// Token plus the user it was issued for.
#[derive(Debug, Serialize)]
pub struct Session {
    /// Bearer token.
    pub token: String,
    /// The logged-in user.
    pub user: UserProfile,
}

fn session(state: &AppState, user: &User) -> ApiResult<Session> {
    Ok(Session {
        token: state.jwt.issue(user)?,
        user: user.profile(),
    })
}

async fn register(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<Session>)> {
    let user = accounts::create_account(
        &state,
        NewAccount {
            name: req.name,
            surname: req.surname,
            email: req.email,
            password: req.password,
            role: Role::Patient,
            phone: req.phone,
            bio: None,
            specialization: None,
        },
    )
    .await?;
    notify::send(
        &state,
        &user,
        EmailTemplate::Welcome {
            name: user.name.clone(),
        },
    )
    .await;
    Ok((StatusCode::CREATED, Json(session(&state, &user)?)))
}

async fn login(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> ApiResult<Json<Session>> {
    let Some(user) = accounts::find_by_email(&state, &req.email).await? else {
        tracing::debug!("Login for unknown email");
        return Err(AuthError::InvalidCredentials.into());
    };
    if !verify_password(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Login with wrong password");
        return Err(AuthError::InvalidCredentials.into());
    }
    Ok(Json(session(&state, &user)?))
}

async fn me(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(state.user(&auth.user_id).await?.profile()))
}

async fn forgot_password(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<ForgotRequest>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    // Same answer whether or not the address is registered.
    let accepted = (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "message": "If the address is registered, a reset code has been sent."
        })),
    );
    let (token, token_hash) = new_reset_token();
    let guard = state.locks.users.lock().await;
    let Some(mut user) = accounts::find_by_email(&state, &req.email).await? else {
        return Ok(accepted);
    };
    user.set_reset_token(token_hash, Utc::now() + state.reset_ttl);
    state.replace(&user, "User").await?;
    drop(guard);
    notify::send(
        &state,
        &user,
        EmailTemplate::PasswordReset {
            name: user.name.clone(),
            token,
            valid_minutes: state.reset_ttl.num_minutes(),
        },
    )
    .await;
    Ok(accepted)
}

async fn reset_password(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<ResetRequest>,
) -> ApiResult<StatusCode> {
    validate::password(&req.password)?;
    let password_hash = hash_password(&req.password)?;
    let token_hash = hash_reset_token(&req.token);
    let now = Utc::now();
    let _guard = state.locks.users.lock().await;
    let user = state
        .users()
        .find_one(|u| u.reset_token_matches(&token_hash, now))
        .await?;
    let Some(mut user) = user else {
        return Err(ApiError::bad_request("invalid or expired reset token"));
    };

    user.password_hash = password_hash;
    user.clear_reset_token();
    state.replace(&user, "User").await?;
    tracing::info!(user_id = %user.id, "Password reset");
    Ok(StatusCode::NO_CONTENT)
}
