//! Own profile, and account administration.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use mindwell_auth::AuthenticatedUser;
use mindwell_auth::password::{hash_password, verify_password};
use mindwell_core::{Role, UserProfile, validate};
use serde::Deserialize;

use crate::accounts::{self, NewAccount};
use crate::extract::{ValidJson, ValidQuery};
use crate::{ApiError, ApiResult, AppState};

/// `/users*`
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/me", put(update_me))
        .route("/users/me/password", put(change_password))
        .route("/users/{id}", get(get_user).delete(delete_user))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    role: Option<Role>,
}

/// Fields a user may change on their own profile. Absent fields are kept.
#[derive(Debug, Default, Deserialize)]
struct ProfileUpdate {
    name: Option<String>,
    surname: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    bio: Option<String>,
    specialization: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PasswordChange {
    current_password: String,
    new_password: String,
}

async fn update_me(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    ValidJson(update): ValidJson<ProfileUpdate>,
) -> ApiResult<Json<UserProfile>> {
    let _guard = state.locks.users.lock().await;
    let mut user = state.user(&auth.user_id).await?;

    if let Some(name) = update.name {
        user.name = validate::non_blank("name", &name)?;
    }
    if let Some(surname) = update.surname {
        user.surname = validate::non_blank("surname", &surname)?;
    }
    if let Some(email) = update.email {
        let email = validate::email(&email)?;
        if email != user.email && accounts::find_by_email(&state, &email).await?.is_some() {
            return Err(ApiError::conflict(format!(
                "email '{email}' is already registered"
            )));
        }
        user.email = email;
    }
    if update.phone.is_some() {
        user.phone = validate::optional_text(update.phone);
    }
    if update.bio.is_some() {
        user.bio = validate::optional_text(update.bio);
    }
    if update.specialization.is_some() {
        user.specialization = validate::optional_text(update.specialization);
    }
    user.touch();
    state.replace(&user, "User").await?;
    Ok(Json(user.profile()))
}

async fn change_password(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    ValidJson(change): ValidJson<PasswordChange>,
) -> ApiResult<StatusCode> {
    validate::password(&change.new_password)?;
    let password_hash = hash_password(&change.new_password)?;
    let _guard = state.locks.users.lock().await;
    let mut user = state.user(&auth.user_id).await?;
    if !verify_password(&change.current_password, &user.password_hash)? {
        return Err(mindwell_core::Error::validation_field(
            "current_password",
            "does not match",
        )
        .into());
    }
    user.password_hash = password_hash;
    user.touch();
    state.replace(&user, "User").await?;
    tracing::info!(user_id = %user.id, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_users(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    ValidQuery(query): ValidQuery<ListQuery>,
) -> ApiResult<Json<Vec<UserProfile>>> {
    auth.require_admin()?;
    let users = state
        .users()
        .find(|u| query.role.is_none_or(|r| u.role == r))
        .await?;
    Ok(Json(users.iter().map(|u| u.profile()).collect()))
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    ValidJson(account): ValidJson<NewAccount>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    auth.require_admin()?;
    let user = accounts::create_account(&state, account).await?;
    Ok((StatusCode::CREATED, Json(user.profile())))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<Json<UserProfile>> {
    auth.require_admin()?;
    Ok(Json(state.user(&id).await?.profile()))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    auth.require_admin()?;
    if id == auth.user_id {
        return Err(ApiError::bad_request("admins cannot delete their own account"));
    }
    let _guard = state.locks.users.lock().await;
    if !state.users().delete(&id).await? {
        return Err(ApiError::not_found("User"));
    }
    tracing::info!(user_id = %id, by = %auth.user_id, "Account deleted");
    Ok(StatusCode::NO_CONTENT)
}
