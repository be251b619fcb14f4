//! Public psychologist directory and bookable slots.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use mindwell_core::schedule::generate_slots;
use mindwell_core::{Role, Slot, User, UserProfile};
use serde::Deserialize;

use crate::extract::ValidQuery;
use crate::{ApiError, ApiResult, AppState};

/// `/psychologists*`
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/psychologists", get(list))
        .route("/psychologists/{id}", get(get_one))
        .route("/psychologists/{id}/slots", get(slots))
}

#[derive(Debug, Deserialize)]
struct DirectoryQuery {
    specialization: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SlotQuery {
    from: NaiveDate,
    to: NaiveDate,
    #[serde(default)]
    available: bool,
}

/// Load a user that must be a psychologist, or 404.
pub async fn psychologist(state: &AppState, id: &str) -> ApiResult<User> {
    match state.users().get(id).await? {
        Some(user) if user.role == Role::Psychologist => Ok(user),
        _ => Err(ApiError::not_found("Psychologist")),
    }
}

async fn list(
    State(state): State<Arc<AppState>>,
    ValidQuery(query): ValidQuery<DirectoryQuery>,
) -> ApiResult<Json<Vec<UserProfile>>> {
    let wanted = query
        .specialization
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    let mut found = state
        .users()
        .find(|u| {
            u.role == Role::Psychologist
                && wanted.as_ref().is_none_or(|w| {
                    u.specialization
                        .as_ref()
                        .is_some_and(|s| s.to_lowercase().contains(w.as_str()))
                })
        })
        .await?;
    found.sort_by(|a, b| (&a.surname, &a.name).cmp(&(&b.surname, &b.name)));
    Ok(Json(found.iter().map(User::profile).collect()))
}

async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(psychologist(&state, &id).await?.profile()))
}

async fn slots(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidQuery(query): ValidQuery<SlotQuery>,
) -> ApiResult<Json<Vec<Slot>>> {
    psychologist(&state, &id).await?;
    let booked: Vec<_> = state
        .appointments()
        .find(|a| a.psychologist_id == id)
        .await?
        .iter()
        .flat_map(|a| a.blocked_starts())
        .collect();

    let mut slots = generate_slots(&state.clinic, query.from, query.to, &booked, Utc::now())?;
    if query.available {
        slots.retain(|s| s.available);
    }
    Ok(Json(slots))
}
