//! Test submission and results history.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use mindwell_auth::AuthenticatedUser;
use mindwell_core::scoring::{find_outcome, score_submission};
use mindwell_core::{SubmittedAnswer, TestHistory};
use mindwell_mail::EmailTemplate;
use serde::Deserialize;

use crate::extract::ValidJson;
use crate::routes::questions::questions_of;
use crate::routes::tests;
use crate::{ApiError, ApiResult, AppState, notify};

/// `/tests/{id}/submit`, `/history*` and `/users/{id}/history`
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tests/{id}/submit", post(submit))
        .route("/history", get(own_history))
        .route("/history/{id}", get(get_one))
        .route("/users/{id}/history", get(user_history))
}

#[derive(Debug, Deserialize)]
struct Submission {
    #[serde(default)]
    answers: Vec<SubmittedAnswer>,
}

async fn submit(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(test_id): Path<String>,
    ValidJson(submission): ValidJson<Submission>,
) -> ApiResult<(StatusCode, Json<TestHistory>)> {
    let user = state.user(&auth.user_id).await?;
    let test = tests::load(&state, &test_id).await?;
    let questions = questions_of(&state, &test.id).await?;
    let score = score_submission(&questions, &submission.answers)?;
    let outcome = find_outcome(&test.outcomes, score).cloned();
    if outcome.is_none() {
        tracing::warn!(test_id = %test.id, score, "Score matches no outcome bucket");
    }

    let entry = TestHistory::record(&auth.user_id, &test, submission.answers, score, outcome);
    state.history().insert(&entry).await?;
    tracing::info!(history_id = %entry.id, test_id = %test.id, score, "Test submitted");

    notify::send(
        &state,
        &user,
        EmailTemplate::TestCompleted {
            name: user.name.clone(),
            test_title: test.title.clone(),
            score,
            outcome: entry.outcome.as_ref().map(|o| o.title.clone()),
        },
    )
    .await;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn own_history(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> ApiResult<Json<Vec<TestHistory>>> {
    Ok(Json(history_of(&state, &auth.user_id).await?))
}

async fn get_one(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<Json<TestHistory>> {
    let entry = state
        .history()
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("History entry"))?;
    if entry.user_id != auth.user_id && !auth.role.is_staff() {
        return Err(ApiError::forbidden("not your test result"));
    }
    Ok(Json(entry))
}

async fn user_history(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(user_id): Path<String>,
) -> ApiResult<Json<Vec<TestHistory>>> {
    auth.require_staff()?;
    state.user(&user_id).await?;
    Ok(Json(history_of(&state, &user_id).await?))
}

/// A user's results, newest first.
async fn history_of(state: &AppState, user_id: &str) -> ApiResult<Vec<TestHistory>> {
    let mut entries = state.history().find(|h| h.user_id == user_id).await?;
    entries.sort_by(|a, b| b.taken_at.cmp(&a.taken_at));
    Ok(entries)
}
