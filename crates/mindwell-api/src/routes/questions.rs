//! Staff management of a test's questions.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use mindwell_auth::AuthenticatedUser;
use mindwell_core::{Answer, Question};
use serde::Deserialize;

use crate::extract::ValidJson;
use crate::routes::tests;
use crate::{ApiError, ApiResult, AppState};

/// `/tests/{id}/questions` and `/questions/{id}`
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tests/{id}/questions", get(list).post(create))
        .route("/questions/{id}", put(update).delete(remove))
}

/// A question as submitted by staff.
#[derive(Debug, Deserialize)]
pub struct QuestionInput {
    text: String,
    #[serde(default)]
    position: Option<u32>,
    #[serde(default)]
    answers: Vec<Answer>,
}

impl QuestionInput {
    /// Build a validated question for `test_id`, using `default_position`
    /// when none was given.
    pub fn into_question(
        self,
        test_id: &str,
        default_position: u32,
    ) -> mindwell_core::Result<Question> {
        Question::new(
            test_id,
            &self.text,
            self.position.unwrap_or(default_position),
            self.answers,
        )
    }
}

/// Questions of a test, ordered by position.
pub async fn questions_of(state: &AppState, test_id: &str) -> ApiResult<Vec<Question>> {
    let mut questions = state.questions().find(|q| q.test_id == test_id).await?;
    questions.sort_by_key(|q| q.position);
    Ok(questions)
}

async fn list(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(test_id): Path<String>,
) -> ApiResult<Json<Vec<Question>>> {
    auth.require_staff()?;
    tests::load(&state, &test_id).await?;
    Ok(Json(questions_of(&state, &test_id).await?))
}

async fn create(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(test_id): Path<String>,
    ValidJson(input): ValidJson<QuestionInput>,
) -> ApiResult<(StatusCode, Json<Question>)> {
    auth.require_staff()?;
    tests::load(&state, &test_id).await?;
    let next = questions_of(&state, &test_id)
        .await?
        .last()
        .map_or(Some(1), |q| q.position.checked_add(1))
        .ok_or_else(|| ApiError::bad_request("no question position left after the last one"))?;
    let question = input.into_question(&test_id, next)?;
    state.questions().insert(&question).await?;
    Ok((StatusCode::CREATED, Json(question)))
}

async fn update(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    ValidJson(input): ValidJson<QuestionInput>,
) -> ApiResult<Json<Question>> {
    auth.require_staff()?;
    let mut question = load(&state, &id).await?;
    let position = input.position.unwrap_or(question.position);
    question.update(&input.text, position, input.answers)?;
    state.replace(&question, "Question").await?;
    Ok(Json(question))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    auth.require_staff()?;
    if !state.questions().delete(&id).await? {
        return Err(ApiError::not_found("Question"));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn load(state: &AppState, id: &str) -> ApiResult<Question> {
    state
        .questions()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Question"))
}
