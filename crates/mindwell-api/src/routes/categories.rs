//! Test categories.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use mindwell_auth::AuthenticatedUser;
use mindwell_core::Category;
use serde::Deserialize;

use crate::extract::ValidJson;
use crate::{ApiError, ApiResult, AppState};

/// `/categories*`
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/categories", get(list).post(create))
        .route("/categories/{id}", get(get_one).put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
struct CategoryRequest {
    name: String,
    #[serde(default)]
    description: Option<String>,
}

async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Category>>> {
    let mut categories = state.categories().all().await?;
    categories.sort_by_key(|c| c.name.to_lowercase());
    Ok(Json(categories))
}

async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Category>> {
    Ok(Json(load(&state, &id).await?))
}

async fn create(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    ValidJson(req): ValidJson<CategoryRequest>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    auth.require_admin()?;
    let category = Category::new(&req.name, req.description)?;

    let _guard = state.locks.categories.lock().await;
    ensure_unique_name(&state, &category.name, None).await?;
    state.categories().insert(&category).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<CategoryRequest>,
) -> ApiResult<Json<Category>> {
    auth.require_admin()?;
    let _guard = state.locks.categories.lock().await;
    let mut category = load(&state, &id).await?;
    category.update(&req.name, req.description)?;
    ensure_unique_name(&state, &category.name, Some(&category.id)).await?;
    state.replace(&category, "Category").await?;
    Ok(Json(category))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    auth.require_admin()?;
    load(&state, &id).await?;
    let in_use = state.tests().find(|t| t.category_id == id).await?.len();
    if in_use > 0 {
        return Err(ApiError::conflict(format!(
            "category is used by {in_use} test(s)"
        )));
    }
    state.categories().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Load a category or fail with 404.
pub async fn load(state: &AppState, id: &str) -> ApiResult<Category> {
    state
        .categories()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Category"))
}

async fn ensure_unique_name(state: &AppState, name: &str, except: Option<&str>) -> ApiResult<()> {
    let taken = state
        .categories()
        .exists(|c| c.has_name(name) && Some(c.id.as_str()) != except)
        .await?;
    if taken {
        return Err(ApiError::conflict(format!("category '{name}' already exists")));
    }
    Ok(())
}
