//! Blog posts.
//!
//! `GET /blog/{id}` takes a slug and only serves published posts;
//! `PUT` and `DELETE` on the same path take the post id.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use mindwell_auth::AuthenticatedUser;
use mindwell_core::{BlogPost, unique_slug};
use serde::Deserialize;

use crate::extract::{ValidJson, ValidQuery};
use crate::{ApiError, ApiResult, AppState};

/// `/blog*`
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/blog", get(list_published).post(create))
        .route("/blog/manage", get(manage))
        .route("/blog/{id}", get(get_by_slug).put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    tag: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostRequest {
    title: String,
    content: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    published: bool,
}

fn newest_first(posts: &mut [BlogPost]) {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

async fn list_published(
    State(state): State<Arc<AppState>>,
    ValidQuery(query): ValidQuery<ListQuery>,
) -> ApiResult<Json<Vec<BlogPost>>> {
    let mut posts = state
        .posts()
        .find(|p| p.published && query.tag.as_deref().is_none_or(|t| p.has_tag(t)))
        .await?;
    newest_first(&mut posts);
    Ok(Json(posts))
}

async fn get_by_slug(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult<Json<BlogPost>> {
    state
        .posts()
        .find_one(|p| p.published && p.slug == slug)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Post"))
}

async fn manage(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
) -> ApiResult<Json<Vec<BlogPost>>> {
    auth.require_staff()?;
    let mut posts = state
        .posts()
        .find(|p| auth.is_admin() || p.author_id == auth.user_id)
        .await?;
    newest_first(&mut posts);
    Ok(Json(posts))
}

async fn create(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    ValidJson(req): ValidJson<PostRequest>,
) -> ApiResult<(StatusCode, Json<BlogPost>)> {
    auth.require_staff()?;

    let _guard = state.locks.slugs.lock().await;
    let slugs: Vec<String> = state
        .posts()
        .all()
        .await?
        .into_iter()
        .map(|p| p.slug)
        .collect();
    let slug = unique_slug(&req.title, |s| slugs.iter().any(|taken| taken == s));
    let post = BlogPost::new(
        &auth.user_id,
        &req.title,
        slug,
        &req.content,
        req.tags,
        req.published,
    )?;
    state.posts().insert(&post).await?;
    tracing::info!(post_id = %post.id, slug = %post.slug, "Post created");
    Ok((StatusCode::CREATED, Json(post)))
}

async fn update(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    ValidJson(req): ValidJson<PostRequest>,
) -> ApiResult<Json<BlogPost>> {
    let mut post = editable(&state, &auth, &id).await?;
    post.update(&req.title, &req.content, req.tags, req.published)?;
    state.replace(&post, "Post").await?;
    Ok(Json(post))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let post = editable(&state, &auth, &id).await?;
    state.posts().delete(&post.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Load a post its author (or an admin) may change.
async fn editable(state: &AppState, auth: &AuthenticatedUser, id: &str) -> ApiResult<BlogPost> {
    auth.require_staff()?;
    let post = state
        .posts()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post"))?;
    if post.author_id != auth.user_id && !auth.is_admin() {
        return Err(ApiError::forbidden("only the author or an admin may change this post"));
    }
    Ok(post)
}
