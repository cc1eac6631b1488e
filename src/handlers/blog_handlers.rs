//! HTTP handlers for blog posts: public published views and the gated
//! admin CRUD.

use crate::{
    AppState,
    errors::AppError,
    services::auth_service::Capability,
    services::blog_service::{NewPost, PostPatch},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

/// Query params for the public published listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedQuery {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    pub cursor: Option<String>,
}

fn default_page_size() -> usize {
    10
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryQuery {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

/// GET /api/posts — published posts, cursor-paginated.
pub async fn list_published(
    State(state): State<AppState>,
    Query(q): Query<PublishedQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = state.blog.get_published(q.page_size, q.cursor.as_deref()).await?;
    Ok(Json(json!({
        "posts": page.posts,
        "nextCursor": page.next_cursor,
        "hasMore": page.has_more,
    })))
}

/// GET /api/posts/{slug} — single published post. Drafts 404 here.
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    match state.blog.get_by_slug(&slug).await? {
        Some(post) => Ok(Json(post)),
        None => Err(AppError::not_found(format!("no published post at `{}`", slug))),
    }
}

/// GET /api/posts/category/{category} — published posts in a category.
pub async fn list_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(q): Query<CategoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let posts = state.blog.get_by_category(&category, q.page_size).await?;
    Ok(Json(json!({ "posts": posts })))
}

/// GET /api/admin/posts — every post including drafts.
pub async fn admin_list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    state.auth.authorize(&headers, Capability::ManagePosts).await?;
    let posts = state.blog.get_all().await?;
    Ok(Json(posts))
}

/// POST /api/admin/posts — create a draft or published post.
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<NewPost>,
) -> Result<impl IntoResponse, AppError> {
    let identity = state.auth.authorize(&headers, Capability::ManagePosts).await?;
    let post = state.blog.create(payload, &identity.subject_id).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": post.id, "slug": post.slug }))))
}

/// PUT /api/admin/posts/{id} — partial update.
pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<PostPatch>,
) -> Result<impl IntoResponse, AppError> {
    state.auth.authorize(&headers, Capability::ManagePosts).await?;
    state.blog.update(id, payload).await?;
    Ok(Json(json!({ "message": "Post updated successfully" })))
}

/// DELETE /api/admin/posts/{id} — hard delete.
pub async fn delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.auth.authorize(&headers, Capability::ManagePosts).await?;
    state.blog.delete(id).await?;
    Ok(Json(json!({ "message": "Post deleted successfully" })))
}
