//! HTTP handlers for the showcase collections. Every mutation passes the
//! authorization gate first; public listings bypass it.

use crate::{
    AppState,
    errors::AppError,
    services::auth_service::Capability,
    services::catalog_service::{NewProject, NewService, NewTestimonial, ServicePatch},
    services::media_service::MediaService,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

/// `?id=` query used by the delete endpoints.
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<Uuid>,
}

fn require_id(q: IdQuery, what: &str) -> Result<Uuid, AppError> {
    q.id.ok_or_else(|| AppError::bad_request(format!("Missing {} ID", what)))
}

/// Deleting a record does not block on its asset: cleanup runs as a
/// detached best-effort task and failures are only logged.
fn spawn_media_cleanup(media: MediaService, media_id: Uuid) {
    tokio::spawn(async move {
        if let Err(err) = media.cleanup(media_id).await {
            tracing::warn!("media cleanup for {} failed: {}", media_id, err);
        }
    });
}

// --- services ---

/// GET /api/services — public listing.
pub async fn list_services(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let services = state.catalog.get_services().await?;
    Ok(Json(services))
}

/// POST /api/services/create — admin only.
pub async fn create_service(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<NewService>,
) -> Result<impl IntoResponse, AppError> {
    let identity = state
        .auth
        .authorize(&headers, Capability::ManageServices)
        .await?;
    let id = state
        .catalog
        .create_service(payload, &identity.subject_id)
        .await?;
    Ok(Json(json!({ "id": id })))
}

/// PUT /api/services/{id} — admin only, partial update.
pub async fn update_service(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<ServicePatch>,
) -> Result<impl IntoResponse, AppError> {
    state
        .auth
        .authorize(&headers, Capability::ManageServices)
        .await?;
    state.catalog.update_service(id, payload).await?;
    Ok(Json(json!({ "message": "Service updated successfully" })))
}

/// DELETE /api/services?id= — admin only. Schedules asset cleanup when
/// the record carried a media reference.
pub async fn delete_service(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(q): Query<IdQuery>,
) -> Result<impl IntoResponse, AppError> {
    state
        .auth
        .authorize(&headers, Capability::ManageServices)
        .await?;
    let id = require_id(q, "service")?;
    let removed = state.catalog.delete_service(id).await?;
    if let Some(media_id) = removed.media_id {
        spawn_media_cleanup(state.media.clone(), media_id);
    }
    Ok(Json(json!({ "message": "Service deleted successfully" })))
}

// --- projects ---

/// GET /api/projects — public listing.
pub async fn list_projects(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let projects = state.catalog.get_projects().await?;
    Ok(Json(projects))
}

/// POST /api/projects — admin only.
pub async fn create_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<NewProject>,
) -> Result<impl IntoResponse, AppError> {
    let identity = state
        .auth
        .authorize(&headers, Capability::ManageProjects)
        .await?;
    let id = state
        .catalog
        .create_project(payload, &identity.subject_id)
        .await?;
    Ok(Json(json!({ "id": id, "message": "Project created successfully" })))
}

/// DELETE /api/projects?id= — admin only, with asset cleanup.
pub async fn delete_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(q): Query<IdQuery>,
) -> Result<impl IntoResponse, AppError> {
    state
        .auth
        .authorize(&headers, Capability::ManageProjects)
        .await?;
    let id = require_id(q, "project")?;
    let removed = state.catalog.delete_project(id).await?;
    if let Some(media_id) = removed.media_id {
        spawn_media_cleanup(state.media.clone(), media_id);
    }
    Ok(Json(json!({ "message": "Project deleted successfully" })))
}

// --- testimonials ---

/// GET /api/testimonials — public listing.
pub async fn list_testimonials(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let testimonials = state.catalog.get_testimonials().await?;
    Ok(Json(testimonials))
}

/// POST /api/testimonials — admin only.
pub async fn create_testimonial(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<NewTestimonial>,
) -> Result<impl IntoResponse, AppError> {
    let identity = state
        .auth
        .authorize(&headers, Capability::ManageTestimonials)
        .await?;
    let id = state
        .catalog
        .create_testimonial(payload, &identity.subject_id)
        .await?;
    Ok(Json(json!({ "id": id, "message": "Testimonial created successfully" })))
}

/// DELETE /api/testimonials?id= — admin only.
pub async fn delete_testimonial(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(q): Query<IdQuery>,
) -> Result<impl IntoResponse, AppError> {
    state
        .auth
        .authorize(&headers, Capability::ManageTestimonials)
        .await?;
    let id = require_id(q, "testimonial")?;
    state.catalog.delete_testimonial(id).await?;
    Ok(Json(json!({ "message": "Testimonial deleted successfully" })))
}
