//! HTTP handlers for the contact inbox. Submission is public; triage
//! requires the inbox capability.

use crate::{
    AppState,
    errors::AppError,
    models::contact::ContactStatus,
    services::auth_service::Capability,
    services::contact_service::NewContactForm,
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

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: ContactStatus,
}

/// POST /api/contact — public submission endpoint.
pub async fn submit(
    State(state): State<AppState>,
    Json(payload): Json<NewContactForm>,
) -> Result<impl IntoResponse, AppError> {
    let id = state.contact.submit(payload).await?;
    Ok(Json(json!({ "id": id, "message": "Form submitted successfully" })))
}

/// GET /api/contact — full inbox, newest first.
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    state
        .auth
        .authorize(&headers, Capability::ModerateInbox)
        .await?;
    let forms = state.contact.get_all().await?;
    Ok(Json(forms))
}

/// PUT /api/contact/{id}/status — move a submission through triage.
pub async fn update_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusUpdate>,
) -> Result<impl IntoResponse, AppError> {
    state
        .auth
        .authorize(&headers, Capability::ModerateInbox)
        .await?;
    state.contact.update_status(id, payload.status).await?;
    Ok(Json(json!({ "message": "Status updated successfully" })))
}

/// DELETE /api/contact?id= — hard delete of a submission.
pub async fn delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(q): Query<IdQuery>,
) -> Result<impl IntoResponse, AppError> {
    state
        .auth
        .authorize(&headers, Capability::ModerateInbox)
        .await?;
    let id = q
        .id
        .ok_or_else(|| AppError::bad_request("Missing contact form ID"))?;
    state.contact.delete(id).await?;
    Ok(Json(json!({ "message": "Form deleted successfully" })))
}
