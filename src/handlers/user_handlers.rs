//! HTTP handlers for the admin user screens: role records CRUD.

use crate::{
    AppState,
    errors::AppError,
    models::role::Role,
    services::auth_service::Capability,
};
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
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
pub struct NewUser {
    pub email: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct RoleChange {
    pub id: Option<Uuid>,
    pub role: Option<Role>,
}

/// GET /api/users — all role records, newest first.
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    state
        .auth
        .authorize(&headers, Capability::ManageUsers)
        .await?;
    let users = state.auth.list_roles().await?;
    Ok(Json(users))
}

/// POST /api/users — grant a role to an email. Duplicate emails are
/// rejected with 409.
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<NewUser>,
) -> Result<impl IntoResponse, AppError> {
    let identity = state
        .auth
        .authorize(&headers, Capability::ManageUsers)
        .await?;

    let email = payload
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("Email is required"))?;
    let role = payload
        .role
        .ok_or_else(|| AppError::bad_request("Role is required"))?;

    let id = state
        .auth
        .create_role(&email, role, Some(&identity.subject_id))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "message": "User added successfully" })),
    ))
}

/// PUT /api/users — change the role on an existing record.
pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<RoleChange>,
) -> Result<impl IntoResponse, AppError> {
    state
        .auth
        .authorize(&headers, Capability::ManageUsers)
        .await?;

    let id = payload
        .id
        .ok_or_else(|| AppError::bad_request("Missing user ID"))?;
    let role = payload
        .role
        .ok_or_else(|| AppError::bad_request("Role is required"))?;

    state.auth.update_role(id, role).await?;
    Ok(Json(json!({ "message": "User updated successfully" })))
}

/// DELETE /api/users?id= — hard delete of a role record.
pub async fn delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(q): Query<IdQuery>,
) -> Result<impl IntoResponse, AppError> {
    state
        .auth
        .authorize(&headers, Capability::ManageUsers)
        .await?;
    let id = q
        .id
        .ok_or_else(|| AppError::bad_request("Missing user ID"))?;
    state.auth.delete_role(id).await?;
    Ok(Json(json!({ "message": "User deleted successfully" })))
}
