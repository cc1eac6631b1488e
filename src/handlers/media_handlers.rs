//! HTTP handlers for the media pipeline: multipart upload, store-side
//! delete, and streaming assets back out.

use crate::{AppState, errors::AppError, models::media::ResourceType};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, State},
    http::{HeaderMap, header},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tokio_util::io::ReaderStream;

fn parse_resource_type(value: &str) -> ResourceType {
    match value {
        "video" => ResourceType::Video,
        "raw" => ResourceType::Raw,
        _ => ResourceType::Image,
    }
}

fn content_type_for(format: &str) -> &'static str {
    match format {
        "jpg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// POST /api/media/upload — multipart form with a `file` part and
/// optional `folder` and `resource_type` parts. Open to any
/// authenticated caller.
pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    state.auth.verify_bearer(&headers)?;

    let mut file = None;
    let mut folder = "general".to_string();
    let mut resource_type = ResourceType::Image;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(format!("invalid multipart body: {}", err)))?
    {
        match field.name() {
            Some("file") => {
                file = Some(field.bytes().await.map_err(|err| {
                    AppError::bad_request(format!("failed to read file part: {}", err))
                })?);
            }
            Some("folder") => {
                folder = field.text().await.map_err(|err| {
                    AppError::bad_request(format!("failed to read folder part: {}", err))
                })?;
            }
            Some("resource_type") => {
                let raw = field.text().await.map_err(|err| {
                    AppError::bad_request(format!("failed to read resource_type part: {}", err))
                })?;
                resource_type = parse_resource_type(&raw);
            }
            _ => {}
        }
    }

    let data = file.ok_or_else(|| AppError::bad_request("No file provided"))?;
    let outcome = state.media.upload(data, &folder, resource_type).await?;

    // Degraded path keeps the 200: the asset exists even when its
    // metadata row does not.
    let mut body = json!({
        "result": outcome.asset,
        "mediaId": outcome.media_id,
    });
    if let Some(error) = outcome.metadata_error {
        body["error"] = json!(error);
    }
    Ok(Json(body))
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub public_id: String,
    pub resource_type: Option<String>,
}

/// POST /api/media/delete — removes the stored asset only. Missing
/// assets are acknowledged, not errored.
pub async fn delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<DeleteRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.auth.verify_bearer(&headers)?;

    if payload.public_id.trim().is_empty() {
        return Err(AppError::bad_request("Missing public ID"));
    }
    let resource_type = parse_resource_type(payload.resource_type.as_deref().unwrap_or("image"));
    let outcome = state.media.delete(&payload.public_id, resource_type).await?;
    Ok(Json(json!({ "result": outcome })))
}

/// GET /assets/{*public_id} — stream a stored asset. Content type comes
/// from the metadata record when one exists.
pub async fn serve(
    State(state): State<AppState>,
    Path(public_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let file = state.assets.open(&public_id).await?;

    let content_type = match state.media.find_by_public_id(&public_id).await? {
        Some(record) => content_type_for(&record.format),
        None => "application/octet-stream",
    };

    let stream = ReaderStream::new(file);
    Ok((
        [(header::CONTENT_TYPE, content_type)],
        Body::from_stream(stream),
    ))
}
