use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::services::{
    ContentError, auth_service::AuthError, media_service::MediaError,
};

/// A lightweight wrapper for request-level errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for 400 Bad Request (validation failures).
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Shortcut for 404 Not Found.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Shortcut for a 500 Internal Server Error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let status = match &err {
            AuthError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::DuplicateEmail(_) => StatusCode::CONFLICT,
            AuthError::RoleNotFound(_) => StatusCode::NOT_FOUND,
            AuthError::Sqlx(inner) => {
                tracing::error!("role store failure: {}", inner);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        AppError::new(status, err.to_string())
    }
}

impl From<ContentError> for AppError {
    fn from(err: ContentError) -> Self {
        let status = match &err {
            ContentError::Validation(_) => StatusCode::BAD_REQUEST,
            ContentError::NotFound { .. } => StatusCode::NOT_FOUND,
            ContentError::Sqlx(inner) => {
                tracing::error!("content repository failure: {}", inner);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        AppError::new(status, err.to_string())
    }
}

impl From<MediaError> for AppError {
    fn from(err: MediaError) -> Self {
        let status = match &err {
            MediaError::InvalidKey => StatusCode::BAD_REQUEST,
            MediaError::AssetNotFound(_) | MediaError::MetadataNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            MediaError::UploadFailed(inner) => {
                tracing::error!("asset store upload failure: {}", inner);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            MediaError::Persistence(inner) => {
                tracing::error!("media metadata failure: {}", inner);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            MediaError::Io(inner) => {
                tracing::error!("asset store I/O failure: {}", inner);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        AppError::new(status, err.to_string())
    }
}
