//! Service layer: one struct per concern, all sharing the SQLite pool.

pub mod auth_service;
pub mod blog_service;
pub mod catalog_service;
pub mod contact_service;
pub mod media_service;

use thiserror::Error;
use uuid::Uuid;

/// Failure modes shared by the content repositories (blog, catalog,
/// contact forms). Authorization failures never reach these — the gate
/// runs first.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("{0}")]
    Validation(String),
    #[error("{collection} `{id}` not found")]
    NotFound { collection: &'static str, id: Uuid },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type ContentResult<T> = Result<T, ContentError>;
