//! Media metadata — the queryable record kept alongside every stored asset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

/// Kind of asset held by the external store.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ResourceType {
    Image,
    Video,
    Raw,
}

/// Metadata row owned by the media pipeline.
///
/// Content records point at this with a weak `media_id` reference. The
/// row is written after the asset itself; the two writes are not atomic,
/// so a row may be missing for an asset that exists (and vice versa after
/// a store-only delete).
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct MediaRecord {
    /// Internal UUID for DB indexing — the `mediaId` handed to callers.
    pub id: Uuid,

    /// Key of the asset in the external store.
    pub public_id: String,

    /// Publicly fetchable URL for the asset.
    pub secure_url: String,

    pub resource_type: ResourceType,

    /// Folder the caller uploaded into (un-namespaced).
    pub folder: String,

    /// Payload size in bytes.
    pub bytes: i64,

    /// File format as detected at upload time ("jpg", "png", "bin", ...).
    pub format: String,

    pub width: Option<i64>,
    pub height: Option<i64>,

    pub created_at: DateTime<Utc>,

    /// The store's upload response, kept verbatim for auditing.
    pub raw_response: Json<serde_json::Value>,
}
