//! Blog posts — draft/published articles with a slug-addressed public view.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;
use uuid::Uuid;

/// A single blog post.
///
/// The slug is derived from the title at creation time and is not
/// guaranteed unique; the `published` flag is the publication gate that
/// controls visibility through every public query.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct BlogPost {
    /// Internal UUID for DB indexing.
    pub id: Uuid,

    pub title: String,

    /// URL-safe identifier derived from the title (`slugify`).
    pub slug: String,

    /// Short teaser shown in listings.
    pub excerpt: String,

    /// Full article body.
    pub content: String,

    /// Display name of the author.
    pub author: String,

    /// Subject id of the authoring identity.
    pub author_id: String,

    pub category: String,

    /// Free-form tags, stored as a JSON array column.
    pub tags: Json<Vec<String>>,

    /// URL of the featured image, usually a `secure_url` from the media
    /// pipeline. Weak reference only.
    pub featured_image: Option<String>,

    /// Publication gate: public queries only see rows where this is true.
    pub published: bool,

    /// Server-assigned, never client-supplied.
    pub created_at: DateTime<Utc>,

    /// Bumped on every update.
    pub updated_at: DateTime<Utc>,
}
