//! Showcase content: services offered, project gallery, client testimonials.
//!
//! All three share the same lifecycle — created by an admin, listed
//! publicly, hard-deleted — and carry `created_by` attribution from the
//! authorization gate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A service the firm offers.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Service {
    /// Internal UUID for DB indexing.
    pub id: Uuid,

    pub title: String,

    /// `secure_url` of an uploaded image, when one was attached.
    pub image: Option<String>,

    /// Weak back-reference into the media metadata collection, used by the
    /// best-effort cleanup sweep on delete. No ownership semantics.
    pub media_id: Option<Uuid>,

    pub description: String,

    /// 1–5 inclusive, validated at creation.
    pub rating: i64,

    pub created_at: DateTime<Utc>,

    /// Subject id of the creating admin.
    pub created_by: String,
}

/// A portfolio/gallery entry. Same shape and lifecycle as [`Service`],
/// fewer fields.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct ProjectItem {
    pub id: Uuid,
    pub title: String,
    pub image: String,
    pub media_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}

/// A client testimonial. Created and deleted by admins, never updated
/// in place.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Testimonial {
    pub id: Uuid,
    pub details: String,
    pub client_name: String,
    pub client_title: Option<String>,
    pub client_company: Option<String>,
    /// 1–5 inclusive, validated at creation.
    pub rating: i64,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
}
