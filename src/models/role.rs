//! Role records — the email-to-permission-level mapping behind admin gating.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Permission level held by a role record.
///
/// Only `admin` carries mutating capabilities today; the weaker tiers exist
/// in the data model and in the capability matrix so grants can widen
/// without a schema change.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum Role {
    Admin,
    ContentManager,
    Editor,
    Viewer,
}

/// An email-to-role mapping created by an existing admin.
///
/// Emails are stored case-sensitively and are not constrained unique;
/// duplicate creation is rejected by a lookup at write time.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct RoleRecord {
    /// Internal UUID for DB indexing.
    pub id: Uuid,

    /// Email the identity provider resolves a credential to.
    pub email: String,

    /// Permission level granted to that email.
    pub role: Role,

    /// When this record was created (server-assigned).
    pub created_at: DateTime<Utc>,

    /// Subject id of the admin who created the record, when known.
    pub created_by: Option<String>,
}
