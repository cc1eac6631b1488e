//! Contact-form submissions from the public site.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Triage state of a submission. Moves forward only through explicit
/// admin status updates.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ContactStatus {
    New,
    Contacted,
    Closed,
}

/// A contact-form submission.
///
/// Created once by the public (unauthenticated) submit path; afterwards
/// only the `status` field changes, and only through the gated admin
/// endpoints.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct ContactForm {
    /// Internal UUID for DB indexing.
    pub id: Uuid,

    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub phone: Option<String>,

    /// Which service the enquiry concerns.
    pub service: String,

    pub message: String,

    pub status: ContactStatus,

    /// Server-assigned, never client-supplied.
    pub created_at: DateTime<Utc>,
}
