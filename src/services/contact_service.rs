//! src/services/contact_service.rs
//!
//! Contact-form inbox. Submission is the one ungated mutation in the
//! system; everything after it (status triage, delete) is admin-only.

use crate::models::contact::{ContactForm, ContactStatus};
use crate::services::{ContentError, ContentResult};
use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Clone)]
pub struct ContactService {
    pub db: Arc<SqlitePool>,
}

impl ContactService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Public submission. Status always starts at `new`; the timestamp is
    /// server-assigned.
    pub async fn submit(&self, form: NewContactForm) -> ContentResult<Uuid> {
        for (value, field) in [
            (&form.name, "name"),
            (&form.email, "email"),
            (&form.service, "service"),
            (&form.message, "message"),
        ] {
            if value.trim().is_empty() {
                return Err(ContentError::Validation(format!("{} is required", field)));
            }
        }

        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO contact_forms (id, name, email, company, phone, service, message, \
             status, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(form.name.trim())
        .bind(form.email.trim())
        .bind(&form.company)
        .bind(&form.phone)
        .bind(&form.service)
        .bind(&form.message)
        .bind(ContactStatus::New)
        .bind(Utc::now())
        .execute(&*self.db)
        .await?;

        Ok(id)
    }

    /// Admin inbox, newest first.
    pub async fn get_all(&self) -> ContentResult<Vec<ContactForm>> {
        let forms = sqlx::query_as::<_, ContactForm>(
            "SELECT id, name, email, company, phone, service, message, status, created_at
             FROM contact_forms ORDER BY created_at DESC",
        )
        .fetch_all(&*self.db)
        .await?;
        Ok(forms)
    }

    pub async fn get_by_id(&self, id: Uuid) -> ContentResult<ContactForm> {
        sqlx::query_as::<_, ContactForm>(
            "SELECT id, name, email, company, phone, service, message, status, created_at
             FROM contact_forms WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or(ContentError::NotFound {
            collection: "contact form",
            id,
        })
    }

    /// The only field that ever changes after submission.
    pub async fn update_status(&self, id: Uuid, status: ContactStatus) -> ContentResult<()> {
        let result = sqlx::query("UPDATE contact_forms SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ContentError::NotFound {
                collection: "contact form",
                id,
            });
        }
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> ContentResult<()> {
        let result = sqlx::query("DELETE FROM contact_forms WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ContentError::NotFound {
                collection: "contact form",
                id,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_pool;

    fn enquiry() -> NewContactForm {
        NewContactForm {
            name: "Sam".into(),
            email: "sam@client.test".into(),
            company: Some("Client Co".into()),
            phone: None,
            service: "ndt-inspection".into(),
            message: "Need a quote for weld testing.".into(),
        }
    }

    #[tokio::test]
    async fn submit_starts_new_and_triages_forward() {
        let (db, _dir) = test_pool().await;
        let contact = ContactService::new(db);

        let id = contact.submit(enquiry()).await.unwrap();
        let form = contact.get_by_id(id).await.unwrap();
        assert_eq!(form.status, ContactStatus::New);
        assert_eq!(form.name, "Sam");

        contact.update_status(id, ContactStatus::Contacted).await.unwrap();
        contact.update_status(id, ContactStatus::Closed).await.unwrap();
        let form = contact.get_by_id(id).await.unwrap();
        assert_eq!(form.status, ContactStatus::Closed);
    }

    #[tokio::test]
    async fn submit_requires_core_fields() {
        let (db, _dir) = test_pool().await;
        let contact = ContactService::new(db);

        let mut form = enquiry();
        form.message = " ".into();
        assert!(matches!(
            contact.submit(form).await.unwrap_err(),
            ContentError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn delete_and_missing_ids() {
        let (db, _dir) = test_pool().await;
        let contact = ContactService::new(db);

        let id = contact.submit(enquiry()).await.unwrap();
        contact.delete(id).await.unwrap();
        assert!(matches!(
            contact.delete(id).await.unwrap_err(),
            ContentError::NotFound { .. }
        ));
        assert!(matches!(
            contact.update_status(id, ContactStatus::Contacted).await.unwrap_err(),
            ContentError::NotFound { .. }
        ));
    }
}
