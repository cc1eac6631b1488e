//! src/services/catalog_service.rs
//!
//! Repositories for the showcase collections — services, projects,
//! testimonials. Deletes are hard and return the removed record so the
//! caller can schedule media cleanup from its `media_id`.

use crate::models::catalog::{ProjectItem, Service, Testimonial};
use crate::services::{ContentError, ContentResult};
use chrono::Utc;
use serde::Deserialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewService {
    #[serde(default)]
    pub title: String,
    pub image: Option<String>,
    pub media_id: Option<Uuid>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rating: i64,
}

/// Partial service update; absent fields keep their stored value.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePatch {
    pub title: Option<String>,
    pub image: Option<String>,
    pub media_id: Option<Uuid>,
    pub description: Option<String>,
    pub rating: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image: String,
    pub media_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTestimonial {
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub client_name: String,
    pub client_title: Option<String>,
    pub client_company: Option<String>,
    #[serde(default)]
    pub rating: i64,
}

fn ensure_rating(rating: i64) -> ContentResult<()> {
    if !(1..=5).contains(&rating) {
        return Err(ContentError::Validation(
            "rating must be between 1 and 5".into(),
        ));
    }
    Ok(())
}

fn ensure_present(value: &str, field: &str) -> ContentResult<()> {
    if value.trim().is_empty() {
        return Err(ContentError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

#[derive(Clone)]
pub struct CatalogService {
    pub db: Arc<SqlitePool>,
}

impl CatalogService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    // --- services ---

    pub async fn create_service(
        &self,
        new: NewService,
        created_by: &str,
    ) -> ContentResult<Uuid> {
        ensure_present(&new.title, "title")?;
        ensure_present(&new.description, "description")?;
        ensure_rating(new.rating)?;

        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO services (id, title, image, media_id, description, rating, \
             created_at, created_by) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(new.title.trim())
        .bind(&new.image)
        .bind(new.media_id)
        .bind(&new.description)
        .bind(new.rating)
        .bind(Utc::now())
        .bind(created_by)
        .execute(&*self.db)
        .await?;

        Ok(id)
    }

    pub async fn get_services(&self) -> ContentResult<Vec<Service>> {
        let services = sqlx::query_as::<_, Service>(
            "SELECT id, title, image, media_id, description, rating, created_at, created_by
             FROM services ORDER BY created_at DESC",
        )
        .fetch_all(&*self.db)
        .await?;
        Ok(services)
    }

    pub async fn get_service(&self, id: Uuid) -> ContentResult<Service> {
        sqlx::query_as::<_, Service>(
            "SELECT id, title, image, media_id, description, rating, created_at, created_by
             FROM services WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or(ContentError::NotFound {
            collection: "service",
            id,
        })
    }

    pub async fn update_service(&self, id: Uuid, patch: ServicePatch) -> ContentResult<()> {
        let existing = self.get_service(id).await?;

        let title = patch.title.unwrap_or(existing.title);
        let image = patch.image.or(existing.image);
        let media_id = patch.media_id.or(existing.media_id);
        let description = patch.description.unwrap_or(existing.description);
        let rating = patch.rating.unwrap_or(existing.rating);
        ensure_present(&title, "title")?;
        ensure_present(&description, "description")?;
        ensure_rating(rating)?;

        sqlx::query(
            "UPDATE services SET title = ?, image = ?, media_id = ?, description = ?, \
             rating = ? WHERE id = ?",
        )
        .bind(&title)
        .bind(&image)
        .bind(media_id)
        .bind(&description)
        .bind(rating)
        .bind(id)
        .execute(&*self.db)
        .await?;

        Ok(())
    }

    /// Hard delete in a single statement; returns the removed record so
    /// the handler can hand its `media_id` to the asset-cleanup sweep.
    /// Only one of two racing deletes can observe success.
    pub async fn delete_service(&self, id: Uuid) -> ContentResult<Service> {
        sqlx::query_as::<_, Service>(
            "DELETE FROM services WHERE id = ?
             RETURNING id, title, image, media_id, description, rating, created_at, created_by",
        )
        .bind(id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or(ContentError::NotFound {
            collection: "service",
            id,
        })
    }

    // --- projects ---

    pub async fn create_project(
        &self,
        new: NewProject,
        created_by: &str,
    ) -> ContentResult<Uuid> {
        ensure_present(&new.title, "title")?;
        ensure_present(&new.image, "image")?;

        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO projects (id, title, image, media_id, created_at, created_by)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(new.title.trim())
        .bind(&new.image)
        .bind(new.media_id)
        .bind(Utc::now())
        .bind(created_by)
        .execute(&*self.db)
        .await?;

        Ok(id)
    }

    pub async fn get_projects(&self) -> ContentResult<Vec<ProjectItem>> {
        let projects = sqlx::query_as::<_, ProjectItem>(
            "SELECT id, title, image, media_id, created_at, created_by
             FROM projects ORDER BY created_at DESC",
        )
        .fetch_all(&*self.db)
        .await?;
        Ok(projects)
    }

    pub async fn delete_project(&self, id: Uuid) -> ContentResult<ProjectItem> {
        sqlx::query_as::<_, ProjectItem>(
            "DELETE FROM projects WHERE id = ?
             RETURNING id, title, image, media_id, created_at, created_by",
        )
        .bind(id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or(ContentError::NotFound {
            collection: "project",
            id,
        })
    }

    // --- testimonials ---

    pub async fn create_testimonial(
        &self,
        new: NewTestimonial,
        created_by: &str,
    ) -> ContentResult<Uuid> {
        ensure_present(&new.details, "details")?;
        ensure_present(&new.client_name, "clientName")?;
        ensure_rating(new.rating)?;

        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO testimonials (id, details, client_name, client_title, \
             client_company, rating, created_at, created_by) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&new.details)
        .bind(new.client_name.trim())
        .bind(&new.client_title)
        .bind(&new.client_company)
        .bind(new.rating)
        .bind(Utc::now())
        .bind(created_by)
        .execute(&*self.db)
        .await?;

        Ok(id)
    }

    pub async fn get_testimonials(&self) -> ContentResult<Vec<Testimonial>> {
        let testimonials = sqlx::query_as::<_, Testimonial>(
            "SELECT id, details, client_name, client_title, client_company, rating, \
             created_at, created_by FROM testimonials ORDER BY created_at DESC",
        )
        .fetch_all(&*self.db)
        .await?;
        Ok(testimonials)
    }

    pub async fn delete_testimonial(&self, id: Uuid) -> ContentResult<()> {
        let result = sqlx::query("DELETE FROM testimonials WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ContentError::NotFound {
                collection: "testimonial",
                id,
            });
        }
        Ok(())
    }
}
