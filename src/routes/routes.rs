//! Defines routes for the public site surface and the admin API.
//!
//! ## Structure
//! - **Public endpoints** (no credential required)
//!   - `GET  /api/posts` — published posts, cursor-paginated
//!   - `GET  /api/posts/{slug}` — one published post
//!   - `GET  /api/posts/category/{category}` — published posts by category
//!   - `GET  /api/services`, `/api/projects`, `/api/testimonials` — listings
//!   - `POST /api/contact` — submit a contact form
//!   - `GET  /assets/{*public_id}` — stream a stored media asset
//!
//! - **Admin endpoints** (bearer credential plus a granted capability)
//!   - `/api/admin/posts` CRUD, `/api/services/create`, `PUT /api/services/{id}`,
//!     `POST /api/projects`, `POST /api/testimonials`, the matching
//!     `DELETE ...?id=` routes, `/api/users` CRUD and contact triage
//!
//! - **Authenticated endpoints** (bearer credential only)
//!   - `POST /api/media/upload`, `POST /api/media/delete`
//!
//! The wildcard `*public_id` allows nested asset keys like `site/general/abc`.

use crate::{
    AppState,
    handlers::{
        blog_handlers,
        catalog_handlers,
        contact_handlers,
        health_handlers::{healthz, readyz},
        media_handlers,
        user_handlers,
    },
};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Build and return the router for the whole API surface.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // blog: public reads, gated admin CRUD
        .route("/api/posts", get(blog_handlers::list_published))
        .route("/api/posts/{slug}", get(blog_handlers::get_by_slug))
        .route(
            "/api/posts/category/{category}",
            get(blog_handlers::list_by_category),
        )
        .route(
            "/api/admin/posts",
            get(blog_handlers::admin_list).post(blog_handlers::create),
        )
        .route(
            "/api/admin/posts/{id}",
            put(blog_handlers::update).delete(blog_handlers::delete),
        )
        // showcase collections
        .route(
            "/api/services",
            get(catalog_handlers::list_services).delete(catalog_handlers::delete_service),
        )
        .route("/api/services/create", post(catalog_handlers::create_service))
        .route("/api/services/{id}", put(catalog_handlers::update_service))
        .route(
            "/api/projects",
            get(catalog_handlers::list_projects)
                .post(catalog_handlers::create_project)
                .delete(catalog_handlers::delete_project),
        )
        .route(
            "/api/testimonials",
            get(catalog_handlers::list_testimonials)
                .post(catalog_handlers::create_testimonial)
                .delete(catalog_handlers::delete_testimonial),
        )
        // contact inbox
        .route(
            "/api/contact",
            post(contact_handlers::submit)
                .get(contact_handlers::list)
                .delete(contact_handlers::delete),
        )
        .route(
            "/api/contact/{id}/status",
            put(contact_handlers::update_status),
        )
        // role records
        .route(
            "/api/users",
            get(user_handlers::list)
                .post(user_handlers::create)
                .put(user_handlers::update)
                .delete(user_handlers::delete),
        )
        // media pipeline
        .route("/api/media/upload", post(media_handlers::upload))
        .route("/api/media/delete", post(media_handlers::delete))
        .route("/assets/{*public_id}", get(media_handlers::serve))
}
