//! Core data models for the content & access-control service.
//!
//! One module per collection. Every entity maps onto a database table via
//! `sqlx::FromRow` and serializes naturally as JSON via `serde`.

pub mod blog;
pub mod catalog;
pub mod contact;
pub mod media;
pub mod role;
