pub mod blog_handlers;
pub mod catalog_handlers;
pub mod contact_handlers;
pub mod health_handlers;
pub mod media_handlers;
pub mod user_handlers;
