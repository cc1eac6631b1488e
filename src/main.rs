use anyhow::Result;
use axum::Router;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::{fs, io::ErrorKind, path::Path, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;

#[cfg(test)]
mod test_support;

use services::{
    auth_service::{AuthService, TokenVerifier},
    blog_service::BlogService,
    catalog_service::CatalogService,
    contact_service::ContactService,
    media_service::{DiskAssetStore, MediaService},
};

/// Shared state handed to every handler: one service per collection plus
/// the disk store the asset-serving route reads from directly.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<SqlitePool>,
    pub auth: AuthService,
    pub blog: BlogService,
    pub catalog: CatalogService,
    pub contact: ContactService,
    pub media: MediaService,
    pub assets: Arc<DiskAssetStore>,
}

impl AppState {
    pub fn new(db: Arc<SqlitePool>, assets: Arc<DiskAssetStore>, verifier: TokenVerifier) -> Self {
        Self {
            auth: AuthService::new(db.clone(), verifier),
            blog: BlogService::new(db.clone()),
            catalog: CatalogService::new(db.clone()),
            contact: ContactService::new(db.clone()),
            media: MediaService::new(db.clone(), assets.clone()),
            assets,
            db,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + migrate flag ---
    let (cfg, migrate) = config::AppConfig::from_env_and_args()?;

    tracing::info!(
        "Starting content-service on {} (db: {})",
        cfg.addr(),
        cfg.database_url
    );

    // --- Ensure media directory exists ---
    if !Path::new(&cfg.media_dir).exists() {
        fs::create_dir_all(&cfg.media_dir)?;
        tracing::info!("Created media directory at {}", cfg.media_dir);
    }

    // --- Initialize SQLite connection ---
    let db_path = cfg
        .database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("file:");

    // Create parent directory and the database file if needed; SQLx will
    // not create either on its own with a plain sqlite:// URL.
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
            tracing::info!("Created missing directory {:?}", parent);
        }
    }
    if let Err(err) = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(db_path)
    {
        tracing::warn!("Failed to pre-create database file: {}", err);
    }

    let db: Arc<SqlitePool> = Arc::new(
        SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&cfg.database_url)
            .await?,
    );

    // --- Handle migration mode ---
    if migrate {
        run_migrations(&db).await?;
        tracing::info!("Database migration complete.");
        return Ok(()); // exit after migration
    }

    // --- Initialize services ---
    let assets = Arc::new(DiskAssetStore::new(
        cfg.media_dir.clone(),
        cfg.public_base_url.clone(),
        "site",
    ));
    let verifier = TokenVerifier::new(&cfg.token_secret);
    let state = AppState::new(db, assets, verifier);

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(state);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Run SQLite migrations from the embedded SQL file.
pub async fn run_migrations(db: &SqlitePool) -> Result<()> {
    let sql = include_str!("../migrations/0001_init.sql");
    let statements = sql
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    tracing::info!("Running {} migration statements...", statements.len());

    for stmt in statements {
        tracing::debug!("Executing migration SQL: {}", stmt);
        sqlx::query(stmt).execute(db).await?;
    }

    Ok(())
}
