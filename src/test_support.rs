//! Shared helpers for unit and integration tests: a throwaway SQLite
//! database per test, plus a fully wired server on an ephemeral port.

use crate::{
    AppState, routes, run_migrations,
    services::{auth_service::TokenVerifier, media_service::DiskAssetStore},
};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const TEST_SECRET: &str = "test-secret";

/// Fresh migrated pool backed by a file in a temp directory. The
/// directory guard must outlive the pool.
pub async fn test_pool() -> (Arc<SqlitePool>, TempDir) {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("test.db");
    let url = format!("sqlite://{}?mode=rwc", db_path.display());

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .unwrap();
    run_migrations(&pool).await.unwrap();

    (Arc::new(pool), dir)
}

/// Application state wired exactly as `main` wires it, but against a
/// temp database and temp media directory.
pub async fn test_state() -> (AppState, TempDir) {
    let (db, dir) = test_pool().await;
    let media_dir = dir.path().join("media");
    std::fs::create_dir_all(&media_dir).unwrap();

    let assets = Arc::new(DiskAssetStore::new(
        media_dir,
        "http://localhost:0",
        "site",
    ));
    let state = AppState::new(db, assets, TokenVerifier::new(TEST_SECRET));
    (state, dir)
}

/// Serve the full router on an ephemeral local port and return its base
/// URL. The server task runs until the test process exits.
pub async fn spawn_server(state: AppState) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = routes::routes::routes().with_state(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}
