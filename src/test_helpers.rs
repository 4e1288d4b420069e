//! Shared fixtures for service and router tests.
//!
//! Every test gets its own in-memory SQLite database and a temp directory for
//! object payloads.

use crate::{
    config::AppConfig,
    db,
    services::{
        article_service::ArticleService, folder_service::FolderService,
        gallery_service::GalleryService, session_service::SessionStore,
    },
    state::AppState,
    storage::{LocalObjectStore, ObjectStore},
};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::sync::Arc;
use tempfile::TempDir;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "correct horse";

/// A single-connection pool so the in-memory database is shared by every query.
pub async fn memory_pool() -> Arc<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    db::run_migrations(&pool).await.unwrap();
    Arc::new(pool)
}

pub fn test_config(storage_dir: &str) -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 3000,
        storage_dir: storage_dir.into(),
        database_url: "sqlite::memory:".into(),
        public_base_url: "http://localhost:3000".into(),
        admin_email: ADMIN_EMAIL.into(),
        admin_password: ADMIN_PASSWORD.into(),
        session_ttl_hours: 12,
        max_upload_mb: 10,
    }
}

/// Local store rooted in a fresh temp dir, with every country bucket created.
pub async fn local_store() -> (TempDir, Arc<LocalObjectStore>) {
    let tmp = TempDir::new().unwrap();
    let store = Arc::new(LocalObjectStore::new(tmp.path(), "http://localhost:3000"));
    for country in crate::models::country::Country::ALL {
        store.ensure_bucket(&country.bucket()).await.unwrap();
    }
    (tmp, store)
}

pub async fn gallery_with_store(store: Arc<dyn ObjectStore>) -> (Arc<SqlitePool>, GalleryService) {
    let db = memory_pool().await;
    let service = GalleryService::new(db.clone(), store);
    (db, service)
}

/// Full application state over an in-memory database and temp storage.
pub async fn test_state() -> (TempDir, AppState) {
    let (tmp, store) = local_store().await;
    let db = memory_pool().await;
    let config = test_config(&tmp.path().to_string_lossy());
    let store: Arc<dyn ObjectStore> = store;
    let state = AppState {
        gallery: GalleryService::new(db.clone(), store.clone()),
        folders: FolderService::new(db.clone()),
        articles: ArticleService::new(db.clone()),
        sessions: SessionStore::from_config(&config),
        store,
        db,
        config: Arc::new(config),
    };
    (tmp, state)
}
