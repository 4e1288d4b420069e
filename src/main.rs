use anyhow::Result;
use axum::Router;
use std::{fs, io::ErrorKind, path::Path, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod db;
mod errors;
mod gallery;
mod handlers;
mod models;
mod query;
mod routes;
mod services;
mod state;
mod storage;

#[cfg(test)]
mod test_helpers;

use services::{
    article_service::ArticleService, folder_service::FolderService,
    gallery_service::GalleryService, session_service::SessionStore,
};
use state::AppState;
use storage::{LocalObjectStore, ObjectStore};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + migrate flag ---
    let (cfg, migrate) = config::AppConfig::from_env_and_args()?;

    tracing::info!(
        "Starting gallery-site on {} (storage: {}, db: {})",
        cfg.addr(),
        cfg.storage_dir,
        cfg.database_url
    );

    // --- Ensure storage directory exists ---
    if !Path::new(&cfg.storage_dir).exists() {
        fs::create_dir_all(&cfg.storage_dir)?;
        tracing::info!("Created storage directory at {}", cfg.storage_dir);
    }

    // --- Initialize SQLite connection ---
    let db = Arc::new(db::connect(&cfg.database_url).await?);

    // --- Handle migration mode ---
    if migrate {
        db::run_migrations(&db).await?;
        tracing::info!("Database migration complete.");
        return Ok(()); // exit after migration
    }
    db::run_migrations(&db).await?;

    // --- Initialize services ---
    let store: Arc<dyn ObjectStore> = Arc::new(LocalObjectStore::new(
        cfg.storage_dir.clone(),
        cfg.public_base_url.clone(),
    ));
    let gallery = GalleryService::new(db.clone(), store.clone());
    gallery.ensure_buckets().await?;

    let state = AppState {
        gallery,
        folders: FolderService::new(db.clone()),
        articles: ArticleService::new(db.clone()),
        sessions: SessionStore::from_config(&cfg),
        store,
        db,
        config: Arc::new(cfg.clone()),
    };

    // --- Build router ---
    let app: Router = routes::routes::routes(state);

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
