//! Shared state handed to every handler.

use crate::{
    config::AppConfig,
    services::{
        article_service::ArticleService, folder_service::FolderService,
        gallery_service::GalleryService, session_service::SessionStore,
    },
    storage::ObjectStore,
};
use axum::extract::FromRef;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub gallery: GalleryService,
    pub folders: FolderService,
    pub articles: ArticleService,
    pub sessions: SessionStore,
    pub store: Arc<dyn ObjectStore>,
    pub db: Arc<SqlitePool>,
    pub config: Arc<AppConfig>,
}

impl FromRef<AppState> for SessionStore {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}
