//! Defines routes for the gallery site API.
//!
//! ## Structure
//! - **Health**: `GET /healthz`, `GET /readyz`
//! - **Gallery (public)**
//!   - `GET /api/countries`
//!   - `GET /api/gallery/view?path=`: resolve a gallery address to its view
//!   - `GET /api/gallery/{country}/folders`
//!   - `GET /api/gallery/{country}/images`
//!   - `GET /api/gallery/{country}/folder-meta`
//! - **Gallery (admin)**
//!   - `POST   /api/gallery/upload`
//!   - `PATCH  /api/gallery/images/{id}`, `DELETE /api/gallery/images/{id}`
//!   - `POST   /api/gallery/images/{id}/visibility`
//!   - `PUT    /api/gallery/{country}/folder-meta`
//!   - `DELETE /api/gallery/{country}/folder-meta/{name}`
//! - **Articles**: `GET/POST /api/articles`, `GET /api/articles/{slug}`,
//!   `PUT/DELETE /api/articles/{id}` (same path; reads take a slug, writes an id)
//! - **Auth**: `POST /api/auth/login`, `POST /api/auth/logout`, `GET /api/auth/session`
//! - **Storage**: `GET /storage/{bucket}/{*key}`: public image URLs

use crate::{
    handlers::{
        article_handlers::{
            create_article, delete_article, get_article, list_articles, update_article,
        },
        auth_handlers::{current_session, login, logout},
        gallery_handlers::{
            delete_folder_metadata, delete_image, list_countries, list_folder_metadata,
            list_folders, list_images, resolve_view, toggle_visibility, update_image,
            upload_images, upsert_folder_metadata,
        },
        health_handlers::{healthz, readyz},
        storage_handlers::get_object,
    },
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
};

/// Build the full router with shared state attached.
///
/// The configured upload limit applies to the upload route only.
pub fn routes(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes();

    let gallery = Router::new()
        .route("/view", get(resolve_view))
        .route(
            "/upload",
            post(upload_images).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/images/{id}", patch(update_image).delete(delete_image))
        .route("/images/{id}/visibility", post(toggle_visibility))
        .route("/{country}/folders", get(list_folders))
        .route("/{country}/images", get(list_images))
        .route(
            "/{country}/folder-meta",
            get(list_folder_metadata).put(upsert_folder_metadata),
        )
        .route("/{country}/folder-meta/{name}", delete(delete_folder_metadata));

    let articles = Router::new()
        .route("/", get(list_articles).post(create_article))
        .route(
            "/{key}",
            get(get_article).put(update_article).delete(delete_article),
        );

    let auth = Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/session", get(current_session));

    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/api/countries", get(list_countries))
        .nest("/api/gallery", gallery)
        .nest("/api/articles", articles)
        .nest("/api/auth", auth)
        // public object URLs; the wildcard allows nested keys like `events/a.jpg`
        .route("/storage/{bucket}/{*key}", get(get_object))
        .with_state(state)
}
