//! HTTP handlers for blog articles. Reads are public; writes need an admin session.

use super::extractors::AdminSession;
use crate::{
    errors::AppError,
    models::article::{Article, ArticleInput},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

/// `GET /api/articles`
pub async fn list_articles(State(state): State<AppState>) -> Result<Json<Vec<Article>>, AppError> {
    Ok(Json(state.articles.list().await?))
}

/// `GET /api/articles/{slug}`
pub async fn get_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Article>, AppError> {
    Ok(Json(state.articles.get_by_slug(&slug).await?))
}

/// `POST /api/articles`
pub async fn create_article(
    State(state): State<AppState>,
    _admin: AdminSession,
    Json(input): Json<ArticleInput>,
) -> Result<(StatusCode, Json<Article>), AppError> {
    let article = state.articles.create(input).await?;
    tracing::info!("created article {}", article.slug);
    Ok((StatusCode::CREATED, Json(article)))
}

/// `PUT /api/articles/{id}`
pub async fn update_article(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<Uuid>,
    Json(input): Json<ArticleInput>,
) -> Result<Json<Article>, AppError> {
    Ok(Json(state.articles.update(id, input).await?))
}

/// `DELETE /api/articles/{id}`
pub async fn delete_article(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.articles.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
