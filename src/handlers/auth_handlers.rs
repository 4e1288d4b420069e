//! Login, logout and session inspection.

use super::extractors::AdminSession;
use crate::{errors::AppError, services::session_service::Session, state::AppState};
use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub session: Session,
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let session = state.sessions.login(req.email.trim(), &req.password).await?;
    Ok(Json(LoginResponse {
        token: session.token.clone(),
        session,
    }))
}

/// `POST /api/auth/logout`
pub async fn logout(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
) -> StatusCode {
    state.sessions.logout(&session.token).await;
    StatusCode::NO_CONTENT
}

/// `GET /api/auth/session`
pub async fn current_session(AdminSession(session): AdminSession) -> Json<Session> {
    Json(session)
}
