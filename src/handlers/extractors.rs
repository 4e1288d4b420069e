//! Request extractors resolving the caller's session from `Authorization: Bearer`.

use crate::{
    errors::AppError,
    services::session_service::{AuthError, Session, SessionStore},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};

/// A live session. Only the configured admin can log in, so holding one is
/// what gates every write endpoint.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Session);

/// The session if a valid token was sent, otherwise `None`. Never rejects.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<Session>);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl<S> FromRequestParts<S> for AdminSession
where
    SessionStore: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthError::MissingToken)?;
        let sessions = SessionStore::from_ref(state);
        Ok(AdminSession(sessions.resolve(token).await?))
    }
}

impl<S> FromRequestParts<S> for MaybeSession
where
    SessionStore: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeSession(
            AdminSession::from_request_parts(parts, state)
                .await
                .ok()
                .map(|AdminSession(s)| s),
        ))
    }
}
