//! Session management for the admin editor.
//!
//! A login exchanges the configured email/password for an opaque bearer
//! token. The configured admin is the only identity, so every live session
//! carries admin rights. Handlers receive the resolved [`Session`] explicitly; nothing about
//! the login state is kept anywhere else.

use crate::config::AppConfig;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("missing bearer token")]
    MissingToken,
    #[error("session is invalid or has expired")]
    InvalidSession,
}

/// An authenticated session.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    #[serde(skip)]
    pub token: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_valid(&self) -> bool {
        self.expires_at > Utc::now()
    }
}

#[derive(Clone)]
struct Credentials {
    email: String,
    password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// In-memory session table keyed by token.
#[derive(Clone, Debug)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    admin: Credentials,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(admin_email: String, admin_password: String, ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            admin: Credentials {
                email: admin_email,
                password: admin_password,
            },
            ttl,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.admin_email.clone(),
            config.admin_password.clone(),
            Duration::hours(config.session_ttl_hours),
        )
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email_ok = constant_time_eq(email.as_bytes(), self.admin.email.as_bytes());
        let password_ok = constant_time_eq(password.as_bytes(), self.admin.password.as_bytes());
        if !(email_ok && password_ok) {
            tracing::warn!("rejected login for {}", email);
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        let session = Session {
            token: generate_token(),
            email: email.to_string(),
            created_at: now,
            expires_at: now + self.ttl,
        };

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| s.is_valid());
        sessions.insert(session.token.clone(), session.clone());
        tracing::info!("session opened for {}", email);
        Ok(session)
    }

    /// Look up a live session. Expired sessions are dropped on sight.
    pub async fn resolve(&self, token: &str) -> Result<Session, AuthError> {
        let found = self.sessions.read().await.get(token).cloned();
        match found {
            Some(session) if session.is_valid() => Ok(session),
            Some(_) => {
                self.sessions.write().await.remove(token);
                Err(AuthError::InvalidSession)
            }
            None => Err(AuthError::InvalidSession),
        }
    }

    /// Returns false if the token was not known.
    pub async fn logout(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }
}

/// 256 bits from two v4 UUIDs, URL-safe base64 without padding.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    bytes[..16].copy_from_slice(Uuid::new_v4().as_bytes());
    bytes[16..].copy_from_slice(Uuid::new_v4().as_bytes());
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(ttl: Duration) -> SessionStore {
        SessionStore::new("admin@example.com".into(), "secret".into(), ttl)
    }

    #[tokio::test]
    async fn login_resolve_logout() {
        let store = store(Duration::hours(1));
        let session = store.login("admin@example.com", "secret").await.unwrap();
        assert_eq!(session.token.len(), 43);

        let resolved = store.resolve(&session.token).await.unwrap();
        assert_eq!(resolved.email, "admin@example.com");

        assert!(store.logout(&session.token).await);
        assert_eq!(
            store.resolve(&session.token).await.unwrap_err(),
            AuthError::InvalidSession
        );
        assert!(!store.logout(&session.token).await);
    }

    #[tokio::test]
    async fn wrong_credentials_are_rejected() {
        let store = store(Duration::hours(1));
        assert_eq!(
            store.login("admin@example.com", "nope").await.unwrap_err(),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            store.login("Admin@example.com", "secret").await.unwrap_err(),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            store.login("admin@example.com ", "secret").await.unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn expired_sessions_do_not_resolve() {
        let store = store(Duration::seconds(-1));
        let session = store.login("admin@example.com", "secret").await.unwrap();
        assert_eq!(
            store.resolve(&session.token).await.unwrap_err(),
            AuthError::InvalidSession
        );
    }
}
