use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared::{domain::User, error::ResourceError};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::resource::ResourceClient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    /// Unknown email, wrong password or deactivated account; callers cannot
    /// tell these apart.
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("could not reach the user directory: {0}")]
    Remote(#[from] ResourceError),
}

/// Lowercase hex SHA-256 of the password, the digest format stored in
/// `User::password_hash`.
pub fn password_digest(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Persists the session between runs. Store failures never block login or
/// logout; they are logged and the in-memory session stays authoritative.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(&self, session: &Session) -> anyhow::Result<()>;
    async fn load(&self) -> anyhow::Result<Option<Session>>;
    async fn clear(&self) -> anyhow::Result<()>;
}

/// JSON file next to the binary (path from settings).
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn save(&self, session: &Session) -> anyhow::Result<()> {
        let body = serde_json::to_vec_pretty(session).context("serializing session")?;
        tokio::fs::write(&self.path, body)
            .await
            .with_context(|| format!("writing session file {}", self.path.display()))?;
        Ok(())
    }

    async fn load(&self) -> anyhow::Result<Option<Session>> {
        let body = match tokio::fs::read(&self.path).await {
            Ok(body) => body,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("reading session file {}", self.path.display())
                })
            }
        };
        let session = serde_json::from_slice(&body).context("parsing session file")?;
        Ok(Some(session))
    }

    async fn clear(&self) -> anyhow::Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| {
                format!("removing session file {}", self.path.display())
            }),
        }
    }
}

/// In-memory store for tests and for running without a writable disk.
#[derive(Default)]
pub struct EphemeralSessionStore {
    inner: Mutex<Option<Session>>,
}

impl EphemeralSessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for EphemeralSessionStore {
    async fn save(&self, session: &Session) -> anyhow::Result<()> {
        *self.inner.lock().await = Some(session.clone());
        Ok(())
    }

    async fn load(&self) -> anyhow::Result<Option<Session>> {
        Ok(self.inner.lock().await.clone())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        *self.inner.lock().await = None;
        Ok(())
    }
}

/// Logs users in against the remote user directory and keeps the current
/// session in memory, mirrored to a [`SessionStore`].
pub struct Authenticator {
    users: Arc<dyn ResourceClient<User>>,
    store: Arc<dyn SessionStore>,
    current: Mutex<Option<Session>>,
}

impl Authenticator {
    pub fn new(users: Arc<dyn ResourceClient<User>>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            users,
            store,
            current: Mutex::new(None),
        }
    }

    /// Seeds the current session from the store. Unreadable stores count as
    /// no session.
    pub async fn restore(&self) -> Option<Session> {
        let session = match self.store.load().await {
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "auth: could not restore session");
                None
            }
        };
        if let Some(session) = &session {
            info!(user_id = %session.user.id, "auth: session restored");
        }
        *self.current.lock().await = session.clone();
        session
    }

    /// Matches the email plus password digest against the user directory.
    /// Deactivated accounts fail identically to wrong credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let wanted_email = email.trim().to_lowercase();
        let wanted_digest = password_digest(password);

        let users = self.users.list().await?;
        let matched = users.into_iter().find(|user| {
            user.active
                && user.email.to_lowercase() == wanted_email
                && user.password_hash.as_deref() == Some(wanted_digest.as_str())
        });
        let Some(mut user) = matched else {
            info!("auth: login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        // The persisted session never carries the credential digest.
        user.password_hash = None;
        let session = Session {
            token: Uuid::new_v4().to_string(),
            user,
            issued_at: Utc::now(),
        };
        if let Err(err) = self.store.save(&session).await {
            warn!(error = %err, "auth: persisting session failed");
        }
        info!(user_id = %session.user.id, "auth: login succeeded");
        *self.current.lock().await = Some(session.clone());
        Ok(session)
    }

    pub async fn logout(&self) {
        *self.current.lock().await = None;
        if let Err(err) = self.store.clear().await {
            warn!(error = %err, "auth: clearing stored session failed");
        }
        info!("auth: logged out");
    }

    pub async fn current_session(&self) -> Option<Session> {
        self.current.lock().await.clone()
    }

    pub async fn current_user(&self) -> Option<User> {
        self.current.lock().await.as_ref().map(|s| s.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.lock().await.is_some()
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
