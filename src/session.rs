//! Client-side session persistence.
//!
//! After login the storefront keeps `{token, user}` on disk, the way a
//! browser build keeps it in local storage. Everything that needs the
//! current shopper reads it through [`SessionStore`] instead of touching the
//! file directly.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

use serde::{Deserialize, Serialize};

use crate::{error::AppResult, models::SessionUser};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
}

/// Who is using the storefront right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shopper {
    Guest,
    Member(SessionUser),
}

impl Shopper {
    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            Shopper::Guest => None,
            Shopper::Member(user) => Some(user),
        }
    }

    pub fn is_guest(&self) -> bool {
        matches!(self, Shopper::Guest)
    }
}

#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    /// Loads the stored session at `path`. A missing or unreadable file is
    /// treated as "nobody logged in".
    pub async fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let current = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<Session>(&bytes) {
                Ok(session) => Some(session),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "ignoring corrupt session file");
                    None
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "session file unreadable");
                None
            }
        };

        Self {
            path,
            current: RwLock::new(current),
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.current().map(|s| s.token)
    }

    pub fn shopper(&self) -> Shopper {
        match self.current() {
            Some(session) => Shopper::Member(session.user),
            None => Shopper::Guest,
        }
    }

    pub async fn save(&self, session: Session) -> AppResult<()> {
        let bytes = serde_json::to_vec_pretty(&session)?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", self.path.display()))?;
        tracing::info!(user_id = %session.user.id, "session stored");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
        Ok(())
    }

    /// Logs out: forgets the session in memory and on disk.
    pub async fn clear(&self) -> AppResult<()> {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => {
                return Err(anyhow::anyhow!("failed to remove {}: {err}", self.path.display()).into());
            }
        }
        tracing::info!("session cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::models::Role;

    fn session() -> Session {
        Session {
            token: "token-123".into(),
            user: SessionUser {
                id: Uuid::new_v4(),
                name: "Asha".into(),
                email: "asha@example.com".into(),
                role: Role::Customer,
            },
        }
    }

    #[tokio::test]
    async fn missing_file_means_guest() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let store = SessionStore::open(dir.path().join("session.json")).await;

        assert!(store.current().is_none());
        assert!(store.shopper().is_guest());
        Ok(())
    }

    #[tokio::test]
    async fn saved_session_survives_reopen_until_cleared() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("session.json");
        let expected = session();

        let store = SessionStore::open(&path).await;
        store.save(expected.clone()).await?;
        assert_eq!(store.token().as_deref(), Some("token-123"));

        let reopened = SessionStore::open(&path).await;
        assert_eq!(reopened.current(), Some(expected.clone()));
        assert_eq!(reopened.shopper(), Shopper::Member(expected.user));

        reopened.clear().await?;
        assert!(reopened.shopper().is_guest());
        assert!(!path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_is_ignored() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, b"{not json").await?;

        let store = SessionStore::open(&path).await;
        assert!(store.current().is_none());
        Ok(())
    }
}
