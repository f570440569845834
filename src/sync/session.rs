use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::calendar::AuthUser;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to access session file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse session: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("No stored session, log in with --login EMAIL")]
    NotLoggedIn,
}

/// What survives between runs: the bearer token and the user it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredSession {
    pub token: String,
    #[serde(default)]
    pub user: Option<AuthUser>,
    pub saved_at: DateTime<Utc>,
}

impl StoredSession {
    pub fn new(token: String, user: Option<AuthUser>) -> Self {
        Self {
            token,
            user,
            saved_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenStorage {
    path: PathBuf,
}

impl TokenStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, session: &StoredSession) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn load(&self) -> Result<StoredSession, SessionError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SessionError::NotLoggedIn);
            }
            Err(e) => return Err(e.into()),
        };
        let session: StoredSession = serde_json::from_str(&content)?;
        if session.token.trim().is_empty() {
            return Err(SessionError::NotLoggedIn);
        }
        Ok(session)
    }

    /// Removes the stored session. A missing file is not an error.
    pub fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("Cleared stored session at {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
