//! The authenticated identity that authorizes channel use, and its on-disk copy.

use crate::error::session::SessionStoreError;

use common::{ErrorLocation, RedactedSecret};

use std::panic::Location;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

const SESSION_FILE_NAME: &str = "session.json";

/// Account, owner and auth token returned by a successful authentication.
///
/// Exactly one is active at a time; it lives inside the protocol machine and
/// is dropped (token zeroized) when the machine returns to `LoggedOut`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub account_id: String,
    pub owner_id: String,
    pub auth_token: RedactedSecret,
}

impl Session {
    pub fn new(
        account_id: impl Into<String>,
        owner_id: impl Into<String>,
        auth_token: RedactedSecret,
    ) -> Self {
        Self {
            account_id: account_id.into(),
            owner_id: owner_id.into(),
            auth_token,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct StoredSession {
    account_id: String,
    owner_id: String,
    auth_token: String,
}

/// `session.json` in the config directory, so a restart can resume without
/// asking for credentials again.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join(SESSION_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored session, or `None` if nothing was saved.
    ///
    /// # Errors
    ///
    /// Returns [`SessionStoreError`] if the file exists but cannot be read or parsed.
    #[track_caller]
    pub fn load(&self) -> Result<Option<Session>, SessionStoreError> {
        let location = ErrorLocation::from(Location::caller());

        if !self.path.exists() {
            return Ok(None);
        }

        let contents =
            std::fs::read_to_string(&self.path).map_err(|e| SessionStoreError::Read {
                location,
                path: self.path.clone(),
                source: e,
            })?;

        let stored: StoredSession =
            serde_json::from_str(&contents).map_err(|e| SessionStoreError::Parse {
                location,
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        info!("Loaded stored session for account {}", stored.account_id);
        Ok(Some(Session::new(
            stored.account_id,
            stored.owner_id,
            RedactedSecret::new(stored.auth_token),
        )))
    }

    /// Save using temp file + rename.
    #[track_caller]
    pub fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        let location = ErrorLocation::from(Location::caller());
        let stored = StoredSession {
            account_id: session.account_id.clone(),
            owner_id: session.owner_id.clone(),
            auth_token: session.auth_token.expose().to_string(),
        };

        let json = serde_json::to_string_pretty(&stored).map_err(|e| SessionStoreError::Parse {
            location,
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| SessionStoreError::Write {
                location,
                path: dir.to_path_buf(),
                source: e,
            })?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, json).map_err(|e| SessionStoreError::Write {
            location,
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &self.path).map_err(|e| SessionStoreError::Write {
            location,
            path: self.path.clone(),
            source: e,
        })?;

        info!("Session saved to {}", self.path.display());
        Ok(())
    }

    /// Forget the stored session. Missing file is fine.
    #[track_caller]
    pub fn clear(&self) -> Result<(), SessionStoreError> {
        let location = ErrorLocation::from(Location::caller());

        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Stored session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!("Failed to clear stored session: {e}");
                Err(SessionStoreError::Write {
                    location,
                    path: self.path.clone(),
                    source: e,
                })
            }
        }
    }
}
