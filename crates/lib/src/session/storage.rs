//! Pluggable persistence for the session.
//!
//! The store itself is in-memory; a [`SessionStorage`] backend mirrors every
//! change into a durable slot so the session survives a restart. The file
//! backend keeps one JSON document; a missing file simply means "not logged
//! in yet". Whether the persisted session is still honored by the server is
//! reconciled lazily: the first authenticated request after a reload either
//! succeeds or walks the refresh/expiry path.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Session, errors::SessionError};
use crate::Result;

/// A durable slot holding the serialized session.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Load the persisted session, `None` when the slot is empty.
    async fn load(&self) -> Result<Option<Session>>;

    /// Persist the given session, replacing whatever the slot held.
    async fn save(&self, session: &Session) -> Result<()>;
}

/// File-backed storage: one JSON document at a fixed path.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl SessionStorage for FileStorage {
    async fn load(&self) -> Result<Option<Session>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => {
                let session: Session = serde_json::from_str(&json)
                    .map_err(|e| SessionError::DeserializationFailed { source: e })?;
                Ok(Some(session))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SessionError::FileIo { source: e }.into()),
        }
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| SessionError::SerializationFailed { source: e })?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| SessionError::FileIo { source: e }.into())
    }
}

/// In-memory storage for tests and session-per-process use.
#[derive(Default)]
pub struct InMemoryStorage {
    slot: Mutex<Option<Session>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for InMemoryStorage {
    async fn load(&self) -> Result<Option<Session>> {
        Ok(self.slot.lock().await.clone())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        *self.slot.lock().await = Some(session.clone());
        Ok(())
    }
}
