//! Local session state.
//!
//! The [`SessionStore`] is the process-wide record of who is logged in. It is
//! written on login, on every `current-user` fetch, and cleared on logout or
//! when the refresh interceptor gives up on a session. Reads are cheap
//! snapshots with no side effects. All writes go through the store's public
//! operations and are mirrored into the configured [`SessionStorage`]
//! backend.

mod errors;
mod storage;

pub use errors::SessionError;
pub use storage::{FileStorage, InMemoryStorage, SessionStorage};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{Result, api::types::User};

/// A snapshot of the authentication state.
///
/// Constructed only through [`Session::anonymous`] and
/// [`Session::authenticated`], which keeps the invariant that
/// `is_authenticated` is true exactly when a user profile is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    is_authenticated: bool,
    user: Option<User>,
}

impl Session {
    /// The logged-out state.
    pub fn anonymous() -> Self {
        Self {
            is_authenticated: false,
            user: None,
        }
    }

    /// The logged-in state for the given user.
    pub fn authenticated(user: User) -> Self {
        Self {
            is_authenticated: true,
            user: Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Repair a session whose flag and profile disagree (e.g. a hand-edited
    /// or truncated persistence file). Anything inconsistent collapses to
    /// anonymous.
    fn normalized(self) -> Self {
        if self.is_authenticated != self.user.is_some() {
            tracing::warn!("persisted session was inconsistent, treating as anonymous");
            Self::anonymous()
        } else {
            self
        }
    }
}

/// Process-wide session store.
///
/// Constructed once at client startup and rehydrated from the storage
/// backend, then lives for the lifetime of the process.
pub struct SessionStore {
    state: RwLock<Session>,
    storage: Box<dyn SessionStorage>,
}

impl SessionStore {
    /// Open the store, rehydrating the persisted session when there is one.
    pub async fn open(storage: Box<dyn SessionStorage>) -> Result<Self> {
        let state = match storage.load().await {
            Ok(Some(session)) => session.normalized(),
            Ok(None) => Session::anonymous(),
            Err(e) => {
                // A corrupt session slot must not brick the client.
                tracing::warn!("failed to load persisted session: {e}, starting anonymous");
                Session::anonymous()
            }
        };
        if state.is_authenticated() {
            tracing::debug!("rehydrated authenticated session from storage");
        }
        Ok(Self {
            state: RwLock::new(state),
            storage,
        })
    }

    /// A clone of the current session.
    pub async fn snapshot(&self) -> Session {
        self.state.read().await.clone()
    }

    /// Whether a user is currently logged in.
    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    /// The current user profile, when logged in.
    pub async fn current_user(&self) -> Option<User> {
        self.state.read().await.user().cloned()
    }

    /// Mark the session authenticated with the given profile and persist it.
    pub async fn set(&self, user: User) -> Result<()> {
        let session = Session::authenticated(user);
        *self.state.write().await = session.clone();
        self.storage.save(&session).await
    }

    /// Reset to the logged-out state and persist it.
    pub async fn clear(&self) -> Result<()> {
        let session = Session::anonymous();
        *self.state.write().await = session.clone();
        self.storage.save(&session).await
    }
}
