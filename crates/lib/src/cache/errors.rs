//! Error types for the query cache.

use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CacheError {
    /// The load this caller was waiting on failed. The leader of the
    /// coalesced fetch got the structured error; waiters share this summary.
    #[error("Load failed: {message}")]
    LoadFailed { message: String },

    /// The load this caller was waiting on was dropped before completing
    /// (e.g. the leading caller was cancelled).
    #[error("Load was interrupted before completing")]
    LoadInterrupted,
}

impl CacheError {
    /// Check if this error came from a shared (coalesced) load.
    pub fn is_shared_failure(&self) -> bool {
        matches!(self, CacheError::LoadFailed { .. })
    }
}
