//! Error types for session persistence.

use thiserror::Error;

/// Errors that can occur while loading or saving the session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// Reading or writing the durable session slot failed.
    #[error("Session file I/O error: {source}")]
    FileIo {
        #[source]
        source: std::io::Error,
    },

    /// The session could not be serialized for persistence.
    #[error("Failed to serialize session: {source}")]
    SerializationFailed {
        #[source]
        source: serde_json::Error,
    },

    /// The persisted session could not be deserialized.
    #[error("Failed to deserialize session: {source}")]
    DeserializationFailed {
        #[source]
        source: serde_json::Error,
    },
}

impl SessionError {
    /// Check if this is an I/O error.
    pub fn is_io_error(&self) -> bool {
        matches!(self, SessionError::FileIo { .. })
    }

    /// Check if this is a (de)serialization error.
    pub fn is_serialization_error(&self) -> bool {
        matches!(
            self,
            SessionError::SerializationFailed { .. } | SessionError::DeserializationFailed { .. }
        )
    }
}
