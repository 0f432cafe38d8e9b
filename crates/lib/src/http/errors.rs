//! Error types for the HTTP transport layer.

use thiserror::Error;

/// A structured failure reported by the API server.
///
/// Carries the pieces of the server's error envelope (`statusCode`,
/// `message`, `errors`) together with the request path that failed, so
/// callers can tell refresh-endpoint failures apart from everything else.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code of the response.
    pub status: u16,
    /// Human-readable message, server-provided when the body was the error
    /// envelope, otherwise a generic fallback.
    pub message: String,
    /// Field-level validation errors, when the server supplied any.
    pub errors: Vec<serde_json::Value>,
    /// Request path that produced this failure.
    pub path: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} {})", self.message, self.status, self.path)
    }
}

/// Errors that can occur while talking to the API server.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HttpError {
    /// No response was received at all (DNS, connect, timeout, ...).
    #[error("Failed to reach {path}: {reason}")]
    Network { path: String, reason: String },

    /// The server answered with a non-2xx status.
    #[error("API request failed: {0}")]
    Api(ApiError),

    /// A 2xx response body could not be decoded as the expected envelope.
    #[error("Failed to decode response from {path}: {reason}")]
    Decode { path: String, reason: String },

    /// The session expired: a request got a 401 and the silent refresh
    /// failed. The session store has been cleared by the time this is
    /// returned.
    #[error("Session expired, please login again")]
    AuthExpired,

    /// A request path could not be resolved against the base URL.
    #[error("Invalid request path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },
}

impl HttpError {
    /// Status code of the failed request, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Api(api) => Some(api.status),
            _ => None,
        }
    }

    /// Check if this is a network-level failure (no response received).
    pub fn is_network_error(&self) -> bool {
        matches!(self, HttpError::Network { .. })
    }

    /// Check if this is the expired-session error.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, HttpError::AuthExpired)
    }

    /// Check if this is a 4xx failure carrying field-level errors.
    pub fn is_validation_error(&self) -> bool {
        match self {
            HttpError::Api(api) => (400..500).contains(&api.status) && !api.errors.is_empty(),
            _ => false,
        }
    }

    /// Check if this is a server fault (5xx).
    pub fn is_server_fault(&self) -> bool {
        match self {
            HttpError::Api(api) => api.status >= 500,
            _ => false,
        }
    }

    /// The server-provided message, when there is one.
    pub fn api_message(&self) -> Option<&str> {
        match self {
            HttpError::Api(api) => Some(&api.message),
            _ => None,
        }
    }

    /// The request path this failure belongs to, when known.
    pub fn path(&self) -> Option<&str> {
        match self {
            HttpError::Network { path, .. }
            | HttpError::Decode { path, .. }
            | HttpError::InvalidPath { path, .. } => Some(path),
            HttpError::Api(api) => Some(&api.path),
            HttpError::AuthExpired => None,
        }
    }
}
