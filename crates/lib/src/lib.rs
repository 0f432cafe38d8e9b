//!
//! Taskcamp client: a typed, async client for the Taskcamp project & task
//! management REST API.
//!
//! ## Core Concepts
//!
//! The client is built around a few cooperating pieces:
//!
//! * **HTTP client (`http::HttpClient`)**: wraps `reqwest` with the server's
//!   JSON response envelope, cookie-based credentials, and a one-shot
//!   refresh-and-retry interceptor for expired sessions.
//! * **Query cache (`cache::QueryCache`)**: a process-wide cache keyed by
//!   resource tuples (e.g. `["tasks", project_id]`). Concurrent reads of the
//!   same key coalesce into one request; mutations invalidate the affected
//!   key prefixes on success.
//! * **Session store (`session::SessionStore`)**: holds the authenticated
//!   user, persisted through a pluggable `SessionStorage` backend so a
//!   restart does not require a fresh login.
//! * **Notifier (`notify::Notifier`)**: a broadcast channel carrying the
//!   user-visible notifications (success messages, API failures, session
//!   expiry) that a front-end would render as toasts.
//! * **API surface (`api::Client`)**: typed operations grouped by resource
//!   (`client.auth()`, `client.projects()`, `client.tasks()`), each wired to
//!   the cache keys it reads or invalidates.

pub mod api;
pub mod cache;
pub mod config;
pub mod http;
pub mod notify;
pub mod session;

/// Re-export the top-level client handle for easier access.
pub use api::Client;
/// Re-export the settings struct used to construct a [`Client`].
pub use config::Settings;

/// Result type used throughout the Taskcamp client library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Taskcamp client library.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured transport and API errors from the http module
    #[error(transparent)]
    Http(#[from] http::HttpError),

    /// Structured session errors from the session module
    #[error(transparent)]
    Session(#[from] session::SessionError),

    /// Structured cache errors from the cache module
    #[error(transparent)]
    Cache(#[from] cache::CacheError),

    /// Structured configuration errors from the config module
    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Http(_) => "http",
            Error::Session(_) => "session",
            Error::Cache(_) => "cache",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// HTTP status code of the failed request, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http(http_err) => http_err.status(),
            _ => None,
        }
    }

    /// Check if this error indicates the request never got a response.
    pub fn is_network_error(&self) -> bool {
        match self {
            Error::Http(http_err) => http_err.is_network_error(),
            _ => false,
        }
    }

    /// Check if this error indicates an expired session (401 after a failed
    /// refresh). Fully handled at the interceptor boundary: the session store
    /// has already been cleared and a `SessionExpired` notification emitted.
    pub fn is_auth_expired(&self) -> bool {
        match self {
            Error::Http(http_err) => http_err.is_auth_expired(),
            _ => false,
        }
    }

    /// Check if this error indicates the server refused the operation (403).
    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403)
    }

    /// Check if this error indicates a resource was not found (404).
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Check if this error carries field-level validation failures from the
    /// server (4xx with a populated `errors` array).
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Http(http_err) => http_err.is_validation_error(),
            _ => false,
        }
    }

    /// Check if this error is a server fault (5xx).
    pub fn is_server_fault(&self) -> bool {
        match self {
            Error::Http(http_err) => http_err.is_server_fault(),
            _ => false,
        }
    }

    /// Check if this failure is worth retrying (transient transport or
    /// server-side trouble, never a client error).
    pub fn is_transient(&self) -> bool {
        self.is_network_error() || self.is_server_fault()
    }

    /// The server-provided message of a failed request, when there is one.
    pub fn api_message(&self) -> Option<&str> {
        match self {
            Error::Http(http_err) => http_err.api_message(),
            _ => None,
        }
    }
}
