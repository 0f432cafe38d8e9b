//! Client configuration.
//!
//! A [`Settings`] value describes everything needed to construct a
//! [`Client`](crate::Client): the API base URL, request timeout, cache
//! staleness window, read-retry budget, and the optional durable session
//! file. The base URL is the one piece of environment configuration the
//! client consumes (`TASKCAMP_API_URL`).

use std::{path::PathBuf, time::Duration};

use thiserror::Error;
use url::Url;

use crate::Result;

/// Environment variable naming the API base URL.
pub const API_URL_ENV: &str = "TASKCAMP_API_URL";

/// Environment variable naming the durable session file (optional).
pub const SESSION_FILE_ENV: &str = "TASKCAMP_SESSION_FILE";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(30);
const DEFAULT_FETCH_RETRIES: u32 = 2;
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Errors that can occur while assembling the client configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("Environment variable '{name}' is not set")]
    MissingEnv { name: &'static str },

    /// The configured base URL could not be parsed.
    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Configuration for a Taskcamp [`Client`](crate::Client).
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL all request paths are resolved against.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Age after which a cached read is considered stale.
    pub stale_after: Duration,
    /// How many times a transient read failure is retried.
    pub fetch_retries: u32,
    /// Base delay between read retries (grows linearly per attempt).
    pub retry_backoff: Duration,
    /// Durable slot for the serialized session. `None` keeps the session in
    /// memory only.
    pub session_file: Option<PathBuf>,
}

impl Settings {
    /// Create settings for the given API base URL with defaults for
    /// everything else.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let raw = base_url.as_ref();
        let base_url = Url::parse(raw).map_err(|e| ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            stale_after: DEFAULT_STALE_AFTER,
            fetch_retries: DEFAULT_FETCH_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            session_file: None,
        })
    }

    /// Build settings from the environment.
    ///
    /// `TASKCAMP_API_URL` is required; `TASKCAMP_SESSION_FILE` optionally
    /// selects the durable session slot.
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var(API_URL_ENV).map_err(|_| ConfigError::MissingEnv { name: API_URL_ENV })?;
        let mut settings = Self::new(base_url)?;
        if let Ok(path) = std::env::var(SESSION_FILE_ENV) {
            settings.session_file = Some(PathBuf::from(path));
        }
        Ok(settings)
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the cache staleness window.
    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    /// Set the transient read-retry budget.
    pub fn with_fetch_retries(mut self, retries: u32) -> Self {
        self.fetch_retries = retries;
        self
    }

    /// Set the base delay between read retries.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Persist the session to the given file across restarts.
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }
}
