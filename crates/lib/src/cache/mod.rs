//! Query/mutation cache.
//!
//! The [`QueryCache`] coordinates UI-facing reads and writes:
//!
//! * `fetch` serves a fresh cached value or runs the loader, coalescing
//!   concurrent fetches of the same key into a single loader run;
//! * `invalidate` marks every entry under a key prefix stale, and poisons
//!   matching in-flight loads so a result from before the invalidation can
//!   never be written back;
//! * `mutate` runs a write and invalidates the declared prefixes only on
//!   success — a failed mutation leaves every entry untouched.
//!
//! Values are stored as raw JSON; typed access deserializes at the edge.
//! Transient read failures (network, 5xx) are retried a bounded number of
//! times with linear backoff. Client errors are never retried here: 401 is
//! the refresh interceptor's business and 4xx will not improve by asking
//! again.

mod errors;
mod key;

pub use errors::CacheError;
pub use key::QueryKey;

use std::{
    collections::HashMap,
    sync::Mutex,
    time::{Duration, Instant},
};

use serde_json::Value;
use tokio::sync::watch;

use crate::{Result, Settings};

/// Failure form shared with the waiters of a coalesced load. Errors are not
/// cloneable, so waiters get a classified summary; the leader keeps the
/// structured error. Session expiry keeps its identity so waiters suppress
/// the generic failure toast the same way the leader does.
#[derive(Debug, Clone)]
enum SharedError {
    AuthExpired,
    Other(String),
}

/// Outcome shared with the waiters of a coalesced load.
type SharedOutcome = std::result::Result<Value, SharedError>;

struct CacheEntry {
    value: Value,
    fetched_at: Instant,
    stale: bool,
}

struct InFlight {
    rx: watch::Receiver<Option<SharedOutcome>>,
    /// Set when an invalidation lands while the load is running; the result
    /// is still handed to waiters but never stored.
    poisoned: bool,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<QueryKey, CacheEntry>,
    in_flight: HashMap<QueryKey, InFlight>,
}

enum Role {
    Hit(Value),
    Waiter(watch::Receiver<Option<SharedOutcome>>),
    Leader(watch::Sender<Option<SharedOutcome>>),
}

/// Process-wide cache keyed by [`QueryKey`].
pub struct QueryCache {
    inner: Mutex<CacheInner>,
    stale_after: Duration,
    fetch_retries: u32,
    retry_backoff: Duration,
}

impl QueryCache {
    pub fn new(settings: &Settings) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            stale_after: settings.stale_after,
            fetch_retries: settings.fetch_retries,
            retry_backoff: settings.retry_backoff,
        }
    }

    /// Fetch the value for `key`, deserialized as `T`.
    ///
    /// Serves the cached value when present and fresh; otherwise runs the
    /// loader. Concurrent fetches of the same key share one loader run.
    pub async fn fetch<T, F, Fut>(&self, key: &QueryKey, loader: F) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        let value = self.fetch_value(key, loader).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Untyped fetch; see [`QueryCache::fetch`].
    pub async fn fetch_value<F, Fut>(&self, key: &QueryKey, loader: F) -> Result<Value>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        let role = {
            let mut inner = self.inner.lock().expect("cache lock poisoned");
            if let Some(entry) = inner.entries.get(key)
                && !entry.stale
                && entry.fetched_at.elapsed() < self.stale_after
            {
                Role::Hit(entry.value.clone())
            } else if let Some(flight) = inner.in_flight.get(key) {
                Role::Waiter(flight.rx.clone())
            } else {
                let (tx, rx) = watch::channel(None);
                inner
                    .in_flight
                    .insert(key.clone(), InFlight { rx, poisoned: false });
                Role::Leader(tx)
            }
        };

        match role {
            Role::Hit(value) => {
                tracing::trace!(key = %key, "cache hit");
                Ok(value)
            }
            Role::Waiter(rx) => self.wait_for_leader(key, rx).await,
            Role::Leader(tx) => self.lead_load(key, loader, tx).await,
        }
    }

    /// Run the loader as the single in-flight load for `key`, retrying
    /// transient failures, then publish the outcome to any waiters.
    async fn lead_load<F, Fut>(
        &self,
        key: &QueryKey,
        loader: F,
        tx: watch::Sender<Option<SharedOutcome>>,
    ) -> Result<Value>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        let mut attempt = 0;
        let result = loop {
            match loader().await {
                Ok(value) => break Ok(value),
                Err(err) if attempt < self.fetch_retries && err.is_transient() => {
                    attempt += 1;
                    tracing::debug!(key = %key, attempt, "retrying transient load failure: {err}");
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                }
                Err(err) => break Err(err),
            }
        };

        let poisoned = {
            let mut inner = self.inner.lock().expect("cache lock poisoned");
            let poisoned = inner
                .in_flight
                .remove(key)
                .map(|flight| flight.poisoned)
                .unwrap_or(false);
            if let Ok(value) = &result
                && !poisoned
            {
                inner.entries.insert(
                    key.clone(),
                    CacheEntry {
                        value: value.clone(),
                        fetched_at: Instant::now(),
                        stale: false,
                    },
                );
            }
            poisoned
        };
        if poisoned {
            tracing::debug!(key = %key, "load raced an invalidation, result not cached");
        }

        let shared = match &result {
            Ok(value) => Ok(value.clone()),
            Err(err) if err.is_auth_expired() => Err(SharedError::AuthExpired),
            Err(err) => Err(SharedError::Other(err.to_string())),
        };
        let _ = tx.send(Some(shared));
        result
    }

    /// Wait for the in-flight load led by another caller.
    async fn wait_for_leader(
        &self,
        key: &QueryKey,
        mut rx: watch::Receiver<Option<SharedOutcome>>,
    ) -> Result<Value> {
        tracing::trace!(key = %key, "coalescing into in-flight load");
        loop {
            if let Some(outcome) = rx.borrow_and_update().clone() {
                return outcome.map_err(|shared| match shared {
                    SharedError::AuthExpired => crate::http::HttpError::AuthExpired.into(),
                    SharedError::Other(message) => CacheError::LoadFailed { message }.into(),
                });
            }
            if rx.changed().await.is_err() {
                // Leader was cancelled before publishing.
                return Err(CacheError::LoadInterrupted.into());
            }
        }
    }

    /// Mark every entry under `prefix` stale and poison matching in-flight
    /// loads. Entries outside the prefix are untouched.
    pub fn invalidate(&self, prefix: &QueryKey) {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        let mut stale = 0;
        for (key, entry) in inner.entries.iter_mut() {
            if key.starts_with(prefix) {
                entry.stale = true;
                stale += 1;
            }
        }
        for (key, flight) in inner.in_flight.iter_mut() {
            if key.starts_with(prefix) {
                flight.poisoned = true;
            }
        }
        tracing::debug!(prefix = %prefix, entries = stale, "invalidated cache entries");
    }

    /// Mark the entry for exactly `key` stale, leaving entries nested under
    /// it fresh. A matching in-flight load is poisoned like in
    /// [`QueryCache::invalidate`].
    pub fn invalidate_exact(&self, key: &QueryKey) {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        if let Some(entry) = inner.entries.get_mut(key) {
            entry.stale = true;
        }
        if let Some(flight) = inner.in_flight.get_mut(key) {
            flight.poisoned = true;
        }
        tracing::debug!(key = %key, "invalidated cache entry");
    }

    /// Run a write operation; on success invalidate the declared prefixes.
    ///
    /// A failed mutation is assumed to have changed nothing, so no
    /// invalidation happens and the error propagates to the caller.
    pub async fn mutate<T, Fut>(&self, invalidates: &[QueryKey], action: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        let output = action.await?;
        for prefix in invalidates {
            self.invalidate(prefix);
        }
        Ok(output)
    }

    /// The cached value for `key`, fresh or not. Test and debugging aid.
    pub fn peek(&self, key: &QueryKey) -> Option<Value> {
        let inner = self.inner.lock().expect("cache lock poisoned");
        inner.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Drop every entry. Used on logout so the next login starts clean.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        inner.entries.clear();
        for flight in inner.in_flight.values_mut() {
            flight.poisoned = true;
        }
    }
}
