//! Typed API surface.
//!
//! [`Client`] is the top-level handle: it owns the HTTP client, the session
//! store, the query cache, and the notifier, and hands out grouped operation
//! structs ([`AuthApi`], [`ProjectsApi`], [`TasksApi`]). Every read goes
//! through the cache; every mutation declares the key prefixes it
//! invalidates on success. Failed operations are reported once through the
//! notifier and propagated to the caller.

mod auth;
mod projects;
mod tasks;
pub mod types;

pub use auth::{AuthApi, current_user_key};
pub use projects::{ProjectsApi, project_key, project_members_key, projects_key};
pub use tasks::{TasksApi, subtasks_key, task_key, tasks_key};

use std::sync::Arc;

use serde_json::Value;

use crate::{
    Result, Settings,
    cache::{QueryCache, QueryKey},
    http::{ApiRequest, HttpClient},
    notify::{Notification, Notifier},
    session::{FileStorage, InMemoryStorage, SessionStore, SessionStorage},
};

/// Cache key for the server health probe.
pub fn server_health_key() -> QueryKey {
    QueryKey::new(["serverHealth"])
}

/// Top-level client handle.
///
/// Cheap to clone; all clones share the same session store, cache, and
/// notification channel.
#[derive(Clone)]
pub struct Client {
    http: Arc<HttpClient>,
    session: Arc<SessionStore>,
    cache: Arc<QueryCache>,
    notifier: Notifier,
}

impl Client {
    /// Construct a client from settings.
    ///
    /// The session is rehydrated from `settings.session_file` when one is
    /// configured, otherwise kept in memory only.
    pub async fn new(settings: Settings) -> Result<Self> {
        let storage: Box<dyn SessionStorage> = match &settings.session_file {
            Some(path) => Box::new(FileStorage::new(path)),
            None => Box::new(InMemoryStorage::new()),
        };
        Self::with_storage(settings, storage).await
    }

    /// Construct a client with an explicit session storage backend.
    pub async fn with_storage(
        settings: Settings,
        storage: Box<dyn SessionStorage>,
    ) -> Result<Self> {
        let notifier = Notifier::new();
        let session = Arc::new(SessionStore::open(storage).await?);
        let http = Arc::new(HttpClient::new(
            &settings,
            Arc::clone(&session),
            notifier.clone(),
        )?);
        let cache = Arc::new(QueryCache::new(&settings));
        Ok(Self {
            http,
            session,
            cache,
            notifier,
        })
    }

    /// Authentication and profile operations.
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    /// Project and membership operations.
    pub fn projects(&self) -> ProjectsApi<'_> {
        ProjectsApi::new(self)
    }

    /// Task, subtask, and attachment operations.
    pub fn tasks(&self) -> TasksApi<'_> {
        TasksApi::new(self)
    }

    /// The session store.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// The query cache.
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Subscribe to user-visible notifications.
    pub fn notifications(&self) -> tokio::sync::broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    /// Probe the server health endpoint.
    ///
    /// Bypasses the refresh interceptor so an unauthenticated probe cannot
    /// trigger session side effects.
    pub async fn health(&self) -> Result<Value> {
        let http = Arc::clone(&self.http);
        self.cache
            .fetch_value(&server_health_key(), move || {
                let http = Arc::clone(&http);
                async move { Ok(http.probe("/healthCheck").await?.data) }
            })
            .await
    }

    // === Internal plumbing shared by the operation groups ===

    /// Cached GET of `path` under `key`.
    pub(crate) async fn read<T>(&self, key: QueryKey, path: impl Into<String>) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let http = Arc::clone(&self.http);
        let path: String = path.into();
        let result = self
            .cache
            .fetch(&key, move || {
                let http = Arc::clone(&http);
                let path = path.clone();
                async move { http.get_value(&path).await }
            })
            .await;
        if let Err(err) = &result {
            self.notifier.report_failure(err);
        }
        result
    }

    /// Run a mutation expecting a typed payload back; invalidate `invalidates`
    /// on success.
    pub(crate) async fn write<T>(&self, invalidates: &[QueryKey], request: ApiRequest) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let result = self
            .cache
            .mutate(invalidates, async {
                self.http.execute(request).await?.into_data::<T>()
            })
            .await;
        if let Err(err) = &result {
            self.notifier.report_failure(err);
        }
        result
    }

    /// Run a mutation whose payload we do not care about.
    pub(crate) async fn write_ack(
        &self,
        invalidates: &[QueryKey],
        request: ApiRequest,
    ) -> Result<()> {
        let result = self
            .cache
            .mutate(invalidates, async {
                self.http.execute(request).await.map(|_| ())
            })
            .await;
        if let Err(err) = &result {
            self.notifier.report_failure(err);
        }
        result
    }

    pub(crate) fn notifier(&self) -> &Notifier {
        &self.notifier
    }
}
