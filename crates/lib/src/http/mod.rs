//! HTTP transport for the Taskcamp API.
//!
//! [`HttpClient`] wraps `reqwest` with everything every call needs: the
//! configured base URL, cookie-based credentials, the JSON response envelope,
//! and the session refresh interceptor. Requests default to JSON; individual
//! calls override the body for multipart uploads.
//!
//! The interceptor implements the one-shot refresh policy: a 401 on a
//! request that has not been retried triggers exactly one silent
//! `POST /auth/refresh-token`, then one re-dispatch of the original request.
//! A second 401, or a failed refresh, ends the session.

mod envelope;
mod errors;
mod request;

pub use envelope::{Envelope, ErrorBody};
pub use errors::{ApiError, HttpError};
pub use request::{ApiRequest, Body, FileUpload, MultipartSpec};

use std::sync::Arc;

use serde_json::Value;
use url::Url;

use crate::{Error, Result, Settings, notify::Notifier, session::SessionStore};

/// Endpoint used for silent session refresh.
pub const REFRESH_PATH: &str = "/auth/refresh-token";

/// HTTP client for the Taskcamp API.
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: Url,
    session: Arc<SessionStore>,
    notifier: Notifier,
}

impl HttpClient {
    /// Create a client from settings.
    ///
    /// The underlying `reqwest` client keeps a cookie store, which is how the
    /// server-issued access and refresh token cookies ride along with every
    /// request.
    pub fn new(settings: &Settings, session: Arc<SessionStore>, notifier: Notifier) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| HttpError::Network {
                path: settings.base_url.to_string(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            inner,
            base_url: settings.base_url.clone(),
            session,
            notifier,
        })
    }

    /// Execute a request through the refresh interceptor.
    ///
    /// This is the entry point all API operations use. The 401 handling is
    /// skipped for the refresh endpoint itself.
    pub async fn execute(&self, mut request: ApiRequest) -> Result<Envelope> {
        match self.dispatch(&request).await {
            Err(err)
                if err.status() == Some(401)
                    && !request.retried
                    && request.path != REFRESH_PATH =>
            {
                request.retried = true;
                tracing::debug!(path = %request.path, "got 401, attempting silent session refresh");
                match self.dispatch(&ApiRequest::post(REFRESH_PATH)).await {
                    Ok(_) => {
                        tracing::debug!(path = %request.path, "session refreshed, retrying request");
                        self.dispatch(&request).await
                    }
                    Err(refresh_err) => {
                        tracing::warn!("session refresh failed: {refresh_err}");
                        self.session.clear().await?;
                        self.notifier.session_expired();
                        Err(HttpError::AuthExpired.into())
                    }
                }
            }
            other => other,
        }
    }

    /// Execute a request and return the envelope's `data` payload untyped.
    pub async fn execute_value(&self, request: ApiRequest) -> Result<Value> {
        Ok(self.execute(request).await?.data)
    }

    /// GET a path and return the payload untyped.
    pub async fn get_value(&self, path: &str) -> Result<Value> {
        self.execute_value(ApiRequest::get(path)).await
    }

    /// Send a request once, bypassing the refresh interceptor.
    ///
    /// Used for the health probe, which must not trigger refresh
    /// side effects.
    pub async fn probe(&self, path: &str) -> Result<Envelope> {
        self.dispatch(&ApiRequest::get(path)).await
    }

    /// Download raw bytes from an absolute URL.
    ///
    /// Attachment files live on external storage, outside the API's response
    /// envelope, so this skips envelope decoding and the refresh interceptor.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let parsed = Url::parse(url).map_err(|e| HttpError::InvalidPath {
            path: url.to_string(),
            reason: e.to_string(),
        })?;
        let response = self
            .inner
            .get(parsed)
            .send()
            .await
            .map_err(|e| HttpError::Network {
                path: url.to_string(),
                reason: e.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http(HttpError::Api(ApiError {
                status: status.as_u16(),
                message: format!("Request failed with status {status}"),
                errors: vec![],
                path: url.to_string(),
            })));
        }
        let bytes = response.bytes().await.map_err(|e| HttpError::Network {
            path: url.to_string(),
            reason: format!("failed to read response body: {e}"),
        })?;
        Ok(bytes.to_vec())
    }

    /// Resolve a request path against the base URL.
    fn resolve(&self, path: &str) -> Result<Url> {
        // Url::join treats the base path as a directory only with a trailing
        // slash; splice the path strings instead so a base of ".../api/v1"
        // keeps its prefix.
        let mut url = self.base_url.clone();
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        Ok(url)
    }

    /// Send one request and decode the envelope. No retry logic here; this
    /// is the single-dispatch primitive the interceptor composes.
    async fn dispatch(&self, request: &ApiRequest) -> Result<Envelope> {
        let url = self.resolve(&request.path)?;
        let mut builder = self.inner.request(request.method.clone(), url);
        match &request.body {
            Body::Empty => {}
            Body::Json(value) => builder = builder.json(value),
            Body::Multipart(spec) => builder = builder.multipart(spec.to_form()?),
        }

        let response = builder.send().await.map_err(|e| HttpError::Network {
            path: request.path.clone(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| HttpError::Network {
            path: request.path.clone(),
            reason: format!("failed to read response body: {e}"),
        })?;

        if status.is_success() {
            let envelope: Envelope =
                serde_json::from_slice(&bytes).map_err(|e| HttpError::Decode {
                    path: request.path.clone(),
                    reason: e.to_string(),
                })?;
            Ok(envelope)
        } else {
            let api_error = match serde_json::from_slice::<ErrorBody>(&bytes) {
                Ok(body) => ApiError {
                    status: status.as_u16(),
                    message: body.message,
                    errors: body.errors,
                    path: request.path.clone(),
                },
                // Not the error envelope (e.g. a proxy page); keep the status.
                Err(_) => ApiError {
                    status: status.as_u16(),
                    message: format!("Request failed with status {status}"),
                    errors: vec![],
                    path: request.path.clone(),
                },
            };
            tracing::debug!(path = %request.path, status = status.as_u16(), "request failed");
            Err(Error::Http(HttpError::Api(api_error)))
        }
    }
}
