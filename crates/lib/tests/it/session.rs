//! Refresh-and-retry interceptor behavior.

use std::time::Duration;

use axum::{
    Router,
    extract::Multipart,
    http::StatusCode,
    routing::{get, patch, post},
};
use serde_json::json;
use taskcamp::{http::FileUpload, notify::Notification};

use crate::helpers::{Counter, envelope, error_body, serve, test_client, user_json};

/// A 401 on an API call triggers exactly one refresh and one retry of the
/// original request.
#[tokio::test]
async fn test_401_refreshes_once_and_retries_once() {
    let projects_calls = Counter::default();
    let refresh_calls = Counter::default();
    let router = Router::new()
        .route(
            "/projects",
            get({
                let projects_calls = projects_calls.clone();
                move || {
                    let n = projects_calls.incr();
                    async move {
                        if n == 0 {
                            error_body(StatusCode::UNAUTHORIZED, "jwt expired")
                        } else {
                            envelope(json!([]))
                        }
                    }
                }
            }),
        )
        .route(
            "/auth/refresh-token",
            post({
                let refresh_calls = refresh_calls.clone();
                move || {
                    refresh_calls.incr();
                    async move { envelope(json!({})) }
                }
            }),
        );

    let client = test_client(serve(router).await).await;
    let items = client.projects().list().await.unwrap();

    assert!(items.is_empty());
    assert_eq!(refresh_calls.get(), 1);
    assert_eq!(projects_calls.get(), 2, "original request plus one retry");
}

/// A second 401 after a successful refresh is not retried again; the error
/// reaches the caller and the refresh ran only once.
#[tokio::test]
async fn test_retried_request_is_never_retried_again() {
    let projects_calls = Counter::default();
    let refresh_calls = Counter::default();
    let router = Router::new()
        .route(
            "/projects",
            get({
                let projects_calls = projects_calls.clone();
                move || {
                    projects_calls.incr();
                    async move { error_body(StatusCode::UNAUTHORIZED, "jwt expired") }
                }
            }),
        )
        .route(
            "/auth/refresh-token",
            post({
                let refresh_calls = refresh_calls.clone();
                move || {
                    refresh_calls.incr();
                    async move { envelope(json!({})) }
                }
            }),
        );

    let client = test_client(serve(router).await).await;
    let err = client.projects().list().await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert!(!err.is_auth_expired());
    assert_eq!(refresh_calls.get(), 1);
    assert_eq!(projects_calls.get(), 2);
}

/// When the refresh endpoint itself fails the session is cleared, the
/// expiry signal is published, and the original request is not retried.
#[tokio::test]
async fn test_failed_refresh_expires_the_session() {
    let projects_calls = Counter::default();
    let refresh_calls = Counter::default();
    let router = Router::new()
        .route(
            "/projects",
            get({
                let projects_calls = projects_calls.clone();
                move || {
                    projects_calls.incr();
                    async move { error_body(StatusCode::UNAUTHORIZED, "jwt expired") }
                }
            }),
        )
        .route(
            "/auth/refresh-token",
            post({
                let refresh_calls = refresh_calls.clone();
                move || {
                    refresh_calls.incr();
                    async move {
                        error_body(StatusCode::UNAUTHORIZED, "refresh token expired")
                    }
                }
            }),
        );

    let client = test_client(serve(router).await).await;
    let user = serde_json::from_value(user_json("u1")).unwrap();
    client.session().set(user).await.unwrap();
    let mut notifications = client.notifications();

    let err = client.projects().list().await.unwrap_err();

    assert!(err.is_auth_expired());
    assert!(!client.session().is_authenticated().await);
    assert_eq!(
        notifications.recv().await.unwrap(),
        Notification::SessionExpired
    );
    // The refresh endpoint's own 401 must not recurse into another refresh,
    // and the original request is not retried on this path.
    assert_eq!(refresh_calls.get(), 1);
    assert_eq!(projects_calls.get(), 1);
}

/// A multipart request is rebuilt from its spec for the post-refresh retry;
/// the retried upload arrives with the same field and bytes.
#[tokio::test]
async fn test_multipart_request_is_rebuilt_for_the_retry() {
    let avatar_calls = Counter::default();
    let refresh_calls = Counter::default();
    let router = Router::new()
        .route(
            "/auth/avatar",
            patch({
                let avatar_calls = avatar_calls.clone();
                move |mut multipart: Multipart| {
                    let n = avatar_calls.incr();
                    async move {
                        let field = multipart.next_field().await.unwrap().unwrap();
                        let name = field.name().map(str::to_owned);
                        let bytes = field.bytes().await.unwrap();
                        if n == 0 {
                            return error_body(StatusCode::UNAUTHORIZED, "jwt expired");
                        }
                        assert_eq!(name.as_deref(), Some("avatar"));
                        assert_eq!(&bytes[..], b"pngbytes");
                        envelope(user_json("u1"))
                    }
                }
            }),
        )
        .route(
            "/auth/refresh-token",
            post({
                let refresh_calls = refresh_calls.clone();
                move || {
                    refresh_calls.incr();
                    async move { envelope(json!({})) }
                }
            }),
        );

    let client = test_client(serve(router).await).await;
    let upload = FileUpload::new("me.png", "image/png", b"pngbytes".to_vec());
    let user = client.auth().update_avatar(upload).await.unwrap();

    assert_eq!(user.id, "u1");
    assert_eq!(refresh_calls.get(), 1);
    assert_eq!(avatar_calls.get(), 2, "original upload plus one retry");
}

/// When concurrent reads coalesce and the load dies on an expired session,
/// waiters share the expiry outcome instead of a generic load failure, and
/// the expiry signal is published exactly once.
#[tokio::test]
async fn test_coalesced_reads_share_the_expiry_outcome() {
    let refresh_calls = Counter::default();
    let router = Router::new()
        .route(
            "/projects",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                error_body(StatusCode::UNAUTHORIZED, "jwt expired")
            }),
        )
        .route(
            "/auth/refresh-token",
            post({
                let refresh_calls = refresh_calls.clone();
                move || {
                    refresh_calls.incr();
                    async move {
                        error_body(StatusCode::UNAUTHORIZED, "refresh token expired")
                    }
                }
            }),
        );

    let client = test_client(serve(router).await).await;
    let mut notifications = client.notifications();

    let waiter = {
        let client = client.clone();
        tokio::spawn(async move {
            // Join after the leader's request is in flight.
            tokio::time::sleep(Duration::from_millis(10)).await;
            client.projects().list().await
        })
    };
    let leader_err = client.projects().list().await.unwrap_err();
    let waiter_err = waiter.await.unwrap().unwrap_err();

    assert!(leader_err.is_auth_expired());
    assert!(waiter_err.is_auth_expired());
    assert_eq!(refresh_calls.get(), 1);
    assert_eq!(
        notifications.recv().await.unwrap(),
        Notification::SessionExpired
    );
    assert!(
        matches!(
            notifications.try_recv(),
            Err(tokio::sync::broadcast::error::TryRecvError::Empty)
        ),
        "the waiter's failure must not add a generic error notification"
    );
}

/// An expired session produces the expiry signal only, not an additional
/// generic error notification.
#[tokio::test]
async fn test_expiry_produces_a_single_notification() {
    let router = Router::new()
        .route(
            "/projects",
            get(|| async { error_body(StatusCode::UNAUTHORIZED, "jwt expired") }),
        )
        .route(
            "/auth/refresh-token",
            post(|| async { error_body(StatusCode::UNAUTHORIZED, "refresh token expired") }),
        );

    let client = test_client(serve(router).await).await;
    let mut notifications = client.notifications();

    let err = client.projects().list().await.unwrap_err();
    assert!(err.is_auth_expired());

    assert_eq!(
        notifications.recv().await.unwrap(),
        Notification::SessionExpired
    );
    assert!(
        matches!(
            notifications.try_recv(),
            Err(tokio::sync::broadcast::error::TryRecvError::Empty)
        ),
        "expiry must not be doubled by a generic error notification"
    );
}
