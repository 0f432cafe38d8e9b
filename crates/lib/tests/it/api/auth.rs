//! Authentication flows.

use axum::{
    Router,
    extract::Multipart,
    routing::{get, patch, post},
};
use serde_json::json;
use taskcamp::{http::FileUpload, notify::Notification};

use crate::helpers::{Counter, envelope, project_item_json, serve, test_client, user_json};

#[tokio::test]
async fn test_login_marks_the_session_authenticated() {
    let router = Router::new().route(
        "/auth/login",
        post(|| async { envelope(user_json("u1")) }),
    );

    let client = test_client(serve(router).await).await;
    let mut notifications = client.notifications();
    assert!(!client.session().is_authenticated().await);

    let user = client
        .auth()
        .login("camper@example.com", "hunter2")
        .await
        .unwrap();

    assert_eq!(user.id, "u1");
    assert!(client.session().is_authenticated().await);
    assert_eq!(
        client.session().current_user().await.map(|u| u.id),
        Some("u1".into())
    );
    assert_eq!(
        notifications.recv().await.unwrap(),
        Notification::Info("Logged in successfully!".into())
    );
}

#[tokio::test]
async fn test_logout_drops_session_and_cached_data() {
    let list_calls = Counter::default();
    let router = Router::new()
        .route("/auth/login", post(|| async { envelope(user_json("u1")) }))
        .route("/auth/logout", post(|| async { envelope(json!({})) }))
        .route(
            "/projects",
            get({
                let list_calls = list_calls.clone();
                move || {
                    list_calls.incr();
                    async move { envelope(json!([project_item_json("p1")])) }
                }
            }),
        );

    let client = test_client(serve(router).await).await;
    client
        .auth()
        .login("camper@example.com", "hunter2")
        .await
        .unwrap();
    client.projects().list().await.unwrap();
    assert_eq!(list_calls.get(), 1);

    client.auth().logout().await.unwrap();

    assert!(!client.session().is_authenticated().await);
    assert!(client.session().current_user().await.is_none());
    // The whole cache was cleared, so the next read goes to the server.
    client.projects().list().await.unwrap();
    assert_eq!(list_calls.get(), 2);
}

/// An avatar upload goes out as multipart with the file under the `avatar`
/// field, and the refreshed profile lands in the session store.
#[tokio::test]
async fn test_update_avatar_uploads_multipart() {
    let router = Router::new().route(
        "/auth/avatar",
        patch(|mut multipart: Multipart| async move {
            let field = multipart.next_field().await.unwrap().unwrap();
            assert_eq!(field.name(), Some("avatar"));
            assert_eq!(field.file_name(), Some("me.png"));
            assert_eq!(field.content_type(), Some("image/png"));
            assert_eq!(&field.bytes().await.unwrap()[..], b"pngbytes");
            envelope(user_json("u1"))
        }),
    );

    let client = test_client(serve(router).await).await;
    let upload = FileUpload::new("me.png", "image/png", b"pngbytes".to_vec());
    let user = client.auth().update_avatar(upload).await.unwrap();

    assert_eq!(user.id, "u1");
    assert_eq!(
        client.session().current_user().await.map(|u| u.id),
        Some("u1".into())
    );
}

#[tokio::test]
async fn test_current_user_is_cached_and_syncs_the_session() {
    let profile_calls = Counter::default();
    let router = Router::new().route(
        "/auth/current-user",
        get({
            let profile_calls = profile_calls.clone();
            move || {
                profile_calls.incr();
                async move { envelope(user_json("u1")) }
            }
        }),
    );

    let client = test_client(serve(router).await).await;
    let first = client.auth().current_user().await.unwrap();
    let second = client.auth().current_user().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(profile_calls.get(), 1);
    assert!(client.session().is_authenticated().await);
}
