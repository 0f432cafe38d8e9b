//! Cached reads and prefix-scoped invalidation through the project API.

use axum::{Router, http::StatusCode, routing::get};
use serde_json::json;

use crate::helpers::{
    Counter, envelope, error_body, project_item_json, project_json, serve, test_client,
};

#[tokio::test]
async fn test_repeated_reads_hit_the_server_once() {
    let list_calls = Counter::default();
    let router = Router::new().route(
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
    let first = client.projects().list().await.unwrap();
    let second = client.projects().list().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first[0].project.id, "p1");
    assert_eq!(list_calls.get(), 1);
}

#[tokio::test]
async fn test_create_invalidates_the_list() {
    let list_calls = Counter::default();
    let router = Router::new().route(
        "/projects",
        get({
            let list_calls = list_calls.clone();
            move || {
                list_calls.incr();
                async move { envelope(json!([project_item_json("p1")])) }
            }
        })
        .post(|| async { envelope(project_json("p2")) }),
    );

    let client = test_client(serve(router).await).await;
    client.projects().list().await.unwrap();
    assert_eq!(list_calls.get(), 1);

    client
        .projects()
        .create(taskcamp::api::types::CreateProjectRequest {
            name: "Summer trip".into(),
            description: None,
        })
        .await
        .unwrap();

    client.projects().list().await.unwrap();
    assert_eq!(list_calls.get(), 2, "the list is refetched after a create");
}

/// Updating one project refreshes its detail entry without touching the
/// cached list.
#[tokio::test]
async fn test_update_leaves_sibling_entries_fresh() {
    let list_calls = Counter::default();
    let detail_calls = Counter::default();
    let router = Router::new()
        .route(
            "/projects",
            get({
                let list_calls = list_calls.clone();
                move || {
                    list_calls.incr();
                    async move { envelope(json!([project_item_json("p1")])) }
                }
            }),
        )
        .route(
            "/projects/{project_id}",
            get({
                let detail_calls = detail_calls.clone();
                move || {
                    detail_calls.incr();
                    async move { envelope(project_json("p1")) }
                }
            })
            .put(|| async { envelope(project_json("p1")) }),
        );

    let client = test_client(serve(router).await).await;
    client.projects().list().await.unwrap();
    client.projects().get("p1").await.unwrap();

    client
        .projects()
        .update("p1", taskcamp::api::types::UpdateProjectRequest {
            name: Some("Autumn trip".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    client.projects().get("p1").await.unwrap();
    client.projects().list().await.unwrap();
    assert_eq!(detail_calls.get(), 2, "the detail entry was invalidated");
    assert_eq!(list_calls.get(), 1, "the list entry stayed fresh");
}

/// Deleting a project invalidates the list and the deleted project's own
/// detail entry.
#[tokio::test]
async fn test_delete_invalidates_list_and_own_detail() {
    let list_calls = Counter::default();
    let detail_calls = Counter::default();
    let router = Router::new()
        .route(
            "/projects",
            get({
                let list_calls = list_calls.clone();
                move || {
                    list_calls.incr();
                    async move { envelope(json!([project_item_json("p1")])) }
                }
            }),
        )
        .route(
            "/projects/{project_id}",
            get({
                let detail_calls = detail_calls.clone();
                move || {
                    detail_calls.incr();
                    async move { envelope(project_json("p1")) }
                }
            })
            .delete(|| async { envelope(json!({})) }),
        );

    let client = test_client(serve(router).await).await;
    client.projects().list().await.unwrap();
    client.projects().get("p1").await.unwrap();

    client.projects().delete("p1").await.unwrap();

    client.projects().list().await.unwrap();
    client.projects().get("p1").await.unwrap();
    assert_eq!(list_calls.get(), 2);
    assert_eq!(detail_calls.get(), 2);
}

/// Deleting one project leaves other projects' cached details fresh.
#[tokio::test]
async fn test_delete_spares_sibling_details() {
    let p1_calls = Counter::default();
    let p2_calls = Counter::default();
    let router = Router::new().route(
        "/projects/{project_id}",
        get({
            let p1_calls = p1_calls.clone();
            let p2_calls = p2_calls.clone();
            move |axum::extract::Path(project_id): axum::extract::Path<String>| {
                if project_id == "p1" {
                    p1_calls.incr();
                } else {
                    p2_calls.incr();
                }
                async move { envelope(project_json(&project_id)) }
            }
        })
        .delete(|| async { envelope(json!({})) }),
    );

    let client = test_client(serve(router).await).await;
    client.projects().get("p1").await.unwrap();
    client.projects().get("p2").await.unwrap();

    client.projects().delete("p1").await.unwrap();

    client.projects().get("p1").await.unwrap();
    client.projects().get("p2").await.unwrap();
    assert_eq!(p1_calls.get(), 2, "the deleted project's detail refetched");
    assert_eq!(p2_calls.get(), 1, "the sibling's detail stayed cached");
}

/// A failed mutation must not invalidate anything.
#[tokio::test]
async fn test_failed_mutation_preserves_cached_data() {
    let list_calls = Counter::default();
    let create_calls = Counter::default();
    let router = Router::new().route(
        "/projects",
        get({
            let list_calls = list_calls.clone();
            move || {
                list_calls.incr();
                async move { envelope(json!([project_item_json("p1")])) }
            }
        })
        .post({
            let create_calls = create_calls.clone();
            move || {
                create_calls.incr();
                async move {
                    error_body(StatusCode::INTERNAL_SERVER_ERROR, "database is down")
                }
            }
        }),
    );

    let client = test_client(serve(router).await).await;
    client.projects().list().await.unwrap();

    let err = client
        .projects()
        .create(taskcamp::api::types::CreateProjectRequest {
            name: "Summer trip".into(),
            description: None,
        })
        .await
        .unwrap_err();

    assert!(err.is_server_fault());
    assert_eq!(create_calls.get(), 1, "mutations are never retried");
    client.projects().list().await.unwrap();
    assert_eq!(list_calls.get(), 1, "the cached list survived the failure");
}
