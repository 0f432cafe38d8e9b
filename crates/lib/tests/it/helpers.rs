//! Shared helpers: a scriptable axum mock of the Taskcamp API.

use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{Json, http::StatusCode};
use serde_json::{Value, json};
use taskcamp::{Client, Settings, session::InMemoryStorage};

/// A cloneable call counter for mock routes.
#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    /// Increment and return the previous value.
    pub fn incr(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst)
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Bind the router on an ephemeral port and serve it in the background.
pub async fn serve(router: axum::Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind mock server");
    let addr = listener.local_addr().expect("failed to get local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock server failed");
    });
    addr
}

/// A client wired to the mock server, with fast retries and an in-memory
/// session.
pub async fn test_client(addr: SocketAddr) -> Client {
    let settings = Settings::new(format!("http://{addr}"))
        .unwrap()
        .with_retry_backoff(Duration::from_millis(1));
    Client::with_storage(settings, Box::new(InMemoryStorage::new()))
        .await
        .unwrap()
}

/// The server's success envelope around `data`.
pub fn envelope(data: Value) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "statusCode": 200,
            "data": data,
            "message": "ok",
            "success": true
        })),
    )
}

/// The server's error envelope.
pub fn error_body(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({
            "success": false,
            "statusCode": status.as_u16(),
            "message": message,
            "errors": []
        })),
    )
}

/// A user profile as the server would send it.
pub fn user_json(id: &str) -> Value {
    json!({
        "_id": id,
        "username": "camper",
        "email": "camper@example.com",
        "fullName": "Camper McCampface",
        "avatar": { "url": "https://cdn.example.com/a.png", "fileId": "f1" },
        "isEmailVerified": true,
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-01-01T00:00:00Z"
    })
}

/// A project as the single-project endpoints send it.
pub fn project_json(id: &str) -> Value {
    json!({
        "_id": id,
        "name": "Basecamp",
        "description": "Plan the summer trip",
        "createdBy": "u1",
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-01-01T00:00:00Z"
    })
}

/// One row of the list-projects response.
pub fn project_item_json(id: &str) -> Value {
    json!({
        "projects": {
            "_id": id,
            "name": "Basecamp",
            "members": 3,
            "createdBy": "u1",
            "createdAt": "2024-01-01T00:00:00Z"
        },
        "role": "admin"
    })
}

/// A task as the server would send it in a list response.
pub fn task_json(id: &str) -> Value {
    json!({
        "_id": id,
        "title": "Pitch the tent",
        "assignedTo": "u1",
        "createdBy": {
            "_id": "u1",
            "username": "camper",
            "fullName": "Camper McCampface",
            "avatar": "https://cdn.example.com/a.png"
        },
        "status": "todo",
        "attachments": [],
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-01-01T00:00:00Z"
    })
}

/// A subtask as the server would send it.
pub fn subtask_json(id: &str, task_id: &str, is_completed: bool) -> Value {
    json!({
        "_id": id,
        "title": "Find a flat spot",
        "task": task_id,
        "isCompleted": is_completed,
        "createdBy": "u1",
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-01-01T00:00:00Z"
    })
}
