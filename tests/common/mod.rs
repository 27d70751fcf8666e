#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request};
use axum::Router;
use family_todo::application::{family_member_service::FamilyMemberServiceImpl, todo_service::TodoServiceImpl};
use family_todo::http::routing::{self, family_members, todos};
use family_todo::infrastructure::sqlite_repo::SqliteRepository;
use tower::ServiceExt;

/// Router over a fresh in-memory database, optionally seeded.
pub async fn app(seed: bool) -> Router {
    let repo = SqliteRepository::connect("sqlite::memory:").await.unwrap();
    repo.init().await.unwrap();
    if seed { repo.seed_defaults().await.unwrap(); }
    routing::app(
        todos::router(todos::AppState { service: TodoServiceImpl::new(repo.clone()) }),
        family_members::router(family_members::AppState { service: FamilyMemberServiceImpl::new(repo.clone(), repo) }),
    )
}

pub async fn request(app: &Router, method: &str, path: &str, body: Option<serde_json::Value>) -> hyper::Response<Body> {
    let req = Request::builder().method(Method::from_bytes(method.as_bytes()).unwrap()).uri(path);
    let req = match body {
        Some(json) => req.header("content-type", "application/json").body(Body::from(json.to_string())).unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(req).await.unwrap()
}

pub async fn json(res: hyper::Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&to_bytes(res.into_body(), 1024 * 1024).await.unwrap()).unwrap()
}
