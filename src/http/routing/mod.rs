pub mod family_members;
pub mod todos;

use axum::{middleware, routing::get, Router};

use super::cors;
use super::types::ApiError;

pub fn app(todos: Router, family_members: Router) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(todos)
        .merge(family_members)
        .fallback(|| async { ApiError::not_found("Not found") })
        .layer(middleware::from_fn(cors::permissive))
}
