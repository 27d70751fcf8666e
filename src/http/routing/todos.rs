use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};

use crate::application::todo_service::TodoService;
use crate::domain::todo::{NewTodo, TodoId, TodoPatch};
use crate::http::types::{ApiError, DeleteTodoResponse, IdQuery, TodoResponse, TodosResponse, UpdateTodoRequest};

#[derive(Clone)]
pub struct AppState<S: TodoService> { pub service: S }

pub fn router<S: TodoService + Clone + Send + Sync + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route(
            "/todos",
            get(list_todos::<S>).post(create_todo::<S>).put(update_todo_from_body::<S>).delete(delete_todo_by_query::<S>),
        )
        .route("/todos/:id", get(get_todo::<S>).put(update_todo::<S>).delete(delete_todo::<S>))
        .with_state(state)
}

async fn list_todos<S: TodoService>(State(state): State<AppState<S>>) -> Result<Json<TodosResponse>, ApiError> {
    let todos = state.service.list().await?;
    Ok(Json(TodosResponse { todos }))
}

async fn get_todo<S: TodoService>(State(state): State<AppState<S>>, Path(id): Path<String>) -> Result<Json<TodoResponse>, ApiError> {
    let todo = state.service.get(TodoId(id)).await?;
    Ok(Json(TodoResponse { todo }))
}

async fn create_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    payload: Result<Json<NewTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoResponse>), ApiError> {
    let Json(input) = payload?;
    let todo = state.service.create(input).await?;
    Ok((StatusCode::CREATED, Json(TodoResponse { todo })))
}

async fn update_todo<S: TodoService>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    payload: Result<Json<TodoPatch>, JsonRejection>,
) -> Result<Json<TodoResponse>, ApiError> {
    let Json(patch) = payload?;
    let todo = state.service.update(TodoId(id), patch).await?;
    Ok(Json(TodoResponse { todo }))
}

async fn update_todo_from_body<S: TodoService>(
    State(state): State<AppState<S>>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> Result<Json<TodoResponse>, ApiError> {
    let Json(body) = payload?;
    let id = require_id(body.id)?;
    let todo = state.service.update(TodoId(id), body.patch).await?;
    Ok(Json(TodoResponse { todo }))
}

async fn delete_todo<S: TodoService>(State(state): State<AppState<S>>, Path(id): Path<String>) -> Result<Json<DeleteTodoResponse>, ApiError> {
    state.service.delete(TodoId(id)).await?;
    Ok(Json(DeleteTodoResponse { success: true }))
}

async fn delete_todo_by_query<S: TodoService>(
    State(state): State<AppState<S>>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Result<Json<DeleteTodoResponse>, ApiError> {
    let Query(query) = query?;
    let id = require_id(query.id)?;
    state.service.delete(TodoId(id)).await?;
    Ok(Json(DeleteTodoResponse { success: true }))
}

pub(super) fn require_id(id: Option<String>) -> Result<String, ApiError> {
    id.filter(|s| !s.trim().is_empty()).ok_or_else(|| ApiError::bad_request("id is required", None))
}
