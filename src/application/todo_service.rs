use async_trait::async_trait;

use super::error::{require, require_if_present, ServiceError, ServiceResult, StorageContext};
use crate::domain::repository::TodoRepository;
use crate::domain::todo::{NewTodo, Todo, TodoId, TodoPatch};

#[async_trait]
pub trait TodoService: Send + Sync + 'static {
    async fn list(&self) -> ServiceResult<Vec<Todo>>;
    async fn get(&self, id: TodoId) -> ServiceResult<Todo>;
    async fn create(&self, input: NewTodo) -> ServiceResult<Todo>;
    async fn update(&self, id: TodoId, patch: TodoPatch) -> ServiceResult<Todo>;
    async fn delete(&self, id: TodoId) -> ServiceResult<Todo>;
}

#[derive(Clone)]
pub struct TodoServiceImpl<R: TodoRepository> {
    repo: R,
}

impl<R: TodoRepository> TodoServiceImpl<R> {
    pub fn new(repo: R) -> Self { Self { repo } }
}

fn not_found(id: &TodoId) -> ServiceError { ServiceError::not_found(format!("Todo with id {id} not found")) }

#[async_trait]
impl<R: TodoRepository> TodoService for TodoServiceImpl<R> {
    async fn list(&self) -> ServiceResult<Vec<Todo>> { self.repo.list().await.storage("get todos") }

    async fn get(&self, id: TodoId) -> ServiceResult<Todo> {
        self.repo.get(id.clone()).await.storage("get todo")?.ok_or_else(|| not_found(&id))
    }

    async fn create(&self, input: NewTodo) -> ServiceResult<Todo> {
        require("title", &input.title)?;
        require("assignedTo", &input.assigned_to)?;
        require("assignedToColor", &input.assigned_to_color)?;
        let todo = self.repo.create(input).await.storage("create todo")?;
        tracing::info!(id = %todo.id, assigned_to = %todo.assigned_to, "todo created");
        Ok(todo)
    }

    async fn update(&self, id: TodoId, patch: TodoPatch) -> ServiceResult<Todo> {
        if patch.is_empty() {
            return Err(ServiceError::validation("No fields to update"));
        }
        require_if_present("title", patch.title.as_deref())?;
        require_if_present("assignedTo", patch.assigned_to.as_deref())?;
        require_if_present("assignedToColor", patch.assigned_to_color.as_deref())?;
        self.repo.update(id.clone(), patch).await.storage("update todo")?.ok_or_else(|| not_found(&id))
    }

    async fn delete(&self, id: TodoId) -> ServiceResult<Todo> {
        let removed = self.repo.delete(id.clone()).await.storage("delete todo")?.ok_or_else(|| not_found(&id))?;
        tracing::info!(id = %removed.id, "todo deleted");
        Ok(removed)
    }
}
