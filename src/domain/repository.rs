use async_trait::async_trait;

use super::family_member::{FamilyMember, FamilyMemberPatch, MemberId, NewFamilyMember};
use super::todo::{NewTodo, Todo, TodoId, TodoPatch};

#[async_trait]
pub trait TodoRepository: Send + Sync + 'static {
    async fn create(&self, input: NewTodo) -> anyhow::Result<Todo>;
    async fn get(&self, id: TodoId) -> anyhow::Result<Option<Todo>>;
    /// Newest first.
    async fn list(&self) -> anyhow::Result<Vec<Todo>>;
    async fn update(&self, id: TodoId, patch: TodoPatch) -> anyhow::Result<Option<Todo>>;
    /// Returns the removed record, `None` if nothing matched.
    async fn delete(&self, id: TodoId) -> anyhow::Result<Option<Todo>>;
    /// Number of todos whose denormalized `assigned_to` equals `name`.
    async fn count_assigned_to(&self, name: &str) -> anyhow::Result<u64>;
}

#[async_trait]
pub trait FamilyMemberRepository: Send + Sync + 'static {
    /// `None` when a member with the same id already exists.
    async fn create(&self, input: NewFamilyMember) -> anyhow::Result<Option<FamilyMember>>;
    async fn get(&self, id: MemberId) -> anyhow::Result<Option<FamilyMember>>;
    /// Oldest first.
    async fn list(&self) -> anyhow::Result<Vec<FamilyMember>>;
    async fn update(&self, id: MemberId, patch: FamilyMemberPatch) -> anyhow::Result<Option<FamilyMember>>;
    async fn delete(&self, id: MemberId) -> anyhow::Result<Option<FamilyMember>>;
}
