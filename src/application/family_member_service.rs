use async_trait::async_trait;

use super::error::{require, require_if_present, ServiceError, ServiceResult, StorageContext};
use crate::domain::family_member::{FamilyMember, FamilyMemberPatch, MemberId, NewFamilyMember};
use crate::domain::repository::{FamilyMemberRepository, TodoRepository};

#[async_trait]
pub trait FamilyMemberService: Send + Sync + 'static {
    async fn list(&self) -> ServiceResult<Vec<FamilyMember>>;
    async fn create(&self, input: NewFamilyMember) -> ServiceResult<FamilyMember>;
    async fn update(&self, id: MemberId, patch: FamilyMemberPatch) -> ServiceResult<FamilyMember>;
    async fn delete(&self, id: MemberId) -> ServiceResult<FamilyMember>;
}

/// Needs the todo repository to refuse deleting members still named on a todo.
#[derive(Clone)]
pub struct FamilyMemberServiceImpl<M: FamilyMemberRepository, T: TodoRepository> {
    members: M,
    todos: T,
}

impl<M: FamilyMemberRepository, T: TodoRepository> FamilyMemberServiceImpl<M, T> {
    pub fn new(members: M, todos: T) -> Self { Self { members, todos } }
}

fn not_found(id: &MemberId) -> ServiceError { ServiceError::not_found(format!("Family member with id {id} not found")) }

#[async_trait]
impl<M: FamilyMemberRepository, T: TodoRepository> FamilyMemberService for FamilyMemberServiceImpl<M, T> {
    async fn list(&self) -> ServiceResult<Vec<FamilyMember>> { self.members.list().await.storage("get family members") }

    async fn create(&self, input: NewFamilyMember) -> ServiceResult<FamilyMember> {
        require("id", &input.id)?;
        require("name", &input.name)?;
        require("color", &input.color)?;
        let id = input.id.clone();
        match self.members.create(input).await.storage("create family member")? {
            Some(member) => {
                tracing::info!(id = %member.id, "family member created");
                Ok(member)
            }
            None => Err(ServiceError::conflict(format!("Family member with id {id} already exists"))),
        }
    }

    async fn update(&self, id: MemberId, patch: FamilyMemberPatch) -> ServiceResult<FamilyMember> {
        if patch.is_empty() {
            return Err(ServiceError::validation("No fields to update"));
        }
        require_if_present("name", patch.name.as_deref())?;
        require_if_present("color", patch.color.as_deref())?;
        self.members.update(id.clone(), patch).await.storage("update family member")?.ok_or_else(|| not_found(&id))
    }

    // The reference check and the delete are separate statements; a todo
    // created in between keeps a dangling `assigned_to`.
    async fn delete(&self, id: MemberId) -> ServiceResult<FamilyMember> {
        let member = self.members.get(id.clone()).await.storage("delete family member")?.ok_or_else(|| not_found(&id))?;
        let assigned = self.todos.count_assigned_to(&member.name).await.storage("delete family member")?;
        if assigned > 0 {
            return Err(ServiceError::Conflict {
                message: format!("Cannot delete family member {}: todos are still assigned", member.name),
                details: Some(format!("{assigned} todo(s) assigned to {}", member.name)),
            });
        }
        let removed = self.members.delete(id.clone()).await.storage("delete family member")?.ok_or_else(|| not_found(&id))?;
        tracing::info!(id = %removed.id, "family member deleted");
        Ok(removed)
    }
}
