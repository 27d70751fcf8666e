use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};

use super::todos::require_id;
use crate::application::family_member_service::FamilyMemberService;
use crate::domain::family_member::{FamilyMemberPatch, MemberId, NewFamilyMember};
use crate::http::types::{
    ApiError, DeleteFamilyMemberResponse, FamilyMemberResponse, FamilyMembersResponse, IdQuery, UpdateFamilyMemberRequest,
};

#[derive(Clone)]
pub struct AppState<S: FamilyMemberService> { pub service: S }

pub fn router<S: FamilyMemberService + Clone + Send + Sync + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route(
            "/family-members",
            get(list_members::<S>).post(create_member::<S>).put(update_member_from_body::<S>).delete(delete_member_by_query::<S>),
        )
        .route("/family-members/:id", axum::routing::put(update_member::<S>).delete(delete_member::<S>))
        .with_state(state)
}

async fn list_members<S: FamilyMemberService>(State(state): State<AppState<S>>) -> Result<Json<FamilyMembersResponse>, ApiError> {
    let family_members = state.service.list().await?;
    Ok(Json(FamilyMembersResponse { family_members }))
}

async fn create_member<S: FamilyMemberService>(
    State(state): State<AppState<S>>,
    payload: Result<Json<NewFamilyMember>, JsonRejection>,
) -> Result<(StatusCode, Json<FamilyMemberResponse>), ApiError> {
    let Json(input) = payload?;
    let family_member = state.service.create(input).await?;
    Ok((StatusCode::CREATED, Json(FamilyMemberResponse { family_member })))
}

async fn update_member<S: FamilyMemberService>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    payload: Result<Json<FamilyMemberPatch>, JsonRejection>,
) -> Result<Json<FamilyMemberResponse>, ApiError> {
    let Json(patch) = payload?;
    let family_member = state.service.update(MemberId(id), patch).await?;
    Ok(Json(FamilyMemberResponse { family_member }))
}

async fn update_member_from_body<S: FamilyMemberService>(
    State(state): State<AppState<S>>,
    payload: Result<Json<UpdateFamilyMemberRequest>, JsonRejection>,
) -> Result<Json<FamilyMemberResponse>, ApiError> {
    let Json(body) = payload?;
    let id = require_id(body.id)?;
    let family_member = state.service.update(MemberId(id), body.patch).await?;
    Ok(Json(FamilyMemberResponse { family_member }))
}

async fn delete_member<S: FamilyMemberService>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteFamilyMemberResponse>, ApiError> {
    remove(&state.service, MemberId(id)).await
}

async fn delete_member_by_query<S: FamilyMemberService>(
    State(state): State<AppState<S>>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Result<Json<DeleteFamilyMemberResponse>, ApiError> {
    let Query(query) = query?;
    let id = require_id(query.id)?;
    remove(&state.service, MemberId(id)).await
}

async fn remove<S: FamilyMemberService>(service: &S, id: MemberId) -> Result<Json<DeleteFamilyMemberResponse>, ApiError> {
    let deleted_member = service.delete(id).await?;
    let message = format!("Family member {} deleted", deleted_member.name);
    Ok(Json(DeleteFamilyMemberResponse { message, deleted_member }))
}
