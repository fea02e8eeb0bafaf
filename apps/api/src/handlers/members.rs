use axum::extract::{Path, State};
use axum::{Extension, Json};
use tenura_core::DomainId;
use tenura_domain::{
    ACTION_DELETE, ACTION_READ, ACTION_UPDATE, RESOURCE_EMPLOYEES, Role, UserId,
};
use uuid::Uuid;

use crate::dto::{AddMemberRequest, AppliedResponse, EditRoleRequest, MemberResponse};
use crate::error::ApiResult;
use crate::middleware::Actor;
use crate::state::AppState;

pub async fn list_members_handler(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(domain_id): Path<Uuid>,
) -> ApiResult<Json<Vec<MemberResponse>>> {
    let domain_id = DomainId::from_uuid(domain_id);
    state
        .authorization_service
        .require(actor, domain_id, RESOURCE_EMPLOYEES, ACTION_READ)
        .await?;

    let members = state
        .access_admin_service
        .list_members(domain_id)
        .await?
        .into_iter()
        .map(MemberResponse::from)
        .collect();

    Ok(Json(members))
}

pub async fn add_member_handler(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(domain_id): Path<Uuid>,
    Json(payload): Json<AddMemberRequest>,
) -> ApiResult<Json<AppliedResponse>> {
    let domain_id = DomainId::from_uuid(domain_id);
    state
        .authorization_service
        .require(actor, domain_id, RESOURCE_EMPLOYEES, ACTION_UPDATE)
        .await?;

    let role = Role::from_transport(payload.role.as_str())?;
    let applied = state
        .access_admin_service
        .add_role_for_user(UserId::from_uuid(payload.user_id), role, domain_id)
        .await?;

    Ok(Json(applied.into()))
}

pub async fn edit_member_role_handler(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path((domain_id, user_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<EditRoleRequest>,
) -> ApiResult<Json<AppliedResponse>> {
    let domain_id = DomainId::from_uuid(domain_id);
    state
        .authorization_service
        .require(actor, domain_id, RESOURCE_EMPLOYEES, ACTION_UPDATE)
        .await?;

    let applied = state
        .access_admin_service
        .edit_role(UserId::from_uuid(user_id), domain_id, payload.role.as_str())
        .await?;

    Ok(Json(applied.into()))
}

pub async fn remove_member_handler(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path((domain_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<AppliedResponse>> {
    let domain_id = DomainId::from_uuid(domain_id);
    state
        .authorization_service
        .require(actor, domain_id, RESOURCE_EMPLOYEES, ACTION_DELETE)
        .await?;

    let applied = state
        .access_admin_service
        .remove_member(UserId::from_uuid(user_id), domain_id)
        .await?;

    Ok(Json(applied.into()))
}
