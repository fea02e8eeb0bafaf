use axum::extract::{Path, State};
use axum::{Extension, Json};
use tenura_core::DomainId;
use tenura_domain::{ACTION_READ, ACTION_UPDATE, RESOURCE_POLICIES, Role};
use uuid::Uuid;

use crate::dto::{AppliedResponse, PolicyBatchRequest, RolePoliciesResponse};
use crate::error::ApiResult;
use crate::middleware::Actor;
use crate::state::AppState;

pub async fn role_policies_handler(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path((domain_id, role)): Path<(Uuid, String)>,
) -> ApiResult<Json<RolePoliciesResponse>> {
    let domain_id = DomainId::from_uuid(domain_id);
    state
        .authorization_service
        .require(actor, domain_id, RESOURCE_POLICIES, ACTION_READ)
        .await?;

    let role = Role::from_transport(role.as_str())?;
    let resources = state
        .access_admin_service
        .policies_for_role(role, domain_id)
        .await;

    Ok(Json(RolePoliciesResponse {
        role: role.as_str().to_owned(),
        resources,
    }))
}

pub async fn add_role_policies_handler(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path((domain_id, role)): Path<(Uuid, String)>,
    Json(payload): Json<PolicyBatchRequest>,
) -> ApiResult<Json<AppliedResponse>> {
    let domain_id = DomainId::from_uuid(domain_id);
    state
        .authorization_service
        .require(actor, domain_id, RESOURCE_POLICIES, ACTION_UPDATE)
        .await?;

    let role = Role::from_transport(role.as_str())?;
    let applied = state
        .access_admin_service
        .add_policies_for_role(role, domain_id, &payload.into_grants())
        .await?;

    Ok(Json(applied.into()))
}

pub async fn remove_role_policies_handler(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path((domain_id, role)): Path<(Uuid, String)>,
    Json(payload): Json<PolicyBatchRequest>,
) -> ApiResult<Json<AppliedResponse>> {
    let domain_id = DomainId::from_uuid(domain_id);
    state
        .authorization_service
        .require(actor, domain_id, RESOURCE_POLICIES, ACTION_UPDATE)
        .await?;

    let role = Role::from_transport(role.as_str())?;
    let applied = state
        .access_admin_service
        .delete_policies_for_role(role, domain_id, &payload.into_grants())
        .await?;

    Ok(Json(applied.into()))
}
