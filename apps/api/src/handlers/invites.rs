use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::Utc;
use tenura_core::DomainId;
use tenura_domain::{ACTION_INVITE, ACTION_READ, RESOURCE_EMPLOYEES, UserId};
use uuid::Uuid;

use crate::dto::{AppliedResponse, InviteRequest, InviteResponse, RedeemInviteRequest};
use crate::error::ApiResult;
use crate::middleware::Actor;
use crate::state::AppState;

pub async fn list_invites_handler(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(domain_id): Path<Uuid>,
) -> ApiResult<Json<Vec<InviteResponse>>> {
    let domain_id = DomainId::from_uuid(domain_id);
    state
        .authorization_service
        .require(actor, domain_id, RESOURCE_EMPLOYEES, ACTION_READ)
        .await?;

    let invites = state
        .invite_service
        .pending_invites(domain_id, Utc::now())
        .await?
        .into_iter()
        .map(InviteResponse::from)
        .collect();

    Ok(Json(invites))
}

pub async fn send_invite_handler(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path(domain_id): Path<Uuid>,
    Json(payload): Json<InviteRequest>,
) -> ApiResult<Json<AppliedResponse>> {
    let domain_id = DomainId::from_uuid(domain_id);
    state
        .authorization_service
        .require(actor, domain_id, RESOURCE_EMPLOYEES, ACTION_INVITE)
        .await?;

    let applied = state
        .invite_service
        .invite(actor, payload.email.as_str(), domain_id)
        .await?;

    Ok(Json(applied.into()))
}

pub async fn revoke_invite_handler(
    State(state): State<AppState>,
    Extension(Actor(actor)): Extension<Actor>,
    Path((domain_id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<AppliedResponse>> {
    let domain_id = DomainId::from_uuid(domain_id);
    state
        .authorization_service
        .require(actor, domain_id, RESOURCE_EMPLOYEES, ACTION_INVITE)
        .await?;

    let applied = state
        .invite_service
        .revoke(domain_id, UserId::from_uuid(user_id))
        .await?;

    Ok(Json(applied.into()))
}

/// The token alone authorizes redemption.
pub async fn redeem_invite_handler(
    State(state): State<AppState>,
    Json(payload): Json<RedeemInviteRequest>,
) -> ApiResult<Json<AppliedResponse>> {
    let applied = state.invite_service.redeem(payload.token.as_str()).await?;

    Ok(Json(applied.into()))
}
