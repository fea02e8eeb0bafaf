use axum::Json;
use axum::extract::{Path, State};
use tenura_core::DomainId;
use tenura_domain::UserId;
use tracing::info;
use uuid::Uuid;

use crate::dto::{AppliedResponse, InitializeDomainRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn initialize_domain_handler(
    State(state): State<AppState>,
    Path(domain_id): Path<Uuid>,
    Json(payload): Json<InitializeDomainRequest>,
) -> ApiResult<Json<AppliedResponse>> {
    let domain_id = DomainId::from_uuid(domain_id);
    let owner_id = UserId::from_uuid(payload.owner_user_id);
    let applied = state
        .access_admin_service
        .initialize_domain(domain_id, owner_id)
        .await?;

    if applied {
        info!(%domain_id, %owner_id, "domain initialized");
    }

    Ok(Json(applied.into()))
}

pub async fn purge_domain_handler(
    State(state): State<AppState>,
    Path(domain_id): Path<Uuid>,
) -> ApiResult<Json<AppliedResponse>> {
    let domain_id = DomainId::from_uuid(domain_id);
    let applied = state.access_admin_service.purge_domain(domain_id).await?;

    if applied {
        info!(%domain_id, "domain purged");
    }

    Ok(Json(applied.into()))
}
