use axum::extract::State;
use axum::{Extension, Json};
use tenura_core::DomainId;

use crate::dto::{EnforceRequest, EnforceResponse, PermissionCatalogResponse};
use crate::error::ApiResult;
use crate::middleware::Actor;
use crate::state::AppState;

pub async fn permission_catalog_handler(
    State(state): State<AppState>,
) -> Json<PermissionCatalogResponse> {
    let registry = state.access_admin_service.registry();
    let resources = registry
        .all_resources()
        .into_iter()
        .map(|resource| {
            let actions = registry
                .actions_for(&resource)
                .unwrap_or_default()
                .into_iter()
                .collect();
            (resource, actions)
        })
        .collect();

    Json(PermissionCatalogResponse { resources })
}

/// Answers whether the caller may perform an action. Denial is a normal answer.
pub async fn enforce_handler(
    State(state): State<AppState>,
    Extension(Actor(user_id)): Extension<Actor>,
    Json(payload): Json<EnforceRequest>,
) -> ApiResult<Json<EnforceResponse>> {
    let allowed = state
        .authorization_service
        .enforce(
            user_id,
            DomainId::from_uuid(payload.domain_id),
            payload.resource.as_str(),
            payload.action.as_str(),
        )
        .await?;

    Ok(Json(EnforceResponse { allowed }))
}
