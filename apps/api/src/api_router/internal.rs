use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, post};

use crate::state::AppState;
use crate::{handlers, middleware};

/// Domain lifecycle routes called by the organization service.
pub(super) fn build_internal_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/internal/domains/{domain_id}/initialize",
            post(handlers::domains::initialize_domain_handler),
        )
        .route(
            "/api/internal/domains/{domain_id}",
            delete(handlers::domains::purge_domain_handler),
        )
        .route_layer(from_fn_with_state(
            app_state,
            middleware::require_internal_token,
        ))
}
