use axum::Router;
use axum::routing::{get, post};
use tenura_core::AppError;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

mod cors;
mod internal;
mod protected;

use cors::build_cors_layer;
use internal::build_internal_routes;
use protected::build_protected_routes;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route(
            "/api/permissions",
            get(handlers::permissions::permission_catalog_handler),
        )
        .route(
            "/api/invites/redeem",
            post(handlers::invites::redeem_invite_handler),
        )
        .merge(build_protected_routes())
        .merge(build_internal_routes(app_state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
