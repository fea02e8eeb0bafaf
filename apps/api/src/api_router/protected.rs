use axum::Router;
use axum::middleware::from_fn;
use axum::routing::{delete, get, post, put};

use crate::state::AppState;
use crate::{handlers, middleware};

pub(super) fn build_protected_routes() -> Router<AppState> {
    Router::new()
        .route("/api/enforce", post(handlers::permissions::enforce_handler))
        .route(
            "/api/domains/{domain_id}/members",
            get(handlers::members::list_members_handler)
                .post(handlers::members::add_member_handler),
        )
        .route(
            "/api/domains/{domain_id}/members/{user_id}/role",
            put(handlers::members::edit_member_role_handler),
        )
        .route(
            "/api/domains/{domain_id}/members/{user_id}",
            delete(handlers::members::remove_member_handler),
        )
        .route(
            "/api/domains/{domain_id}/roles/{role}/policies",
            get(handlers::policies::role_policies_handler)
                .post(handlers::policies::add_role_policies_handler),
        )
        .route(
            "/api/domains/{domain_id}/roles/{role}/policies/removals",
            post(handlers::policies::remove_role_policies_handler),
        )
        .route(
            "/api/domains/{domain_id}/invites",
            get(handlers::invites::list_invites_handler)
                .post(handlers::invites::send_invite_handler),
        )
        .route(
            "/api/domains/{domain_id}/invites/{user_id}",
            delete(handlers::invites::revoke_invite_handler),
        )
        .route_layer(from_fn(middleware::require_actor))
}
