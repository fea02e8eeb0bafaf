use std::sync::Arc;

use tenura_application::{AccessAdminService, AuthorizationService, InviteService, PolicyStore};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub authorization_service: AuthorizationService,
    pub access_admin_service: AccessAdminService,
    pub invite_service: InviteService,
    pub policy_store: PolicyStore,
    pub internal_api_token: Arc<str>,
}
