use std::sync::Arc;

use sqlx::PgPool;
use tenura_application::{AccessAdminService, AuthorizationService, InviteService, PolicyStore};
use tenura_core::AppError;
use tenura_domain::PermissionRegistry;
use tenura_infrastructure::{
    EmailInviteMailer, PostgresInviteRepository, PostgresOrganizationDirectory,
    PostgresPolicyRepository, PostgresRoleAssignmentRepository, PostgresUserDirectory,
};
use tracing::info;

use crate::api_config::ApiConfig;
use crate::state::AppState;

use super::email::build_email_service;

pub async fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let policy_repository = Arc::new(PostgresPolicyRepository::new(pool.clone()));
    let assignment_repository = Arc::new(PostgresRoleAssignmentRepository::new(pool.clone()));
    let invite_repository = Arc::new(PostgresInviteRepository::new(pool.clone()));
    let user_directory = Arc::new(PostgresUserDirectory::new(pool.clone()));
    let organization_directory = Arc::new(PostgresOrganizationDirectory::new(pool));

    let policies = PolicyStore::load(policy_repository).await?;
    info!(rules = policies.snapshot().await.len(), "policy rules loaded");

    let invite_mailer = Arc::new(EmailInviteMailer::new(
        build_email_service(config)?,
        config.frontend_url.clone(),
        config.invite_ttl_hours,
    ));

    Ok(AppState {
        authorization_service: AuthorizationService::new(
            assignment_repository.clone(),
            policies.clone(),
        ),
        access_admin_service: AccessAdminService::new(
            Arc::new(PermissionRegistry::standard()),
            policies.clone(),
            assignment_repository.clone(),
            invite_repository.clone(),
            user_directory.clone(),
        ),
        invite_service: InviteService::new(
            invite_repository,
            assignment_repository,
            user_directory,
            organization_directory,
            invite_mailer,
            config.invite_settings()?,
        ),
        policy_store: policies,
        internal_api_token: Arc::from(config.internal_api_token.as_str()),
    })
}
