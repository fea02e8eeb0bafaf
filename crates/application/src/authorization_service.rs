use std::sync::Arc;

use tenura_core::{AppError, AppResult, DomainId};
use tenura_domain::UserId;

use crate::{PolicyStore, RoleAssignmentRepository};

/// Application service answering tenant-scoped authorization questions.
///
/// Resolves the caller's role from the assignment repository and checks it
/// against the in-memory policy view. Never mutates state.
#[derive(Clone)]
pub struct AuthorizationService {
    assignments: Arc<dyn RoleAssignmentRepository>,
    policies: PolicyStore,
}

impl AuthorizationService {
    /// Creates a new authorization service.
    #[must_use]
    pub fn new(assignments: Arc<dyn RoleAssignmentRepository>, policies: PolicyStore) -> Self {
        Self {
            assignments,
            policies,
        }
    }

    /// Returns whether the user may perform the action on the resource in the domain.
    ///
    /// Users without a role in the domain are denied. Storage failures surface
    /// as `AppError::Internal`, never as a denial.
    pub async fn enforce(
        &self,
        user_id: UserId,
        domain_id: DomainId,
        resource: &str,
        action: &str,
    ) -> AppResult<bool> {
        let roles = self.assignments.roles_of(user_id, domain_id).await?;

        for role in roles {
            if self
                .policies
                .allows(role, domain_id, resource, action)
                .await
            {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Like [`Self::enforce`], but turns a denial into `AppError::Forbidden`.
    pub async fn require(
        &self,
        user_id: UserId,
        domain_id: DomainId,
        resource: &str,
        action: &str,
    ) -> AppResult<()> {
        if self.enforce(user_id, domain_id, resource, action).await? {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{user_id}' is missing permission '{resource}:{action}' in domain '{domain_id}'"
        )))
    }
}
