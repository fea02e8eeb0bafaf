//! Administration façade for policies, memberships and domain lifecycle.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tenura_core::{AppError, AppResult, DomainId};
use tenura_domain::{PermissionRegistry, PolicyRule, Role, UserId, can_remove_or_demote};

use crate::{
    InviteRepository, PermissionGrant, PolicyStore, RoleAssignmentRepository, UserDirectory,
};

mod lifecycle;
mod members;
mod policies;

/// Member row returned by [`AccessAdminService::list_members`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSummary {
    /// Member identifier.
    pub user_id: UserId,
    /// Role held in the domain.
    pub role: Role,
    /// Display name, when the directory still knows the user.
    pub display_name: Option<String>,
    /// Email address, when the directory still knows the user.
    pub email: Option<String>,
}

/// Application service combining the registry, policy store and assignment store.
#[derive(Clone)]
pub struct AccessAdminService {
    registry: Arc<PermissionRegistry>,
    policies: PolicyStore,
    assignments: Arc<dyn RoleAssignmentRepository>,
    invites: Arc<dyn InviteRepository>,
    users: Arc<dyn UserDirectory>,
}

impl AccessAdminService {
    /// Creates a new administration service.
    #[must_use]
    pub fn new(
        registry: Arc<PermissionRegistry>,
        policies: PolicyStore,
        assignments: Arc<dyn RoleAssignmentRepository>,
        invites: Arc<dyn InviteRepository>,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            registry,
            policies,
            assignments,
            invites,
            users,
        }
    }

    /// Returns the permission registry used for validation.
    #[must_use]
    pub fn registry(&self) -> &PermissionRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests;
