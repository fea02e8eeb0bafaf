use std::collections::BTreeSet;

use async_trait::async_trait;

use tenura_core::{AppResult, DomainId};
use tenura_domain::{Role, RoleAssignment, UserId};

/// Result of a membership mutation protected by the owner guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipChange {
    /// The mutation was written.
    Applied,
    /// The user holds no role in the domain.
    NotMember,
    /// The user is the last owner of the domain.
    LastOwner,
}

impl MembershipChange {
    /// Returns whether the mutation was written.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Repository port for the single role each user holds per domain.
#[async_trait]
pub trait RoleAssignmentRepository: Send + Sync {
    /// Creates an assignment. Returns `false` when the user already holds a role in the domain.
    async fn assign_role(
        &self,
        user_id: UserId,
        domain_id: DomainId,
        role: Role,
    ) -> AppResult<bool>;

    /// Lists the user's roles in a domain (at most one).
    async fn roles_of(&self, user_id: UserId, domain_id: DomainId) -> AppResult<Vec<Role>>;

    /// Lists users holding a role in a domain.
    async fn users_with_role(
        &self,
        domain_id: DomainId,
        role: Role,
    ) -> AppResult<BTreeSet<UserId>>;

    /// Lists every member of a domain.
    async fn all_users(&self, domain_id: DomainId) -> AppResult<BTreeSet<UserId>>;

    /// Lists every assignment of a domain.
    async fn list_assignments(&self, domain_id: DomainId) -> AppResult<Vec<RoleAssignment>>;

    /// Replaces the role of an existing assignment without the owner guard.
    async fn change_role(
        &self,
        user_id: UserId,
        domain_id: DomainId,
        role: Role,
    ) -> AppResult<bool>;

    /// Deletes an assignment without the owner guard.
    async fn remove_assignment(&self, user_id: UserId, domain_id: DomainId) -> AppResult<bool>;

    /// Deletes every assignment of a domain.
    async fn remove_all_assignments(&self, domain_id: DomainId) -> AppResult<bool>;

    /// Lists the domains a user belongs to.
    async fn domains_of(&self, user_id: UserId) -> AppResult<BTreeSet<DomainId>>;

    /// Changes a role after checking the owner guard under the same per-domain lock.
    async fn try_change_role(
        &self,
        user_id: UserId,
        domain_id: DomainId,
        role: Role,
    ) -> AppResult<MembershipChange>;

    /// Removes a member after checking the owner guard under the same per-domain lock.
    async fn try_remove_member(
        &self,
        user_id: UserId,
        domain_id: DomainId,
    ) -> AppResult<MembershipChange>;
}
