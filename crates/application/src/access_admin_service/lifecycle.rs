use tenura_domain::default_policies;

use super::*;

impl AccessAdminService {
    /// Sets up a new domain: seeds the default policy catalog and makes `owner_id` its owner.
    ///
    /// Returns `Ok(false)` when the domain already has members. Policies are
    /// seeded before the owner is assigned.
    pub async fn initialize_domain(
        &self,
        domain_id: DomainId,
        owner_id: UserId,
    ) -> AppResult<bool> {
        if self.users.find_by_id(owner_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "user '{owner_id}' does not exist"
            )));
        }

        if !self.assignments.all_users(domain_id).await?.is_empty() {
            return Ok(false);
        }

        self.policies
            .add_rules(default_policies(domain_id, &self.registry))
            .await?;
        self.assignments
            .assign_role(owner_id, domain_id, Role::Owner)
            .await
    }

    /// Removes every assignment, policy rule and pending invite of a domain.
    ///
    /// Returns whether anything was removed. The three deletions are separate
    /// writes and each is idempotent, so re-running after a failure finishes
    /// a partial purge.
    pub async fn purge_domain(&self, domain_id: DomainId) -> AppResult<bool> {
        let removed_members = self.assignments.remove_all_assignments(domain_id).await?;
        let removed_rules = self.policies.remove_domain(domain_id).await?;
        let removed_invites = self.invites.delete_domain_invites(domain_id).await?;

        Ok(removed_members || removed_rules || removed_invites > 0)
    }
}
