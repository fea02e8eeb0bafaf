use super::*;

impl AccessAdminService {
    /// Grants one action on a resource to a role in a domain.
    ///
    /// Unknown resource/action pairs are rejected with `AppError::Validation`
    /// before storage is touched. Returns `Ok(false)` when the rule existed.
    pub async fn add_policy_for_role(
        &self,
        role: Role,
        domain_id: DomainId,
        resource: &str,
        action: &str,
    ) -> AppResult<bool> {
        self.registry.validate(resource, action)?;
        self.policies
            .add_rule(PolicyRule::new(role, domain_id, resource, action))
            .await
    }

    /// Grants several actions at once. One invalid pair rejects the whole batch.
    pub async fn add_policies_for_role(
        &self,
        role: Role,
        domain_id: DomainId,
        grants: &[PermissionGrant],
    ) -> AppResult<bool> {
        let rules = self.validated_rules(role, domain_id, grants)?;
        self.policies.add_rules(rules).await
    }

    /// Revokes one action. Returns `Ok(false)` when the rule did not exist.
    pub async fn delete_policy_for_role(
        &self,
        role: Role,
        domain_id: DomainId,
        resource: &str,
        action: &str,
    ) -> AppResult<bool> {
        self.registry.validate(resource, action)?;
        self.policies
            .remove_rule(PolicyRule::new(role, domain_id, resource, action))
            .await
    }

    /// Revokes several actions at once. One invalid pair rejects the whole batch.
    pub async fn delete_policies_for_role(
        &self,
        role: Role,
        domain_id: DomainId,
        grants: &[PermissionGrant],
    ) -> AppResult<bool> {
        let rules = self.validated_rules(role, domain_id, grants)?;
        self.policies.remove_rules(rules).await
    }

    /// Returns a role's actions grouped by resource.
    pub async fn policies_for_role(
        &self,
        role: Role,
        domain_id: DomainId,
    ) -> BTreeMap<String, Vec<String>> {
        self.policies.rules_for(role, domain_id).await
    }

    /// Returns the roles allowed to perform an action.
    pub async fn roles_granted(
        &self,
        domain_id: DomainId,
        resource: &str,
        action: &str,
    ) -> AppResult<BTreeSet<Role>> {
        self.registry.validate(resource, action)?;
        Ok(self.policies.roles_granted(domain_id, resource, action).await)
    }

    fn validated_rules(
        &self,
        role: Role,
        domain_id: DomainId,
        grants: &[PermissionGrant],
    ) -> AppResult<Vec<PolicyRule>> {
        grants
            .iter()
            .map(|grant| {
                self.registry.validate(&grant.resource, &grant.action)?;
                Ok(PolicyRule::new(
                    role,
                    domain_id,
                    grant.resource.as_str(),
                    grant.action.as_str(),
                ))
            })
            .collect()
    }
}
