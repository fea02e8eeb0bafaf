use super::*;

impl AccessAdminService {
    /// Grants a role to a user who is not yet a member of the domain.
    ///
    /// Returns `Ok(false)` when the user is unknown to the directory or
    /// already holds a role in the domain.
    pub async fn add_role_for_user(
        &self,
        user_id: UserId,
        role: Role,
        domain_id: DomainId,
    ) -> AppResult<bool> {
        if self.users.find_by_id(user_id).await?.is_none() {
            return Ok(false);
        }

        self.assignments.assign_role(user_id, domain_id, role).await
    }

    /// Changes a member's role.
    ///
    /// Unknown role names, non-members and demoting the last owner all yield
    /// `Ok(false)` without changing anything.
    pub async fn edit_role(
        &self,
        user_id: UserId,
        domain_id: DomainId,
        new_role: &str,
    ) -> AppResult<bool> {
        let Ok(role) = Role::from_transport(new_role) else {
            return Ok(false);
        };

        let change = self
            .assignments
            .try_change_role(user_id, domain_id, role)
            .await?;
        Ok(change.is_applied())
    }

    /// Removes a member. Removing the last owner yields `Ok(false)`.
    pub async fn remove_member(&self, user_id: UserId, domain_id: DomainId) -> AppResult<bool> {
        let change = self
            .assignments
            .try_remove_member(user_id, domain_id)
            .await?;
        Ok(change.is_applied())
    }

    /// Advisory check whether the user could lose the owner role right now.
    ///
    /// Mutations re-check under their own transaction.
    pub async fn can_remove_or_demote(
        &self,
        domain_id: DomainId,
        user_id: UserId,
    ) -> AppResult<bool> {
        let owners = self
            .assignments
            .users_with_role(domain_id, Role::Owner)
            .await?;
        Ok(can_remove_or_demote(&owners, user_id))
    }

    /// Returns the roles a user holds in a domain.
    pub async fn roles_of(&self, user_id: UserId, domain_id: DomainId) -> AppResult<Vec<Role>> {
        self.assignments.roles_of(user_id, domain_id).await
    }

    /// Returns the domains a user belongs to.
    pub async fn domains_of(&self, user_id: UserId) -> AppResult<BTreeSet<DomainId>> {
        self.assignments.domains_of(user_id).await
    }

    /// Lists a domain's members, owners first, then by display name.
    pub async fn list_members(&self, domain_id: DomainId) -> AppResult<Vec<MemberSummary>> {
        let assignments = self.assignments.list_assignments(domain_id).await?;
        let user_ids: Vec<UserId> = assignments
            .iter()
            .map(|assignment| assignment.user_id)
            .collect();
        let profiles: BTreeMap<UserId, _> = self
            .users
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|profile| (profile.id(), profile))
            .collect();

        let mut members: Vec<MemberSummary> = assignments
            .into_iter()
            .map(|assignment| {
                let profile = profiles.get(&assignment.user_id);
                MemberSummary {
                    user_id: assignment.user_id,
                    role: assignment.role,
                    display_name: profile.map(|profile| profile.display_name().to_owned()),
                    email: profile.map(|profile| profile.email().as_str().to_owned()),
                }
            })
            .collect();
        members.sort_by(|left, right| {
            left.role
                .cmp(&right.role)
                .then_with(|| left.display_name.cmp(&right.display_name))
                .then_with(|| left.user_id.cmp(&right.user_id))
        });

        Ok(members)
    }
}
