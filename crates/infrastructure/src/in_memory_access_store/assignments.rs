use super::*;

#[async_trait]
impl RoleAssignmentRepository for InMemoryAccessStore {
    async fn assign_role(
        &self,
        user_id: UserId,
        domain_id: DomainId,
        role: Role,
    ) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.assignments.contains_key(&(domain_id, user_id)) {
            return Ok(false);
        }

        tables.assignments.insert((domain_id, user_id), role);
        Ok(true)
    }

    async fn roles_of(&self, user_id: UserId, domain_id: DomainId) -> AppResult<Vec<Role>> {
        Ok(self
            .tables
            .read()
            .await
            .assignments
            .get(&(domain_id, user_id))
            .copied()
            .into_iter()
            .collect())
    }

    async fn users_with_role(
        &self,
        domain_id: DomainId,
        role: Role,
    ) -> AppResult<BTreeSet<UserId>> {
        Ok(self
            .tables
            .read()
            .await
            .domain_assignments(domain_id)
            .filter_map(|(user_id, stored)| (stored == role).then_some(user_id))
            .collect())
    }

    async fn all_users(&self, domain_id: DomainId) -> AppResult<BTreeSet<UserId>> {
        Ok(self
            .tables
            .read()
            .await
            .domain_assignments(domain_id)
            .map(|(user_id, _)| user_id)
            .collect())
    }

    async fn list_assignments(&self, domain_id: DomainId) -> AppResult<Vec<RoleAssignment>> {
        Ok(self
            .tables
            .read()
            .await
            .domain_assignments(domain_id)
            .map(|(user_id, role)| RoleAssignment {
                user_id,
                domain_id,
                role,
            })
            .collect())
    }

    async fn change_role(
        &self,
        user_id: UserId,
        domain_id: DomainId,
        role: Role,
    ) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.assignments.get_mut(&(domain_id, user_id)) else {
            return Ok(false);
        };

        *stored = role;
        Ok(true)
    }

    async fn remove_assignment(&self, user_id: UserId, domain_id: DomainId) -> AppResult<bool> {
        Ok(self
            .tables
            .write()
            .await
            .assignments
            .remove(&(domain_id, user_id))
            .is_some())
    }

    async fn remove_all_assignments(&self, domain_id: DomainId) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.assignments.len();
        tables
            .assignments
            .retain(|(stored_domain, _), _| *stored_domain != domain_id);
        Ok(tables.assignments.len() < before)
    }

    async fn domains_of(&self, user_id: UserId) -> AppResult<BTreeSet<DomainId>> {
        Ok(self
            .tables
            .read()
            .await
            .assignments
            .keys()
            .filter_map(|(domain_id, stored_user)| (*stored_user == user_id).then_some(*domain_id))
            .collect())
    }

    async fn try_change_role(
        &self,
        user_id: UserId,
        domain_id: DomainId,
        role: Role,
    ) -> AppResult<MembershipChange> {
        let mut tables = self.tables.write().await;
        let Some(current) = tables.assignments.get(&(domain_id, user_id)).copied() else {
            return Ok(MembershipChange::NotMember);
        };

        if current.is_owner()
            && !role.is_owner()
            && !can_remove_or_demote(&tables.owners(domain_id), user_id)
        {
            return Ok(MembershipChange::LastOwner);
        }

        tables.assignments.insert((domain_id, user_id), role);
        Ok(MembershipChange::Applied)
    }

    async fn try_remove_member(
        &self,
        user_id: UserId,
        domain_id: DomainId,
    ) -> AppResult<MembershipChange> {
        let mut tables = self.tables.write().await;
        let Some(current) = tables.assignments.get(&(domain_id, user_id)).copied() else {
            return Ok(MembershipChange::NotMember);
        };

        if current.is_owner() && !can_remove_or_demote(&tables.owners(domain_id), user_id) {
            return Ok(MembershipChange::LastOwner);
        }

        tables.assignments.remove(&(domain_id, user_id));
        Ok(MembershipChange::Applied)
    }
}
