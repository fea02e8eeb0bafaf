use super::*;

fn sorted(mut invites: Vec<InviteRecord>) -> Vec<InviteRecord> {
    invites.sort_by(|left, right| {
        left.issued_at
            .cmp(&right.issued_at)
            .then_with(|| left.token_hash.cmp(&right.token_hash))
    });
    invites
}

#[async_trait]
impl InviteRepository for InMemoryAccessStore {
    async fn create_invite(&self, invite: &InviteRecord) -> AppResult<()> {
        self.tables
            .write()
            .await
            .invites
            .insert(invite.token_hash.clone(), invite.clone());
        Ok(())
    }

    async fn supersede_invites(
        &self,
        domain_id: DomainId,
        invited_user_id: UserId,
        keep_token_hash: &str,
    ) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.invites.len();
        tables.invites.retain(|token_hash, invite| {
            token_hash == keep_token_hash
                || invite.domain_id != domain_id
                || invite.invited_user_id != invited_user_id
        });
        Ok((before - tables.invites.len()) as u64)
    }

    async fn list_domain_invites(&self, domain_id: DomainId) -> AppResult<Vec<InviteRecord>> {
        let invites = self
            .tables
            .read()
            .await
            .invites
            .values()
            .filter(|invite| invite.domain_id == domain_id)
            .cloned()
            .collect();

        Ok(sorted(invites))
    }

    async fn list_user_invites(&self, user_id: UserId) -> AppResult<Vec<InviteRecord>> {
        let invites = self
            .tables
            .read()
            .await
            .invites
            .values()
            .filter(|invite| invite.invited_user_id == user_id)
            .cloned()
            .collect();

        Ok(sorted(invites))
    }

    async fn delete_invite(&self, token_hash: &str) -> AppResult<bool> {
        Ok(self
            .tables
            .write()
            .await
            .invites
            .remove(token_hash)
            .is_some())
    }

    async fn delete_member_invites(
        &self,
        domain_id: DomainId,
        invited_user_id: UserId,
    ) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.invites.len();
        tables.invites.retain(|_, invite| {
            invite.domain_id != domain_id || invite.invited_user_id != invited_user_id
        });
        Ok((before - tables.invites.len()) as u64)
    }

    async fn delete_domain_invites(&self, domain_id: DomainId) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.invites.len();
        tables.invites.retain(|_, invite| invite.domain_id != domain_id);
        Ok((before - tables.invites.len()) as u64)
    }

    async fn delete_expired_invites(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.invites.len();
        tables.invites.retain(|_, invite| !invite.is_expired(now));
        Ok((before - tables.invites.len()) as u64)
    }

    async fn redeem_invite(
        &self,
        token_hash: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> AppResult<RedeemOutcome> {
        let mut tables = self.tables.write().await;
        let Some(invite) = tables
            .invites
            .get(token_hash)
            .filter(|invite| !invite.is_expired(now))
            .cloned()
        else {
            return Ok(RedeemOutcome::NotFound);
        };

        let key = (invite.domain_id, invite.invited_user_id);
        if tables.assignments.contains_key(&key) {
            return Ok(RedeemOutcome::AlreadyMember);
        }

        tables.assignments.insert(key, role);
        tables.invites.remove(token_hash);
        Ok(RedeemOutcome::Redeemed(RoleAssignment {
            user_id: invite.invited_user_id,
            domain_id: invite.domain_id,
            role,
        }))
    }
}
