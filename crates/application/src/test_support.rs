use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use tenura_core::{AppError, AppResult, DomainId};
use tenura_domain::{
    EmailAddress, PolicyRule, Role, RoleAssignment, UserId, UserProfile, can_remove_or_demote,
};

use crate::{
    InviteMailer, InviteRecord, InviteRepository, MembershipChange, OrganizationDirectory,
    PolicyRepository, RedeemOutcome, RoleAssignmentRepository, UserDirectory,
};

#[derive(Default)]
struct FakeState {
    rules: BTreeSet<PolicyRule>,
    assignments: BTreeMap<(UserId, DomainId), Role>,
    invites: BTreeMap<String, InviteRecord>,
}

/// One fake backing the policy, assignment and invite ports.
#[derive(Default)]
pub(crate) struct FakeAccessStore {
    state: Mutex<FakeState>,
    unavailable: AtomicBool,
    failing_invite_deletes: AtomicBool,
}

impl FakeAccessStore {
    pub(crate) fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub(crate) fn set_failing_invite_deletes(&self, failing: bool) {
        self.failing_invite_deletes.store(failing, Ordering::SeqCst);
    }

    pub(crate) async fn invite_count(&self) -> usize {
        self.state.lock().await.invites.len()
    }

    pub(crate) async fn insert_invite(&self, invite: InviteRecord) {
        self.state
            .lock()
            .await
            .invites
            .insert(invite.token_hash.clone(), invite);
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Internal("fake storage is unavailable".to_owned()));
        }

        Ok(())
    }
}

fn owners_of(state: &FakeState, domain_id: DomainId) -> BTreeSet<UserId> {
    state
        .assignments
        .iter()
        .filter(|((_, domain), role)| *domain == domain_id && role.is_owner())
        .map(|((user_id, _), _)| *user_id)
        .collect()
}

#[async_trait]
impl PolicyRepository for FakeAccessStore {
    async fn list_all_rules(&self) -> AppResult<Vec<PolicyRule>> {
        self.check_available()?;
        Ok(self.state.lock().await.rules.iter().cloned().collect())
    }

    async fn list_domain_rules(&self, domain_id: DomainId) -> AppResult<Vec<PolicyRule>> {
        self.check_available()?;
        Ok(self
            .state
            .lock()
            .await
            .rules
            .iter()
            .filter(|rule| rule.domain_id() == domain_id)
            .cloned()
            .collect())
    }

    async fn insert_rules(&self, rules: &[PolicyRule]) -> AppResult<u64> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        Ok(rules
            .iter()
            .filter(|rule| state.rules.insert((*rule).clone()))
            .count() as u64)
    }

    async fn delete_rules(&self, rules: &[PolicyRule]) -> AppResult<u64> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        Ok(rules.iter().filter(|rule| state.rules.remove(*rule)).count() as u64)
    }

    async fn delete_domain_rules(&self, domain_id: DomainId) -> AppResult<u64> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        let before = state.rules.len();
        state.rules.retain(|rule| rule.domain_id() != domain_id);
        Ok((before - state.rules.len()) as u64)
    }
}

#[async_trait]
impl RoleAssignmentRepository for FakeAccessStore {
    async fn assign_role(
        &self,
        user_id: UserId,
        domain_id: DomainId,
        role: Role,
    ) -> AppResult<bool> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        if state.assignments.contains_key(&(user_id, domain_id)) {
            return Ok(false);
        }
        state.assignments.insert((user_id, domain_id), role);
        Ok(true)
    }

    async fn roles_of(&self, user_id: UserId, domain_id: DomainId) -> AppResult<Vec<Role>> {
        self.check_available()?;
        Ok(self
            .state
            .lock()
            .await
            .assignments
            .get(&(user_id, domain_id))
            .copied()
            .into_iter()
            .collect())
    }

    async fn users_with_role(
        &self,
        domain_id: DomainId,
        role: Role,
    ) -> AppResult<BTreeSet<UserId>> {
        self.check_available()?;
        Ok(self
            .state
            .lock()
            .await
            .assignments
            .iter()
            .filter(|((_, domain), stored)| *domain == domain_id && **stored == role)
            .map(|((user_id, _), _)| *user_id)
            .collect())
    }

    async fn all_users(&self, domain_id: DomainId) -> AppResult<BTreeSet<UserId>> {
        self.check_available()?;
        Ok(self
            .state
            .lock()
            .await
            .assignments
            .keys()
            .filter(|(_, domain)| *domain == domain_id)
            .map(|(user_id, _)| *user_id)
            .collect())
    }

    async fn list_assignments(&self, domain_id: DomainId) -> AppResult<Vec<RoleAssignment>> {
        self.check_available()?;
        Ok(self
            .state
            .lock()
            .await
            .assignments
            .iter()
            .filter(|((_, domain), _)| *domain == domain_id)
            .map(|((user_id, domain_id), role)| RoleAssignment {
                user_id: *user_id,
                domain_id: *domain_id,
                role: *role,
            })
            .collect())
    }

    async fn change_role(
        &self,
        user_id: UserId,
        domain_id: DomainId,
        role: Role,
    ) -> AppResult<bool> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        match state.assignments.get_mut(&(user_id, domain_id)) {
            Some(stored) => {
                *stored = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_assignment(&self, user_id: UserId, domain_id: DomainId) -> AppResult<bool> {
        self.check_available()?;
        Ok(self
            .state
            .lock()
            .await
            .assignments
            .remove(&(user_id, domain_id))
            .is_some())
    }

    async fn remove_all_assignments(&self, domain_id: DomainId) -> AppResult<bool> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        let before = state.assignments.len();
        state.assignments.retain(|(_, domain), _| *domain != domain_id);
        Ok(state.assignments.len() < before)
    }

    async fn domains_of(&self, user_id: UserId) -> AppResult<BTreeSet<DomainId>> {
        self.check_available()?;
        Ok(self
            .state
            .lock()
            .await
            .assignments
            .keys()
            .filter(|(user, _)| *user == user_id)
            .map(|(_, domain_id)| *domain_id)
            .collect())
    }

    async fn try_change_role(
        &self,
        user_id: UserId,
        domain_id: DomainId,
        role: Role,
    ) -> AppResult<MembershipChange> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        let Some(current) = state.assignments.get(&(user_id, domain_id)).copied() else {
            return Ok(MembershipChange::NotMember);
        };
        if current.is_owner()
            && !role.is_owner()
            && !can_remove_or_demote(&owners_of(&state, domain_id), user_id)
        {
            return Ok(MembershipChange::LastOwner);
        }
        state.assignments.insert((user_id, domain_id), role);
        Ok(MembershipChange::Applied)
    }

    async fn try_remove_member(
        &self,
        user_id: UserId,
        domain_id: DomainId,
    ) -> AppResult<MembershipChange> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        let Some(current) = state.assignments.get(&(user_id, domain_id)).copied() else {
            return Ok(MembershipChange::NotMember);
        };
        if current.is_owner() && !can_remove_or_demote(&owners_of(&state, domain_id), user_id) {
            return Ok(MembershipChange::LastOwner);
        }
        state.assignments.remove(&(user_id, domain_id));
        Ok(MembershipChange::Applied)
    }
}

#[async_trait]
impl InviteRepository for FakeAccessStore {
    async fn create_invite(&self, invite: &InviteRecord) -> AppResult<()> {
        self.check_available()?;
        self.state
            .lock()
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
        self.check_available()?;
        let mut state = self.state.lock().await;
        let before = state.invites.len();
        state.invites.retain(|token_hash, invite| {
            token_hash == keep_token_hash
                || invite.domain_id != domain_id
                || invite.invited_user_id != invited_user_id
        });
        Ok((before - state.invites.len()) as u64)
    }

    async fn list_domain_invites(&self, domain_id: DomainId) -> AppResult<Vec<InviteRecord>> {
        self.check_available()?;
        Ok(self
            .state
            .lock()
            .await
            .invites
            .values()
            .filter(|invite| invite.domain_id == domain_id)
            .cloned()
            .collect())
    }

    async fn list_user_invites(&self, user_id: UserId) -> AppResult<Vec<InviteRecord>> {
        self.check_available()?;
        Ok(self
            .state
            .lock()
            .await
            .invites
            .values()
            .filter(|invite| invite.invited_user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_invite(&self, token_hash: &str) -> AppResult<bool> {
        self.check_available()?;
        if self.failing_invite_deletes.load(Ordering::SeqCst) {
            return Err(AppError::Internal("fake invite delete failed".to_owned()));
        }
        Ok(self.state.lock().await.invites.remove(token_hash).is_some())
    }

    async fn delete_member_invites(
        &self,
        domain_id: DomainId,
        invited_user_id: UserId,
    ) -> AppResult<u64> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        let before = state.invites.len();
        state.invites.retain(|_, invite| {
            invite.domain_id != domain_id || invite.invited_user_id != invited_user_id
        });
        Ok((before - state.invites.len()) as u64)
    }

    async fn delete_domain_invites(&self, domain_id: DomainId) -> AppResult<u64> {
        self.check_available()?;
        if self.failing_invite_deletes.load(Ordering::SeqCst) {
            return Err(AppError::Internal("fake invite delete failed".to_owned()));
        }
        let mut state = self.state.lock().await;
        let before = state.invites.len();
        state.invites.retain(|_, invite| invite.domain_id != domain_id);
        Ok((before - state.invites.len()) as u64)
    }

    async fn delete_expired_invites(&self, now: DateTime<Utc>) -> AppResult<u64> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        let before = state.invites.len();
        state.invites.retain(|_, invite| !invite.is_expired(now));
        Ok((before - state.invites.len()) as u64)
    }

    async fn redeem_invite(
        &self,
        token_hash: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> AppResult<RedeemOutcome> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        let Some(invite) = state
            .invites
            .get(token_hash)
            .filter(|invite| !invite.is_expired(now))
            .cloned()
        else {
            return Ok(RedeemOutcome::NotFound);
        };

        let key = (invite.invited_user_id, invite.domain_id);
        if state.assignments.contains_key(&key) {
            return Ok(RedeemOutcome::AlreadyMember);
        }

        state.assignments.insert(key, role);
        state.invites.remove(token_hash);
        Ok(RedeemOutcome::Redeemed(RoleAssignment {
            user_id: invite.invited_user_id,
            domain_id: invite.domain_id,
            role,
        }))
    }
}

/// Fake user and organization directory.
#[derive(Default)]
pub(crate) struct FakeDirectory {
    users: Mutex<Vec<UserProfile>>,
    domains: Mutex<BTreeSet<DomainId>>,
}

impl FakeDirectory {
    pub(crate) async fn add_user(&self, display_name: &str, email: &str) -> UserId {
        let user_id = UserId::new();
        let email = EmailAddress::new(email).unwrap_or_else(|error| panic!("{error}"));
        self.users
            .lock()
            .await
            .push(UserProfile::new(user_id, display_name, email));
        user_id
    }

    pub(crate) async fn add_domain(&self) -> DomainId {
        let domain_id = DomainId::new();
        self.domains.lock().await.insert(domain_id);
        domain_id
    }
}

#[async_trait]
impl UserDirectory for FakeDirectory {
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserProfile>> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|profile| profile.id() == user_id)
            .cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> AppResult<Option<UserProfile>> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|profile| profile.email() == email)
            .cloned())
    }

    async fn find_by_ids(&self, user_ids: &[UserId]) -> AppResult<Vec<UserProfile>> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .filter(|profile| user_ids.contains(&profile.id()))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OrganizationDirectory for FakeDirectory {
    async fn domain_exists(&self, domain_id: DomainId) -> AppResult<bool> {
        Ok(self.domains.lock().await.contains(&domain_id))
    }
}

/// Mail sent through [`FakeMailer`].
#[derive(Debug, Clone)]
pub(crate) struct SentInvite {
    pub(crate) recipient: String,
    pub(crate) subject: String,
    pub(crate) inviter_name: String,
    pub(crate) token: String,
}

/// Fake mailer that records deliveries and can be told to fail.
#[derive(Default)]
pub(crate) struct FakeMailer {
    pub(crate) sent: Mutex<Vec<SentInvite>>,
    failing: AtomicBool,
}

impl FakeMailer {
    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) async fn last_token(&self) -> Option<String> {
        self.sent.lock().await.last().map(|mail| mail.token.clone())
    }
}

#[async_trait]
impl InviteMailer for FakeMailer {
    async fn send_invite(
        &self,
        recipient: &EmailAddress,
        subject: &str,
        inviter_name: &str,
        token: &str,
    ) -> AppResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Internal("smtp relay refused message".to_owned()));
        }

        self.sent.lock().await.push(SentInvite {
            recipient: recipient.as_str().to_owned(),
            subject: subject.to_owned(),
            inviter_name: inviter_name.to_owned(),
            token: token.to_owned(),
        });
        Ok(())
    }
}
