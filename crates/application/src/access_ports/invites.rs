use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tenura_core::{AppResult, DomainId};
use tenura_domain::{Role, RoleAssignment, UserId};

/// Pending invitation as persisted. Only the SHA-256 hash of the token is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteRecord {
    /// Hex SHA-256 of the raw token.
    pub token_hash: String,
    /// Member who issued the invite.
    pub inviter_user_id: UserId,
    /// User resolved from the invited email address.
    pub invited_user_id: UserId,
    /// Domain the invitee joins on redemption.
    pub domain_id: DomainId,
    /// Issue timestamp.
    pub issued_at: DateTime<Utc>,
    /// Instant after which the token no longer redeems.
    pub expires_at: DateTime<Utc>,
}

impl InviteRecord {
    /// Returns whether the invite can no longer be redeemed.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Outcome of an atomic redemption attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedeemOutcome {
    /// Assignment created and token deleted.
    Redeemed(RoleAssignment),
    /// No live token matches the hash.
    NotFound,
    /// The invitee already holds a role; the token stays valid.
    AlreadyMember,
}

/// Repository port for invite tokens.
#[async_trait]
pub trait InviteRepository: Send + Sync {
    /// Persists a new invite. Earlier invites for the same pair are left untouched.
    async fn create_invite(&self, invite: &InviteRecord) -> AppResult<()>;

    /// Deletes the invites for `invited_user_id` in `domain_id` except `keep_token_hash`.
    async fn supersede_invites(
        &self,
        domain_id: DomainId,
        invited_user_id: UserId,
        keep_token_hash: &str,
    ) -> AppResult<u64>;

    /// Lists invites issued for a domain.
    async fn list_domain_invites(&self, domain_id: DomainId) -> AppResult<Vec<InviteRecord>>;

    /// Lists invites addressed to a user.
    async fn list_user_invites(&self, user_id: UserId) -> AppResult<Vec<InviteRecord>>;

    /// Deletes one invite by token hash.
    async fn delete_invite(&self, token_hash: &str) -> AppResult<bool>;

    /// Deletes the invites addressed to a user in a domain.
    async fn delete_member_invites(
        &self,
        domain_id: DomainId,
        invited_user_id: UserId,
    ) -> AppResult<u64>;

    /// Deletes every invite of a domain.
    async fn delete_domain_invites(&self, domain_id: DomainId) -> AppResult<u64>;

    /// Deletes invites whose expiry is at or before `now`.
    async fn delete_expired_invites(&self, now: DateTime<Utc>) -> AppResult<u64>;

    /// Grants `role` to the invitee and deletes the token in one transaction.
    async fn redeem_invite(
        &self,
        token_hash: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> AppResult<RedeemOutcome>;
}
