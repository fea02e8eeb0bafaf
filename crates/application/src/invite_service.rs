//! Invitation workflow: issue, redeem, revoke and expire single-use tokens.
//!
//! Tokens are 256-bit random hex strings. Only their SHA-256 hash is stored;
//! the raw value exists only in the invitation mail.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use tenura_core::{AppError, AppResult, DomainId};
use tenura_domain::{Role, UserId};

use crate::{
    InviteMailer, InviteRecord, InviteRepository, OrganizationDirectory, RoleAssignmentRepository,
    UserDirectory,
};

mod issue;
mod redeem;
mod token_crypto;

const MAX_TTL_DAYS: i64 = 365;

/// Tunables for issued invitations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InviteSettings {
    ttl: Duration,
    default_role: Role,
}

impl InviteSettings {
    /// Creates settings. The granted role must not be `owner` and the TTL must be
    /// positive and at most a year.
    pub fn new(ttl: Duration, default_role: Role) -> AppResult<Self> {
        if default_role.is_owner() {
            return Err(AppError::Validation(
                "invites cannot grant the owner role".to_owned(),
            ));
        }

        if ttl <= Duration::zero() {
            return Err(AppError::Validation(
                "invite ttl must be positive".to_owned(),
            ));
        }

        if ttl > Duration::days(MAX_TTL_DAYS) {
            return Err(AppError::Validation(format!(
                "invite ttl must not exceed {MAX_TTL_DAYS} days"
            )));
        }

        Ok(Self { ttl, default_role })
    }

    /// Returns the lifetime of a token.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the role granted on redemption.
    #[must_use]
    pub fn default_role(&self) -> Role {
        self.default_role
    }
}

impl Default for InviteSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::days(7),
            default_role: Role::Moderator,
        }
    }
}

/// Application service driving the invitation state machine.
#[derive(Clone)]
pub struct InviteService {
    invites: Arc<dyn InviteRepository>,
    assignments: Arc<dyn RoleAssignmentRepository>,
    users: Arc<dyn UserDirectory>,
    organizations: Arc<dyn OrganizationDirectory>,
    mailer: Arc<dyn InviteMailer>,
    settings: InviteSettings,
}

impl InviteService {
    /// Creates a new invite service.
    #[must_use]
    pub fn new(
        invites: Arc<dyn InviteRepository>,
        assignments: Arc<dyn RoleAssignmentRepository>,
        users: Arc<dyn UserDirectory>,
        organizations: Arc<dyn OrganizationDirectory>,
        mailer: Arc<dyn InviteMailer>,
        settings: InviteSettings,
    ) -> Self {
        Self {
            invites,
            assignments,
            users,
            organizations,
            mailer,
            settings,
        }
    }

    /// Returns the active settings.
    #[must_use]
    pub fn settings(&self) -> InviteSettings {
        self.settings
    }

    /// Revokes the pending invites addressed to a user in a domain.
    pub async fn revoke(&self, domain_id: DomainId, invited_user_id: UserId) -> AppResult<bool> {
        let deleted = self
            .invites
            .delete_member_invites(domain_id, invited_user_id)
            .await?;

        Ok(deleted > 0)
    }

    /// Lists unexpired invites issued for a domain.
    pub async fn pending_invites(
        &self,
        domain_id: DomainId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<InviteRecord>> {
        let mut invites = self.invites.list_domain_invites(domain_id).await?;
        invites.retain(|invite| !invite.is_expired(now));
        invites.sort_by_key(|invite| invite.issued_at);
        Ok(invites)
    }

    /// Lists unexpired invites addressed to a user.
    pub async fn invites_for(
        &self,
        invited_user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<InviteRecord>> {
        let mut invites = self.invites.list_user_invites(invited_user_id).await?;
        invites.retain(|invite| !invite.is_expired(now));
        invites.sort_by_key(|invite| invite.issued_at);
        Ok(invites)
    }

    /// Deletes invites that expired at or before `now`. Returns how many were removed.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        self.invites.delete_expired_invites(now).await
    }
}
