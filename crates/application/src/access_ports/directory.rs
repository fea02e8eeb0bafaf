use async_trait::async_trait;

use tenura_core::{AppResult, DomainId};
use tenura_domain::{EmailAddress, UserId, UserProfile};

/// Port resolving users to profile data.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds a user by identifier.
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserProfile>>;

    /// Finds a user by email address.
    async fn find_by_email(&self, email: &EmailAddress) -> AppResult<Option<UserProfile>>;

    /// Resolves a batch of identifiers. Unknown identifiers are omitted.
    async fn find_by_ids(&self, user_ids: &[UserId]) -> AppResult<Vec<UserProfile>>;
}

/// Port answering whether an organization exists.
#[async_trait]
pub trait OrganizationDirectory: Send + Sync {
    /// Returns whether the domain exists.
    async fn domain_exists(&self, domain_id: DomainId) -> AppResult<bool>;
}
