use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use tenura_application::{OrganizationDirectory, UserDirectory};
use tenura_core::{AppError, AppResult, DomainId};
use tenura_domain::{EmailAddress, UserId, UserProfile};

/// In-memory user and organization directory.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: RwLock<HashMap<UserId, UserProfile>>,
    organizations: RwLock<BTreeSet<DomainId>>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user. Email addresses are unique.
    pub async fn insert_user(&self, profile: UserProfile) -> AppResult<()> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|stored| stored.id() != profile.id() && stored.email() == profile.email())
        {
            return Err(AppError::Conflict(format!(
                "email '{}' is already registered",
                profile.email().as_str()
            )));
        }

        users.insert(profile.id(), profile);
        Ok(())
    }

    /// Registers an organization.
    pub async fn insert_organization(&self, domain_id: DomainId) {
        self.organizations.write().await.insert(domain_id);
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserProfile>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> AppResult<Option<UserProfile>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|profile| profile.email() == email)
            .cloned())
    }

    async fn find_by_ids(&self, user_ids: &[UserId]) -> AppResult<Vec<UserProfile>> {
        let users = self.users.read().await;
        Ok(user_ids
            .iter()
            .filter_map(|user_id| users.get(user_id).cloned())
            .collect())
    }
}

#[async_trait]
impl OrganizationDirectory for InMemoryDirectory {
    async fn domain_exists(&self, domain_id: DomainId) -> AppResult<bool> {
        Ok(self.organizations.read().await.contains(&domain_id))
    }
}
