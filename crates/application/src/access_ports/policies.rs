use async_trait::async_trait;

use tenura_core::{AppResult, DomainId};
use tenura_domain::PolicyRule;

/// `(resource, action)` pair submitted for a role.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PermissionGrant {
    /// Resource name from the permission registry.
    pub resource: String,
    /// Action name valid for the resource.
    pub action: String,
}

impl PermissionGrant {
    /// Creates a grant pair.
    #[must_use]
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
        }
    }
}

/// Repository port for durable policy rules.
///
/// Bulk writes run in a single transaction. Rules that already exist (insert)
/// or are already absent (delete) are skipped rather than failing the batch.
#[async_trait]
pub trait PolicyRepository: Send + Sync {
    /// Lists every persisted rule.
    async fn list_all_rules(&self) -> AppResult<Vec<PolicyRule>>;

    /// Lists the rules of one domain.
    async fn list_domain_rules(&self, domain_id: DomainId) -> AppResult<Vec<PolicyRule>>;

    /// Inserts rules and returns how many were new.
    async fn insert_rules(&self, rules: &[PolicyRule]) -> AppResult<u64>;

    /// Deletes rules and returns how many existed.
    async fn delete_rules(&self, rules: &[PolicyRule]) -> AppResult<u64>;

    /// Deletes every rule of a domain.
    async fn delete_domain_rules(&self, domain_id: DomainId) -> AppResult<u64>;
}
