//! In-memory adapter for policies, role assignments and invites.
//!
//! All three tables sit behind one lock, so every multi-step write
//! (guarded role change, redemption, invite supersede) is atomic.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use tenura_application::{
    InviteRecord, InviteRepository, MembershipChange, PolicyRepository, RedeemOutcome,
    RoleAssignmentRepository,
};
use tenura_core::{AppResult, DomainId};
use tenura_domain::{PolicyRule, Role, RoleAssignment, UserId, can_remove_or_demote};

mod assignments;
mod invites;

#[derive(Debug, Default)]
struct AccessTables {
    rules: BTreeSet<PolicyRule>,
    assignments: BTreeMap<(DomainId, UserId), Role>,
    invites: HashMap<String, InviteRecord>,
}

impl AccessTables {
    fn owners(&self, domain_id: DomainId) -> BTreeSet<UserId> {
        self.domain_assignments(domain_id)
            .filter(|(_, role)| role.is_owner())
            .map(|(user_id, _)| user_id)
            .collect()
    }

    fn domain_assignments(&self, domain_id: DomainId) -> impl Iterator<Item = (UserId, Role)> {
        self.assignments
            .range((domain_id, UserId::from_uuid(uuid::Uuid::nil()))..)
            .take_while(move |((stored_domain, _), _)| *stored_domain == domain_id)
            .map(|((_, user_id), role)| (*user_id, *role))
    }
}

/// In-memory implementation of the policy, assignment and invite ports.
#[derive(Debug, Default)]
pub struct InMemoryAccessStore {
    tables: RwLock<AccessTables>,
}

impl InMemoryAccessStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PolicyRepository for InMemoryAccessStore {
    async fn list_all_rules(&self) -> AppResult<Vec<PolicyRule>> {
        Ok(self.tables.read().await.rules.iter().cloned().collect())
    }

    async fn list_domain_rules(&self, domain_id: DomainId) -> AppResult<Vec<PolicyRule>> {
        Ok(self
            .tables
            .read()
            .await
            .rules
            .iter()
            .filter(|rule| rule.domain_id() == domain_id)
            .cloned()
            .collect())
    }

    async fn insert_rules(&self, rules: &[PolicyRule]) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let mut inserted = 0;
        for rule in rules {
            if tables.rules.insert(rule.clone()) {
                inserted += 1;
            }
        }

        Ok(inserted)
    }

    async fn delete_rules(&self, rules: &[PolicyRule]) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let mut deleted = 0;
        for rule in rules {
            if tables.rules.remove(rule) {
                deleted += 1;
            }
        }

        Ok(deleted)
    }

    async fn delete_domain_rules(&self, domain_id: DomainId) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.rules.len();
        tables.rules.retain(|rule| rule.domain_id() != domain_id);
        Ok((before - tables.rules.len()) as u64)
    }
}
