//! Policy rules with a read-optimized in-memory view.
//!
//! Writes go to the durable repository first, then the affected domains are
//! reloaded and swapped into the view under one write guard. Readers see
//! either the state before a (possibly multi-rule) mutation or after it,
//! never a partial one.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use tenura_core::{AppResult, DomainId};
use tenura_domain::{PolicyRule, PolicySet, Role};

use crate::PolicyRepository;

/// Policy store shared by the enforcer and the administration façade.
#[derive(Clone)]
pub struct PolicyStore {
    repository: Arc<dyn PolicyRepository>,
    view: Arc<RwLock<PolicySet>>,
    write_lock: Arc<Mutex<()>>,
}

impl PolicyStore {
    /// Creates a store and loads every persisted rule.
    pub async fn load(repository: Arc<dyn PolicyRepository>) -> AppResult<Self> {
        let rules = repository.list_all_rules().await?;

        Ok(Self {
            repository,
            view: Arc::new(RwLock::new(PolicySet::from_rules(rules))),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Replaces the whole view with the durable state.
    pub async fn reload(&self) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;
        let rules = self.repository.list_all_rules().await?;
        *self.view.write().await = PolicySet::from_rules(rules);
        Ok(())
    }

    /// Adds one rule. Returns `false` when it already exists.
    pub async fn add_rule(&self, rule: PolicyRule) -> AppResult<bool> {
        self.add_rules(vec![rule]).await
    }

    /// Adds rules in one transaction. Returns `true` when at least one rule was new.
    pub async fn add_rules(&self, rules: Vec<PolicyRule>) -> AppResult<bool> {
        if rules.is_empty() {
            return Ok(false);
        }

        let _guard = self.write_lock.lock().await;
        let inserted = self.repository.insert_rules(&rules).await?;
        self.refresh_domains(domains_of(&rules)).await?;
        Ok(inserted > 0)
    }

    /// Removes one rule. Returns `false` when it did not exist.
    pub async fn remove_rule(&self, rule: PolicyRule) -> AppResult<bool> {
        self.remove_rules(vec![rule]).await
    }

    /// Removes rules in one transaction. Returns `true` when at least one rule existed.
    pub async fn remove_rules(&self, rules: Vec<PolicyRule>) -> AppResult<bool> {
        if rules.is_empty() {
            return Ok(false);
        }

        let _guard = self.write_lock.lock().await;
        let deleted = self.repository.delete_rules(&rules).await?;
        self.refresh_domains(domains_of(&rules)).await?;
        Ok(deleted > 0)
    }

    /// Removes every rule of a domain.
    pub async fn remove_domain(&self, domain_id: DomainId) -> AppResult<bool> {
        let _guard = self.write_lock.lock().await;
        let deleted = self.repository.delete_domain_rules(domain_id).await?;
        self.refresh_domains(BTreeSet::from([domain_id])).await?;
        Ok(deleted > 0)
    }

    /// Returns whether `(role, domain, resource, action)` is allowed.
    pub async fn allows(
        &self,
        role: Role,
        domain_id: DomainId,
        resource: &str,
        action: &str,
    ) -> bool {
        self.view
            .read()
            .await
            .allows(role, domain_id, resource, action)
    }

    /// Groups a role's actions by resource.
    pub async fn rules_for(&self, role: Role, domain_id: DomainId) -> BTreeMap<String, Vec<String>> {
        self.view.read().await.rules_for(role, domain_id)
    }

    /// Returns the roles allowed to perform the action on the resource.
    pub async fn roles_granted(
        &self,
        domain_id: DomainId,
        resource: &str,
        action: &str,
    ) -> BTreeSet<Role> {
        self.view
            .read()
            .await
            .roles_granted(domain_id, resource, action)
    }

    /// Returns a point-in-time copy of the view.
    pub async fn snapshot(&self) -> PolicySet {
        self.view.read().await.clone()
    }

    async fn refresh_domains(&self, domain_ids: BTreeSet<DomainId>) -> AppResult<()> {
        let mut reloaded = Vec::with_capacity(domain_ids.len());
        for domain_id in domain_ids {
            let rules = self.repository.list_domain_rules(domain_id).await?;
            reloaded.push((domain_id, rules));
        }

        let mut view = self.view.write().await;
        for (domain_id, rules) in reloaded {
            view.replace_domain(domain_id, rules);
        }

        Ok(())
    }
}

fn domains_of(rules: &[PolicyRule]) -> BTreeSet<DomainId> {
    rules.iter().map(PolicyRule::domain_id).collect()
}
