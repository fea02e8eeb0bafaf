use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tenura_core::DomainId;

use crate::{
    ACTION_READ, PermissionRegistry, RESOURCE_EVENTS, RESOURCE_JOBS, Role,
};

/// Allow statement binding a role, domain, resource and action.
///
/// Presence of a rule means "allow"; there is no deny effect.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PolicyRule {
    domain_id: DomainId,
    role: Role,
    resource: String,
    action: String,
}

impl PolicyRule {
    /// Creates a policy rule.
    #[must_use]
    pub fn new(
        role: Role,
        domain_id: DomainId,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            domain_id,
            role,
            resource: resource.into(),
            action: action.into(),
        }
    }

    /// Returns the role the rule grants to.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the owning domain.
    #[must_use]
    pub fn domain_id(&self) -> DomainId {
        self.domain_id
    }

    /// Returns the resource name.
    #[must_use]
    pub fn resource(&self) -> &str {
        self.resource.as_str()
    }

    /// Returns the action name.
    #[must_use]
    pub fn action(&self) -> &str {
        self.action.as_str()
    }
}

/// In-memory view of policy rules, partitioned by domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicySet {
    domains: BTreeMap<DomainId, BTreeSet<PolicyRule>>,
}

impl PolicySet {
    /// Builds a set from arbitrary rules.
    #[must_use]
    pub fn from_rules(rules: impl IntoIterator<Item = PolicyRule>) -> Self {
        let mut domains: BTreeMap<DomainId, BTreeSet<PolicyRule>> = BTreeMap::new();
        for rule in rules {
            domains.entry(rule.domain_id).or_default().insert(rule);
        }

        Self { domains }
    }

    /// Returns whether a rule `(role, domain, resource, action)` exists.
    #[must_use]
    pub fn allows(&self, role: Role, domain_id: DomainId, resource: &str, action: &str) -> bool {
        self.domains.get(&domain_id).is_some_and(|rules| {
            rules.iter().any(|rule| {
                rule.role == role && rule.resource == resource && rule.action == action
            })
        })
    }

    /// Groups a role's actions by resource inside one domain.
    #[must_use]
    pub fn rules_for(&self, role: Role, domain_id: DomainId) -> BTreeMap<String, Vec<String>> {
        let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for rule in self.domain_rules(domain_id).filter(|rule| rule.role == role) {
            grouped
                .entry(rule.resource.clone())
                .or_default()
                .push(rule.action.clone());
        }

        grouped
    }

    /// Returns every role allowed to perform the action on the resource.
    #[must_use]
    pub fn roles_granted(&self, domain_id: DomainId, resource: &str, action: &str) -> BTreeSet<Role> {
        self.domain_rules(domain_id)
            .filter(|rule| rule.resource == resource && rule.action == action)
            .map(|rule| rule.role)
            .collect()
    }

    /// Iterates over the rules of one domain.
    pub fn domain_rules(&self, domain_id: DomainId) -> impl Iterator<Item = &PolicyRule> {
        self.domains.get(&domain_id).into_iter().flatten()
    }

    /// Swaps in the authoritative rule set of one domain.
    pub fn replace_domain(&mut self, domain_id: DomainId, rules: impl IntoIterator<Item = PolicyRule>) {
        let rules: BTreeSet<PolicyRule> = rules
            .into_iter()
            .filter(|rule| rule.domain_id == domain_id)
            .collect();

        if rules.is_empty() {
            self.domains.remove(&domain_id);
        } else {
            self.domains.insert(domain_id, rules);
        }
    }

    /// Returns the total number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.domains.values().map(BTreeSet::len).sum()
    }

    /// Returns whether the set holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

/// Rules seeded into a freshly created domain.
///
/// Owners receive every catalog action. Moderators can read every resource
/// and manage events and jobs.
#[must_use]
pub fn default_policies(domain_id: DomainId, registry: &PermissionRegistry) -> Vec<PolicyRule> {
    let mut rules = Vec::new();
    for (resource, action) in registry.pairs() {
        rules.push(PolicyRule::new(Role::Owner, domain_id, resource, action));

        let moderator_manages = resource == RESOURCE_EVENTS || resource == RESOURCE_JOBS;
        if moderator_manages || action == ACTION_READ {
            rules.push(PolicyRule::new(Role::Moderator, domain_id, resource, action));
        }
    }

    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ACTION_DELETE, ACTION_INVITE, RESOURCE_EMPLOYEES, RESOURCE_POLICIES};

    fn rule(role: Role, domain_id: DomainId, resource: &str, action: &str) -> PolicyRule {
        PolicyRule::new(role, domain_id, resource, action)
    }

    #[test]
    fn allows_is_scoped_by_domain() {
        let first = DomainId::new();
        let second = DomainId::new();
        let set = PolicySet::from_rules([rule(Role::Moderator, first, "Events", "read")]);

        assert!(set.allows(Role::Moderator, first, "Events", "read"));
        assert!(!set.allows(Role::Moderator, second, "Events", "read"));
        assert!(!set.allows(Role::Owner, first, "Events", "read"));
    }

    #[test]
    fn rules_for_groups_actions_by_resource() {
        let domain_id = DomainId::new();
        let set = PolicySet::from_rules([
            rule(Role::Owner, domain_id, "Events", "read"),
            rule(Role::Owner, domain_id, "Events", "delete"),
            rule(Role::Owner, domain_id, "Jobs", "read"),
            rule(Role::Moderator, domain_id, "Jobs", "create"),
        ]);

        let grouped = set.rules_for(Role::Owner, domain_id);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped.get("Events").map(Vec::len), Some(2));
        assert_eq!(grouped.get("Jobs"), Some(&vec!["read".to_owned()]));
    }

    #[test]
    fn roles_granted_is_reverse_lookup() {
        let domain_id = DomainId::new();
        let set = PolicySet::from_rules([
            rule(Role::Owner, domain_id, "Events", "read"),
            rule(Role::Moderator, domain_id, "Events", "read"),
            rule(Role::Owner, domain_id, "Events", "delete"),
        ]);

        assert_eq!(set.roles_granted(domain_id, "Events", "read").len(), 2);
        assert_eq!(
            set.roles_granted(domain_id, "Events", "delete"),
            BTreeSet::from([Role::Owner])
        );
    }

    #[test]
    fn replace_domain_keeps_other_domains() {
        let first = DomainId::new();
        let second = DomainId::new();
        let mut set = PolicySet::from_rules([
            rule(Role::Owner, first, "Events", "read"),
            rule(Role::Owner, second, "Events", "read"),
        ]);

        set.replace_domain(first, Vec::new());
        assert_eq!(set.len(), 1);
        assert!(set.allows(Role::Owner, second, "Events", "read"));
    }

    #[test]
    fn default_policies_keep_management_with_owners() {
        let domain_id = DomainId::new();
        let registry = PermissionRegistry::standard();
        let set = PolicySet::from_rules(default_policies(domain_id, &registry));

        assert_eq!(
            set.domain_rules(domain_id)
                .filter(|rule| rule.role() == Role::Owner)
                .count(),
            registry.pairs().count()
        );
        assert!(set.allows(Role::Owner, domain_id, RESOURCE_POLICIES, "update"));
        assert!(set.allows(Role::Moderator, domain_id, RESOURCE_EVENTS, ACTION_DELETE));
        assert!(set.allows(Role::Moderator, domain_id, RESOURCE_EMPLOYEES, ACTION_READ));
        assert!(!set.allows(Role::Moderator, domain_id, RESOURCE_EMPLOYEES, ACTION_INVITE));
    }
}
