//! Catalog of resources and the actions each one accepts.
//!
//! The registry is a validation oracle for policy mutations. It never grants
//! anything by itself; authorization truth lives in the policy store.

use std::collections::{BTreeMap, BTreeSet};

use tenura_core::{AppError, AppResult};

/// Organization settings resource.
pub const RESOURCE_ORGANIZATION: &str = "Organization";
/// Member roster and role management resource.
pub const RESOURCE_EMPLOYEES: &str = "Employees";
/// Policy administration resource.
pub const RESOURCE_POLICIES: &str = "Policies";
/// Organization events resource.
pub const RESOURCE_EVENTS: &str = "Events";
/// Job postings resource.
pub const RESOURCE_JOBS: &str = "Jobs";
/// Member profiles resource.
pub const RESOURCE_PROFILES: &str = "Profiles";

/// Create action.
pub const ACTION_CREATE: &str = "create";
/// Read action.
pub const ACTION_READ: &str = "read";
/// Update action.
pub const ACTION_UPDATE: &str = "update";
/// Delete action.
pub const ACTION_DELETE: &str = "delete";
/// Invite action.
pub const ACTION_INVITE: &str = "invite";

const STANDARD_CATALOG: &[(&str, &[&str])] = &[
    (
        RESOURCE_ORGANIZATION,
        &[ACTION_READ, ACTION_UPDATE, ACTION_DELETE],
    ),
    (
        RESOURCE_EMPLOYEES,
        &[ACTION_READ, ACTION_INVITE, ACTION_UPDATE, ACTION_DELETE],
    ),
    (RESOURCE_POLICIES, &[ACTION_READ, ACTION_UPDATE]),
    (
        RESOURCE_EVENTS,
        &[ACTION_CREATE, ACTION_READ, ACTION_UPDATE, ACTION_DELETE],
    ),
    (
        RESOURCE_JOBS,
        &[ACTION_CREATE, ACTION_READ, ACTION_UPDATE, ACTION_DELETE],
    ),
    (RESOURCE_PROFILES, &[ACTION_READ]),
];

/// Read-only mapping from resource to its valid action set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRegistry {
    resources: BTreeMap<String, BTreeSet<String>>,
}

impl PermissionRegistry {
    /// Builds the catalog every deployment ships with.
    #[must_use]
    pub fn standard() -> Self {
        Self::from_catalog(STANDARD_CATALOG)
    }

    /// Builds a registry from `(resource, actions)` pairs.
    ///
    /// Repeated resources merge their action sets.
    #[must_use]
    pub fn from_catalog(catalog: &[(&str, &[&str])]) -> Self {
        let mut resources: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (resource, actions) in catalog {
            resources
                .entry((*resource).to_owned())
                .or_default()
                .extend(actions.iter().map(|action| (*action).to_owned()));
        }

        Self { resources }
    }

    /// Returns whether the action is valid for the resource.
    #[must_use]
    pub fn is_valid_action(&self, resource: &str, action: &str) -> bool {
        self.resources
            .get(resource)
            .is_some_and(|actions| actions.contains(action))
    }

    /// Returns a copy of the resource's action set, or `None` for unknown resources.
    #[must_use]
    pub fn actions_for(&self, resource: &str) -> Option<BTreeSet<String>> {
        self.resources.get(resource).cloned()
    }

    /// Returns every registered resource.
    #[must_use]
    pub fn all_resources(&self) -> BTreeSet<String> {
        self.resources.keys().cloned().collect()
    }

    /// Iterates over every valid `(resource, action)` pair.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.resources.iter().flat_map(|(resource, actions)| {
            actions
                .iter()
                .map(move |action| (resource.as_str(), action.as_str()))
        })
    }

    /// Rejects a `(resource, action)` pair the catalog does not know.
    pub fn validate(&self, resource: &str, action: &str) -> AppResult<()> {
        if self.is_valid_action(resource, action) {
            return Ok(());
        }

        Err(AppError::Validation(format!(
            "permission not exist: '{resource}:{action}'"
        )))
    }
}

impl Default for PermissionRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
