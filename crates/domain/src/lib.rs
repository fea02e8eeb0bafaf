//! Domain entities and invariants for tenant-scoped access control.

#![forbid(unsafe_code)]

mod owner_guard;
mod permission;
mod policy;
mod role;
mod user;

pub use owner_guard::can_remove_or_demote;
pub use permission::{
    ACTION_CREATE, ACTION_DELETE, ACTION_INVITE, ACTION_READ, ACTION_UPDATE, PermissionRegistry,
    RESOURCE_EMPLOYEES, RESOURCE_EVENTS, RESOURCE_JOBS, RESOURCE_ORGANIZATION, RESOURCE_POLICIES,
    RESOURCE_PROFILES,
};
pub use policy::{PolicyRule, PolicySet, default_policies};
pub use role::{Role, RoleAssignment};
pub use user::{EmailAddress, UserId, UserProfile};
