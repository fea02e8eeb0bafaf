//! Application services and ports.

#![forbid(unsafe_code)]

mod access_admin_service;
mod access_ports;
mod authorization_service;
mod invite_service;
mod policy_store;

#[cfg(test)]
mod test_support;

pub use access_admin_service::{AccessAdminService, MemberSummary};
pub use access_ports::{
    EmailService, InviteMailer, InviteRecord, InviteRepository, MembershipChange,
    OrganizationDirectory, PermissionGrant, PolicyRepository, RedeemOutcome,
    RoleAssignmentRepository, UserDirectory,
};
pub use authorization_service::AuthorizationService;
pub use invite_service::{InviteService, InviteSettings};
pub use policy_store::PolicyStore;
