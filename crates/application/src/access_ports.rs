mod assignments;
mod directory;
mod invites;
mod mail;
mod policies;

pub use assignments::{MembershipChange, RoleAssignmentRepository};
pub use directory::{OrganizationDirectory, UserDirectory};
pub use invites::{InviteRecord, InviteRepository, RedeemOutcome};
pub use mail::{EmailService, InviteMailer};
pub use policies::{PermissionGrant, PolicyRepository};
