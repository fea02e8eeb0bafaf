//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod console_email_service;
mod email_invite_mailer;
mod in_memory_access_store;
mod in_memory_directory;
mod postgres_directory;
mod postgres_invite_repository;
mod postgres_policy_repository;
mod postgres_role_assignment_repository;
mod postgres_support;
mod smtp_email_service;

pub use console_email_service::ConsoleEmailService;
pub use email_invite_mailer::EmailInviteMailer;
pub use in_memory_access_store::InMemoryAccessStore;
pub use in_memory_directory::InMemoryDirectory;
pub use postgres_directory::{PostgresOrganizationDirectory, PostgresUserDirectory};
pub use postgres_invite_repository::PostgresInviteRepository;
pub use postgres_policy_repository::PostgresPolicyRepository;
pub use postgres_role_assignment_repository::PostgresRoleAssignmentRepository;
pub use smtp_email_service::{SmtpEmailConfig, SmtpEmailService};
