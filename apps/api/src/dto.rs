//! Request and response payloads of the HTTP surface.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tenura_application::{InviteRecord, MemberSummary, PermissionGrant};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Registry catalog keyed by resource.
#[derive(Debug, Serialize)]
pub struct PermissionCatalogResponse {
    pub resources: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct EnforceRequest {
    pub domain_id: Uuid,
    pub resource: String,
    pub action: String,
}

#[derive(Debug, Serialize)]
pub struct EnforceResponse {
    pub allowed: bool,
}

/// Outcome of a mutation that may be refused by a business rule.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct AppliedResponse {
    pub applied: bool,
}

impl From<bool> for AppliedResponse {
    fn from(applied: bool) -> Self {
        Self { applied }
    }
}

#[derive(Debug, Serialize)]
pub struct MemberResponse {
    pub user_id: String,
    pub role: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

impl From<MemberSummary> for MemberResponse {
    fn from(value: MemberSummary) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            role: value.role.as_str().to_owned(),
            display_name: value.display_name,
            email: value.email,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: Uuid,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct EditRoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct PermissionGrantRequest {
    pub resource: String,
    pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct PolicyBatchRequest {
    pub permissions: Vec<PermissionGrantRequest>,
}

impl PolicyBatchRequest {
    pub fn into_grants(self) -> Vec<PermissionGrant> {
        self.permissions
            .into_iter()
            .map(|grant| PermissionGrant::new(grant.resource, grant.action))
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct RolePoliciesResponse {
    pub role: String,
    pub resources: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub email: String,
}

/// Pending invite without its token hash.
#[derive(Debug, Serialize)]
pub struct InviteResponse {
    pub invited_user_id: String,
    pub inviter_user_id: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<InviteRecord> for InviteResponse {
    fn from(value: InviteRecord) -> Self {
        Self {
            invited_user_id: value.invited_user_id.to_string(),
            inviter_user_id: value.inviter_user_id.to_string(),
            issued_at: value.issued_at,
            expires_at: value.expires_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RedeemInviteRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct InitializeDomainRequest {
    pub owner_user_id: Uuid,
}
