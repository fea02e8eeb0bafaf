//! PostgreSQL-backed role assignments.
//!
//! Owner-guarded mutations take a per-domain advisory lock so concurrent
//! demotions cannot both observe a second owner.

use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::PgPool;

use tenura_application::{MembershipChange, RoleAssignmentRepository};
use tenura_core::{AppError, AppResult, DomainId};
use tenura_domain::{Role, RoleAssignment, UserId, can_remove_or_demote};

use crate::postgres_support::{lock_domain, parse_stored_role};

mod guarded;

/// PostgreSQL implementation of the role assignment port.
#[derive(Clone)]
pub struct PostgresRoleAssignmentRepository {
    pool: PgPool,
}

impl PostgresRoleAssignmentRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AssignmentRow {
    user_id: uuid::Uuid,
    domain_id: uuid::Uuid,
    role: String,
}

impl TryFrom<AssignmentRow> for RoleAssignment {
    type Error = AppError;

    fn try_from(row: AssignmentRow) -> Result<Self, Self::Error> {
        Ok(RoleAssignment {
            user_id: UserId::from_uuid(row.user_id),
            domain_id: DomainId::from_uuid(row.domain_id),
            role: parse_stored_role(row.role.as_str())?,
        })
    }
}

#[async_trait]
impl RoleAssignmentRepository for PostgresRoleAssignmentRepository {
    async fn assign_role(
        &self,
        user_id: UserId,
        domain_id: DomainId,
        role: Role,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO role_assignments (user_id, domain_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, domain_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(domain_id.as_uuid())
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to assign role: {error}")))?;

        Ok(result.rows_affected() == 1)
    }

    async fn roles_of(&self, user_id: UserId, domain_id: DomainId) -> AppResult<Vec<Role>> {
        let roles = sqlx::query_scalar::<_, String>(
            r#"
            SELECT role
            FROM role_assignments
            WHERE user_id = $1 AND domain_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(domain_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve roles: {error}")))?;

        roles
            .iter()
            .map(|role| parse_stored_role(role.as_str()))
            .collect()
    }

    async fn users_with_role(
        &self,
        domain_id: DomainId,
        role: Role,
    ) -> AppResult<BTreeSet<UserId>> {
        let user_ids = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            SELECT user_id
            FROM role_assignments
            WHERE domain_id = $1 AND role = $2
            "#,
        )
        .bind(domain_id.as_uuid())
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list users with role: {error}"))
        })?;

        Ok(user_ids.into_iter().map(UserId::from_uuid).collect())
    }

    async fn all_users(&self, domain_id: DomainId) -> AppResult<BTreeSet<UserId>> {
        let user_ids = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            SELECT user_id
            FROM role_assignments
            WHERE domain_id = $1
            "#,
        )
        .bind(domain_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list domain users: {error}")))?;

        Ok(user_ids.into_iter().map(UserId::from_uuid).collect())
    }

    async fn list_assignments(&self, domain_id: DomainId) -> AppResult<Vec<RoleAssignment>> {
        let rows = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT user_id, domain_id, role
            FROM role_assignments
            WHERE domain_id = $1
            ORDER BY assigned_at, user_id
            "#,
        )
        .bind(domain_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list role assignments: {error}"))
        })?;

        rows.into_iter().map(RoleAssignment::try_from).collect()
    }

    async fn change_role(
        &self,
        user_id: UserId,
        domain_id: DomainId,
        role: Role,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE role_assignments
            SET role = $3
            WHERE user_id = $1 AND domain_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(domain_id.as_uuid())
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to change role: {error}")))?;

        Ok(result.rows_affected() == 1)
    }

    async fn remove_assignment(&self, user_id: UserId, domain_id: DomainId) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM role_assignments
            WHERE user_id = $1 AND domain_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(domain_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to remove role assignment: {error}"))
        })?;

        Ok(result.rows_affected() == 1)
    }

    async fn remove_all_assignments(&self, domain_id: DomainId) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM role_assignments
            WHERE domain_id = $1
            "#,
        )
        .bind(domain_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to remove role assignments for domain '{domain_id}': {error}"
            ))
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn domains_of(&self, user_id: UserId) -> AppResult<BTreeSet<DomainId>> {
        let domain_ids = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            SELECT domain_id
            FROM role_assignments
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list user domains: {error}")))?;

        Ok(domain_ids.into_iter().map(DomainId::from_uuid).collect())
    }

    async fn try_change_role(
        &self,
        user_id: UserId,
        domain_id: DomainId,
        role: Role,
    ) -> AppResult<MembershipChange> {
        self.try_change_role_impl(user_id, domain_id, role).await
    }

    async fn try_remove_member(
        &self,
        user_id: UserId,
        domain_id: DomainId,
    ) -> AppResult<MembershipChange> {
        self.try_remove_member_impl(user_id, domain_id).await
    }
}
