use async_trait::async_trait;
use sqlx::PgPool;

use tenura_application::PolicyRepository;
use tenura_core::{AppError, AppResult, DomainId};
use tenura_domain::PolicyRule;

use crate::postgres_support::parse_stored_role;

/// PostgreSQL-backed policy rule repository.
#[derive(Clone)]
pub struct PostgresPolicyRepository {
    pool: PgPool,
}

impl PostgresPolicyRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PolicyRow {
    domain_id: uuid::Uuid,
    role: String,
    resource: String,
    action: String,
}

impl TryFrom<PolicyRow> for PolicyRule {
    type Error = AppError;

    fn try_from(row: PolicyRow) -> Result<Self, Self::Error> {
        Ok(PolicyRule::new(
            parse_stored_role(row.role.as_str())?,
            DomainId::from_uuid(row.domain_id),
            row.resource,
            row.action,
        ))
    }
}

#[async_trait]
impl PolicyRepository for PostgresPolicyRepository {
    async fn list_all_rules(&self) -> AppResult<Vec<PolicyRule>> {
        let rows = sqlx::query_as::<_, PolicyRow>(
            r#"
            SELECT domain_id, role, resource, action
            FROM policy_rules
            ORDER BY domain_id, role, resource, action
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list policy rules: {error}")))?;

        rows.into_iter().map(PolicyRule::try_from).collect()
    }

    async fn list_domain_rules(&self, domain_id: DomainId) -> AppResult<Vec<PolicyRule>> {
        let rows = sqlx::query_as::<_, PolicyRow>(
            r#"
            SELECT domain_id, role, resource, action
            FROM policy_rules
            WHERE domain_id = $1
            ORDER BY role, resource, action
            "#,
        )
        .bind(domain_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list policy rules for domain '{domain_id}': {error}"
            ))
        })?;

        rows.into_iter().map(PolicyRule::try_from).collect()
    }

    async fn insert_rules(&self, rules: &[PolicyRule]) -> AppResult<u64> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let mut inserted = 0;
        for rule in rules {
            inserted += sqlx::query(
                r#"
                INSERT INTO policy_rules (domain_id, role, resource, action)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (domain_id, role, resource, action) DO NOTHING
                "#,
            )
            .bind(rule.domain_id().as_uuid())
            .bind(rule.role().as_str())
            .bind(rule.resource())
            .bind(rule.action())
            .execute(&mut *transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to insert policy rule: {error}")))?
            .rows_affected();
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(inserted)
    }

    async fn delete_rules(&self, rules: &[PolicyRule]) -> AppResult<u64> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let mut deleted = 0;
        for rule in rules {
            deleted += sqlx::query(
                r#"
                DELETE FROM policy_rules
                WHERE domain_id = $1
                    AND role = $2
                    AND resource = $3
                    AND action = $4
                "#,
            )
            .bind(rule.domain_id().as_uuid())
            .bind(rule.role().as_str())
            .bind(rule.resource())
            .bind(rule.action())
            .execute(&mut *transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete policy rule: {error}")))?
            .rows_affected();
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(deleted)
    }

    async fn delete_domain_rules(&self, domain_id: DomainId) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM policy_rules
            WHERE domain_id = $1
            "#,
        )
        .bind(domain_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to delete policy rules for domain '{domain_id}': {error}"
            ))
        })?;

        Ok(result.rows_affected())
    }
}
