use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tenura_application::{InviteRecord, InviteRepository, RedeemOutcome};
use tenura_core::{AppError, AppResult, DomainId};
use tenura_domain::{Role, RoleAssignment, UserId};

mod redeem;

/// PostgreSQL-backed invite token repository.
#[derive(Clone)]
pub struct PostgresInviteRepository {
    pool: PgPool,
}

impl PostgresInviteRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InviteRow {
    token_hash: String,
    inviter_user_id: uuid::Uuid,
    invited_user_id: uuid::Uuid,
    domain_id: uuid::Uuid,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<InviteRow> for InviteRecord {
    fn from(row: InviteRow) -> Self {
        Self {
            token_hash: row.token_hash,
            inviter_user_id: UserId::from_uuid(row.inviter_user_id),
            invited_user_id: UserId::from_uuid(row.invited_user_id),
            domain_id: DomainId::from_uuid(row.domain_id),
            issued_at: row.issued_at,
            expires_at: row.expires_at,
        }
    }
}

#[async_trait]
impl InviteRepository for PostgresInviteRepository {
    async fn create_invite(&self, invite: &InviteRecord) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO invite_tokens (
                token_hash,
                inviter_user_id,
                invited_user_id,
                domain_id,
                issued_at,
                expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(invite.token_hash.as_str())
        .bind(invite.inviter_user_id.as_uuid())
        .bind(invite.invited_user_id.as_uuid())
        .bind(invite.domain_id.as_uuid())
        .bind(invite.issued_at)
        .bind(invite.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to create invite: {error}")))?;

        Ok(())
    }

    async fn supersede_invites(
        &self,
        domain_id: DomainId,
        invited_user_id: UserId,
        keep_token_hash: &str,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM invite_tokens
            WHERE domain_id = $1 AND invited_user_id = $2 AND token_hash <> $3
            "#,
        )
        .bind(domain_id.as_uuid())
        .bind(invited_user_id.as_uuid())
        .bind(keep_token_hash)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to supersede pending invites: {error}"))
        })?;

        Ok(result.rows_affected())
    }

    async fn list_domain_invites(&self, domain_id: DomainId) -> AppResult<Vec<InviteRecord>> {
        let rows = sqlx::query_as::<_, InviteRow>(
            r#"
            SELECT token_hash, inviter_user_id, invited_user_id, domain_id, issued_at, expires_at
            FROM invite_tokens
            WHERE domain_id = $1
            ORDER BY issued_at
            "#,
        )
        .bind(domain_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list domain invites: {error}")))?;

        Ok(rows.into_iter().map(InviteRecord::from).collect())
    }

    async fn list_user_invites(&self, user_id: UserId) -> AppResult<Vec<InviteRecord>> {
        let rows = sqlx::query_as::<_, InviteRow>(
            r#"
            SELECT token_hash, inviter_user_id, invited_user_id, domain_id, issued_at, expires_at
            FROM invite_tokens
            WHERE invited_user_id = $1
            ORDER BY issued_at
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list user invites: {error}")))?;

        Ok(rows.into_iter().map(InviteRecord::from).collect())
    }

    async fn delete_invite(&self, token_hash: &str) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM invite_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete invite: {error}")))?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_member_invites(
        &self,
        domain_id: DomainId,
        invited_user_id: UserId,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM invite_tokens
            WHERE domain_id = $1 AND invited_user_id = $2
            "#,
        )
        .bind(domain_id.as_uuid())
        .bind(invited_user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to revoke invites: {error}")))?;

        Ok(result.rows_affected())
    }

    async fn delete_domain_invites(&self, domain_id: DomainId) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM invite_tokens
            WHERE domain_id = $1
            "#,
        )
        .bind(domain_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to delete invites for domain '{domain_id}': {error}"
            ))
        })?;

        Ok(result.rows_affected())
    }

    async fn delete_expired_invites(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM invite_tokens
            WHERE expires_at <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to purge expired invites: {error}"))
        })?;

        Ok(result.rows_affected())
    }

    async fn redeem_invite(
        &self,
        token_hash: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> AppResult<RedeemOutcome> {
        self.redeem_invite_impl(token_hash, role, now).await
    }
}
