use super::*;

impl PostgresInviteRepository {
    pub(super) async fn redeem_invite_impl(
        &self,
        token_hash: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> AppResult<RedeemOutcome> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let invite = sqlx::query_as::<_, InviteRow>(
            r#"
            SELECT token_hash, inviter_user_id, invited_user_id, domain_id, issued_at, expires_at
            FROM invite_tokens
            WHERE token_hash = $1 AND expires_at > $2
            FOR UPDATE
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve invite: {error}")))?
        .map(InviteRecord::from);

        let Some(invite) = invite else {
            return Ok(RedeemOutcome::NotFound);
        };

        let assigned = sqlx::query(
            r#"
            INSERT INTO role_assignments (user_id, domain_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, domain_id) DO NOTHING
            "#,
        )
        .bind(invite.invited_user_id.as_uuid())
        .bind(invite.domain_id.as_uuid())
        .bind(role.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to assign invited role: {error}")))?
        .rows_affected();

        if assigned == 0 {
            return Ok(RedeemOutcome::AlreadyMember);
        }

        sqlx::query(
            r#"
            DELETE FROM invite_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to consume invite: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(RedeemOutcome::Redeemed(RoleAssignment {
            user_id: invite.invited_user_id,
            domain_id: invite.domain_id,
            role,
        }))
    }
}
