use sqlx::{Postgres, Transaction};

use super::*;

impl PostgresRoleAssignmentRepository {
    pub(super) async fn try_change_role_impl(
        &self,
        user_id: UserId,
        domain_id: DomainId,
        role: Role,
    ) -> AppResult<MembershipChange> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;
        lock_domain(&mut transaction, domain_id).await?;

        let Some(current) = current_role(&mut transaction, user_id, domain_id).await? else {
            return Ok(MembershipChange::NotMember);
        };

        if current.is_owner()
            && !role.is_owner()
            && !can_remove_or_demote(&owners(&mut transaction, domain_id).await?, user_id)
        {
            return Ok(MembershipChange::LastOwner);
        }

        sqlx::query(
            r#"
            UPDATE role_assignments
            SET role = $3
            WHERE user_id = $1 AND domain_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(domain_id.as_uuid())
        .bind(role.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to change role: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(MembershipChange::Applied)
    }

    pub(super) async fn try_remove_member_impl(
        &self,
        user_id: UserId,
        domain_id: DomainId,
    ) -> AppResult<MembershipChange> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;
        lock_domain(&mut transaction, domain_id).await?;

        let Some(current) = current_role(&mut transaction, user_id, domain_id).await? else {
            return Ok(MembershipChange::NotMember);
        };

        if current.is_owner()
            && !can_remove_or_demote(&owners(&mut transaction, domain_id).await?, user_id)
        {
            return Ok(MembershipChange::LastOwner);
        }

        sqlx::query(
            r#"
            DELETE FROM role_assignments
            WHERE user_id = $1 AND domain_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(domain_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove member: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(MembershipChange::Applied)
    }
}

async fn current_role(
    transaction: &mut Transaction<'_, Postgres>,
    user_id: UserId,
    domain_id: DomainId,
) -> AppResult<Option<Role>> {
    let role = sqlx::query_scalar::<_, String>(
        r#"
        SELECT role
        FROM role_assignments
        WHERE user_id = $1 AND domain_id = $2
        FOR UPDATE
        "#,
    )
    .bind(user_id.as_uuid())
    .bind(domain_id.as_uuid())
    .fetch_optional(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to resolve current role: {error}")))?;

    role.map(|role| parse_stored_role(role.as_str())).transpose()
}

async fn owners(
    transaction: &mut Transaction<'_, Postgres>,
    domain_id: DomainId,
) -> AppResult<BTreeSet<UserId>> {
    let user_ids = sqlx::query_scalar::<_, uuid::Uuid>(
        r#"
        SELECT user_id
        FROM role_assignments
        WHERE domain_id = $1 AND role = $2
        "#,
    )
    .bind(domain_id.as_uuid())
    .bind(Role::Owner.as_str())
    .fetch_all(&mut **transaction)
    .await
    .map_err(|error| AppError::Internal(format!("failed to list domain owners: {error}")))?;

    Ok(user_ids.into_iter().map(UserId::from_uuid).collect())
}
