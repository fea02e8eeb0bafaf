//! Row helpers shared by the PostgreSQL adapters.

use sqlx::{Postgres, Transaction};
use tenura_core::{AppError, AppResult, DomainId};
use tenura_domain::Role;

/// Parses a role column. Unknown values mean the table was written by something else.
pub(crate) fn parse_stored_role(value: &str) -> AppResult<Role> {
    value
        .parse()
        .map_err(|_| AppError::Internal(format!("stored role '{value}' is not recognized")))
}

/// Serializes guarded writes for one domain until the transaction ends.
pub(crate) async fn lock_domain(
    transaction: &mut Transaction<'_, Postgres>,
    domain_id: DomainId,
) -> AppResult<()> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(domain_id.as_uuid().to_string())
        .execute(&mut **transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to lock domain '{domain_id}': {error}")))?;

    Ok(())
}
