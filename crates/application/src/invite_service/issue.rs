use tenura_domain::EmailAddress;

use super::token_crypto::generate_token;
use super::*;

impl InviteService {
    /// Invites the user registered under `invited_email` to the domain.
    ///
    /// Returns `Ok(false)` without issuing a token when the invitee already
    /// holds a role there. Unknown inviter, invitee or domain are
    /// `AppError::NotFound`. Earlier pending invites for the same invitee are
    /// superseded only once the new one has been delivered. When delivery
    /// fails the new token is deleted, earlier invites stay valid and the
    /// delivery error is returned.
    pub async fn invite(
        &self,
        inviter_user_id: UserId,
        invited_email: &str,
        domain_id: DomainId,
    ) -> AppResult<bool> {
        let invited_email = EmailAddress::new(invited_email)?;
        let inviter = self
            .users
            .find_by_id(inviter_user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("inviter '{inviter_user_id}' does not exist"))
            })?;

        let invitee = self
            .users
            .find_by_email(&invited_email)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "no user is registered with email '{}'",
                    invited_email.as_str()
                ))
            })?;

        if !self.organizations.domain_exists(domain_id).await? {
            return Err(AppError::NotFound(format!(
                "domain '{domain_id}' does not exist"
            )));
        }

        let existing_roles = self.assignments.roles_of(invitee.id(), domain_id).await?;
        if !existing_roles.is_empty() {
            return Ok(false);
        }

        let (raw_token, token_hash) = generate_token()?;
        let issued_at = Utc::now();
        self.invites
            .create_invite(&InviteRecord {
                token_hash: token_hash.clone(),
                inviter_user_id,
                invited_user_id: invitee.id(),
                domain_id,
                issued_at,
                expires_at: issued_at + self.settings.ttl,
            })
            .await?;

        let subject = format!(
            "{} invited you to join their organization",
            inviter.display_name()
        );
        if let Err(error) = self
            .mailer
            .send_invite(
                invitee.email(),
                &subject,
                inviter.display_name(),
                &raw_token,
            )
            .await
        {
            if let Err(cleanup_error) = self.invites.delete_invite(&token_hash).await {
                return Err(with_detail(
                    error,
                    &format!("discarding the undelivered invite also failed: {cleanup_error}"),
                ));
            }
            return Err(error);
        }

        self.invites
            .supersede_invites(domain_id, invitee.id(), &token_hash)
            .await?;

        Ok(true)
    }
}

// Appends `detail` to the message, keeping the variant of `error`.
fn with_detail(error: AppError, detail: &str) -> AppError {
    match error {
        AppError::Validation(message) => AppError::Validation(format!("{message}; {detail}")),
        AppError::NotFound(message) => AppError::NotFound(format!("{message}; {detail}")),
        AppError::Conflict(message) => AppError::Conflict(format!("{message}; {detail}")),
        AppError::Unauthorized(message) => AppError::Unauthorized(format!("{message}; {detail}")),
        AppError::Forbidden(message) => AppError::Forbidden(format!("{message}; {detail}")),
        AppError::Internal(message) => AppError::Internal(format!("{message}; {detail}")),
    }
}
