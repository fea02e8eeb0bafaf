use crate::RedeemOutcome;

use super::token_crypto::hash_token;
use super::*;

impl InviteService {
    /// Redeems a raw invite token.
    ///
    /// Grants the configured default role and deletes the token in one write.
    /// Unknown, expired or already redeemed tokens are `AppError::NotFound`.
    /// Returns `Ok(false)` and keeps the token when the invitee joined the
    /// domain by other means in the meantime.
    pub async fn redeem(&self, raw_token: &str) -> AppResult<bool> {
        let raw_token = raw_token.trim();
        if raw_token.is_empty() {
            return Err(AppError::Validation(
                "invite token must not be empty".to_owned(),
            ));
        }

        let outcome = self
            .invites
            .redeem_invite(
                &hash_token(raw_token),
                self.settings.default_role,
                Utc::now(),
            )
            .await?;

        match outcome {
            RedeemOutcome::Redeemed(_) => Ok(true),
            RedeemOutcome::AlreadyMember => Ok(false),
            RedeemOutcome::NotFound => Err(AppError::NotFound(
                "invite token not found".to_owned(),
            )),
        }
    }
}
