use async_trait::async_trait;

use tenura_core::AppResult;
use tenura_domain::EmailAddress;

/// Port for sending emails. Infrastructure provides SMTP or console implementations.
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Sends a plain-text or HTML email.
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: Option<&str>,
    ) -> AppResult<()>;
}

/// Port delivering invitation mail. Delivery either succeeds or fails as a whole.
#[async_trait]
pub trait InviteMailer: Send + Sync {
    /// Sends the raw invite token to the invitee.
    async fn send_invite(
        &self,
        recipient: &EmailAddress,
        subject: &str,
        inviter_name: &str,
        token: &str,
    ) -> AppResult<()>;
}
