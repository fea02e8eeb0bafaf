use std::sync::Arc;

use async_trait::async_trait;
use tenura_application::{EmailService, InviteMailer};
use tenura_core::AppResult;
use tenura_domain::EmailAddress;

/// Invite mailer composing an accept link and handing it to an [`EmailService`].
#[derive(Clone)]
pub struct EmailInviteMailer {
    email_service: Arc<dyn EmailService>,
    frontend_url: String,
    validity_label: String,
}

impl EmailInviteMailer {
    /// Creates a mailer linking to `{frontend_url}/accept-invite`.
    #[must_use]
    pub fn new(
        email_service: Arc<dyn EmailService>,
        frontend_url: impl Into<String>,
        validity_hours: i64,
    ) -> Self {
        let validity_label = if validity_hours % 24 == 0 {
            match validity_hours / 24 {
                1 => "1 day".to_owned(),
                days => format!("{days} days"),
            }
        } else {
            format!("{validity_hours} hours")
        };

        Self {
            email_service,
            frontend_url: frontend_url.into().trim_end_matches('/').to_owned(),
            validity_label,
        }
    }

    fn accept_url(&self, token: &str) -> String {
        format!("{}/accept-invite?token={token}", self.frontend_url)
    }
}

#[async_trait]
impl InviteMailer for EmailInviteMailer {
    async fn send_invite(
        &self,
        recipient: &EmailAddress,
        subject: &str,
        inviter_name: &str,
        token: &str,
    ) -> AppResult<()> {
        let accept_url = self.accept_url(token);
        let text_body = format!(
            "{inviter_name} has invited you to join their organization.\n\n\
             Open the link below to accept the invitation:\n{accept_url}\n\n\
             This link expires in {}.",
            self.validity_label
        );

        self.email_service
            .send_email(recipient.as_str(), subject, &text_body, None)
            .await
    }
}
