use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tenura_application::{
    AccessAdminService, AuthorizationService, InviteMailer, InviteService, InviteSettings,
    PolicyStore,
};
use tenura_core::{AppResult, DomainId};
use tenura_domain::{EmailAddress, PermissionRegistry, UserId, UserProfile};
use tenura_infrastructure::{InMemoryAccessStore, InMemoryDirectory};
use tokio::sync::Mutex;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Default)]
pub(crate) struct CapturingMailer {
    tokens: Mutex<Vec<String>>,
}

impl CapturingMailer {
    pub(crate) async fn last_token(&self) -> String {
        self.tokens.lock().await.last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl InviteMailer for CapturingMailer {
    async fn send_invite(
        &self,
        _recipient: &EmailAddress,
        _subject: &str,
        _inviter_name: &str,
        token: &str,
    ) -> AppResult<()> {
        self.tokens.lock().await.push(token.to_owned());
        Ok(())
    }
}

pub(crate) struct TestApp {
    pub(crate) state: AppState,
    pub(crate) directory: Arc<InMemoryDirectory>,
    pub(crate) mailer: Arc<CapturingMailer>,
    pub(crate) domain_id: DomainId,
    pub(crate) owner: UserId,
}

impl TestApp {
    pub(crate) async fn add_user(&self, display_name: &str, email: &str) -> UserId {
        let email = match EmailAddress::new(email) {
            Ok(email) => email,
            Err(error) => panic!("invalid test email: {error}"),
        };
        let user_id = UserId::new();
        if let Err(error) = self
            .directory
            .insert_user(UserProfile::new(user_id, display_name, email))
            .await
        {
            panic!("failed to insert test user: {error}");
        }

        user_id
    }
}

/// Builds in-memory state with one initialized domain owned by `owner`.
pub(crate) async fn test_app() -> TestApp {
    let store = Arc::new(InMemoryAccessStore::new());
    let directory = Arc::new(InMemoryDirectory::new());
    let mailer = Arc::new(CapturingMailer::default());
    let policies = match PolicyStore::load(store.clone()).await {
        Ok(policies) => policies,
        Err(error) => panic!("failed to load policy store: {error}"),
    };

    let state = AppState {
        authorization_service: AuthorizationService::new(store.clone(), policies.clone()),
        access_admin_service: AccessAdminService::new(
            Arc::new(PermissionRegistry::standard()),
            policies.clone(),
            store.clone(),
            store.clone(),
            directory.clone(),
        ),
        invite_service: InviteService::new(
            store.clone(),
            store,
            directory.clone(),
            directory.clone(),
            mailer.clone(),
            InviteSettings::default(),
        ),
        policy_store: policies,
        internal_api_token: Arc::from("0123456789abcdef0123456789abcdef"),
    };

    let mut app = TestApp {
        state,
        directory,
        mailer,
        domain_id: DomainId::new(),
        owner: UserId::new(),
    };

    app.owner = app.add_user("Olivia Owner", "olivia@example.com").await;
    app.directory.insert_organization(app.domain_id).await;
    let initialized = app
        .state
        .access_admin_service
        .initialize_domain(app.domain_id, app.owner)
        .await;
    assert!(matches!(initialized, Ok(true)));

    app
}

pub(crate) fn status_of<T>(result: ApiResult<T>) -> StatusCode {
    match result {
        Ok(_) => StatusCode::OK,
        Err(error) => error.into_response().status(),
    }
}
