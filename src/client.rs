// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! High-level client combining the API, token storage and the session.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;
use tracing::info;

use crate::api::{ApiClient, HttpTransport};
use crate::audit::{AuditDraft, AuditReport};
use crate::auth::oauth::{callback_query, google_authorization_url, verification_token};
use crate::auth::{AuthError, LoginForm, Session, SessionManager, SignupForm, TokenRefresher};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::storage::{FileTokenStore, TokenStore};

pub struct EnerditClient {
    config: ClientConfig,
    api: ApiClient,
    sessions: SessionManager,
}

impl EnerditClient {
    pub fn new(config: ClientConfig, store: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(config.api_base_url.clone(), config.http_timeout)?;
        Ok(Self::with_transport(config, transport, store))
    }

    /// Client persisting tokens in `config.token_file`.
    pub fn from_config(config: ClientConfig) -> Result<Self, ApiError> {
        let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(&config.token_file));
        Self::new(config, store)
    }

    pub fn with_transport(
        config: ClientConfig,
        transport: HttpTransport,
        store: Arc<dyn TokenStore>,
    ) -> Self {
        let refresher = Arc::new(TokenRefresher::new(transport.clone(), store));
        let mut api = ApiClient::new(transport, Arc::clone(&refresher));
        if let Some(google) = &config.google {
            api = api.with_google_exchange_url(google.api_redirect_uri.clone());
        }
        Self {
            config,
            api,
            sessions: SessionManager::new(refresher),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session_manager(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn session(&self) -> Session {
        self.sessions.session()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.sessions.subscribe()
    }

    /// Rebuild the session from stored tokens. Call once at startup.
    pub async fn restore(&self) -> Session {
        self.sessions.restore().await
    }

    pub async fn login(&self, form: &LoginForm) -> Result<Session, ApiError> {
        form.validate()?;
        let response = self.api.login(&form.email, &form.password).await?;
        Ok(self.sessions.login(response.user, &response.tokens)?)
    }

    /// Create an account. On success the backend has mailed a verification link.
    pub async fn signup(&self, form: &SignupForm) -> Result<Value, ApiError> {
        form.validate()?;
        let body = self
            .api
            .signup(&form.name, &form.email, &form.password)
            .await?;
        info!(email = %form.email, "verification email requested");
        Ok(body)
    }

    /// Verify an email address from the query of the verification link.
    pub async fn verify_email(&self, search: &str) -> Result<Value, ApiError> {
        let token = verification_token(search)?;
        self.api.verify_email(&token).await
    }

    pub fn google_authorization_url(&self) -> Result<String, ApiError> {
        let google = self
            .config
            .google
            .as_ref()
            .ok_or(AuthError::OAuthNotConfigured)?;
        Ok(google_authorization_url(google))
    }

    /// Finish Google sign-in from the callback location Google redirected to.
    pub async fn complete_google_login(&self, location: &str) -> Result<Session, ApiError> {
        let query = callback_query(location)?;
        let response = self.api.exchange_google_code(query).await?;
        Ok(self.sessions.login(response.user, &response.tokens)?)
    }

    pub fn logout(&self) -> Result<Session, ApiError> {
        Ok(self.sessions.logout()?)
    }

    /// Submit `draft` for the logged-in user.
    pub async fn generate_audit_report(&self, draft: &AuditDraft) -> Result<AuditReport, ApiError> {
        let user = self
            .session()
            .user_id()
            .cloned()
            .ok_or(ApiError::NotAuthenticated)?;
        let request = draft.to_request(user)?;
        let report = self.api.generate_audit_report(&request).await?;
        info!(
            building_type = %report.building_type,
            total_energy_consumed = report.total_energy_consumed,
            "audit report generated"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{ApplianceInput, DraftError};
    use crate::auth::claims::test_tokens::expired_access_token;
    use crate::auth::UserId;
    use crate::config::GoogleConfig;
    use crate::error::UserAction;
    use crate::models::TokenPair;
    use crate::storage::{MemoryTokenStore, StorageKey};
    use crate::test_support::MockBackend;
    use reqwest::StatusCode;
    use tempfile::TempDir;

    fn config(backend: &MockBackend) -> ClientConfig {
        ClientConfig::new(backend.base_url()).with_google(GoogleConfig {
            client_id: "client-123".to_string(),
            app_redirect_uri: "http://localhost:3000/auth/callback".to_string(),
            api_redirect_uri: backend.google_exchange_url(),
        })
    }

    async fn client_with(store: Arc<dyn TokenStore>) -> (EnerditClient, MockBackend) {
        let backend = MockBackend::start().await;
        let client = EnerditClient::with_transport(config(&backend), backend.transport(), store);
        (client, backend)
    }

    fn draft() -> AuditDraft {
        let mut draft = AuditDraft::new();
        draft.set_building_type("Duplex");
        draft.set_floors("2").unwrap();
        draft
            .add_appliance(0, &ApplianceInput::new("Fan", "75", "8"))
            .unwrap();
        draft
    }

    fn login_form() -> LoginForm {
        LoginForm::new("ada@example.com", "correct-horse")
    }

    #[tokio::test]
    async fn login_then_report_survives_token_rotation() {
        let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
        let (client, backend) = client_with(Arc::clone(&store)).await;

        let session = client.login(&login_form()).await.unwrap();
        assert!(session.is_authenticated);
        assert_eq!(store.user_id().unwrap().as_deref(), Some("5"));

        // Server-side rotation leaves the stored access token stale.
        client.api().refresh(MockBackend::VALID_REFRESH).await.unwrap();
        assert_ne!(store.access_token().unwrap(), Some(backend.current_access_token()));

        let report = client.generate_audit_report(&draft()).await.unwrap();

        assert_eq!(report.building_type, "Duplex");
        assert_eq!(report.num_floors, 2);
        assert_eq!(backend.audit_calls(), 2);
        assert_eq!(backend.refresh_calls(), 2);
        assert_eq!(store.access_token().unwrap(), Some(backend.current_access_token()));
        assert_eq!(backend.last_audit_body().unwrap()["user"], 5);
        assert!(client.session().is_authenticated);
    }

    #[tokio::test]
    async fn invalid_login_form_is_rejected_locally() {
        let (client, _backend) = client_with(Arc::new(MemoryTokenStore::new())).await;

        let err = client
            .login(&LoginForm::new("not-an-email", ""))
            .await
            .unwrap_err();

        let ApiError::Validation(errors) = &err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(errors.message_for("email"), Some("Invalid email"));
        assert_eq!(errors.message_for("password"), Some("Password is required"));
    }

    #[tokio::test]
    async fn wrong_password_leaves_session_anonymous() {
        let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
        let (client, _backend) = client_with(Arc::clone(&store)).await;

        let err = client
            .login(&LoginForm::new("ada@example.com", "wrong"))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(
            err.user_message(UserAction::Login),
            "Failed to log in. Please check your credentials and try again."
        );
        assert!(!client.session().is_authenticated);
        assert_eq!(store.access_token().unwrap(), None);
    }

    #[tokio::test]
    async fn signup_validates_before_calling_backend() {
        let (client, _backend) = client_with(Arc::new(MemoryTokenStore::new())).await;
        let mut form = SignupForm {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "Passw0rd!".to_string(),
            confirm_password: "Passw0rd?".to_string(),
        };

        let err = client.signup(&form).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        form.confirm_password = form.password.clone();
        let body = client.signup(&form).await.unwrap();
        assert_eq!(body["name"], "Ada");
    }

    #[tokio::test]
    async fn verify_email_needs_a_token() {
        let (client, _backend) = client_with(Arc::new(MemoryTokenStore::new())).await;

        let err = client.verify_email("?foo=bar").await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Auth(AuthError::MissingVerificationToken)
        ));

        let body = client.verify_email("?token=good-token").await.unwrap();
        assert_eq!(body["email"], "Successfully activated");
    }

    #[tokio::test]
    async fn google_login_round_trip() {
        let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
        let (client, backend) = client_with(Arc::clone(&store)).await;

        let url = client.google_authorization_url().unwrap();
        assert!(url.contains("client_id=client-123"));

        let session = client
            .complete_google_login("http://localhost:3000/auth/callback?state=s1&code=good-code")
            .await
            .unwrap();

        assert!(session.is_authenticated);
        assert_eq!(backend.last_google_query().as_deref(), Some("state=s1&code=good-code"));
        assert_eq!(
            store.refresh_token().unwrap().as_deref(),
            Some(MockBackend::VALID_REFRESH)
        );
    }

    #[tokio::test]
    async fn google_denial_and_missing_query_fail_without_network() {
        let (client, backend) = client_with(Arc::new(MemoryTokenStore::new())).await;

        let err = client
            .complete_google_login("http://localhost:3000/auth/callback?error=access_denied")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Auth(AuthError::OAuthDenied(ref reason)) if reason == "access_denied"
        ));

        let err = client
            .complete_google_login("http://localhost:3000/auth/callback")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Auth(AuthError::MissingCallbackQuery)));
        assert_eq!(backend.last_google_query(), None);
    }

    #[tokio::test]
    async fn google_url_requires_configuration() {
        let backend = MockBackend::start().await;
        let client = EnerditClient::with_transport(
            ClientConfig::new(backend.base_url()),
            backend.transport(),
            Arc::new(MemoryTokenStore::new()),
        );

        assert!(matches!(
            client.google_authorization_url(),
            Err(ApiError::Auth(AuthError::OAuthNotConfigured))
        ));
    }

    #[tokio::test]
    async fn report_requires_login_and_complete_draft() {
        let (client, backend) = client_with(Arc::new(MemoryTokenStore::new())).await;

        let err = client.generate_audit_report(&draft()).await.unwrap_err();
        assert!(matches!(err, ApiError::NotAuthenticated));

        client.login(&login_form()).await.unwrap();
        let err = client
            .generate_audit_report(&AuditDraft::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Draft(DraftError::MissingBuildingDetails)
        ));
        assert_eq!(backend.audit_calls(), 0);
    }

    #[tokio::test]
    async fn restart_restores_session_from_token_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        let backend = MockBackend::start().await;
        let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(&path));
        store
            .save_tokens(
                &TokenPair {
                    access: expired_access_token(5),
                    refresh: MockBackend::VALID_REFRESH.to_string(),
                },
                Some("5"),
            )
            .unwrap();

        let client = EnerditClient::with_transport(
            config(&backend).with_token_file(&path),
            backend.transport(),
            Arc::new(FileTokenStore::new(&path)),
        );
        let session = client.restore().await;

        assert!(session.is_authenticated);
        assert_eq!(session.user_id(), Some(&UserId::Number(5)));
        assert_eq!(backend.refresh_calls(), 1);
        assert_eq!(
            store.get(StorageKey::RefreshToken).unwrap().as_deref(),
            Some(MockBackend::ROTATED_REFRESH)
        );

        client.logout().unwrap();
        assert!(!path.exists());
    }
}
