// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Typed calls to the Enerdit backend.

use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::info;

use super::interceptor::Interceptor;
use super::transport::{parse_url, ApiRequest, HttpTransport};
use crate::audit::{AuditReport, AuditRequest};
use crate::auth::{AuthError, TokenRefresher};
use crate::error::ApiError;
use crate::models::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, SignupRequest};
use crate::storage::TokenStore;

pub const LOGIN_PATH: &str = "/auth/login/";
pub const SIGNUP_PATH: &str = "/auth/signup/";
pub const VERIFY_EMAIL_PATH: &str = "/auth/email-verify/";
pub const REFRESH_PATH: &str = "/auth/token/refresh/";
pub const ENERGY_AUDIT_PATH: &str = "/energy-audit/";

/// `POST /auth/token/refresh/`, sent directly on the transport.
///
/// Refresh failures must not be intercepted, so this never goes through
/// [`Interceptor`].
pub(crate) async fn request_token_refresh(
    transport: &HttpTransport,
    refresh: &str,
) -> Result<RefreshResponse, ApiError> {
    let request = ApiRequest::new(Method::POST, transport.endpoint(REFRESH_PATH)?)
        .json(&RefreshRequest { refresh })?;
    transport.execute(&request).await?.into_json()
}

#[derive(Clone)]
pub struct ApiClient {
    transport: HttpTransport,
    interceptor: Interceptor,
    store: Arc<dyn TokenStore>,
    google_exchange_url: Option<String>,
}

impl ApiClient {
    pub fn new(transport: HttpTransport, refresher: Arc<TokenRefresher>) -> Self {
        Self {
            store: Arc::clone(refresher.store()),
            interceptor: Interceptor::new(transport.clone(), refresher),
            transport,
            google_exchange_url: None,
        }
    }

    /// Backend endpoint that exchanges a Google authorization code.
    pub fn with_google_exchange_url(mut self, url: impl Into<String>) -> Self {
        self.google_exchange_url = Some(url.into());
        self
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let request = ApiRequest::new(Method::POST, self.transport.endpoint(LOGIN_PATH)?)
            .json(&LoginRequest { email, password })?;
        self.interceptor.send(request).await?.into_json()
    }

    /// Register an account. The backend then mails a verification link.
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<Value, ApiError> {
        let request = ApiRequest::new(Method::POST, self.transport.endpoint(SIGNUP_PATH)?)
            .json(&SignupRequest {
                name,
                email,
                password,
            })?;
        let response = self.interceptor.send(request).await?;
        info!(status = response.status.as_u16(), "signup accepted");
        Ok(response.body)
    }

    pub async fn verify_email(&self, token: &str) -> Result<Value, ApiError> {
        let request = ApiRequest::new(Method::GET, self.transport.endpoint(VERIFY_EMAIL_PATH)?)
            .query_pair("token", token);
        Ok(self.interceptor.send(request).await?.body)
    }

    pub async fn refresh(&self, refresh: &str) -> Result<RefreshResponse, ApiError> {
        request_token_refresh(&self.transport, refresh).await
    }

    /// Forward the Google redirect query, unmodified, to the exchange endpoint.
    pub async fn exchange_google_code(&self, query: &str) -> Result<LoginResponse, ApiError> {
        let url = self
            .google_exchange_url
            .as_deref()
            .ok_or(AuthError::OAuthNotConfigured)?;
        let request = ApiRequest::new(Method::GET, parse_url(url)?).raw_query(query);
        self.interceptor.send(request).await?.into_json()
    }

    /// Submit an audit with the stored access token.
    pub async fn generate_audit_report(
        &self,
        audit: &AuditRequest,
    ) -> Result<AuditReport, ApiError> {
        let access = self
            .store
            .access_token()?
            .ok_or(ApiError::NotAuthenticated)?;
        let request = ApiRequest::new(Method::POST, self.transport.endpoint(ENERGY_AUDIT_PATH)?)
            .json(audit)?
            .bearer(&access)?;
        self.interceptor.send(request).await?.into_json()
    }
}
