// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Refresh-token exchange.
//!
//! Both session restore and the request interceptor refresh through the
//! same [`TokenRefresher`], so concurrent expiry detections share a single
//! exchange with the backend.

use std::sync::Arc;

use tracing::{info, warn};

use super::AuthError;
use crate::api::{client::request_token_refresh, HttpTransport};
use crate::flight::SingleFlight;
use crate::models::TokenPair;
use crate::storage::TokenStore;

pub struct TokenRefresher {
    transport: HttpTransport,
    store: Arc<dyn TokenStore>,
    flight: SingleFlight<Result<TokenPair, AuthError>>,
}

impl TokenRefresher {
    pub fn new(transport: HttpTransport, store: Arc<dyn TokenStore>) -> Self {
        Self {
            transport,
            store,
            flight: SingleFlight::new(),
        }
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// Exchange the stored refresh token for a new pair and persist it.
    ///
    /// Callers arriving while an exchange is in flight receive that
    /// exchange's outcome.
    pub async fn refresh(&self) -> Result<TokenPair, AuthError> {
        self.flight
            .run(|| self.exchange())
            .await
            .unwrap_or(Err(AuthError::RefreshAbandoned))
    }

    async fn exchange(&self) -> Result<TokenPair, AuthError> {
        let refresh = self
            .store
            .refresh_token()?
            .ok_or(AuthError::MissingRefreshToken)?;

        let response = request_token_refresh(&self.transport, &refresh)
            .await
            .map_err(|e| {
                warn!(error = %e, "refresh token exchange failed");
                AuthError::RefreshFailed(e.to_string())
            })?;

        let tokens = TokenPair {
            access: response.access,
            refresh: response.refresh.unwrap_or(refresh),
        };
        self.store.save_tokens(&tokens, None)?;

        info!("access token refreshed");
        Ok(tokens)
    }
}
