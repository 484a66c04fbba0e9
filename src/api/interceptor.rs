// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token-refresh request interceptor.
//!
//! Every backend call goes through [`Interceptor::send`]:
//!
//! ```text
//! Sent ─┬─ Success ───────────────────────────────────────────► Ok(response)
//!       └─ Failed ─┬─ other shape ────────────────────────────► Err(original)
//!                  └─ expired access ─ RefreshInFlight ─┬─ RetrySent ─► outcome as-is
//!                                                        └─ RefreshFailed ► Err(original)
//! ```
//!
//! A request is re-issued at most once. Tokens are never cleared here; a
//! later restore or the caller decides what to do about a dead session.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::transport::{ApiRequest, ApiResponse, HttpTransport};
use crate::auth::{AuthError, TokenRefresher};
use crate::error::ApiError;

const EXPIRED_STATUS_CODE: u16 = 401;
const ACCESS_TOKEN_TYPE: &str = "access";

/// Whether `err` is the backend's "access token expired" rejection: a body
/// with `status_code == 401` whose first message has `token_type == "access"`.
pub fn requires_token_refresh(err: &ApiError) -> bool {
    let Some(payload) = err.payload() else {
        return false;
    };
    payload.status_code == Some(EXPIRED_STATUS_CODE)
        && payload
            .messages
            .first()
            .and_then(|m| m.token_type.as_deref())
            == Some(ACCESS_TOKEN_TYPE)
}

#[derive(Clone)]
pub struct Interceptor {
    transport: HttpTransport,
    refresher: Arc<TokenRefresher>,
}

impl Interceptor {
    pub fn new(transport: HttpTransport, refresher: Arc<TokenRefresher>) -> Self {
        Self {
            transport,
            refresher,
        }
    }

    /// Send `request`, refreshing and retrying once on an expired access token.
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let err = match self.transport.execute(&request).await {
            Ok(response) => return Ok(response),
            Err(err) => err,
        };

        if !requires_token_refresh(&err) {
            return Err(err);
        }

        debug!(path = %request.path(), "access token rejected as expired");

        let access = match self.fresh_access_token(request.bearer_token()).await {
            Ok(access) => access,
            Err(refresh_err) => {
                warn!(
                    path = %request.path(),
                    error = %refresh_err,
                    error_code = refresh_err.error_code(),
                    "token refresh failed; returning original error"
                );
                return Err(err);
            }
        };

        if request.set_bearer(&access).is_err() {
            return Err(err);
        }

        info!(path = %request.path(), "retrying request with refreshed access token");
        self.transport.execute(&request).await
    }

    /// Access token to retry with.
    ///
    /// When the store already holds a different token than the one that was
    /// rejected, another caller has refreshed in the meantime and that token
    /// is used as is.
    async fn fresh_access_token(&self, rejected: Option<&str>) -> Result<String, AuthError> {
        let stored = self.refresher.store().access_token()?;
        if let (Some(stored), Some(rejected)) = (stored, rejected) {
            if stored != rejected {
                debug!("access token already refreshed by another request");
                return Ok(stored);
            }
        }
        Ok(self.refresher.refresh().await?.access)
    }
}
