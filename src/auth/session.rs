// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session lifecycle: restore, login, logout.
//!
//! The [`Session`] is a cache of the persisted tokens' validity. It is
//! rebuilt by [`SessionManager::restore`] and changed only through
//! [`SessionManager::login`] and [`SessionManager::logout`].

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::claims::{decode_access_token, UserClaims, UserId};
use super::refresh::TokenRefresher;
use super::AuthError;
use crate::flight::SingleFlight;
use crate::models::TokenPair;
use crate::storage::TokenStore;

/// In-memory view of the authentication status.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Session {
    pub is_authenticated: bool,
    pub user: Option<UserClaims>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(user: UserClaims) -> Self {
        Self {
            is_authenticated: true,
            user: Some(user),
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user.as_ref().and_then(UserClaims::subject)
    }
}

pub struct SessionManager {
    store: Arc<dyn TokenStore>,
    refresher: Arc<TokenRefresher>,
    state: watch::Sender<Session>,
    restore_flight: SingleFlight<Session>,
}

impl SessionManager {
    pub fn new(refresher: Arc<TokenRefresher>) -> Self {
        let (state, _) = watch::channel(Session::anonymous());
        Self {
            store: Arc::clone(refresher.store()),
            refresher,
            state,
            restore_flight: SingleFlight::new(),
        }
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receiver notified on every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Rebuild the session from persisted tokens.
    ///
    /// An expired access token is refreshed. Any failure (malformed token,
    /// unreadable storage, failed refresh) clears the persisted tokens and
    /// leaves the session unauthenticated; nothing is returned as an error.
    /// A refresh cancelled by another caller is retried once; if that is
    /// cancelled too, the stored tokens are kept and the current session is
    /// returned. Concurrent calls share one restore.
    pub async fn restore(&self) -> Session {
        self.restore_flight
            .run(|| self.restore_from_store())
            .await
            .unwrap_or_else(|| self.session())
    }

    async fn restore_from_store(&self) -> Session {
        match self.stored_user().await {
            Ok(Some(user)) => {
                debug!(user_id = ?user.subject(), "session restored");
                self.publish(Session::authenticated(user))
            }
            Ok(None) => self.publish(Session::anonymous()),
            Err(AuthError::RefreshAbandoned) => {
                warn!("session restore interrupted; keeping stored tokens");
                self.session()
            }
            Err(err) => {
                warn!(
                    error = %err,
                    error_code = err.error_code(),
                    "session restore failed; clearing stored tokens"
                );
                self.logout().unwrap_or_else(|err| {
                    warn!(error = %err, "failed to clear stored tokens");
                    self.publish(Session::anonymous())
                })
            }
        }
    }

    async fn stored_user(&self) -> Result<Option<UserClaims>, AuthError> {
        let Some(access) = self.store.access_token()? else {
            return Ok(None);
        };

        let claims = decode_access_token(&access)?;
        if !claims.is_expired() {
            return Ok(Some(claims));
        }

        debug!("stored access token expired; refreshing");
        let tokens = match self.refresher.refresh().await {
            // The leading caller went away mid-exchange; take over as leader.
            Err(AuthError::RefreshAbandoned) => {
                debug!("refresh abandoned by its leader; retrying");
                self.refresher.refresh().await?
            }
            result => result?,
        };
        decode_access_token(&tokens.access).map(Some)
    }

    /// Persist tokens obtained from login, signup or OAuth and mark the
    /// session authenticated with `user`.
    pub fn login(&self, user: UserClaims, tokens: &TokenPair) -> Result<Session, AuthError> {
        let user_id = user.subject().map(ToString::to_string);
        self.store.save_tokens(tokens, user_id.as_deref())?;
        info!(user_id = ?user_id, "logged in");
        Ok(self.publish(Session::authenticated(user)))
    }

    /// Clear persisted tokens and the session. Idempotent.
    ///
    /// If the tokens cannot be removed the session is left as it was, so it
    /// never disagrees with what the next restore would find.
    pub fn logout(&self) -> Result<Session, AuthError> {
        self.store.clear()?;
        let was_authenticated = self.state.borrow().is_authenticated;
        if was_authenticated {
            info!("logged out");
        }
        Ok(self.publish(Session::anonymous()))
    }

    fn publish(&self, session: Session) -> Session {
        self.state.send_replace(session.clone());
        session
    }
}
