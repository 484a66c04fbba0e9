// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

/// Session and sign-in failures.
///
/// `Clone` so that the outcome of a shared refresh can be handed to every
/// caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Token is not a decodable JWT
    #[error("Access token is malformed")]
    MalformedToken,
    /// Refresh was needed but no refresh token is persisted
    #[error("No refresh token is stored")]
    MissingRefreshToken,
    /// The refresh exchange failed or was rejected
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),
    /// The caller driving a shared refresh went away before it finished
    #[error("Token refresh was abandoned before completing")]
    RefreshAbandoned,
    /// Reading or writing persisted tokens failed
    #[error("Token storage failed: {0}")]
    Storage(String),
    /// Google redirected back with an `error` parameter
    #[error("Google sign-in failed: {0}")]
    OAuthDenied(String),
    /// Google sign-in is not configured
    #[error("Google sign-in is not configured")]
    OAuthNotConfigured,
    /// The OAuth callback URL carried no query string
    #[error("Google sign-in callback carried no query string")]
    MissingCallbackQuery,
    /// The email verification link carried no token
    #[error("Verification link carried no token")]
    MissingVerificationToken,
}

impl AuthError {
    /// Stable machine-readable code, used as a log field.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MalformedToken => "malformed_token",
            AuthError::MissingRefreshToken => "missing_refresh_token",
            AuthError::RefreshFailed(_) => "refresh_failed",
            AuthError::RefreshAbandoned => "refresh_abandoned",
            AuthError::Storage(_) => "storage_error",
            AuthError::OAuthDenied(_) => "oauth_denied",
            AuthError::OAuthNotConfigured => "oauth_not_configured",
            AuthError::MissingCallbackQuery => "missing_callback_query",
            AuthError::MissingVerificationToken => "missing_verification_token",
        }
    }
}

impl From<crate::storage::StorageError> for AuthError {
    fn from(e: crate::storage::StorageError) -> Self {
        AuthError::Storage(e.to_string())
    }
}
