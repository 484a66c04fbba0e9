// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::audit::DraftError;
use crate::auth::{AuthError, ValidationErrors};
use crate::storage::StorageError;

/// Error returned by every client operation.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("configuration missing: {0}")]
    MissingConfig(String),

    #[error("invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("{method} {path} failed: {source}")]
    Transport {
        method: Method,
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {path} returned {status}")]
    Status {
        method: Method,
        path: String,
        status: StatusCode,
        body: Value,
    },

    #[error("{method} {path} returned an invalid response: {message}")]
    InvalidResponse {
        method: Method,
        path: String,
        message: String,
    },

    #[error("no access token is stored; log in first")]
    NotAuthenticated,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Draft(#[from] DraftError),
}

/// Error body returned by the backend.
///
/// Token failures look like
/// `{"detail": "...", "code": "token_not_valid", "messages": [{"token_type": "access", ...}], "status_code": 401}`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ErrorPayload {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub messages: Vec<TokenMessage>,
    #[serde(default)]
    pub status_code: Option<u16>,
}

/// One entry of the `messages` list in a token error.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TokenMessage {
    #[serde(default)]
    pub token_class: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// The user-facing action an error surfaced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Login,
    GoogleLogin,
    Signup,
    VerifyEmail,
    GenerateReport,
}

impl ApiError {
    /// HTTP status of a backend rejection, if this is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Structured error body of a backend rejection.
    ///
    /// Returns `None` when the error did not come from the backend or the body
    /// does not have the expected shape.
    pub fn payload(&self) -> Option<ErrorPayload> {
        match self {
            ApiError::Status { body, .. } => serde_json::from_value(body.clone()).ok(),
            _ => None,
        }
    }

    /// Message suitable for showing to the user after `action` failed.
    pub fn user_message(&self, action: UserAction) -> String {
        match self {
            ApiError::Validation(errors) => errors.to_string(),
            ApiError::Draft(err) => err.to_string(),
            ApiError::NotAuthenticated => {
                "Your session has expired. Please log in again.".to_string()
            }
            ApiError::Auth(AuthError::OAuthDenied(_)) | ApiError::Auth(AuthError::MissingCallbackQuery) => {
                "Failed to log in with Google. Please try again.".to_string()
            }
            _ => match action {
                UserAction::Login => {
                    "Failed to log in. Please check your credentials and try again.".to_string()
                }
                UserAction::GoogleLogin => "Failed to log in with Google. Please try again.".to_string(),
                UserAction::Signup => "Failed to sign up. Please try again.".to_string(),
                UserAction::VerifyEmail => {
                    "Email verification failed. The verification link may be invalid or expired."
                        .to_string()
                }
                UserAction::GenerateReport => {
                    "Failed to generate audit report. Please try again.".to_string()
                }
            },
        }
    }
}
