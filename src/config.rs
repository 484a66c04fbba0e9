// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the client. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `ENERDIT_API_BASE_URL` | Base URL of the Enerdit backend | Required |
//! | `ENERDIT_GOOGLE_CLIENT_ID` | Google OAuth client ID | Optional |
//! | `ENERDIT_GOOGLE_APP_REDIRECT_URI` | Where Google sends the user after consent | Optional |
//! | `ENERDIT_GOOGLE_API_REDIRECT_URI` | Backend endpoint exchanging the Google code | Optional |
//! | `ENERDIT_TOKEN_FILE` | File holding the persisted token pair | `.enerdit/session.json` |
//! | `ENERDIT_HTTP_TIMEOUT_SECS` | Per-request HTTP timeout | `15` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ApiError;

pub const API_BASE_URL_ENV: &str = "ENERDIT_API_BASE_URL";
pub const GOOGLE_CLIENT_ID_ENV: &str = "ENERDIT_GOOGLE_CLIENT_ID";
pub const GOOGLE_APP_REDIRECT_URI_ENV: &str = "ENERDIT_GOOGLE_APP_REDIRECT_URI";
pub const GOOGLE_API_REDIRECT_URI_ENV: &str = "ENERDIT_GOOGLE_API_REDIRECT_URI";
pub const TOKEN_FILE_ENV: &str = "ENERDIT_TOKEN_FILE";
pub const HTTP_TIMEOUT_ENV: &str = "ENERDIT_HTTP_TIMEOUT_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

const DEFAULT_TOKEN_FILE: &str = ".enerdit/session.json";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Google sign-in settings. All three values are needed for the OAuth flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleConfig {
    pub client_id: String,
    /// Redirect URI registered with Google (the app's callback page).
    pub app_redirect_uri: String,
    /// Backend endpoint that exchanges the callback query for a token pair.
    pub api_redirect_uri: String,
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub google: Option<GoogleConfig>,
    pub token_file: PathBuf,
    pub http_timeout: Duration,
}

impl ClientConfig {
    /// Configuration pointing at `api_base_url` with defaults for everything else.
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            google: None,
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    pub fn with_google(mut self, google: GoogleConfig) -> Self {
        self.google = Some(google);
        self
    }

    pub fn with_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = path.into();
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn from_env() -> Result<Self, ApiError> {
        let api_base_url = env_required(API_BASE_URL_ENV)?;

        let google = match (
            env_optional(GOOGLE_CLIENT_ID_ENV),
            env_optional(GOOGLE_APP_REDIRECT_URI_ENV),
            env_optional(GOOGLE_API_REDIRECT_URI_ENV),
        ) {
            (Some(client_id), Some(app_redirect_uri), Some(api_redirect_uri)) => {
                Some(GoogleConfig {
                    client_id,
                    app_redirect_uri,
                    api_redirect_uri,
                })
            }
            _ => None,
        };

        let token_file = PathBuf::from(env_or_default(TOKEN_FILE_ENV, DEFAULT_TOKEN_FILE));

        let http_timeout = env_optional(HTTP_TIMEOUT_ENV)
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS));

        Ok(Self {
            api_base_url,
            google,
            token_file,
            http_timeout,
        })
    }
}

/// Whether logs should be emitted as JSON lines.
pub fn log_format_is_json() -> bool {
    env_optional(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

fn env_required(name: &str) -> Result<String, ApiError> {
    env_optional(name).ok_or_else(|| ApiError::MissingConfig(name.to_string()))
}

fn env_optional(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) => {
            let trimmed = value.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        Err(_) => None,
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    env_optional(name).unwrap_or_else(|| default.to_string())
}
