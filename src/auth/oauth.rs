// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Google sign-in and email-verification callback helpers.
//!
//! ## Flow
//!
//! 1. The user is sent to [`google_authorization_url`]
//! 2. Google redirects back to the app's callback page with `?code=...`
//!    (or `?error=...` when the user declined)
//! 3. [`callback_query`] extracts the query string, which is forwarded
//!    verbatim to the backend's code-exchange endpoint
//! 4. The backend answers with `{ user, tokens }`

use url::form_urlencoded;

use super::AuthError;
use crate::config::GoogleConfig;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

const GOOGLE_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
];

/// Google consent page URL for the configured client.
pub fn google_authorization_url(config: &GoogleConfig) -> String {
    let scope = GOOGLE_SCOPES.join(" ");
    let params = form_urlencoded::Serializer::new(String::new())
        .append_pair("response_type", "code")
        .append_pair("client_id", &config.client_id)
        .append_pair("redirect_uri", &config.app_redirect_uri)
        .append_pair("prompt", "select_account")
        .append_pair("access_type", "offline")
        .append_pair("scope", &scope)
        .finish();
    format!("{GOOGLE_AUTH_URL}?{params}")
}

/// Query string of an OAuth callback location (`/auth/callback?code=...`).
///
/// Fails when there is no query string or when Google reported an error.
pub fn callback_query(location: &str) -> Result<&str, AuthError> {
    let query = location
        .split('?')
        .nth(1)
        .filter(|q| !q.is_empty())
        .ok_or(AuthError::MissingCallbackQuery)?;

    if let Some(error) = query_param(query, "error") {
        return Err(AuthError::OAuthDenied(error));
    }

    Ok(query)
}

/// `token` parameter of an email-verification link.
pub fn verification_token(search: &str) -> Result<String, AuthError> {
    let query = search.split_once('?').map_or(search, |(_, q)| q);
    query_param(query, "token")
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingVerificationToken)
}

fn query_param(query: &str, name: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
