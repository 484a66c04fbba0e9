// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wire types of the authentication endpoints.

use serde::{Deserialize, Serialize};

use crate::auth::UserClaims;

/// Access/refresh token pair as issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Body of `POST /auth/login/`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `POST /auth/signup/`.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Response of login and of the Google code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub user: UserClaims,
    pub tokens: TokenPair,
}

/// Body of `POST /auth/token/refresh/`.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Response of `POST /auth/token/refresh/`.
///
/// `refresh` is absent when the backend does not rotate refresh tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn login_response_accepts_backend_user_shape() {
        let response: LoginResponse = serde_json::from_value(json!({
            "user": { "id": 12, "name": "Ada", "email": "ada@example.com" },
            "tokens": { "access": "a", "refresh": "r" }
        }))
        .unwrap();

        assert_eq!(response.user.subject().map(|id| id.to_string()).as_deref(), Some("12"));
        assert_eq!(response.tokens.access, "a");
    }

    #[test]
    fn refresh_response_without_rotation() {
        let response: RefreshResponse = serde_json::from_value(json!({ "access": "a2" })).unwrap();
        assert_eq!(response.access, "a2");
        assert!(response.refresh.is_none());
    }
}
