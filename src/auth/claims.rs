// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User claims and local access-token decoding.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::AuthError;

/// User identifier. The backend sends numbers, OAuth users may carry strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Number(i64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Number(n) => write!(f, "{n}"),
            UserId::Text(s) => f.write_str(s),
        }
    }
}

/// Identity of the logged-in user.
///
/// Built either from the `user` object of a login response or from the
/// payload of an access token. The two shapes differ: login responses carry
/// `id`, token payloads carry `user_id`, `exp` and `iat`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Expiration timestamp (seconds since epoch)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issued at timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Any other claims, kept for display
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserClaims {
    /// The user's id: `id` when present, otherwise `user_id`.
    pub fn subject(&self) -> Option<&UserId> {
        self.id.as_ref().or(self.user_id.as_ref())
    }

    /// A token without `exp` never expires.
    pub fn is_expired_at(&self, now: i64) -> bool {
        matches!(self.exp, Some(exp) if exp < now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }
}

/// Decode an access token locally, without verifying its signature.
///
/// Only the client's own view of the token is needed here (expiry and user
/// claims); the backend verifies the signature on every request.
pub fn decode_access_token(token: &str) -> Result<UserClaims, AuthError> {
    jsonwebtoken::dangerous::insecure_decode::<UserClaims>(token)
        .map(|data| data.claims)
        .map_err(|_| AuthError::MalformedToken)
}
