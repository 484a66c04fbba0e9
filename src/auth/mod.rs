// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Client-side session handling for the Enerdit backend.
//!
//! ## Auth Flow
//!
//! 1. The user logs in with email/password or Google
//! 2. The backend returns `{ user, tokens: { access, refresh } }`
//! 3. The client:
//!    - Persists both tokens in the [`TokenStore`](crate::storage::TokenStore)
//!    - Sends `Authorization: Bearer <access>` on authenticated calls
//!    - Decodes the access token locally to read `exp` and user claims
//!    - Exchanges the refresh token for a new pair when the access token
//!      has expired (at startup) or is rejected (during a request)
//!
//! ## Notes
//!
//! - Access tokens are decoded without signature verification; the backend
//!   verifies them on every request
//! - Refresh is single-flight: concurrent expiry detections share one exchange

pub mod claims;
pub mod error;
pub mod oauth;
pub mod refresh;
pub mod session;
pub mod validation;

pub use claims::{decode_access_token, UserClaims, UserId};
pub use error::AuthError;
pub use refresh::TokenRefresher;
pub use session::{Session, SessionManager};
pub use validation::{FieldError, LoginForm, SignupForm, ValidationErrors};
