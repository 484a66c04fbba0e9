// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Backend API
//!
//! | Layer | Responsibility |
//! |---|---|
//! | [`transport`] | One HTTP attempt, status mapping, request ids |
//! | [`interceptor`] | Refresh-and-retry-once on an expired access token |
//! | [`client`] | Typed endpoint calls |

pub mod client;
pub mod interceptor;
pub mod transport;

pub use client::ApiClient;
pub use interceptor::{requires_token_refresh, Interceptor};
pub use transport::{ApiRequest, ApiResponse, HttpTransport};
