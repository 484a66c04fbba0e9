// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Enerdit Client - Energy Audit API Client
//!
//! Talks to the Enerdit backend: email/password and Google sign-in, session
//! persistence with transparent access-token refresh, and energy audit reports.
//!
//! ## Modules
//!
//! - `api` - HTTP transport, refresh interceptor and typed endpoint calls
//! - `audit` - Audit input, report and chart series
//! - `auth` - Session manager, token decoding, refresh, OAuth and form validation
//! - `storage` - Persisted token pair (memory or JSON file)
//! - `client` - [`EnerditClient`], the entry point tying these together

pub mod api;
pub mod audit;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod flight;
pub mod logging;
pub mod models;
pub mod storage;

#[cfg(test)]
mod test_support;

pub use client::EnerditClient;
pub use config::ClientConfig;
pub use error::{ApiError, UserAction};
