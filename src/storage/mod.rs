// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Token Storage Module
//!
//! Persisted session state: the access token, the refresh token and the
//! user id. These three plain strings are the single source of truth across
//! restarts; the in-memory session is rebuilt from them.
//!
//! ## Keys
//!
//! | Key | Content |
//! |-----|---------|
//! | `accessToken` | Short-lived JWT sent as `Authorization: Bearer` |
//! | `refreshToken` | Long-lived token exchanged at `/auth/token/refresh/` |
//! | `userId` | Id of the logged-in user, when the backend returned one |
//!
//! ## Backends
//!
//! - [`MemoryTokenStore`]: process-local, used in tests and embedding
//! - [`FileTokenStore`]: one JSON document on disk, replaced atomically
//!
//! Multi-key writes and `clear()` are atomic in both backends, so a reader
//! never observes a new access token next to an old refresh token, or a
//! half-cleared logout.

pub mod file_store;
pub mod token_store;

pub use file_store::{FileTokenStore, StorageError, StorageResult};
pub use token_store::{MemoryTokenStore, StorageKey, TokenStore};
