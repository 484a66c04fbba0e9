// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token store abstraction and the in-memory backend.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::models::TokenPair;

use super::StorageResult;

/// Keys of the persisted session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StorageKey {
    AccessToken,
    RefreshToken,
    UserId,
}

impl StorageKey {
    pub const ALL: [StorageKey; 3] = [
        StorageKey::AccessToken,
        StorageKey::RefreshToken,
        StorageKey::UserId,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::AccessToken => "accessToken",
            StorageKey::RefreshToken => "refreshToken",
            StorageKey::UserId => "userId",
        }
    }
}

/// Key-value storage for session tokens.
///
/// Implementations must apply `set_many` and `clear` as one atomic update.
pub trait TokenStore: Send + Sync {
    fn get(&self, key: StorageKey) -> StorageResult<Option<String>>;

    /// Write several keys at once.
    fn set_many(&self, entries: &[(StorageKey, &str)]) -> StorageResult<()>;

    /// Remove every key.
    fn clear(&self) -> StorageResult<()>;

    fn access_token(&self) -> StorageResult<Option<String>> {
        self.get(StorageKey::AccessToken)
    }

    fn refresh_token(&self) -> StorageResult<Option<String>> {
        self.get(StorageKey::RefreshToken)
    }

    fn user_id(&self) -> StorageResult<Option<String>> {
        self.get(StorageKey::UserId)
    }

    /// Persist a token pair, optionally together with the user id.
    fn save_tokens(&self, tokens: &TokenPair, user_id: Option<&str>) -> StorageResult<()> {
        let mut entries = vec![
            (StorageKey::AccessToken, tokens.access.as_str()),
            (StorageKey::RefreshToken, tokens.refresh.as_str()),
        ];
        if let Some(user_id) = user_id {
            entries.push((StorageKey::UserId, user_id));
        }
        self.set_many(&entries)
    }
}

/// Process-local token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    values: Mutex<BTreeMap<StorageKey, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> MutexGuard<'_, BTreeMap<StorageKey, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: StorageKey) -> StorageResult<Option<String>> {
        Ok(self.values().get(&key).cloned())
    }

    fn set_many(&self, entries: &[(StorageKey, &str)]) -> StorageResult<()> {
        let mut values = self.values();
        for (key, value) in entries {
            values.insert(*key, (*value).to_string());
        }
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        self.values().clear();
        Ok(())
    }
}
