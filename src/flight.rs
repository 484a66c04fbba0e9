// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Single-flight coordination.
//!
//! At most one execution of an operation runs at a time. The first caller
//! (the leader) drives the future; callers arriving while it is in flight
//! wait for the leader's result instead of starting their own. Once the
//! leader finishes, the next caller starts a fresh execution.
//!
//! If the leader is dropped before finishing, waiting callers get `None`.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

type Slot<T> = Option<watch::Receiver<Option<T>>>;

pub struct SingleFlight<T> {
    inflight: Mutex<Slot<T>>,
}

enum Role<T> {
    Leader(watch::Sender<Option<T>>),
    Follower(watch::Receiver<Option<T>>),
}

/// Frees the slot when the leader completes or is dropped.
struct LeaderGuard<'a, T> {
    inflight: &'a Mutex<Slot<T>>,
}

impl<T> Drop for LeaderGuard<'_, T> {
    fn drop(&mut self) {
        lock(self.inflight).take();
    }
}

fn lock<T>(mutex: &Mutex<Slot<T>>) -> MutexGuard<'_, Slot<T>> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T> Default for SingleFlight<T> {
    fn default() -> Self {
        Self {
            inflight: Mutex::new(None),
        }
    }
}

impl<T: Clone> SingleFlight<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an execution is currently in flight.
    pub fn is_running(&self) -> bool {
        lock(&self.inflight).is_some()
    }

    /// Run `operation` unless an execution is already in flight, in which
    /// case wait for that execution's result.
    ///
    /// Returns `None` only when this caller was a follower and the leader was
    /// dropped before producing a value.
    pub async fn run<F, Fut>(&self, operation: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let role = {
            let mut slot = lock(&self.inflight);
            match slot.as_ref() {
                Some(rx) => Role::Follower(rx.clone()),
                None => {
                    let (tx, rx) = watch::channel(None);
                    *slot = Some(rx);
                    Role::Leader(tx)
                }
            }
        };

        match role {
            Role::Leader(tx) => {
                let guard = LeaderGuard {
                    inflight: &self.inflight,
                };
                let value = operation().await;
                drop(guard);
                tx.send_replace(Some(value.clone()));
                Some(value)
            }
            Role::Follower(mut rx) => {
                let value = rx.wait_for(Option::is_some).await.ok()?;
                (*value).clone()
            }
        }
    }
}
