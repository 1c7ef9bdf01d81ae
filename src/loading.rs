// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Loading state tracking for named asynchronous operations.
//!
//! The store maps an operation key (e.g. `solana:swap`) to its latest
//! [`LoadingState`] and notifies per-key subscribers synchronously on every
//! update. Keys are never removed; a key that was never written reads as
//! idle.
//!
//! Updates from concurrent calls sharing a key are last-write-wins and every
//! update fires its subscribers. Callers must not assume monotonic status
//! progression in that case.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadingStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoadingState {
    pub status: LoadingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A partial update; `None` fields leave the current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadingStatePatch {
    pub status: Option<LoadingStatus>,
    pub error: Option<String>,
}

impl LoadingStatePatch {
    pub fn status(status: LoadingStatus) -> Self {
        Self {
            status: Some(status),
            error: None,
        }
    }

    pub fn loading() -> Self {
        Self::status(LoadingStatus::Loading)
    }

    pub fn success() -> Self {
        Self::status(LoadingStatus::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Some(LoadingStatus::Error),
            error: Some(message.into()),
        }
    }

    fn apply(self, state: &mut LoadingState) {
        if let Some(status) = self.status {
            state.status = status;
        }
        if let Some(error) = self.error {
            state.error = Some(error);
        }
    }
}

type Callback = Arc<dyn Fn(&LoadingState) + Send + Sync>;

#[derive(Default)]
struct Inner {
    states: HashMap<String, LoadingState>,
    subscribers: HashMap<String, Vec<(u64, Callback)>>,
}

/// Process-wide keyed loading state table with subscriptions.
#[derive(Default)]
pub struct LoadingStateStore {
    inner: Arc<Mutex<Inner>>,
    next_id: AtomicU64,
}

impl fmt::Debug for LoadingStateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys = self
            .inner
            .lock()
            .map(|inner| inner.states.len())
            .unwrap_or_default();
        f.debug_struct("LoadingStateStore").field("keys", &keys).finish()
    }
}

impl LoadingStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state for `key`; idle when the key was never updated.
    pub fn get_state(&self, key: &str) -> LoadingState {
        self.inner
            .lock()
            .ok()
            .and_then(|inner| inner.states.get(key).cloned())
            .unwrap_or_default()
    }

    /// Merge `patch` into the state for `key` and notify its subscribers in
    /// registration order.
    ///
    /// Callbacks run after the internal lock is released, so they may read
    /// or update the store themselves.
    pub fn update_state(&self, key: &str, patch: LoadingStatePatch) {
        let (state, callbacks) = {
            let Ok(mut inner) = self.inner.lock() else {
                return;
            };
            let entry = inner.states.entry(key.to_string()).or_default();
            patch.apply(entry);
            let state = entry.clone();
            let callbacks: Vec<Callback> = inner
                .subscribers
                .get(key)
                .map(|subs| subs.iter().map(|(_, cb)| Arc::clone(cb)).collect())
                .unwrap_or_default();
            (state, callbacks)
        };

        for callback in callbacks {
            callback(&state);
        }
    }

    /// Register `callback` for updates to `key`.
    pub fn subscribe<F>(&self, key: &str, callback: F) -> Subscription
    where
        F: Fn(&LoadingState) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut inner) = self.inner.lock() {
            inner
                .subscribers
                .entry(key.to_string())
                .or_default()
                .push((id, Arc::new(callback)));
        }
        Subscription {
            key: key.to_string(),
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    /// Number of live subscribers for `key`.
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.inner
            .lock()
            .map(|inner| inner.subscribers.get(key).map_or(0, Vec::len))
            .unwrap_or_default()
    }
}

/// Handle returned by [`LoadingStateStore::subscribe`].
///
/// Dropping the handle does not unsubscribe; call [`Subscription::unsubscribe`].
#[derive(Debug)]
pub struct Subscription {
    key: String,
    id: u64,
    store: Weak<Mutex<Inner>>,
}

impl Subscription {
    /// Remove exactly this subscription. Further calls are no-ops.
    pub fn unsubscribe(&self) {
        let Some(inner) = self.store.upgrade() else {
            return;
        };
        let Ok(mut inner) = inner.lock() else {
            return;
        };
        if let Some(subs) = inner.subscribers.get_mut(&self.key) {
            subs.retain(|(id, _)| *id != self.id);
        }
    }
}
