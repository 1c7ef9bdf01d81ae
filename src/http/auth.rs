// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credentials attached to every backend request.

use std::fmt;
use std::sync::RwLock;

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Static API key plus the bearer token obtained at login.
///
/// The token has a single writer (the login flow, through
/// [`AuthContext::set_token`]) and many readers (every request). Readers
/// take a snapshot when a request is built, so a call already in flight
/// keeps the token it started with. There is no expiry or refresh; callers
/// log in again when the backend rejects the token.
pub struct AuthContext {
    api_key: String,
    jwt: RwLock<Option<String>>,
}

impl AuthContext {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            jwt: RwLock::new(None),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Replace the bearer token. Setting the same token twice is a no-op.
    pub fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        match self.jwt.write() {
            Ok(mut guard) => *guard = Some(token),
            Err(poisoned) => *poisoned.into_inner() = Some(token),
        }
    }

    pub fn token(&self) -> Option<String> {
        match self.jwt.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("api_key", &"<redacted>")
            .field("has_token", &self.token().is_some())
            .finish()
    }
}
