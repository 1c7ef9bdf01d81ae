// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Uniform result shape and top-level error type.

use reqwest::header::HeaderMap;
use serde::Serialize;

use crate::blockchain::{RpcError, SigningError};
use crate::config::ConfigError;
use crate::http::TransportError;

/// Result of a domain call: `{success, data?, error?}`.
///
/// Request failures are reported here instead of as `Err`, so UI layers can
/// tell "backend rejected the request" apart from wallet problems, which
/// surface as [`ClientError`].
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip)]
    pub headers: Option<HeaderMap>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, status_code: u16, headers: HeaderMap) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            status_code: Some(status_code),
            headers: Some(headers),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            status_code: None,
            headers: None,
        }
    }

    /// Convert the payload, keeping status and headers.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
            status_code: self.status_code,
            headers: self.headers,
        }
    }

    /// Header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()
            .and_then(|h| h.get(name))
            .and_then(|v| v.to_str().ok())
    }

    pub fn into_result(self) -> Result<T, ClientError> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (_, _) => Err(ClientError::Request(
                self.error.unwrap_or_else(|| "Request returned no data".to_string()),
            )),
        }
    }
}

/// Errors raised by domain clients.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Wallet capability missing or signing pipeline failure.
    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Request(String),

    #[error("Failed to serialize request: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Rpc(#[from] RpcError),
}
