// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! by the SDK. Configuration can be built programmatically with
//! [`ClientConfig::new`] or loaded from the environment with
//! [`ClientConfig::from_env`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `PRISMON_API_KEY` | Static API key sent as `X-API-Key` | Required |
//! | `PRISMON_APP_ID` | Application identifier | `Null` |
//! | `PRISMON_BASE_URL` | Backend base URL | `https://api.prismon.dev` |
//! | `PRISMON_SOLANA_RPC_URL` | Solana JSON-RPC endpoint | `https://api.devnet.solana.com` |
//! | `PRISMON_MAX_RETRIES` | Attempts per request | `3` |
//! | `PRISMON_BACKOFF_BASE_MS` | Linear backoff base in milliseconds | `1000` |
//! | `PRISMON_ENABLE_LOGGING` | Verbose SDK diagnostics | `false` |
//! | `PRISMON_HERMES_URL` | Pyth Hermes streaming endpoint | `https://hermes.pyth.network/v2` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::time::Duration;

pub const API_KEY_ENV: &str = "PRISMON_API_KEY";
pub const APP_ID_ENV: &str = "PRISMON_APP_ID";
pub const BASE_URL_ENV: &str = "PRISMON_BASE_URL";
pub const SOLANA_RPC_URL_ENV: &str = "PRISMON_SOLANA_RPC_URL";
pub const MAX_RETRIES_ENV: &str = "PRISMON_MAX_RETRIES";
pub const BACKOFF_BASE_MS_ENV: &str = "PRISMON_BACKOFF_BASE_MS";
pub const ENABLE_LOGGING_ENV: &str = "PRISMON_ENABLE_LOGGING";
pub const HERMES_URL_ENV: &str = "PRISMON_HERMES_URL";

/// Environment variable selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_BASE_URL: &str = "https://api.prismon.dev";
pub const DEFAULT_SOLANA_RPC_URL: &str = "https://api.devnet.solana.com";
pub const DEFAULT_HERMES_URL: &str = "https://hermes.pyth.network/v2";

/// Used when no application id is configured.
pub const DEFAULT_APP_ID: &str = "Null";

/// Default number of attempts made by the request executor.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base for the linear backoff between attempts.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(1000);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Configuration missing: {0}")]
    Missing(String),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: String, value: String },
}

/// SDK configuration shared by every domain client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_key: String,
    pub app_id: String,
    pub base_url: String,
    pub solana_rpc_url: String,
    pub hermes_url: String,
    /// Total attempts per request, never below 1.
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub enable_logging: bool,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>, app_id: impl Into<String>) -> Self {
        let app_id = app_id.into();
        Self {
            api_key: api_key.into(),
            app_id: if app_id.trim().is_empty() {
                DEFAULT_APP_ID.to_string()
            } else {
                app_id
            },
            base_url: DEFAULT_BASE_URL.to_string(),
            solana_rpc_url: DEFAULT_SOLANA_RPC_URL.to_string(),
            hermes_url: DEFAULT_HERMES_URL.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: DEFAULT_BACKOFF_BASE,
            enable_logging: false,
        }
    }

    /// Load configuration from `PRISMON_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env_required(API_KEY_ENV)?;
        let app_id = env_or_default(APP_ID_ENV, DEFAULT_APP_ID);

        let mut config = Self::new(api_key, app_id)
            .with_base_url(env_or_default(BASE_URL_ENV, DEFAULT_BASE_URL))
            .with_solana_rpc_url(env_or_default(SOLANA_RPC_URL_ENV, DEFAULT_SOLANA_RPC_URL))
            .with_hermes_url(env_or_default(HERMES_URL_ENV, DEFAULT_HERMES_URL));

        if let Some(raw) = env_optional(MAX_RETRIES_ENV) {
            config = config.with_max_retries(parse_number(MAX_RETRIES_ENV, &raw)?);
        }
        if let Some(raw) = env_optional(BACKOFF_BASE_MS_ENV) {
            let millis: u64 = parse_number(BACKOFF_BASE_MS_ENV, &raw)?;
            config = config.with_backoff_base(Duration::from_millis(millis));
        }
        if let Some(raw) = env_optional(ENABLE_LOGGING_ENV) {
            config = config.with_logging(parse_flag(ENABLE_LOGGING_ENV, &raw)?);
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_solana_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.solana_rpc_url = rpc_url.into();
        self
    }

    pub fn with_hermes_url(mut self, hermes_url: impl Into<String>) -> Self {
        self.hermes_url = hermes_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the number of attempts per request. Zero is raised to one.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }
}

fn env_required(name: &str) -> Result<String, ConfigError> {
    env_optional(name).ok_or_else(|| ConfigError::Missing(name.to_string()))
}

fn env_optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    env_optional(name).unwrap_or_else(|| default.to_string())
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Invalid {
        name: name.to_string(),
        value: raw.to_string(),
    })
}

fn parse_flag(name: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name: name.to_string(),
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_applies_defaults() {
        let config = ClientConfig::new("key", "my-app");
        assert_eq!(config.api_key, "key");
        assert_eq!(config.app_id, "my-app");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.solana_rpc_url, DEFAULT_SOLANA_RPC_URL);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.backoff_base, Duration::from_millis(1000));
        assert!(!config.enable_logging);
    }

    #[test]
    fn blank_app_id_falls_back_to_null() {
        assert_eq!(ClientConfig::new("key", "  ").app_id, "Null");
    }

    #[test]
    fn zero_retries_still_makes_one_attempt() {
        assert_eq!(ClientConfig::new("k", "a").with_max_retries(0).max_retries, 1);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = ClientConfig::new("k", "a").with_base_url("https://example.com/");
        assert_eq!(config.base_url, "https://example.com");
    }

    #[test]
    fn flag_parsing() {
        assert_eq!(parse_flag("X", "TRUE"), Ok(true));
        assert_eq!(parse_flag("X", "off"), Ok(false));
        assert!(parse_flag("X", "maybe").is_err());
    }

    #[test]
    fn number_parsing_reports_variable() {
        let err = parse_number::<u32>(MAX_RETRIES_ENV, "three").unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: MAX_RETRIES_ENV.to_string(),
                value: "three".to_string()
            }
        );
        assert_eq!(err.to_string(), "Invalid value for PRISMON_MAX_RETRIES: three");
    }
}
