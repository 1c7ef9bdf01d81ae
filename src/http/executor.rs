// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request executor: the single path every backend call takes.
//!
//! One `execute` call:
//! 1. marks the operation key `loading`,
//! 2. builds headers (`X-API-Key`, bearer token once logged in, then caller
//!    headers) and serializes the body,
//! 3. sends the request, classifying transport failures, non-2xx statuses
//!    and decode failures as retryable,
//! 4. sleeps `backoff_base × attempt` between attempts, up to
//!    `max_retries` attempts in total,
//! 5. marks the key `success` or `error` and returns an [`ApiResponse`].
//!
//! Failures never surface as `Err`; they come back as
//! `ApiResponse { success: false, error }` carrying the last attempt's
//! message.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::auth::{AuthContext, API_KEY_HEADER};
use super::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use super::types::{RequestBody, RequestDescriptor, ResponseData, ResponseEncoding};
use crate::config::{DEFAULT_BACKOFF_BASE, DEFAULT_MAX_RETRIES};
use crate::error::ApiResponse;
use crate::loading::{LoadingStatePatch, LoadingStateStore};

/// Attempt budget and linear backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Treated as at least 1.
    pub max_retries: u32,
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: DEFAULT_BACKOFF_BASE,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_base: Duration) -> Self {
        Self {
            max_retries,
            backoff_base,
        }
    }

    /// Delay before the retry that follows failed attempt number `attempt`
    /// (1-based): `backoff_base × attempt`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(attempt)
    }

    fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }
}

/// A failed attempt. Every variant is retryable.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RequestError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse JSON: {0}")]
    Decode(String),
}

/// Errors building a request before any attempt is made. Not retried.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Failed to serialize request body: {0}")]
    Body(String),
}

pub struct RequestExecutor {
    base_url: String,
    auth: Arc<AuthContext>,
    transport: Arc<dyn Transport>,
    loading: Arc<LoadingStateStore>,
    retry: RetryPolicy,
    verbose: bool,
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl RequestExecutor {
    pub fn new(
        base_url: impl Into<String>,
        auth: Arc<AuthContext>,
        transport: Arc<dyn Transport>,
        loading: Arc<LoadingStateStore>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
            transport,
            loading,
            retry,
            verbose: false,
        }
    }

    /// Log every failed attempt at `warn` instead of `debug`.
    pub fn with_verbose_logging(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Attach `token` as a bearer credential to every subsequent call.
    pub fn set_auth_token(&self, token: impl Into<String>) {
        self.auth.set_token(token);
    }

    pub fn auth(&self) -> &Arc<AuthContext> {
        &self.auth
    }

    pub fn loading_states(&self) -> &Arc<LoadingStateStore> {
        &self.loading
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run `descriptor`, decoding the body per its [`ResponseEncoding`].
    pub async fn execute(&self, descriptor: &RequestDescriptor) -> ApiResponse<ResponseData> {
        let encoding = descriptor.encoding;
        self.run(descriptor, |response| decode_body(encoding, response))
            .await
    }

    /// Run `descriptor` and decode the JSON body straight into `T`.
    ///
    /// A body that is valid JSON but does not match `T` is retried like any
    /// other decode failure. The descriptor's encoding is ignored.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        descriptor: &RequestDescriptor,
    ) -> ApiResponse<T> {
        self.run(descriptor, |response| {
            serde_json::from_slice::<T>(&response.body).map_err(|e| {
                debug!(error = %e, "response did not match the expected shape");
                RequestError::Decode(response.text())
            })
        })
        .await
    }

    async fn run<T, D>(&self, descriptor: &RequestDescriptor, decode: D) -> ApiResponse<T>
    where
        D: Fn(&HttpResponse) -> Result<T, RequestError>,
    {
        let key = descriptor.operation_key.as_deref();
        if let Some(key) = key {
            self.loading.update_state(key, LoadingStatePatch::loading());
        }

        let request = match self.build_request(descriptor) {
            Ok(request) => request,
            Err(e) => {
                warn!(path = %descriptor.path, error = %e, "Request could not be built");
                return self.fail(key, e.to_string());
            }
        };

        let attempts = self.retry.attempts();
        let mut attempt: u32 = 0;
        loop {
            let outcome = self.attempt(request.clone(), &decode).await;
            let error = match outcome {
                Ok((data, status, headers)) => {
                    if let Some(key) = key {
                        self.loading.update_state(key, LoadingStatePatch::success());
                    }
                    return ApiResponse::ok(data, status, headers);
                }
                Err(e) => e,
            };

            attempt += 1;
            if self.verbose {
                warn!(
                    method = %descriptor.method,
                    path = %descriptor.path,
                    attempt,
                    max_retries = attempts,
                    error = %error,
                    "Request attempt failed"
                );
            } else {
                debug!(
                    method = %descriptor.method,
                    path = %descriptor.path,
                    attempt,
                    max_retries = attempts,
                    error = %error,
                    "Request attempt failed"
                );
            }

            if attempt >= attempts {
                warn!(
                    path = %descriptor.path,
                    operation_key = ?key,
                    attempts,
                    error = %error,
                    "Request failed after exhausting retries"
                );
                return self.fail(key, error.to_string());
            }

            tokio::time::sleep(self.retry.delay_for_attempt(attempt)).await;
        }
    }

    async fn attempt<T, D>(
        &self,
        request: HttpRequest,
        decode: &D,
    ) -> Result<(T, u16, HeaderMap), RequestError>
    where
        D: Fn(&HttpResponse) -> Result<T, RequestError>,
    {
        let response = self.transport.send(request).await?;

        if !response.status.is_success() {
            return Err(RequestError::Status {
                status: response.status.as_u16(),
                body: response.text(),
            });
        }

        let data = decode(&response)?;
        if self.verbose {
            info!(status = response.status.as_u16(), "Request succeeded");
        }
        Ok((data, response.status.as_u16(), response.headers))
    }

    fn fail<T>(&self, key: Option<&str>, message: String) -> ApiResponse<T> {
        if let Some(key) = key {
            self.loading
                .update_state(key, LoadingStatePatch::error(message.clone()));
        }
        ApiResponse::failure(message)
    }

    fn build_request(&self, descriptor: &RequestDescriptor) -> Result<HttpRequest, BuildError> {
        let headers = build_headers(&self.auth, descriptor)?;
        let body = match &descriptor.body {
            None => None,
            Some(RequestBody::Binary { bytes, .. }) => Some(bytes.clone()),
            Some(RequestBody::Json(value)) => {
                Some(serde_json::to_vec(value).map_err(|e| BuildError::Body(e.to_string()))?)
            }
        };

        Ok(HttpRequest {
            method: descriptor.method.clone(),
            url: format!("{}{}", self.base_url, descriptor.path),
            headers,
            body,
        })
    }
}

fn build_headers(
    auth: &AuthContext,
    descriptor: &RequestDescriptor,
) -> Result<HeaderMap, BuildError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static("x-api-key"),
        header_value(API_KEY_HEADER, auth.api_key())?,
    );
    if let Some(token) = auth.token() {
        headers.insert(
            AUTHORIZATION,
            header_value(AUTHORIZATION.as_str(), &format!("Bearer {token}"))?,
        );
    }

    match &descriptor.body {
        Some(RequestBody::Binary { content_type, .. }) => {
            if let Some(ct) = content_type {
                headers.insert(CONTENT_TYPE, header_value(CONTENT_TYPE.as_str(), ct)?);
            }
        }
        _ => {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
    }

    for (name, value) in &descriptor.headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| BuildError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        headers.insert(header_name, header_value(name, value)?);
    }

    Ok(headers)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, BuildError> {
    HeaderValue::from_str(value).map_err(|e| BuildError::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

fn decode_body(
    encoding: ResponseEncoding,
    response: &HttpResponse,
) -> Result<ResponseData, RequestError> {
    match encoding {
        ResponseEncoding::Binary => Ok(ResponseData::Binary(response.body.clone())),
        ResponseEncoding::Text => Ok(ResponseData::Text(response.text())),
        ResponseEncoding::Structured => serde_json::from_slice::<Value>(&response.body)
            .map(ResponseData::Structured)
            .map_err(|_| RequestError::Decode(response.text())),
    }
}
