// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Backend request pipeline.
//!
//! This module provides:
//! - Request descriptors and response encodings
//! - The retrying [`RequestExecutor`] with loading state reporting
//! - The shared [`AuthContext`] (API key and bearer token)
//! - The [`Transport`] seam and its `reqwest` implementation

pub mod auth;
pub mod executor;
pub mod transport;
pub mod types;

pub use auth::AuthContext;
pub use executor::{BuildError, RequestError, RequestExecutor, RetryPolicy};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
pub use types::{RequestBody, RequestDescriptor, ResponseData, ResponseEncoding};
