// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Domain clients.
//!
//! Each client marshals parameters into a [`RequestDescriptor`] with a fixed
//! operation key and, where the backend wants proof of user intent, runs one
//! of the signing pipelines first.

pub mod ai;
pub mod blob;
pub mod magicblock;
pub mod pyth;
pub mod solana;
pub mod users;

pub use ai::AiClient;
pub use blob::file_name_from_content_disposition;
pub use magicblock::MagicBlockClient;
pub use pyth::{parse_stream_line, PriceStream, PythClient};
pub use solana::SolanaClient;
pub use users::UsersClient;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;
use url::form_urlencoded;

use crate::error::ApiResponse;
use crate::http::{RequestBody, RequestDescriptor, RequestExecutor};

/// Send `body` as JSON and decode the response into `R`.
pub(crate) async fn send_json<B, R>(
    executor: &RequestExecutor,
    method: Method,
    path: String,
    body: Option<&B>,
    operation_key: &str,
) -> ApiResponse<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let mut descriptor = RequestDescriptor::new(method, path).operation_key(operation_key);
    if let Some(body) = body {
        match RequestBody::json(body) {
            Ok(body) => descriptor = descriptor.body(body),
            Err(e) => {
                warn!(operation_key, error = %e, "Request body could not be serialized");
                return ApiResponse::failure(format!("Failed to serialize request: {e}"));
            }
        }
    }
    executor.execute_json(&descriptor).await
}

/// `GET path` decoded into `R`.
pub(crate) async fn get_json<R: DeserializeOwned>(
    executor: &RequestExecutor,
    path: String,
    operation_key: &str,
) -> ApiResponse<R> {
    send_json::<(), R>(executor, Method::GET, path, None, operation_key).await
}

/// Characters escaped when a value is placed in one path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode `value` so it stays a single path segment.
pub(crate) fn path_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

/// Append an url-encoded query string to `path`. Empty pairs leave the path
/// untouched.
pub(crate) fn with_query<'a, I>(path: &str, pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (name, value) in pairs {
        serializer.append_pair(name, value);
        any = true;
    }
    if any {
        format!("{path}?{}", serializer.finish())
    } else {
        path.to_string()
    }
}
