// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request descriptors and decoded response payloads.

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

/// How the response body is decoded. Chosen by the caller, not negotiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseEncoding {
    /// JSON, decoded into a structured value. Decode failures are retried.
    #[default]
    Structured,
    /// Raw bytes, used for file retrieval.
    Binary,
    /// UTF-8 text (lossy). Never fails to decode.
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized as JSON with `Content-Type: application/json`.
    Json(Value),
    /// Sent untouched; suppresses the default JSON content type.
    Binary {
        bytes: Vec<u8>,
        content_type: Option<String>,
    },
}

impl RequestBody {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(RequestBody::Json(serde_json::to_value(value)?))
    }
}

/// One logical HTTP operation. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Path relative to the configured base URL, including any query string.
    pub path: String,
    pub body: Option<RequestBody>,
    /// Caller headers, applied last so they win on conflict.
    pub headers: Vec<(String, String)>,
    pub encoding: ResponseEncoding,
    /// Loading state key, e.g. `solana:swap`.
    pub operation_key: Option<String>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: Vec::new(),
            encoding: ResponseEncoding::Structured,
            operation_key: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn json_body(self, value: Value) -> Self {
        self.body(RequestBody::Json(value))
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn encoding(mut self, encoding: ResponseEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn operation_key(mut self, key: impl Into<String>) -> Self {
        self.operation_key = Some(key.into());
        self
    }
}

/// Decoded response body, shaped by [`ResponseEncoding`].
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseData {
    Structured(Value),
    Binary(Vec<u8>),
    Text(String),
}

impl ResponseData {
    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            ResponseData::Structured(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseData::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            ResponseData::Binary(b) => b,
            ResponseData::Text(t) => t.into_bytes(),
            ResponseData::Structured(v) => v.to_string().into_bytes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_sets_fields() {
        let d = RequestDescriptor::post("/devApi/Solana/swap")
            .json_body(json!({"amount": 1}))
            .header("Accept", "*/*")
            .encoding(ResponseEncoding::Text)
            .operation_key("solana:swap");

        assert_eq!(d.method, Method::POST);
        assert_eq!(d.path, "/devApi/Solana/swap");
        assert_eq!(d.body, Some(RequestBody::Json(json!({"amount": 1}))));
        assert_eq!(d.headers, vec![("Accept".to_string(), "*/*".to_string())]);
        assert_eq!(d.encoding, ResponseEncoding::Text);
        assert_eq!(d.operation_key.as_deref(), Some("solana:swap"));
    }

    #[test]
    fn get_defaults_to_structured_without_key() {
        let d = RequestDescriptor::get("/x");
        assert_eq!(d.encoding, ResponseEncoding::Structured);
        assert!(d.operation_key.is_none());
        assert!(d.body.is_none());
    }

    #[test]
    fn response_data_bytes() {
        assert_eq!(ResponseData::Text("hi".into()).into_bytes(), b"hi".to_vec());
        assert_eq!(ResponseData::Binary(vec![1, 2]).into_bytes(), vec![1, 2]);
    }
}
