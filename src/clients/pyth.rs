// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Pyth price feeds and streaming.
//!
//! Streaming is a two-party affair: the backend is told to open a session
//! (`/devApi/Pyth/price/stream/start`), then updates are read straight from
//! Hermes' server-sent event stream in a background task. [`PriceStream`]
//! is the handle that ends both.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::form_urlencoded;
use uuid::Uuid;

use super::{get_json, send_json, with_query};
use crate::error::{ApiResponse, ClientError};
use crate::http::RequestExecutor;
use crate::models::*;
use crate::state::SdkContext;

/// One event from the Hermes stream.
#[derive(Deserialize)]
struct StreamMessage {
    #[serde(default)]
    parsed: Option<Vec<PriceUpdate>>,
}

/// Decode one line of the Hermes stream.
///
/// Accepts SSE `data:` lines and bare JSON objects. Anything else (event
/// names, comments, keep-alives) yields no updates. A message without a
/// `parsed` array also yields none.
pub fn parse_stream_line(line: &str) -> Result<Vec<PriceUpdate>, serde_json::Error> {
    let line = line.trim();
    let payload = if let Some(data) = line.strip_prefix("data:") {
        data.trim()
    } else if line.starts_with('{') {
        line
    } else {
        return Ok(Vec::new());
    };

    let message: StreamMessage = serde_json::from_str(payload)?;
    Ok(message.parsed.unwrap_or_default())
}

#[derive(Clone, Debug)]
pub struct PythClient {
    ctx: SdkContext,
    http: Client,
}

impl PythClient {
    pub fn new(ctx: SdkContext) -> Result<Self, ClientError> {
        let http = Client::builder()
            .build()
            .map_err(|e| ClientError::Request(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_http_client(ctx, http))
    }

    /// Use `http` for the Hermes stream instead of a default client.
    pub fn with_http_client(ctx: SdkContext, http: Client) -> Self {
        Self { ctx, http }
    }

    pub async fn get_price_feeds(&self, request: &PriceFeedRequest) -> ApiResponse<PriceFeedsResponse> {
        let mut query = Vec::new();
        if let Some(q) = request.query.as_deref() {
            query.push(("query", q));
        }
        if let Some(asset_type) = request.asset_type.as_deref() {
            query.push(("assetType", asset_type));
        }
        let path = with_query("/devApi/Pyth/price/feeds", query);
        get_json(&self.ctx.executor, path, "pyth:getPriceFeeds").await
    }

    pub async fn get_latest_price(
        &self,
        request: &LatestPriceRequest,
    ) -> ApiResponse<LatestPricesResponse> {
        let mut query: Vec<(&str, &str)> = request
            .price_feed_ids
            .iter()
            .map(|id| ("ids", id.as_str()))
            .collect();
        if request.ignore_invalid_price_ids {
            query.push(("ignoreInvalidPriceIds", "true"));
        }
        let path = with_query("/devApi/Pyth/price/latest", query);
        get_json(&self.ctx.executor, path, "pyth:getLatestPrice").await
    }

    /// Open a price stream and call `on_update` for every price update.
    ///
    /// The callback runs on a background task. The stream ends when
    /// [`PriceStream::stop`] is called, the handle is dropped, or Hermes
    /// closes the connection; in every case the backend session is stopped
    /// exactly once.
    pub async fn stream_prices<F>(
        &self,
        options: StreamPriceOptions,
        on_update: F,
    ) -> Result<PriceStream, ClientError>
    where
        F: FnMut(PriceUpdate) + Send + 'static,
    {
        if options.price_feed_ids.is_empty() {
            return Err(ClientError::InvalidInput(
                "At least one price feed ID is required".to_string(),
            ));
        }

        let session_id = new_session_id();
        let path = with_query(
            "/devApi/Pyth/price/stream/start",
            [("sessionId", session_id.as_str())],
        );
        let started: ApiResponse<Value> = send_json(
            &self.ctx.executor,
            Method::POST,
            path,
            Some(&StreamPriceRequest::from(&options)),
            "pyth:startPriceStream",
        )
        .await;
        if !started.success {
            let reason = started
                .error
                .unwrap_or_else(|| "Failed to start price stream".to_string());
            return Err(ClientError::Request(format!(
                "Failed to start price stream: {reason}"
            )));
        }

        let control = Arc::new(StreamControl {
            executor: self.ctx.executor.clone(),
            session_id,
            cancel: CancellationToken::new(),
            closing: AtomicBool::new(false),
            finished: CancellationToken::new(),
        });

        let url = hermes_stream_url(&self.ctx.config.hermes_url, &options);
        debug!(url = %url, session_id = %control.session_id, "Opening price stream");

        let response = match self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                control.stop().await;
                return Err(ClientError::Request(format!(
                    "Failed to stream prices: {}",
                    response.status()
                )));
            }
            Err(e) => {
                control.stop().await;
                return Err(ClientError::Request(format!("Failed to stream prices: {e}")));
            }
        };

        info!(
            session_id = %control.session_id,
            feeds = options.price_feed_ids.len(),
            "Price stream started"
        );
        tokio::spawn(read_stream(response, control.clone(), on_update));

        Ok(PriceStream { control })
    }
}

/// Handle to a running price stream.
///
/// Dropping the handle cancels the reader; the background task then stops
/// the backend session on its way out.
#[derive(Debug)]
pub struct PriceStream {
    control: Arc<StreamControl>,
}

impl PriceStream {
    pub fn session_id(&self) -> &str {
        &self.control.session_id
    }

    pub fn is_stopped(&self) -> bool {
        self.control.closing.load(Ordering::SeqCst)
    }

    /// Stop reading and close the backend session. Safe to call repeatedly.
    pub async fn stop(&self) {
        self.control.stop().await;
    }

    /// Wait until the stream has ended, by [`Self::stop`] or on its own,
    /// and the backend session has been closed.
    pub async fn closed(&self) {
        self.control.finished.cancelled().await;
    }
}

impl Drop for PriceStream {
    fn drop(&mut self) {
        self.control.cancel.cancel();
    }
}

#[derive(Debug)]
struct StreamControl {
    executor: Arc<RequestExecutor>,
    session_id: String,
    cancel: CancellationToken,
    closing: AtomicBool,
    /// Cancelled once the backend stop call has returned.
    finished: CancellationToken,
}

impl StreamControl {
    async fn stop(&self) {
        if self.closing.swap(true, Ordering::SeqCst) {
            return;
        }
        self.cancel.cancel();

        let path = with_query(
            "/devApi/Pyth/price/stream/stop",
            [("sessionId", self.session_id.as_str())],
        );
        let stopped: ApiResponse<Value> = send_json::<(), Value>(
            &self.executor,
            Method::POST,
            path,
            None,
            "pyth:stopPriceStream",
        )
        .await;

        if stopped.success {
            info!(session_id = %self.session_id, "Price stream stopped");
        } else {
            warn!(
                session_id = %self.session_id,
                error = ?stopped.error,
                "Failed to stop price stream session"
            );
        }
        self.finished.cancel();
    }
}

async fn read_stream<F>(mut response: reqwest::Response, control: Arc<StreamControl>, mut on_update: F)
where
    F: FnMut(PriceUpdate) + Send + 'static,
{
    let mut buffer: Vec<u8> = Vec::new();

    loop {
        let chunk = tokio::select! {
            _ = control.cancel.cancelled() => break,
            chunk = response.chunk() => chunk,
        };

        match chunk {
            Ok(Some(bytes)) => {
                buffer.extend_from_slice(&bytes);
                while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=pos).collect();
                    dispatch_line(&String::from_utf8_lossy(&line), &mut on_update);
                }
            }
            Ok(None) => {
                if !buffer.is_empty() {
                    dispatch_line(&String::from_utf8_lossy(&buffer), &mut on_update);
                }
                debug!(session_id = %control.session_id, "Price stream ended");
                break;
            }
            Err(e) => {
                warn!(session_id = %control.session_id, error = %e, "Price stream read failed");
                break;
            }
        }
    }

    control.stop().await;
}

fn dispatch_line<F: FnMut(PriceUpdate)>(line: &str, on_update: &mut F) {
    match parse_stream_line(line) {
        Ok(updates) => {
            for update in updates {
                on_update(update);
            }
        }
        Err(e) => warn!(error = %e, line = line.trim(), "Skipping malformed price stream line"),
    }
}

/// Hermes SSE URL for `options`. Boolean flags are only sent when set.
fn hermes_stream_url(hermes_url: &str, options: &StreamPriceOptions) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    for id in &options.price_feed_ids {
        query.append_pair("ids[]", id);
    }
    query.append_pair("encoding", &options.encoding);
    query.append_pair("parsed", if options.parsed { "true" } else { "false" });
    if options.allow_unordered {
        query.append_pair("allow_unordered", "true");
    }
    if options.benchmarks_only {
        query.append_pair("benchmarks_only", "true");
    }
    if options.ignore_invalid_price_ids {
        query.append_pair("ignore_invalid_price_ids", "true");
    }
    format!(
        "{}/updates/price/stream?{}",
        hermes_url.trim_end_matches('/'),
        query.finish()
    )
}

fn new_session_id() -> String {
    format!(
        "session-{}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::blockchain::transactions::tests::MockRpc;
    use crate::clients::test_support::{context, RecordingTransport};
    use crate::http::HttpResponse;

    fn update_json(id: &str) -> Value {
        json!({
            "id": id,
            "price": { "price": "100", "conf": "1", "expo": -2, "publish_time": 1 },
            "ema_price": { "price": "99", "conf": "1", "expo": -2, "publish_time": 1 },
            "metadata": { "slot": 7, "proof_available_time": 2, "prev_publish_time": 0 }
        })
    }

    #[test]
    fn parses_sse_data_lines() {
        let line = format!(
            "data: {}",
            json!({ "binary": {}, "parsed": [update_json("a"), update_json("b")] })
        );
        let updates = parse_stream_line(&line).unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[1].id, "b");
    }

    #[test]
    fn parses_bare_json_lines() {
        let line = json!({ "parsed": [update_json("c")] }).to_string();
        assert_eq!(parse_stream_line(&line).unwrap()[0].id, "c");
    }

    #[test]
    fn ignores_non_data_lines_and_missing_parsed() {
        assert!(parse_stream_line("event: price_update").unwrap().is_empty());
        assert!(parse_stream_line(": keep-alive").unwrap().is_empty());
        assert!(parse_stream_line("").unwrap().is_empty());
        assert!(parse_stream_line("data: {\"binary\":{}}").unwrap().is_empty());
        assert!(parse_stream_line("data: {not json").is_err());
    }

    #[test]
    fn stream_url_carries_ids_and_flags() {
        let mut options = StreamPriceOptions::new(["0xabc", "0xdef"]);
        options.benchmarks_only = true;
        let url = hermes_stream_url("https://hermes.example/v2/", &options);
        assert_eq!(
            url,
            "https://hermes.example/v2/updates/price/stream?ids%5B%5D=0xabc&ids%5B%5D=0xdef\
             &encoding=hex&parsed=true&benchmarks_only=true&ignore_invalid_price_ids=true"
        );
    }

    #[test]
    fn session_ids_are_unique() {
        let a = new_session_id();
        let b = new_session_id();
        assert!(a.starts_with("session-"));
        assert_ne!(a, b);
    }

    fn client() -> (PythClient, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::default());
        let ctx = context(transport.clone(), Arc::new(MockRpc::default()));
        (PythClient::new(ctx).unwrap(), transport)
    }

    #[tokio::test]
    async fn latest_price_repeats_ids() {
        let (client, transport) = client();
        transport.reply_json(json!({ "prices": [update_json("a")] }));

        let response = client
            .get_latest_price(&LatestPriceRequest {
                price_feed_ids: vec!["a".into(), "b".into()],
                ignore_invalid_price_ids: true,
            })
            .await;

        assert_eq!(response.data.unwrap().prices[0].id, "a");
        assert_eq!(
            transport.requests()[0].url,
            "http://backend.test/devApi/Pyth/price/latest?ids=a&ids=b&ignoreInvalidPriceIds=true"
        );
    }

    #[tokio::test]
    async fn price_feeds_without_filters() {
        let (client, transport) = client();
        transport.reply_json(json!({ "feeds": [] }));
        let response = client.get_price_feeds(&PriceFeedRequest::default()).await;
        assert!(response.data.unwrap().feeds.is_empty());
        assert_eq!(
            transport.requests()[0].url,
            "http://backend.test/devApi/Pyth/price/feeds"
        );
    }

    #[tokio::test]
    async fn stream_requires_feed_ids() {
        let (client, transport) = client();
        let err = client
            .stream_prices(StreamPriceOptions::new(Vec::<String>::new()), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn failed_start_is_an_error() {
        let (client, transport) = client();
        transport.reply(HttpResponse::new(StatusCode::SERVICE_UNAVAILABLE, "down"));

        let err = client
            .stream_prices(StreamPriceOptions::new(["0xabc"]), |_| {})
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to start price stream: HTTP 503: down"
        );

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0]
            .url
            .starts_with("http://backend.test/devApi/Pyth/price/stream/start?sessionId=session-"));
        assert_eq!(
            transport.json_body(0)["priceFeedIds"],
            json!(["0xabc"])
        );
    }
}
