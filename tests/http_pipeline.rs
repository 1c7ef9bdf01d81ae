// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! End-to-end checks of the request pipeline over real HTTP, against an
//! in-process axum backend.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use prismon_client::blockchain::{
    ConfirmationOutcome, KeypairWallet, LatestBlockhash, RpcError, SolanaRpc,
};
use prismon_client::http::{
    AuthContext, ReqwestTransport, RequestDescriptor, RequestExecutor, RetryPolicy,
};
use prismon_client::loading::{LoadingStateStore, LoadingStatus};
use prismon_client::models::{RetrieveBlobOptions, StoreBlobOptions, StreamPriceOptions};
use prismon_client::{ClientConfig, PrismonClient};
use serde_json::{json, Value};
use solana_sdk::hash::Hash;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::transaction::Transaction;

#[derive(Default)]
struct Backend {
    flaky_hits: AtomicUsize,
    stream_stops: AtomicUsize,
    stored: Mutex<Vec<Value>>,
}

async fn flaky(State(backend): State<Arc<Backend>>) -> impl IntoResponse {
    let hit = backend.flaky_hits.fetch_add(1, Ordering::SeqCst) + 1;
    if hit < 3 {
        (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
    } else {
        Json(json!({ "ok": true })).into_response()
    }
}

async fn whoami(headers: HeaderMap) -> Json<Value> {
    let get = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "apiKey": get("x-api-key"),
        "authorization": get("authorization"),
        "contentType": get("content-type"),
    }))
}

async fn store_blob(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Json<Value> {
    backend.stored.lock().unwrap().push(body);
    Json(json!({ "blobId": "blob-42", "cluster": "testnet" }))
}

async fn retrieve_blob(Query(query): Query<HashMap<String, String>>) -> impl IntoResponse {
    let disposition = query
        .get("contentDisposition")
        .cloned()
        .unwrap_or_else(|| "inline".to_string());
    (
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        vec![0u8, 159, 146, 150],
    )
}

async fn stream_start() -> Json<Value> {
    Json(json!({ "started": true }))
}

async fn stream_stop(State(backend): State<Arc<Backend>>) -> Json<Value> {
    backend.stream_stops.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "stopped": true }))
}

fn update(id: &str) -> Value {
    json!({
        "id": id,
        "price": { "price": "6132512000000", "conf": "3254000000", "expo": -8, "publish_time": 1718000000 },
        "ema_price": { "price": "6130000000000", "conf": "3100000000", "expo": -8, "publish_time": 1718000000 },
        "metadata": { "slot": 85480034, "proof_available_time": 1718000001, "prev_publish_time": 1717999999 }
    })
}

async fn hermes_stream() -> impl IntoResponse {
    let body = format!(
        ": connected\n\ndata: {}\n\ndata: {}\n\n",
        json!({ "parsed": [update("btc")] }),
        json!({ "parsed": [update("eth")] }),
    );
    ([(header::CONTENT_TYPE, "text/event-stream")], body)
}

async fn spawn_backend() -> (SocketAddr, Arc<Backend>) {
    let backend = Arc::new(Backend::default());
    let app = Router::new()
        .route("/flaky", get(flaky))
        .route("/whoami", post(whoami))
        .route("/devApi/Solana/blob/store", post(store_blob))
        .route("/devApi/Solana/blob/retrieve/{id}", get(retrieve_blob))
        .route("/devApi/Pyth/price/stream/start", post(stream_start))
        .route("/devApi/Pyth/price/stream/stop", post(stream_stop))
        .route("/updates/price/stream", get(hermes_stream))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, backend)
}

/// Chain stand-in: hands out blockhashes and confirms whatever is sent.
#[derive(Default)]
struct AcceptingRpc {
    submitted: Mutex<Vec<Transaction>>,
}

#[async_trait]
impl SolanaRpc for AcceptingRpc {
    async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, RpcError> {
        Ok(LatestBlockhash {
            blockhash: Hash::new_unique(),
            last_valid_block_height: 1_000,
        })
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature, RpcError> {
        self.submitted.lock().unwrap().push(transaction.clone());
        Ok(transaction.signatures[0])
    }

    async fn confirm_transaction(
        &self,
        _signature: &Signature,
        _anchor: &LatestBlockhash,
    ) -> Result<ConfirmationOutcome, RpcError> {
        Ok(ConfirmationOutcome::Confirmed { slot: 1 })
    }
}

fn executor(addr: SocketAddr, loading: Arc<LoadingStateStore>) -> RequestExecutor {
    RequestExecutor::new(
        format!("http://{addr}"),
        Arc::new(AuthContext::new("integration-key")),
        Arc::new(ReqwestTransport::new().unwrap()),
        loading,
        RetryPolicy::new(3, Duration::from_millis(10)),
    )
}

#[tokio::test]
async fn retries_server_errors_until_success() {
    let (addr, backend) = spawn_backend().await;
    let loading = Arc::new(LoadingStateStore::new());
    let executor = executor(addr, loading.clone());

    let response = executor
        .execute_json::<Value>(&RequestDescriptor::get("/flaky").operation_key("test:flaky"))
        .await;

    assert!(response.success, "{:?}", response.error);
    assert_eq!(response.data, Some(json!({ "ok": true })));
    assert_eq!(response.status_code, Some(200));
    assert_eq!(backend.flaky_hits.load(Ordering::SeqCst), 3);
    assert_eq!(loading.get_state("test:flaky").status, LoadingStatus::Success);
}

#[tokio::test]
async fn unreachable_server_exhausts_retries() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let loading = Arc::new(LoadingStateStore::new());
    let response = executor(addr, loading.clone())
        .execute(&RequestDescriptor::get("/anything").operation_key("test:down"))
        .await;

    assert!(!response.success);
    let error = response.error.unwrap();
    assert!(error.starts_with("Request failed:"), "{error}");
    let state = loading.get_state("test:down");
    assert_eq!(state.status, LoadingStatus::Error);
    assert_eq!(state.error.as_deref(), Some(error.as_str()));
}

#[tokio::test]
async fn credentials_reach_the_server() {
    let (addr, _backend) = spawn_backend().await;
    let executor = executor(addr, Arc::new(LoadingStateStore::new()));

    let descriptor = RequestDescriptor::post("/whoami").json_body(json!({}));
    let before = executor.execute_json::<Value>(&descriptor).await.data.unwrap();
    assert_eq!(before["apiKey"], "integration-key");
    assert_eq!(before["authorization"], Value::Null);
    assert_eq!(before["contentType"], "application/json");

    executor.set_auth_token("jwt-1");
    let after = executor.execute_json::<Value>(&descriptor).await.data.unwrap();
    assert_eq!(after["authorization"], "Bearer jwt-1");
}

#[tokio::test]
async fn blob_store_and_retrieve_round_trip_headers() {
    let (addr, backend) = spawn_backend().await;
    let client = PrismonClient::with_parts(
        ClientConfig::new("key", "app").with_base_url(format!("http://{addr}")),
        Arc::new(ReqwestTransport::new().unwrap()),
        Arc::new(AcceptingRpc::default()),
    )
    .unwrap();
    let wallet = KeypairWallet::new(Keypair::new());

    let stored = client
        .solana()
        .store_blob("aGk=", "hi.txt", &StoreBlobOptions::default(), &wallet)
        .await
        .unwrap();
    assert_eq!(stored.data.unwrap().blob_id, "blob-42");
    assert_eq!(backend.stored.lock().unwrap()[0]["fileName"], "hi.txt");

    let options = RetrieveBlobOptions {
        content_disposition: Some("attachment; filename=\"photo.bin\"".into()),
        content_type: None,
    };
    let blob = client
        .solana()
        .retrieve_blob("blob-42", &wallet, &options)
        .await
        .data
        .unwrap();

    assert_eq!(blob.content, vec![0u8, 159, 146, 150]);
    assert!(blob.is_file);
    assert_eq!(blob.file_name.as_deref(), Some("photo.bin"));
    assert_eq!(blob.content_type, "application/octet-stream");
    assert_eq!(
        client.loading_states().get_state("solana:retrieveBlob").status,
        LoadingStatus::Success
    );
}

#[tokio::test]
async fn price_stream_delivers_updates_and_stops_once() {
    let (addr, backend) = spawn_backend().await;
    let client = PrismonClient::with_parts(
        ClientConfig::new("key", "app")
            .with_base_url(format!("http://{addr}"))
            .with_hermes_url(format!("http://{addr}")),
        Arc::new(ReqwestTransport::new().unwrap()),
        Arc::new(AcceptingRpc::default()),
    )
    .unwrap();

    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    let stream = client
        .pyth()
        .stream_prices(StreamPriceOptions::new(["btc", "eth"]), move |update| {
            sink.lock().unwrap().push(update.id);
        })
        .await
        .unwrap();

    tokio::time::timeout(Duration::from_secs(5), stream.closed())
        .await
        .expect("stream should end when the server closes it");

    assert_eq!(*received.lock().unwrap(), vec!["btc", "eth"]);
    assert!(stream.is_stopped());

    stream.stop().await;
    assert_eq!(backend.stream_stops.load(Ordering::SeqCst), 1);
}
