// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction signing pipeline over `SolanaRpcClient` against a fake
//! Solana JSON-RPC node.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use prismon_client::blockchain::{
    KeypairWallet, RpcError, SigningError, SolanaRpcClient, TransactionSigningPipeline,
    MEMO_PROGRAM_ID,
};
use serde_json::{json, Value};
use solana_sdk::hash::Hash;
use solana_sdk::signature::Keypair;
use solana_sdk::transaction::Transaction;

/// How the fake node treats submitted signatures.
#[derive(Clone, Copy)]
enum Mode {
    /// Unknown on the first status poll, confirmed on the second.
    ConfirmOnSecondPoll,
    /// Landed with an instruction error.
    ExecutionError,
    /// Never seen; block height runs past the validity window.
    NeverLands,
}

struct Node {
    mode: Mode,
    blockhash: Hash,
    polls: AtomicUsize,
    height: AtomicU64,
    submitted: Mutex<Vec<(Transaction, Value)>>,
}

async fn rpc(State(node): State<Arc<Node>>, Json(request): Json<Value>) -> Json<Value> {
    let id = request["id"].clone();
    let method = request["method"].as_str().unwrap_or_default();
    let result = match method {
        "getLatestBlockhash" => json!({
            "context": { "slot": 10 },
            "value": { "blockhash": node.blockhash.to_string(), "lastValidBlockHeight": 100 }
        }),
        "sendTransaction" => {
            let wire = STANDARD
                .decode(request["params"][0].as_str().unwrap())
                .unwrap();
            let tx: Transaction = bincode::deserialize(&wire).unwrap();
            let signature = tx.signatures[0].to_string();
            node.submitted
                .lock()
                .unwrap()
                .push((tx, request["params"][1].clone()));
            json!(signature)
        }
        "getSignatureStatuses" => {
            let poll = node.polls.fetch_add(1, Ordering::SeqCst);
            let status = match node.mode {
                Mode::ConfirmOnSecondPoll if poll == 0 => Value::Null,
                Mode::ConfirmOnSecondPoll => json!({
                    "slot": 12,
                    "confirmations": 1,
                    "status": { "Ok": null },
                    "err": null,
                    "confirmationStatus": "confirmed"
                }),
                Mode::ExecutionError => json!({
                    "slot": 12,
                    "confirmations": 1,
                    "status": { "Err": { "InstructionError": [0, "InvalidInstructionData"] } },
                    "err": { "InstructionError": [0, "InvalidInstructionData"] },
                    "confirmationStatus": "confirmed"
                }),
                Mode::NeverLands => Value::Null,
            };
            json!({ "context": { "slot": 12 }, "value": [status] })
        }
        "getBlockHeight" => json!(node.height.fetch_add(60, Ordering::SeqCst)),
        "getVersion" => json!({ "solana-core": "2.2.0", "feature-set": 1 }),
        other => {
            return Json(json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": { "code": -32601, "message": format!("Method not found: {other}") }
            }))
        }
    };
    Json(json!({ "jsonrpc": "2.0", "id": id, "result": result }))
}

async fn spawn_node(mode: Mode) -> (SocketAddr, Arc<Node>) {
    let node = Arc::new(Node {
        mode,
        blockhash: Hash::new_unique(),
        polls: AtomicUsize::new(0),
        height: AtomicU64::new(50),
        submitted: Mutex::new(Vec::new()),
    });
    let app = Router::new().route("/", post(rpc)).with_state(node.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, node)
}

fn pipeline(addr: SocketAddr) -> TransactionSigningPipeline {
    let rpc = SolanaRpcClient::new(format!("http://{addr}/"))
        .unwrap()
        .with_poll_interval(Duration::from_millis(5));
    TransactionSigningPipeline::new(Arc::new(rpc))
}

#[tokio::test]
async fn memo_transaction_lands_and_confirms() {
    let (addr, node) = spawn_node(Mode::ConfirmOnSecondPoll).await;
    let wallet = KeypairWallet::new(Keypair::new());

    let signature = pipeline(addr)
        .sign_and_submit_with(&wallet, "Prismon:transfer:Dest")
        .await
        .unwrap();

    let submitted = node.submitted.lock().unwrap();
    assert_eq!(submitted.len(), 1);
    let (tx, config) = &submitted[0];
    assert_eq!(signature, tx.signatures[0].to_string());
    assert!(tx.verify().is_ok());
    assert_eq!(tx.message.recent_blockhash, node.blockhash);
    assert_eq!(tx.message.account_keys[0], wallet.pubkey());
    assert!(tx.message.account_keys.contains(&MEMO_PROGRAM_ID));
    assert_eq!(tx.message.instructions[0].data, b"Prismon:transfer:Dest");

    assert_eq!(config["encoding"], "base64");
    assert_eq!(config["skipPreflight"], false);
    assert_eq!(config["preflightCommitment"], "confirmed");
    assert_eq!(node.polls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn execution_error_fails_confirmation() {
    let (addr, node) = spawn_node(Mode::ExecutionError).await;
    let wallet = KeypairWallet::new(Keypair::new());

    let err = pipeline(addr)
        .sign_and_submit_with(&wallet, "Prismon:mint:M")
        .await
        .unwrap_err();

    match err {
        SigningError::ConfirmationFailed(reason) => {
            assert!(reason.contains("invalid instruction data"), "{reason}")
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(node.submitted.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn expired_blockhash_is_surfaced_not_retried() {
    let (addr, node) = spawn_node(Mode::NeverLands).await;
    let wallet = KeypairWallet::new(Keypair::new());

    let err = pipeline(addr)
        .sign_and_submit_with(&wallet, "Prismon:swap:unknown")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SigningError::Confirmation(RpcError::BlockhashExpired {
            last_valid_block_height: 100,
            ..
        })
    ));
    assert_eq!(node.submitted.lock().unwrap().len(), 1);
}
