// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Solana RPC client for blockhash reads, submission and confirmation.

use std::time::Duration;

use async_trait::async_trait;
use solana_rpc_client::nonblocking::rpc_client::RpcClient;
use solana_rpc_client_api::client_error::{Error as ClientError, ErrorKind};
use solana_rpc_client_api::config::RpcSendTransactionConfig;
use solana_rpc_client_api::request::RpcError as RpcRequestError;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::{signature::Signature, transaction::Transaction};
use solana_transaction_status_client_types::UiTransactionEncoding;

use super::types::*;

/// Default delay between signature status polls.
const DEFAULT_CONFIRM_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Network operations used by the transaction signing pipeline.
#[async_trait]
pub trait SolanaRpc: Send + Sync {
    /// Fetch the latest blockhash at `confirmed` commitment.
    async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, RpcError>;

    /// Submit a signed transaction with preflight simulation enabled.
    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature, RpcError>;

    /// Wait until `signature` reaches `confirmed` commitment, reports an
    /// execution error, or `anchor` expires.
    async fn confirm_transaction(
        &self,
        signature: &Signature,
        anchor: &LatestBlockhash,
    ) -> Result<ConfirmationOutcome, RpcError>;
}

/// Solana client backed by the nonblocking `RpcClient`.
pub struct SolanaRpcClient {
    /// Endpoint URL, kept for display
    rpc_url: String,
    /// Solana JSON-RPC client at `confirmed` commitment
    client: RpcClient,
    poll_interval: Duration,
}

impl std::fmt::Debug for SolanaRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaRpcClient")
            .field("rpc_url", &self.rpc_url)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl SolanaRpcClient {
    /// Create a new client for the given RPC endpoint.
    pub fn new(rpc_url: impl Into<String>) -> Result<Self, RpcError> {
        let rpc_url = rpc_url.into();
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| RpcError::InvalidRpcUrl(e.to_string()))?;

        let client = RpcClient::new_with_commitment(url.to_string(), commitment());

        Ok(Self {
            rpc_url,
            client,
            poll_interval: DEFAULT_CONFIRM_POLL_INTERVAL,
        })
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Current block height at `confirmed` commitment.
    pub async fn get_block_height(&self) -> Result<u64, RpcError> {
        self.client
            .get_block_height_with_commitment(commitment())
            .await
            .map_err(|e| map_client_error("getBlockHeight", e))
    }
}

fn commitment() -> CommitmentConfig {
    CommitmentConfig {
        commitment: COMMITMENT,
    }
}

fn map_client_error(method: &str, err: ClientError) -> RpcError {
    match err.kind() {
        ErrorKind::RpcError(RpcRequestError::RpcResponseError { code, message, .. }) => {
            RpcError::Rpc {
                code: *code,
                message: message.clone(),
            }
        }
        ErrorKind::RpcError(RpcRequestError::ParseError(what)) => {
            RpcError::InvalidResponse(format!("{method}: could not parse {what}"))
        }
        ErrorKind::SerdeJson(e) => RpcError::InvalidResponse(format!("{method}: {e}")),
        _ => RpcError::Transport(format!("{method} failed: {err}")),
    }
}

#[async_trait]
impl SolanaRpc for SolanaRpcClient {
    async fn get_latest_blockhash(&self) -> Result<LatestBlockhash, RpcError> {
        let (blockhash, last_valid_block_height) = self
            .client
            .get_latest_blockhash_with_commitment(commitment())
            .await
            .map_err(|e| map_client_error("getLatestBlockhash", e))?;

        Ok(LatestBlockhash {
            blockhash,
            last_valid_block_height,
        })
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature, RpcError> {
        let config = RpcSendTransactionConfig {
            skip_preflight: false,
            preflight_commitment: Some(COMMITMENT),
            encoding: Some(UiTransactionEncoding::Base64),
            ..RpcSendTransactionConfig::default()
        };

        self.client
            .send_transaction_with_config(transaction, config)
            .await
            .map_err(|e| map_client_error("sendTransaction", e))
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
        anchor: &LatestBlockhash,
    ) -> Result<ConfirmationOutcome, RpcError> {
        loop {
            let statuses = self
                .client
                .get_signature_statuses(&[*signature])
                .await
                .map_err(|e| map_client_error("getSignatureStatuses", e))?;

            if let Some(status) = statuses.value.into_iter().next().flatten() {
                if let Some(err) = &status.err {
                    return Ok(ConfirmationOutcome::Failed(err.to_string()));
                }
                if status.satisfies_commitment(commitment()) {
                    return Ok(ConfirmationOutcome::Confirmed { slot: status.slot });
                }
            }

            let height = self.get_block_height().await?;
            if height > anchor.last_valid_block_height {
                return Err(RpcError::BlockhashExpired {
                    signature: signature.to_string(),
                    last_valid_block_height: anchor.last_valid_block_height,
                });
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

/// Errors that can occur during Solana RPC operations.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("RPC transport error: {0}")]
    Transport(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),

    #[error("Blockhash expired before {signature} was confirmed (last valid block height {last_valid_block_height})")]
    BlockhashExpired {
        signature: String,
        last_valid_block_height: u64,
    },
}
