// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Solana trading, token and blob operations.
//!
//! Every state-changing call proves user intent first: most with an
//! on-chain memo transaction, Raydium swaps and Pump.fun buys with an
//! off-chain signed message. The proof travels as `signature` in the body
//! (`transactionId` for blob storage).

use std::path::{Path, PathBuf};

use reqwest::header::{ACCEPT, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use tracing::{debug, info};

use super::blob::{file_name_from_content_disposition, safe_file_name};
use super::{get_json, path_segment, send_json, with_query};
use crate::blockchain::{intent_tag, sign_message_with, WalletAdapter};
use crate::error::{ApiResponse, ClientError};
use crate::http::{RequestDescriptor, ResponseEncoding};
use crate::models::*;
use crate::state::SdkContext;

const UNKNOWN: &str = "unknown";

#[derive(Clone, Debug)]
pub struct SolanaClient {
    ctx: SdkContext,
}

impl SolanaClient {
    pub fn new(ctx: SdkContext) -> Self {
        Self { ctx }
    }

    pub async fn swap(
        &self,
        request: &SwapRequest,
        wallet: &dyn WalletAdapter,
    ) -> Result<ApiResponse<TransactionIdResponse>, ClientError> {
        let subject = request.from_token_mint.as_deref().unwrap_or(UNKNOWN);
        let proof = self.prove_transaction(wallet, intent_tag("swap", subject)).await?;
        self.post_signed("/devApi/Solana/swap", request, proof, "solana:swap")
            .await
    }

    pub async fn create_token(
        &self,
        request: &CreateTokenRequest,
        wallet: &dyn WalletAdapter,
    ) -> Result<ApiResponse<CreateTokenResponse>, ClientError> {
        let proof = self
            .prove_transaction(wallet, intent_tag("token-create", request.decimals))
            .await?;
        self.post_signed("/devApi/Solana/token/create", request, proof, "solana:createToken")
            .await
    }

    pub async fn pumpfun_sell(
        &self,
        request: &PumpfunSellRequest,
        wallet: &dyn WalletAdapter,
    ) -> Result<ApiResponse<TransactionIdResponse>, ClientError> {
        let subject = request.token_mint.as_deref().unwrap_or(UNKNOWN);
        let proof = self
            .prove_transaction(wallet, intent_tag("pumpfun-sell", subject))
            .await?;
        self.post_signed("/devApi/Solana/pumpfun/sell", request, proof, "solana:pumpfunSell")
            .await
    }

    pub async fn ore_open_proof(
        &self,
        request: &OreOpenProofRequest,
        wallet: &dyn WalletAdapter,
    ) -> Result<ApiResponse<TransactionIdResponse>, ClientError> {
        let subject = request.proof_id.as_deref().unwrap_or(UNKNOWN);
        let proof = self
            .prove_transaction(wallet, intent_tag("ore-open-proof", subject))
            .await?;
        self.post_signed("/devApi/Solana/ore/open-proof", request, proof, "solana:oreOpenProof")
            .await
    }

    pub async fn ore_mine_claim(
        &self,
        request: &OreMineClaimRequest,
        wallet: &dyn WalletAdapter,
    ) -> Result<ApiResponse<TransactionIdResponse>, ClientError> {
        let proof = self
            .prove_transaction(wallet, intent_tag("ore-mine-claim", request.amount_to_claim))
            .await?;
        self.post_signed("/devApi/Solana/ore/mine-claim", request, proof, "solana:oreMineClaim")
            .await
    }

    pub async fn transfer(
        &self,
        request: &TransferRequest,
        wallet: &dyn WalletAdapter,
    ) -> Result<ApiResponse<TransactionIdResponse>, ClientError> {
        let proof = self
            .prove_transaction(wallet, intent_tag("transfer", &request.to_public_key))
            .await?;
        self.post_signed("/devApi/Solana/transfer", request, proof, "solana:transfer")
            .await
    }

    pub async fn mint(
        &self,
        request: &MintRequest,
        wallet: &dyn WalletAdapter,
    ) -> Result<ApiResponse<TransactionIdResponse>, ClientError> {
        let proof = self
            .prove_transaction(wallet, intent_tag("mint", &request.mint))
            .await?;
        self.post_signed("/devApi/Solana/mint", request, proof, "solana:mint")
            .await
    }

    /// Pump.fun buy, proven with a signed message instead of a transaction.
    pub async fn pumpfun_buy(
        &self,
        request: &PumpfunBuyRequest,
        wallet: &dyn WalletAdapter,
    ) -> Result<ApiResponse<TransactionIdResponse>, ClientError> {
        let subject = request.token_mint.as_deref().unwrap_or(UNKNOWN);
        let proof = sign_message_with(wallet, &intent_tag("pumpfun-buy", subject)).await?;
        self.post_signed("/devApi/Solana/pumpfun/buy", request, proof, "solana:pumpfunBuy")
            .await
    }

    /// Raydium swap, proven with a signed message instead of a transaction.
    pub async fn raydium_swap(
        &self,
        request: &RaydiumSwapRequest,
        wallet: &dyn WalletAdapter,
    ) -> Result<ApiResponse<TransactionIdResponse>, ClientError> {
        let subject = request.pool_address.as_deref().unwrap_or(UNKNOWN);
        let proof = sign_message_with(wallet, &intent_tag("raydium-swap", subject)).await?;
        self.post_signed("/devApi/Solana/raydium/swap", request, proof, "solana:raydiumSwap")
            .await
    }

    pub async fn get_balance(&self, public_key: &str) -> ApiResponse<BalanceResponse> {
        let path = with_query("/devApi/Solana/balance", [("walletPublicKey", public_key)]);
        get_json(&self.ctx.executor, path, "solana:getBalance").await
    }

    /// Ask the backend to generate a custodial wallet.
    pub async fn create_wallet(&self) -> ApiResponse<CreateWalletResponse> {
        send_json(
            &self.ctx.executor,
            Method::POST,
            "/devApi/Solana/create-wallet".to_string(),
            Some(&json!({})),
            "solana:createWallet",
        )
        .await
    }

    /// Store `data` as a blob, proving intent with a memo transaction whose
    /// id is sent as `transactionId`.
    pub async fn store_blob(
        &self,
        data: &str,
        file_name: &str,
        options: &StoreBlobOptions,
        wallet: &dyn WalletAdapter,
    ) -> Result<ApiResponse<StoreBlobResponse>, ClientError> {
        let transaction_id = self
            .prove_transaction(wallet, intent_tag("store", file_name))
            .await?;

        let body = StoreBlobBody {
            data,
            file_name,
            options: options.into(),
            transaction_id,
        };
        let response: ApiResponse<StoreBlobResponse> = send_json(
            &self.ctx.executor,
            Method::POST,
            "/devApi/Solana/blob/store".to_string(),
            Some(&body),
            "solana:storeBlob",
        )
        .await;

        if let Some(stored) = &response.data {
            info!(blob_id = %stored.blob_id, file_name, "Blob stored");
        }
        Ok(response)
    }

    /// Fetch a blob's raw bytes.
    ///
    /// Failures of any kind, including a missing wallet capability, come
    /// back as `ApiResponse::failure`.
    pub async fn retrieve_blob(
        &self,
        blob_id: &str,
        wallet: &dyn WalletAdapter,
        options: &RetrieveBlobOptions,
    ) -> ApiResponse<BlobContent> {
        let transaction_id = match self
            .prove_transaction(wallet, intent_tag("retrieve", blob_id))
            .await
        {
            Ok(id) => id,
            Err(e) => return ApiResponse::failure(e.to_string()),
        };

        let mut query = vec![("transactionId", transaction_id.as_str())];
        if let Some(disposition) = options.content_disposition.as_deref() {
            query.push(("contentDisposition", disposition));
        }
        if let Some(content_type) = options.content_type.as_deref() {
            query.push(("contentType", content_type));
        }
        let path = with_query(
            &format!("/devApi/Solana/blob/retrieve/{}", path_segment(blob_id)),
            query,
        );

        let descriptor = RequestDescriptor::get(path)
            .header(ACCEPT.as_str(), "*/*")
            .encoding(ResponseEncoding::Binary)
            .operation_key("solana:retrieveBlob");
        let response = self.ctx.executor.execute(&descriptor).await;
        if !response.success {
            return ApiResponse::failure(
                response
                    .error
                    .unwrap_or_else(|| "Failed to retrieve blob".to_string()),
            );
        }

        let disposition = response.header(CONTENT_DISPOSITION.as_str()).map(str::to_string);
        let content_type = response
            .header(CONTENT_TYPE.as_str())
            .unwrap_or("application/octet-stream")
            .to_string();
        debug!(blob_id, is_file = disposition.is_some(), content_type = %content_type, "Blob retrieved");

        response.map(|data| BlobContent {
            content: data.into_bytes(),
            is_file: disposition.is_some(),
            file_name: disposition
                .as_deref()
                .and_then(file_name_from_content_disposition),
            content_type,
        })
    }

    /// Retrieve a blob and decode it as UTF-8 text.
    pub async fn get_blob_as_text(
        &self,
        blob_id: &str,
        wallet: &dyn WalletAdapter,
        options: &RetrieveBlobOptions,
    ) -> ApiResponse<String> {
        let response = self.retrieve_blob(blob_id, wallet, options).await;
        match response.data {
            Some(blob) if response.success => match String::from_utf8(blob.content) {
                Ok(text) => ApiResponse {
                    success: true,
                    data: Some(text),
                    error: None,
                    status_code: response.status_code,
                    headers: response.headers,
                },
                Err(e) => ApiResponse::failure(format!("Blob is not valid UTF-8 text: {e}")),
            },
            _ => ApiResponse::failure(
                response
                    .error
                    .unwrap_or_else(|| "Failed to retrieve blob".to_string()),
            ),
        }
    }

    /// Retrieve a blob as an attachment and write it into `dir`.
    ///
    /// The file is named after the response's `Content-Disposition`, then
    /// `file_name`, then `download`. Returns the written path.
    pub async fn download_blob(
        &self,
        blob_id: &str,
        wallet: &dyn WalletAdapter,
        dir: &Path,
        file_name: Option<&str>,
    ) -> Result<PathBuf, ClientError> {
        let disposition = match file_name {
            Some(name) => format!("attachment; filename=\"{name}\""),
            None => "attachment".to_string(),
        };
        let options = RetrieveBlobOptions {
            content_disposition: Some(disposition),
            content_type: None,
        };

        let blob = self
            .retrieve_blob(blob_id, wallet, &options)
            .await
            .into_result()?;

        let name = blob
            .file_name
            .as_deref()
            .and_then(safe_file_name)
            .or_else(|| file_name.and_then(safe_file_name))
            .unwrap_or_else(|| "download".to_string());
        let path = dir.join(name);
        tokio::fs::write(&path, &blob.content).await?;

        info!(blob_id, path = %path.display(), bytes = blob.content.len(), "Blob downloaded");
        Ok(path)
    }

    async fn prove_transaction(
        &self,
        wallet: &dyn WalletAdapter,
        tag: String,
    ) -> Result<String, ClientError> {
        Ok(self.ctx.transactions.sign_and_submit_with(wallet, &tag).await?)
    }

    async fn post_signed<T, R>(
        &self,
        path: &str,
        request: &T,
        signature: String,
        operation_key: &str,
    ) -> Result<ApiResponse<R>, ClientError>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let body = Signed::new(request, signature);
        Ok(send_json(
            &self.ctx.executor,
            Method::POST,
            path.to_string(),
            Some(&body),
            operation_key,
        )
        .await)
    }
}
