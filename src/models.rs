// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies exchanged with the Prismon backend. The
//! backend speaks camelCase JSON; price updates are passed through in the
//! snake_case shape Hermes emits.
//!
//! ## Model Categories
//!
//! - **Solana**: trading, token and blob operations
//! - **Users**: email and wallet sign-up / login
//! - **Pyth**: price feed discovery, latest prices and streaming
//! - **AI**: model registration and invocation
//! - **SOAR**: on-chain game players, leaderboards and achievements

use serde::{Deserialize, Serialize, Serializer};

// =============================================================================
// Intent Proofs
// =============================================================================

/// A request body with the caller's intent proof appended as `signature`.
///
/// Serialises as the flattened request plus one extra field, matching what
/// the backend verifies.
#[derive(Debug, Clone, Serialize)]
pub struct Signed<'a, T> {
    #[serde(flatten)]
    pub request: &'a T,
    pub signature: String,
}

impl<'a, T> Signed<'a, T> {
    pub fn new(request: &'a T, signature: String) -> Self {
        Self { request, signature }
    }
}

/// Response carrying the id of a backend-side transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionIdResponse {
    pub transaction_id: String,
}

// =============================================================================
// Solana
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_token_mint: Option<String>,
    pub to_token_mint: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTokenRequest {
    pub decimals: u8,
    pub name: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTokenResponse {
    pub token_mint: String,
}

/// Raydium order direction, sent as `0` (buy) or `1` (sell).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl Serialize for OrderSide {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(match self {
            OrderSide::Buy => 0,
            OrderSide::Sell => 1,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RaydiumSwapRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool_address: Option<String>,
    pub amount_in_lamports: u64,
    pub minimum_amount_out: u64,
    pub order_side: OrderSide,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PumpfunBuyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_mint: Option<String>,
    pub amount: f64,
    pub slippage_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PumpfunSellRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_mint: Option<String>,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OreOpenProofRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OreMineClaimRequest {
    pub amount_to_claim: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub to_public_key: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MintRequest {
    pub mint: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BalanceResponse {
    pub balance: f64,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWalletResponse {
    pub public_key: String,
    pub secret_key: String,
}

impl std::fmt::Debug for CreateWalletResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateWalletResponse")
            .field("public_key", &self.public_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Storage options for a blob. Unset fields take the backend defaults
/// (`epochs = 1`, `deletable = false`).
#[derive(Debug, Clone, Default)]
pub struct StoreBlobOptions {
    pub epochs: Option<u32>,
    /// Sui address that should own the stored object.
    pub send_object_to: Option<String>,
    pub deletable: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoreBlobBody<'a> {
    pub data: &'a str,
    pub file_name: &'a str,
    pub options: StoreBlobBodyOptions<'a>,
    pub transaction_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoreBlobBodyOptions<'a> {
    pub epochs: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_object_to: Option<&'a str>,
    pub deletable: bool,
}

impl<'a> From<&'a StoreBlobOptions> for StoreBlobBodyOptions<'a> {
    fn from(options: &'a StoreBlobOptions) -> Self {
        Self {
            epochs: options.epochs.unwrap_or(1),
            send_object_to: options.send_object_to.as_deref(),
            deletable: options.deletable.unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreBlobResponse {
    pub blob_id: String,
    #[serde(default)]
    pub cluster: Option<String>,
}

/// Query options forwarded to blob retrieval. The backend echoes them back
/// as response headers.
#[derive(Debug, Clone, Default)]
pub struct RetrieveBlobOptions {
    pub content_disposition: Option<String>,
    pub content_type: Option<String>,
}

/// A retrieved blob and what its response headers said about it.
#[derive(Debug, Clone, PartialEq)]
pub struct BlobContent {
    pub content: Vec<u8>,
    /// True when the response carried a `Content-Disposition` header.
    pub is_file: bool,
    pub file_name: Option<String>,
    pub content_type: String,
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    pub challenge: String,
    pub challenge_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdResponse {
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectWalletResponse {
    #[serde(default)]
    pub wallet_public_key: Option<String>,
    pub user_id: String,
}

#[derive(Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginWalletResponse {
    pub succeeded: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub token: String,
}

impl std::fmt::Debug for LoginWalletResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginWalletResponse")
            .field("succeeded", &self.succeeded)
            .field("message", &self.message)
            .field("user_id", &self.user_id)
            .field("has_token", &!self.token.is_empty())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedInWallet {
    pub wallet_address: String,
}

// =============================================================================
// Pyth
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct PriceFeedRequest {
    /// Free-text symbol search, e.g. `"BTC"`.
    pub query: Option<String>,
    /// Asset class filter, e.g. `"crypto"`.
    pub asset_type: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LatestPriceRequest {
    pub price_feed_ids: Vec<String>,
    pub ignore_invalid_price_ids: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceFeedAttributes {
    pub asset_type: String,
    pub base: String,
    pub description: String,
    pub display_symbol: String,
    pub generic_symbol: String,
    pub quote_currency: String,
    pub schedule: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceFeedInfo {
    pub id: String,
    pub attributes: PriceFeedAttributes,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PriceFeedsResponse {
    pub feeds: Vec<PriceFeedInfo>,
}

/// Price with confidence interval; `price × 10^expo` is the real value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub conf: String,
    pub expo: i32,
    pub price: String,
    pub publish_time: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceMetadata {
    pub prev_publish_time: i64,
    pub proof_available_time: i64,
    pub slot: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceUpdate {
    pub id: String,
    pub price: Price,
    pub ema_price: Price,
    pub metadata: PriceMetadata,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LatestPricesResponse {
    pub prices: Vec<PriceUpdate>,
}

/// Options for a price stream subscription.
#[derive(Debug, Clone)]
pub struct StreamPriceOptions {
    pub price_feed_ids: Vec<String>,
    pub encoding: String,
    pub parsed: bool,
    pub allow_unordered: bool,
    pub benchmarks_only: bool,
    pub ignore_invalid_price_ids: bool,
}

impl StreamPriceOptions {
    pub fn new<I, S>(price_feed_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            price_feed_ids: price_feed_ids.into_iter().map(Into::into).collect(),
            encoding: "hex".to_string(),
            parsed: true,
            allow_unordered: false,
            benchmarks_only: false,
            ignore_invalid_price_ids: true,
        }
    }
}

/// Body of the server-side stream start call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StreamPriceRequest<'a> {
    pub price_feed_ids: &'a [String],
    pub encoding: &'a str,
    pub parsed: bool,
    pub allow_unordered: bool,
    pub benchmarks_only: bool,
    pub ignore_invalid_price_ids: bool,
}

impl<'a> From<&'a StreamPriceOptions> for StreamPriceRequest<'a> {
    fn from(options: &'a StreamPriceOptions) -> Self {
        Self {
            price_feed_ids: &options.price_feed_ids,
            encoding: &options.encoding,
            parsed: options.parsed,
            allow_unordered: options.allow_unordered,
            benchmarks_only: options.benchmarks_only,
            ignore_invalid_price_ids: options.ignore_invalid_price_ids,
        }
    }
}

// =============================================================================
// AI
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelInputType {
    Text,
    Image,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelOutputType {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelType {
    #[serde(rename = "LocalML")]
    LocalMl,
    #[serde(rename = "ExternalAPI")]
    ExternalApi,
    #[serde(rename = "MCP")]
    Mcp,
}

#[derive(Debug, Clone)]
pub struct AiInvokeParams {
    pub user_id: String,
    pub model_id: String,
    pub input_type: ModelInputType,
    pub input_data: String,
}

/// Body of `/devApi/AI/invoke`. The API key travels in the body as well as
/// the header.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AiInvokeBody<'a> {
    pub user_id: &'a str,
    pub api_key: &'a str,
    pub model_id: &'a str,
    pub input_type: ModelInputType,
    pub input_data: &'a str,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AiInvokeResponse {
    pub succeeded: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub output: String,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiModelConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub model_type: ModelType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_api_key: Option<String>,
    pub input_type: ModelInputType,
    pub output_type: ModelOutputType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

impl std::fmt::Debug for AiModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiModelConfig")
            .field("name", &self.name)
            .field("model_type", &self.model_type)
            .field("external_api_url", &self.external_api_url)
            .field("input_type", &self.input_type)
            .field("output_type", &self.output_type)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

// =============================================================================
// SOAR (on-chain game state)
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRequest {
    pub user_public_key: String,
    pub username: String,
    pub nft_meta: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRequest {
    pub game_public_key: String,
    pub description: String,
    pub nft_meta: String,
    pub scores_to_retain: u32,
    pub is_ascending: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    pub player_public_key: String,
    pub game_public_key: String,
    pub leaderboard_public_key: String,
    pub score: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementRequest {
    pub game_public_key: String,
    pub title: String,
    pub description: String,
    pub nft_meta: String,
}

/// Claim against a leaderboard or an achievement.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    pub player_public_key: String,
    pub game_public_key: String,
    /// Leaderboard or achievement account.
    pub target_public_key: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn signed_body_flattens_request() {
        let request = SwapRequest {
            from_token_mint: None,
            to_token_mint: "USDC".into(),
            amount: 1.5,
        };
        let body = serde_json::to_value(Signed::new(&request, "sig".into())).unwrap();
        assert_eq!(
            body,
            json!({ "toTokenMint": "USDC", "amount": 1.5, "signature": "sig" })
        );
    }

    #[test]
    fn order_side_is_numeric() {
        let request = RaydiumSwapRequest {
            pool_address: Some("pool".into()),
            amount_in_lamports: 1_000,
            minimum_amount_out: 900,
            order_side: OrderSide::Sell,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["orderSide"], json!(1));
        assert_eq!(body["amountInLamports"], json!(1_000));
    }

    #[test]
    fn store_blob_options_apply_defaults() {
        let options = StoreBlobOptions::default();
        let body = serde_json::to_value(StoreBlobBodyOptions::from(&options)).unwrap();
        assert_eq!(body, json!({ "epochs": 1, "deletable": false }));
    }

    #[test]
    fn model_config_uses_wire_names() {
        let config = AiModelConfig {
            name: "sentiment".into(),
            model_type: ModelType::ExternalApi,
            file_path: None,
            external_api_url: Some("https://models.example".into()),
            external_api_key: Some("k".into()),
            input_type: ModelInputType::Text,
            output_type: ModelOutputType::Json,
            model_name: None,
        };
        let body = serde_json::to_value(&config).unwrap();
        assert_eq!(body["type"], json!("ExternalAPI"));
        assert_eq!(body["inputType"], json!("Text"));
        assert!(body.get("filePath").is_none());
        assert!(!format!("{config:?}").contains("\"k\""));
    }

    #[test]
    fn price_update_parses_hermes_shape() {
        let update: PriceUpdate = serde_json::from_value(json!({
            "id": "e62df6c8b4a85fe1a67db44dc12de5db330f7ac66b72dc658afedf0f4a415b43",
            "price": { "price": "6132512000000", "conf": "3254000000", "expo": -8, "publish_time": 1718000000 },
            "ema_price": { "price": "6130000000000", "conf": "3100000000", "expo": -8, "publish_time": 1718000000 },
            "metadata": { "slot": 85480034, "proof_available_time": 1718000001, "prev_publish_time": 1717999999 }
        }))
        .unwrap();
        assert_eq!(update.price.expo, -8);
        assert_eq!(update.metadata.slot, 85_480_034);
    }
}
