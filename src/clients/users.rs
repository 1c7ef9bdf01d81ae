// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account sign-up and login, by email or by wallet signature.
//!
//! A successful login stores the returned token on the shared executor, so
//! every client built from the same context is authenticated from then on.

use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use super::{get_json, send_json, with_query};
use crate::blockchain::{sign_message, WalletAdapter};
use crate::error::ApiResponse;
use crate::models::*;
use crate::state::SdkContext;

const SIGN_MESSAGE_UNAVAILABLE: &str = "Wallet not connected or signMessage not supported";

/// Email login payload. Either field may be absent depending on whether the
/// account is verified.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailLoginResponse {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Clone, Debug)]
pub struct UsersClient {
    ctx: SdkContext,
}

impl UsersClient {
    pub fn new(ctx: SdkContext) -> Self {
        Self { ctx }
    }

    /// Login challenge the wallet must sign.
    pub async fn get_challenge(&self, public_key: &str) -> ApiResponse<ChallengeResponse> {
        let path = with_query("/devApi/Users/challenge", [("walletPublicKey", public_key)]);
        get_json(&self.ctx.executor, path, "users:getChallenge").await
    }

    pub async fn sign_up_with_email(
        &self,
        email: &str,
        password: &str,
    ) -> ApiResponse<UserIdResponse> {
        send_json(
            &self.ctx.executor,
            Method::POST,
            "/devApi/Users/signup-email".to_string(),
            Some(&json!({ "email": email, "password": password })),
            "users:signUpWithEmail",
        )
        .await
    }

    pub async fn verify_email(
        &self,
        email: &str,
        verification_code: &str,
    ) -> ApiResponse<UserIdResponse> {
        send_json(
            &self.ctx.executor,
            Method::POST,
            "/devApi/Users/verify-email".to_string(),
            Some(&json!({ "email": email, "verificationCode": verification_code })),
            "users:verifyEmail",
        )
        .await
    }

    /// Log in with email and password; a returned token becomes the bearer
    /// credential for all later calls.
    pub async fn login_with_email(
        &self,
        email: &str,
        password: &str,
    ) -> ApiResponse<EmailLoginResponse> {
        let response: ApiResponse<EmailLoginResponse> = send_json(
            &self.ctx.executor,
            Method::POST,
            "/devApi/Users/login-email".to_string(),
            Some(&json!({ "email": email, "password": password })),
            "users:loginWithEmail",
        )
        .await;

        if let Some(token) = response.data.as_ref().and_then(|d| d.token.as_deref()) {
            if !token.is_empty() {
                self.ctx.executor.set_auth_token(token);
                info!("Logged in with email");
            }
        }
        response
    }

    /// Register the connected wallet with this app by signing
    /// `Prismon:signup:<app id>:<public key>`.
    pub async fn sign_up_wallet(
        &self,
        wallet: &dyn WalletAdapter,
    ) -> ApiResponse<ConnectWalletResponse> {
        let (Some(public_key), Some(signer)) = (wallet.public_key(), wallet.message_signer())
        else {
            return ApiResponse::failure(SIGN_MESSAGE_UNAVAILABLE);
        };

        let wallet_public_key = public_key.to_string();
        let message = format!(
            "Prismon:signup:{}:{}",
            self.ctx.config.app_id.to_lowercase(),
            wallet_public_key
        );
        let signature = match sign_message(Some(&public_key), Some(signer), &message).await {
            Ok(signature) => signature,
            Err(e) => return ApiResponse::failure(format!("Failed to sign up wallet: {e}")),
        };

        let response: ApiResponse<ConnectWalletResponse> = send_json(
            &self.ctx.executor,
            Method::POST,
            "/devApi/Users/connect-wallet".to_string(),
            Some(&json!({
                "walletPublicKey": wallet_public_key,
                "signature": signature,
            })),
            "users:connectUserWallet",
        )
        .await;

        if let Some(connected) = &response.data {
            info!(user_id = %connected.user_id, wallet = %wallet_public_key, "Wallet signed up");
        }
        response
    }

    /// Challenge-response login. On success the returned token is attached
    /// to every subsequent request.
    pub async fn login_wallet(&self, wallet: &dyn WalletAdapter) -> ApiResponse<LoginWalletResponse> {
        let (Some(public_key), Some(signer)) = (wallet.public_key(), wallet.message_signer())
        else {
            return ApiResponse::failure(SIGN_MESSAGE_UNAVAILABLE);
        };
        let wallet_public_key = public_key.to_string();

        let challenge = match self.get_challenge(&wallet_public_key).await {
            ApiResponse {
                success: true,
                data: Some(challenge),
                ..
            } => challenge,
            failed => {
                let reason = failed.error.unwrap_or_else(|| "Unknown error".to_string());
                return ApiResponse::failure(format!("Failed to get challenge: {reason}"));
            }
        };

        let signature =
            match sign_message(Some(&public_key), Some(signer), &challenge.challenge).await {
                Ok(signature) => signature,
                Err(e) => {
                    warn!(wallet = %wallet_public_key, error = %e, "Challenge signing failed");
                    return ApiResponse::failure(format!("Failed to sign message: {e}"));
                }
            };

        let response: ApiResponse<LoginWalletResponse> = send_json(
            &self.ctx.executor,
            Method::POST,
            "/devApi/Users/login-wallet".to_string(),
            Some(&json!({
                "walletPublicKey": wallet_public_key,
                "signature": signature,
                "challengeId": challenge.challenge_id,
                "appId": self.ctx.config.app_id,
            })),
            "users:loginWallet",
        )
        .await;

        if let Some(login) = response.data.as_ref().filter(|l| !l.token.is_empty()) {
            self.ctx.executor.set_auth_token(login.token.clone());
            info!(user_id = %login.user_id, wallet = %wallet_public_key, "Wallet logged in");
        }
        response
    }

    /// Wallet the backend associates with the current token.
    pub async fn get_signed_in_wallet(&self) -> ApiResponse<SignedInWallet> {
        get_json(
            &self.ctx.executor,
            "/devApi/Solana/debug/wallet".to_string(),
            "users:getWallet",
        )
        .await
    }

    pub fn set_auth_token(&self, token: impl Into<String>) {
        self.ctx.executor.set_auth_token(token);
    }
}
