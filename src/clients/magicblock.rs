// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! SOAR game state: players, leaderboards, scores and achievements.
//!
//! Writes are proven with a memo transaction tagged
//! `Prismon:soar:<action>:<subject>` and scoped to a SOAR `programId`.

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::{get_json, send_json, with_query};
use crate::blockchain::{intent_tag, WalletAdapter};
use crate::error::{ApiResponse, ClientError};
use crate::models::*;
use crate::state::SdkContext;

#[derive(Clone, Debug)]
pub struct MagicBlockClient {
    ctx: SdkContext,
}

impl MagicBlockClient {
    pub fn new(ctx: SdkContext) -> Self {
        Self { ctx }
    }

    pub async fn register_player(
        &self,
        request: &PlayerRequest,
        wallet: &dyn WalletAdapter,
        program_id: &str,
    ) -> Result<ApiResponse<TransactionIdResponse>, ClientError> {
        self.signed_write(
            "register-player",
            &request.username,
            "player",
            request,
            wallet,
            program_id,
            "soar:registerPlayer",
        )
        .await
    }

    /// Player account as stored on chain. The shape is program-defined, so
    /// it is returned as raw JSON.
    pub async fn get_player(&self, player_public_key: &str, program_id: &str) -> ApiResponse<Value> {
        let path = with_query(
            "/devApi/Solana/soar/player",
            [("playerPublicKey", player_public_key), ("programId", program_id)],
        );
        get_json(&self.ctx.executor, path, "soar:getPlayer").await
    }

    pub async fn create_leaderboard(
        &self,
        request: &LeaderboardRequest,
        wallet: &dyn WalletAdapter,
        program_id: &str,
    ) -> Result<ApiResponse<TransactionIdResponse>, ClientError> {
        self.signed_write(
            "create-leaderboard",
            &request.game_public_key,
            "leaderboard",
            request,
            wallet,
            program_id,
            "soar:createLeaderboard",
        )
        .await
    }

    pub async fn submit_score(
        &self,
        request: &ScoreRequest,
        wallet: &dyn WalletAdapter,
        program_id: &str,
    ) -> Result<ApiResponse<TransactionIdResponse>, ClientError> {
        self.signed_write(
            "submit-score",
            &request.leaderboard_public_key,
            "score",
            request,
            wallet,
            program_id,
            "soar:submitScore",
        )
        .await
    }

    pub async fn create_achievement(
        &self,
        request: &AchievementRequest,
        wallet: &dyn WalletAdapter,
        program_id: &str,
    ) -> Result<ApiResponse<TransactionIdResponse>, ClientError> {
        self.signed_write(
            "create-achievement",
            &request.title,
            "achievement",
            request,
            wallet,
            program_id,
            "soar:createAchievement",
        )
        .await
    }

    pub async fn claim_achievement(
        &self,
        request: &ClaimRequest,
        wallet: &dyn WalletAdapter,
        program_id: &str,
    ) -> Result<ApiResponse<TransactionIdResponse>, ClientError> {
        self.signed_write(
            "claim-achievement",
            &request.target_public_key,
            "claim-achievement",
            request,
            wallet,
            program_id,
            "soar:claimAchievement",
        )
        .await
    }

    pub async fn claim_reward(
        &self,
        request: &ClaimRequest,
        wallet: &dyn WalletAdapter,
        program_id: &str,
    ) -> Result<ApiResponse<TransactionIdResponse>, ClientError> {
        self.signed_write(
            "claim-reward",
            &request.target_public_key,
            "claim-reward",
            request,
            wallet,
            program_id,
            "soar:claimReward",
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn signed_write<T: Serialize>(
        &self,
        action: &str,
        subject: &str,
        resource: &str,
        request: &T,
        wallet: &dyn WalletAdapter,
        program_id: &str,
        operation_key: &str,
    ) -> Result<ApiResponse<TransactionIdResponse>, ClientError> {
        let tag = intent_tag(&format!("soar:{action}"), subject);
        let signature = self
            .ctx
            .transactions
            .sign_and_submit_with(wallet, &tag)
            .await?;

        let path = with_query(
            &format!("/devApi/Solana/soar/{resource}"),
            [("programId", program_id)],
        );
        Ok(send_json(
            &self.ctx.executor,
            Method::POST,
            path,
            Some(&Signed::new(request, signature)),
            operation_key,
        )
        .await)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use solana_sdk::signature::Keypair;

    use super::*;
    use crate::blockchain::transactions::tests::MockRpc;
    use crate::blockchain::KeypairWallet;
    use crate::clients::test_support::{context, RecordingTransport};

    #[tokio::test]
    async fn submit_score_is_tagged_with_leaderboard() {
        let transport = Arc::new(RecordingTransport::default());
        let rpc = Arc::new(MockRpc::default());
        let client = MagicBlockClient::new(context(transport.clone(), rpc.clone()));
        transport.reply_json(json!({ "transactionId": "soar-tx" }));
        let wallet = KeypairWallet::new(Keypair::new());

        let request = ScoreRequest {
            player_public_key: "player".into(),
            game_public_key: "game".into(),
            leaderboard_public_key: "board".into(),
            score: 1200,
        };
        let response = client.submit_score(&request, &wallet, "SoarProgram").await.unwrap();
        assert_eq!(response.data.unwrap().transaction_id, "soar-tx");

        let memo = &rpc.submitted()[0].message.instructions[0].data;
        assert_eq!(memo.as_slice(), b"Prismon:soar:submit-score:board");

        assert_eq!(
            transport.requests()[0].url,
            "http://backend.test/devApi/Solana/soar/score?programId=SoarProgram"
        );
        let body = transport.json_body(0);
        assert_eq!(body["score"], 1200);
        assert_eq!(body["signature"], rpc.submitted()[0].signatures[0].to_string());
    }

    #[tokio::test]
    async fn claim_reward_uses_its_own_path() {
        let transport = Arc::new(RecordingTransport::default());
        let rpc = Arc::new(MockRpc::default());
        let client = MagicBlockClient::new(context(transport.clone(), rpc.clone()));
        let wallet = KeypairWallet::new(Keypair::new());

        let request = ClaimRequest {
            player_public_key: "player".into(),
            game_public_key: "game".into(),
            target_public_key: "achievement-1".into(),
        };
        client.claim_reward(&request, &wallet, "P").await.unwrap();

        assert_eq!(
            rpc.submitted()[0].message.instructions[0].data.as_slice(),
            b"Prismon:soar:claim-reward:achievement-1"
        );
        assert_eq!(
            transport.requests()[0].url,
            "http://backend.test/devApi/Solana/soar/claim-reward?programId=P"
        );
    }

    #[tokio::test]
    async fn get_player_needs_no_wallet() {
        let transport = Arc::new(RecordingTransport::default());
        let client = MagicBlockClient::new(context(transport.clone(), Arc::new(MockRpc::default())));
        transport.reply_json(json!({ "username": "alice" }));

        let response = client.get_player("player-key", "P").await;
        assert_eq!(response.data.unwrap()["username"], "alice");
        assert_eq!(
            transport.requests()[0].url,
            "http://backend.test/devApi/Solana/soar/player?playerPublicKey=player-key&programId=P"
        );
    }
}
