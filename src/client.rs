// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! SDK entry point.

use std::sync::Arc;

use crate::blockchain::{SolanaRpc, SolanaRpcClient, TransactionSigningPipeline};
use crate::clients::{AiClient, MagicBlockClient, PythClient, SolanaClient, UsersClient};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::http::{AuthContext, RequestExecutor, ReqwestTransport, RetryPolicy, Transport};
use crate::loading::LoadingStateStore;
use crate::state::SdkContext;

/// All domain clients built over one executor, one loading state store and
/// one Solana RPC connection.
///
/// ```rust,ignore
/// let client = PrismonClient::new(ClientConfig::new(api_key, "my-app"))?;
/// let login = client.users().login_wallet(&wallet).await;
/// let balance = client.solana().get_balance(&pubkey.to_string()).await;
/// ```
#[derive(Clone, Debug)]
pub struct PrismonClient {
    ctx: SdkContext,
    solana: SolanaClient,
    users: UsersClient,
    pyth: PythClient,
    ai: AiClient,
    magicblock: MagicBlockClient,
}

impl PrismonClient {
    /// Build the SDK with the `reqwest` transport and a JSON-RPC connection
    /// to `config.solana_rpc_url`.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = Arc::new(ReqwestTransport::new()?);
        let rpc = Arc::new(SolanaRpcClient::new(config.solana_rpc_url.clone())?);
        Self::with_parts(config, transport, rpc)
    }

    /// Build the SDK from `PRISMON_*` environment variables.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Build the SDK over caller-supplied network seams.
    pub fn with_parts(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        rpc: Arc<dyn SolanaRpc>,
    ) -> Result<Self, ClientError> {
        let executor = RequestExecutor::new(
            config.base_url.clone(),
            Arc::new(AuthContext::new(config.api_key.clone())),
            transport,
            Arc::new(LoadingStateStore::new()),
            RetryPolicy::new(config.max_retries, config.backoff_base),
        )
        .with_verbose_logging(config.enable_logging);

        let ctx = SdkContext::new(config, executor, rpc);
        Ok(Self {
            solana: SolanaClient::new(ctx.clone()),
            users: UsersClient::new(ctx.clone()),
            pyth: PythClient::new(ctx.clone())?,
            ai: AiClient::new(ctx.clone()),
            magicblock: MagicBlockClient::new(ctx.clone()),
            ctx,
        })
    }

    pub fn solana(&self) -> &SolanaClient {
        &self.solana
    }

    pub fn users(&self) -> &UsersClient {
        &self.users
    }

    pub fn pyth(&self) -> &PythClient {
        &self.pyth
    }

    pub fn ai(&self) -> &AiClient {
        &self.ai
    }

    pub fn magicblock(&self) -> &MagicBlockClient {
        &self.magicblock
    }

    /// Attach `token` as the bearer credential for every client.
    pub fn set_auth_token(&self, token: impl Into<String>) {
        self.ctx.executor.set_auth_token(token);
    }

    pub fn loading_states(&self) -> &Arc<LoadingStateStore> {
        self.ctx.loading_states()
    }

    /// Memo-transaction signing pipeline, for intent proofs outside the
    /// built-in clients.
    pub fn transactions(&self) -> &TransactionSigningPipeline {
        &self.ctx.transactions
    }

    pub fn config(&self) -> &ClientConfig {
        &self.ctx.config
    }

    pub fn executor(&self) -> &Arc<RequestExecutor> {
        &self.ctx.executor
    }
}
