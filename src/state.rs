// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::blockchain::{SolanaRpc, TransactionSigningPipeline};
use crate::config::ClientConfig;
use crate::http::RequestExecutor;
use crate::loading::LoadingStateStore;

/// Shared handles cloned into every domain client.
///
/// One executor per SDK instance, so the auth token and loading states are
/// shared by all clients built from the same context.
#[derive(Clone, Debug)]
pub struct SdkContext {
    pub config: Arc<ClientConfig>,
    pub executor: Arc<RequestExecutor>,
    pub transactions: TransactionSigningPipeline,
}

impl SdkContext {
    pub fn new(config: ClientConfig, executor: RequestExecutor, rpc: Arc<dyn SolanaRpc>) -> Self {
        Self {
            config: Arc::new(config),
            executor: Arc::new(executor),
            transactions: TransactionSigningPipeline::new(rpc),
        }
    }

    pub fn loading_states(&self) -> &Arc<LoadingStateStore> {
        self.executor.loading_states()
    }
}
