// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Solana integration.
//!
//! This module provides:
//! - The signer bridge over externally held wallets
//! - A JSON-RPC client for blockhash reads, submission and confirmation
//! - The transaction signing pipeline (memo-carrying intent proofs)
//! - Off-chain message signing

pub mod client;
pub mod signing;
pub mod transactions;
pub mod types;

pub use client::{RpcError, SolanaRpc, SolanaRpcClient};
pub use signing::{
    sign_message, sign_message_with, Capability, KeypairWallet, MessageSigner, SignerError,
    SigningError, TransactionSigner, WalletAdapter,
};
pub use transactions::{build_memo_transaction, TransactionSigningPipeline};
pub use types::*;
