// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and constants.

use solana_sdk::commitment_config::CommitmentLevel;
use solana_sdk::{hash::Hash, pubkey::Pubkey};

/// SPL Memo program. Attaches arbitrary data to a transaction and holds no
/// state; used here only to bind a signed intent tag to a blockhash.
pub const MEMO_PROGRAM_ID: Pubkey =
    solana_sdk::pubkey!("MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr");

/// Commitment used for blockhash reads, preflight and confirmation.
pub const COMMITMENT: CommitmentLevel = CommitmentLevel::Confirmed;

/// Namespace prefix of every intent tag.
pub const INTENT_NAMESPACE: &str = "Prismon";

/// Build an intent tag of the form `Prismon:<action>:<subject>`.
pub fn intent_tag(action: &str, subject: impl std::fmt::Display) -> String {
    format!("{INTENT_NAMESPACE}:{action}:{subject}")
}

/// A recent blockhash and the last block height at which transactions
/// referencing it can still land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatestBlockhash {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

/// Result of waiting for a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    /// Reached `confirmed` (or `finalized`) without an execution error.
    Confirmed { slot: u64 },
    /// Landed, but the network reported an execution error.
    Failed(String),
}
