// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction signing pipeline.
//!
//! Turns an intent tag into a signed, submitted and confirmed memo
//! transaction. The blockhash binds the proof to a short validity window,
//! so a failure after signing is surfaced rather than retried: the caller
//! has to sign again over a fresh blockhash.

use std::sync::Arc;

use solana_sdk::{
    hash::Hash,
    instruction::{AccountMeta, Instruction},
    message::Message,
    pubkey::Pubkey,
    transaction::Transaction,
};
use tracing::{debug, info, warn};

use super::client::SolanaRpc;
use super::signing::{Capability, SigningError, TransactionSigner, WalletAdapter};
use super::types::{ConfirmationOutcome, MEMO_PROGRAM_ID};

/// Build an unsigned transaction with a single memo instruction carrying
/// `tag`. The fee payer is the only account, listed as a read-only signer.
pub fn build_memo_transaction(fee_payer: &Pubkey, tag: &str, blockhash: Hash) -> Transaction {
    let instruction = Instruction::new_with_bytes(
        MEMO_PROGRAM_ID,
        tag.as_bytes(),
        vec![AccountMeta::new_readonly(*fee_payer, true)],
    );
    let message = Message::new_with_blockhash(&[instruction], Some(fee_payer), &blockhash);
    Transaction::new_unsigned(message)
}

/// Signs intent memos with an external wallet and lands them on chain.
#[derive(Clone)]
pub struct TransactionSigningPipeline {
    rpc: Arc<dyn SolanaRpc>,
}

impl TransactionSigningPipeline {
    pub fn new(rpc: Arc<dyn SolanaRpc>) -> Self {
        Self { rpc }
    }

    /// Sign, submit and confirm a memo transaction carrying `tag`.
    ///
    /// Steps, none of which are retried:
    /// 1. check both the key and the signing capability are present
    /// 2. fetch the latest blockhash (`confirmed`)
    /// 3. build the memo transaction with `public_key` as fee payer
    /// 4. hand it to the external signer
    /// 5. submit with preflight enabled
    /// 6. wait for `confirmed`; an execution error fails the call
    ///
    /// Returns the base58 transaction signature.
    pub async fn sign_and_submit(
        &self,
        public_key: Option<&Pubkey>,
        signer: Option<&dyn TransactionSigner>,
        tag: &str,
    ) -> Result<String, SigningError> {
        let (fee_payer, signer) = match (public_key, signer) {
            (Some(key), Some(signer)) => (key, signer),
            _ => return Err(SigningError::SignerUnavailable(Capability::SignTransaction)),
        };

        let anchor = self
            .rpc
            .get_latest_blockhash()
            .await
            .map_err(SigningError::Blockhash)?;

        let transaction = build_memo_transaction(fee_payer, tag, anchor.blockhash);
        debug!(
            fee_payer = %fee_payer,
            tag,
            blockhash = %anchor.blockhash,
            "Requesting transaction signature"
        );

        let signed = signer.sign_transaction(transaction).await?;

        let signature = self
            .rpc
            .send_transaction(&signed)
            .await
            .map_err(SigningError::Submission)?;

        match self.rpc.confirm_transaction(&signature, &anchor).await {
            Ok(ConfirmationOutcome::Confirmed { slot }) => {
                info!(signature = %signature, slot, tag, "Intent transaction confirmed");
                Ok(signature.to_string())
            }
            Ok(ConfirmationOutcome::Failed(err)) => {
                warn!(signature = %signature, error = %err, "Intent transaction failed on chain");
                Err(SigningError::ConfirmationFailed(err))
            }
            Err(e) => {
                warn!(signature = %signature, error = %e, "Intent transaction not confirmed");
                Err(SigningError::Confirmation(e))
            }
        }
    }

    /// [`Self::sign_and_submit`] using the wallet's current capabilities.
    pub async fn sign_and_submit_with(
        &self,
        wallet: &dyn WalletAdapter,
        tag: &str,
    ) -> Result<String, SigningError> {
        let public_key = wallet.public_key();
        self.sign_and_submit(public_key.as_ref(), wallet.transaction_signer(), tag)
            .await
    }
}

impl std::fmt::Debug for TransactionSigningPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionSigningPipeline").finish_non_exhaustive()
    }
}
