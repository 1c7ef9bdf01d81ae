// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signer bridge and message signing.
//!
//! Keys are never held by this crate. The host application supplies a
//! [`WalletAdapter`] whose capabilities may come and go (a browser wallet
//! that disconnects, a hardware wallet that only signs messages), so
//! presence is checked on every call rather than at construction.

use std::fmt;

use async_trait::async_trait;
use solana_sdk::{
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
    transaction::Transaction,
};
use tracing::debug;

use super::client::RpcError;

/// Failure reported by an external signer, usually an explicit user
/// rejection. The message is passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct SignerError(pub String);

impl SignerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Signs a fully built transaction for the fee payer.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    async fn sign_transaction(&self, transaction: Transaction) -> Result<Transaction, SignerError>;
}

/// Signs arbitrary bytes, returning the raw signature.
#[async_trait]
pub trait MessageSigner: Send + Sync {
    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, SignerError>;
}

/// An externally held wallet with optional signing capabilities.
pub trait WalletAdapter: Send + Sync {
    /// Connected public key, or `None` while disconnected.
    fn public_key(&self) -> Option<Pubkey>;

    fn transaction_signer(&self) -> Option<&dyn TransactionSigner>;

    fn message_signer(&self) -> Option<&dyn MessageSigner>;
}

/// Signing capability a call requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    SignTransaction,
    SignMessage,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::SignTransaction => f.write_str("signTransaction"),
            Capability::SignMessage => f.write_str("signMessage"),
        }
    }
}

/// Errors raised by the transaction and message signing pipelines.
///
/// None of these are retried: each one needs either a wallet fix or a
/// fresh signature over a fresh blockhash.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("Wallet not connected or {0} not supported")]
    SignerUnavailable(Capability),

    #[error(transparent)]
    Signer(#[from] SignerError),

    #[error("Failed to fetch latest blockhash: {0}")]
    Blockhash(#[source] RpcError),

    #[error("Transaction submission failed: {0}")]
    Submission(#[source] RpcError),

    #[error("Transaction confirmation failed: {0}")]
    Confirmation(#[source] RpcError),

    /// The transaction landed but the network reported an execution error.
    #[error("Transaction confirmation failed: {0}")]
    ConfirmationFailed(String),
}

impl SigningError {
    /// True when the wallet is missing a key or capability.
    pub fn is_signer_unavailable(&self) -> bool {
        matches!(self, SigningError::SignerUnavailable(_))
    }
}

/// Sign `message` off-chain and return the base58 signature.
///
/// # Arguments
/// * `public_key` - Connected wallet key; required even though the message
///   itself does not embed it
/// * `signer` - Message signing capability
/// * `message` - Intent string, signed as its UTF-8 bytes
///
/// # Returns
/// * `Ok(String)` - Base58-encoded signature
/// * `Err(SigningError)` - Missing capability, or the signer's own error
pub async fn sign_message(
    public_key: Option<&Pubkey>,
    signer: Option<&dyn MessageSigner>,
    message: &str,
) -> Result<String, SigningError> {
    let (public_key, signer) = match (public_key, signer) {
        (Some(key), Some(signer)) => (key, signer),
        _ => return Err(SigningError::SignerUnavailable(Capability::SignMessage)),
    };

    let signature = signer.sign_message(message.as_bytes()).await?;
    debug!(signer = %public_key, message, "Message signed");
    Ok(bs58::encode(signature).into_string())
}

/// [`sign_message`] using the wallet's current capabilities.
pub async fn sign_message_with(
    wallet: &dyn WalletAdapter,
    message: &str,
) -> Result<String, SigningError> {
    let public_key = wallet.public_key();
    sign_message(public_key.as_ref(), wallet.message_signer(), message).await
}

/// Wallet backed by an in-process keypair. Useful for scripts, bots and
/// tests; either capability can be switched off to mimic limited wallets.
pub struct KeypairWallet {
    keypair: Keypair,
    sign_transactions: bool,
    sign_messages: bool,
}

impl KeypairWallet {
    pub fn new(keypair: Keypair) -> Self {
        Self {
            keypair,
            sign_transactions: true,
            sign_messages: true,
        }
    }

    pub fn without_transaction_signing(mut self) -> Self {
        self.sign_transactions = false;
        self
    }

    pub fn without_message_signing(mut self) -> Self {
        self.sign_messages = false;
        self
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }
}

impl fmt::Debug for KeypairWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeypairWallet")
            .field("pubkey", &self.keypair.pubkey())
            .field("sign_transactions", &self.sign_transactions)
            .field("sign_messages", &self.sign_messages)
            .finish()
    }
}

#[async_trait]
impl TransactionSigner for KeypairWallet {
    async fn sign_transaction(
        &self,
        mut transaction: Transaction,
    ) -> Result<Transaction, SignerError> {
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[&self.keypair], blockhash)
            .map_err(|e| SignerError(e.to_string()))?;
        Ok(transaction)
    }
}

#[async_trait]
impl MessageSigner for KeypairWallet {
    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        Ok(self.keypair.sign_message(message).as_ref().to_vec())
    }
}

impl WalletAdapter for KeypairWallet {
    fn public_key(&self) -> Option<Pubkey> {
        Some(self.keypair.pubkey())
    }

    fn transaction_signer(&self) -> Option<&dyn TransactionSigner> {
        self.sign_transactions
            .then_some(self as &dyn TransactionSigner)
    }

    fn message_signer(&self) -> Option<&dyn MessageSigner> {
        self.sign_messages.then_some(self as &dyn MessageSigner)
    }
}
