// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Prismon Client - API client and Solana intent-signing SDK
//!
//! Every backend call goes through one retrying [`http::RequestExecutor`]
//! that injects credentials and reports progress to a shared
//! [`loading::LoadingStateStore`]. Calls that need proof of user intent are
//! first co-signed by an externally held wallet, either as an on-chain memo
//! transaction or as an off-chain message.
//!
//! ## Modules
//!
//! - `http` - Request executor, retry policy, auth context, transport seam
//! - `loading` - Keyed loading states with subscriptions
//! - `blockchain` - Signer bridge, Solana RPC, signing pipelines
//! - `clients` - Solana, users, Pyth, AI and SOAR domain clients
//! - `config` - Environment configuration
//! - `logging` - `tracing` subscriber setup

pub mod blockchain;
pub mod client;
pub mod clients;
pub mod config;
pub mod error;
pub mod http;
pub mod loading;
pub mod logging;
pub mod models;
pub mod state;

pub use client::PrismonClient;
pub use config::ClientConfig;
pub use error::{ApiResponse, ClientError};
