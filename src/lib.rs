// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Green Bond Registry
//!
//! Issues green bonds onto a plain key/value ledger with their financial
//! figures encoded, lists and filters them, and reveals the figures only
//! after a wallet signs a challenge.
//!
//! ## Modules
//!
//! - `codec` - Reversible numeric encoding of yield and amount
//! - `storage` - Ledger contract, backends and the bond index
//! - `registry` - Issuance and listing
//! - `query` - Search, category filter and status counts
//! - `decryption` - Signature-gated reveal sessions
//! - `view` - Client browsing state reducer
//! - `wallet` - Signing collaborator
//! - `api` - HTTP API handlers (Axum)

pub mod api;
pub mod codec;
pub mod config;
pub mod decryption;
pub mod error;
pub mod logging;
pub mod models;
pub mod query;
pub mod registry;
pub mod state;
pub mod storage;
pub mod view;
pub mod wallet;
