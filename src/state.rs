// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::registry::BondRegistry;
use crate::storage::{IndexManager, LedgerResult, RedbLedger};
use crate::wallet::LocalWalletSigner;

/// Registry type served over HTTP.
pub type ServerRegistry = BondRegistry<RedbLedger>;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ServerRegistry>,
    /// Custodial wallet that issues and reveals on the caller's behalf.
    pub signer: Arc<LocalWalletSigner>,
    pub config: Arc<Config>,
    /// Cancelled on shutdown; aborts pending signature sessions.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(registry: ServerRegistry, signer: LocalWalletSigner, config: Config) -> Self {
        Self {
            registry: Arc::new(registry),
            signer: Arc::new(signer),
            config: Arc::new(config),
            shutdown: CancellationToken::new(),
        }
    }

    /// Open the ledger under `config.data_dir`.
    pub fn open(config: Config, signer: LocalWalletSigner) -> LedgerResult<Self> {
        let ledger = RedbLedger::open(&config.ledger_path())?;
        let index = IndexManager::with_cache(ledger, config.record_cache_size);
        Ok(Self::new(BondRegistry::new(index), signer, config))
    }
}
