// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Bond Registry
//!
//! Issuance, lookup and listing of green bonds on top of the
//! [`IndexManager`].
//!
//! ## Issuance
//!
//! 1. Validate the request (no ledger access on failure).
//! 2. Encode yield and amount through the [`NumericCodec`].
//! 3. Generate an id: millisecond timestamp plus 64 random bits.
//! 4. Build the record (`active`, `timestamp = now`, `issuer = wallet`).
//! 5. Write the record, then append its id to the index.
//!
//! A failure between steps 5a and 5b leaves an orphan record. Nothing is
//! rolled back; re-issuing is the caller's recourse.
//!
//! ## Listing
//!
//! Newest first by `timestamp`, ties broken by ascending id.

use chrono::Utc;
use k256::elliptic_curve::rand_core::{OsRng, RngCore};

use crate::codec::{NumericCodec, PlaceholderCodec};
use crate::models::{BondRecord, BondStats, BondStatus, Category, NewBond};
use crate::query;
use crate::storage::{ConditionalLedgerStore, IndexManager, LedgerError, LedgerStore, ListReport};
use crate::wallet::WalletSigner;

/// Errors returned by registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Issuance input was rejected before touching the ledger.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry of issued bonds.
pub struct BondRegistry<S, C = PlaceholderCodec> {
    index: IndexManager<S>,
    codec: C,
}

impl<S: LedgerStore> BondRegistry<S, PlaceholderCodec> {
    pub fn new(index: IndexManager<S>) -> Self {
        Self::with_codec(index, PlaceholderCodec::new())
    }
}

impl<S: LedgerStore, C: NumericCodec> BondRegistry<S, C> {
    pub fn with_codec(index: IndexManager<S>, codec: C) -> Self {
        Self { index, codec }
    }

    pub fn index(&self) -> &IndexManager<S> {
        &self.index
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Issue a bond with a plain read-modify-write index append.
    ///
    /// Concurrent issuers can drop each other's ids from the index; see
    /// [`BondRegistry::issue_atomic`] for stores that support it.
    pub async fn issue<W: WalletSigner>(&self, input: NewBond, wallet: &W) -> RegistryResult<String> {
        let record = self.prepare(input, wallet)?;
        self.index.put_record(&record).await?;
        self.index.append_id(&record.id).await?;
        log_issued(&record);
        Ok(record.id)
    }

    /// Look up one bond by id.
    pub async fn get(&self, bond_id: &str) -> RegistryResult<Option<BondRecord>> {
        Ok(self.index.get_record(bond_id).await?)
    }

    /// All indexed bonds, newest first.
    pub async fn list(&self) -> RegistryResult<Vec<BondRecord>> {
        Ok(self.list_report().await?.records)
    }

    /// Like [`BondRegistry::list`] but also reports skipped index entries.
    pub async fn list_report(&self) -> RegistryResult<ListReport> {
        let mut report = self.index.load_all().await?;
        sort_for_display(&mut report.records);
        if report.skipped() > 0 {
            tracing::info!(
                loaded = report.records.len(),
                missing = report.missing.len(),
                unreadable = report.unreadable.len(),
                "Listing skipped index entries"
            );
        }
        Ok(report)
    }

    /// Status counts over the current listing.
    pub async fn stats(&self) -> RegistryResult<BondStats> {
        Ok(query::stats(&self.list().await?))
    }

    fn prepare<W: WalletSigner>(&self, input: NewBond, wallet: &W) -> RegistryResult<BondRecord> {
        let issuer = wallet.current_address();
        let category = validate(&input, &issuer)?;

        Ok(BondRecord {
            id: generate_bond_id(),
            project_name: input.project_name.trim().to_string(),
            encrypted_yield: self.codec.encode(input.expected_yield),
            encrypted_amount: self.codec.encode(input.amount),
            timestamp: Utc::now().timestamp(),
            issuer,
            category,
            status: BondStatus::Active,
            description: input.description.unwrap_or_default(),
        })
    }
}

impl<S: ConditionalLedgerStore, C: NumericCodec> BondRegistry<S, C> {
    /// Issue a bond, appending to the index through compare-and-swap.
    pub async fn issue_atomic<W: WalletSigner>(
        &self,
        input: NewBond,
        wallet: &W,
    ) -> RegistryResult<String> {
        let record = self.prepare(input, wallet)?;
        self.index.put_record(&record).await?;
        self.index.append_id_atomic(&record.id).await?;
        log_issued(&record);
        Ok(record.id)
    }
}

fn log_issued(record: &BondRecord) {
    tracing::info!(
        bond_id = %record.id,
        category = %record.category,
        issuer = %record.issuer,
        "Bond issued"
    );
}

/// Validate issuance input, returning the parsed category.
pub fn validate(input: &NewBond, issuer: &str) -> RegistryResult<Category> {
    if issuer.trim().is_empty() {
        return Err(RegistryError::Validation(
            "a connected wallet is required to issue bonds".to_string(),
        ));
    }

    if input.project_name.trim().is_empty() {
        return Err(RegistryError::Validation(
            "projectName must not be empty".to_string(),
        ));
    }

    let category = input
        .category
        .parse::<Category>()
        .map_err(RegistryError::Validation)?;

    if !input.expected_yield.is_finite() || input.expected_yield < 0.0 {
        return Err(RegistryError::Validation(
            "expectedYield must be a finite number >= 0".to_string(),
        ));
    }

    if !input.amount.is_finite() || input.amount < 0.0 {
        return Err(RegistryError::Validation(
            "amount must be a finite number >= 0".to_string(),
        ));
    }

    Ok(category)
}

/// `bond-<unix millis>-<16 hex chars>`.
///
/// The suffix is 64 bits from the OS RNG, so uncoordinated issuers in the
/// same millisecond collide with negligible probability.
pub fn generate_bond_id() -> String {
    format!("bond-{}-{:016x}", Utc::now().timestamp_millis(), OsRng.next_u64())
}

/// Newest first; equal timestamps ordered by ascending id.
pub fn sort_for_display(records: &mut [BondRecord]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then_with(|| a.id.cmp(&b.id)));
}
