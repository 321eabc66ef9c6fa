// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Ledger Storage Module
//!
//! Bonds live in an external append-only key/value ledger that offers only
//! `get` and `set`. There are no transactions and no locks, and any number of
//! independent writers share the same keys.
//!
//! ## Key Layout
//!
//! ```text
//! bond_keys      # UTF-8 JSON array of bond ids (the index)
//! bond_<id>      # UTF-8 JSON object, one per bond (see models::StoredBond)
//! ```
//!
//! ## Consistency Model
//!
//! - An unset key reads as an empty byte sequence; absence is not an error.
//! - Issuance writes the record first and the index second. A crash in
//!   between leaves an orphan record, never an index entry pointing nowhere.
//! - Appending to the index is a read-modify-write. Two writers that read the
//!   same snapshot race, and the second `set` drops the first writer's id.
//!   Stores that can compare-and-swap implement [`ConditionalLedgerStore`] so
//!   [`IndexManager::append_id_atomic`] can close that window.
//!
//! ## Backends
//!
//! - [`MemoryLedger`]: process-local map, used by tests and demos.
//! - [`RedbLedger`]: embedded redb database used by the server binary.

use std::future::Future;
use std::sync::Arc;

pub mod cache;
pub mod index;
pub mod keys;
pub mod memory;
pub mod redb_ledger;

pub use cache::RecordCache;
pub use index::{IndexManager, ListReport};
pub use keys::{record_key, INDEX_KEY};
pub use memory::MemoryLedger;
pub use redb_ledger::RedbLedger;

/// Error type for ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The ledger could not be reached. No mutation may be assumed.
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),

    /// A payload could not be serialized for writing.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend-specific failure.
    #[error("Ledger backend error: {0}")]
    Backend(String),

    /// Conditional append kept losing to concurrent writers.
    #[error("Index append for {id} conflicted {attempts} times")]
    Contended { id: String, attempts: usize },
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Minimal ledger contract: byte values under string keys.
pub trait LedgerStore: Send + Sync {
    /// Read a key. Unset keys return an empty vector.
    fn get(&self, key: &str) -> impl Future<Output = LedgerResult<Vec<u8>>> + Send;

    /// Write a key. Durable once this resolves `Ok`.
    fn set(&self, key: &str, value: Vec<u8>) -> impl Future<Output = LedgerResult<()>> + Send;
}

/// Ledgers that can swap a value only if it still matches what was read.
pub trait ConditionalLedgerStore: LedgerStore {
    /// Write `value` if the key currently holds exactly `expected` (an empty
    /// `expected` matches an unset key). Returns `false` on mismatch.
    fn compare_and_set(
        &self,
        key: &str,
        expected: &[u8],
        value: Vec<u8>,
    ) -> impl Future<Output = LedgerResult<bool>> + Send;
}

impl<S: LedgerStore> LedgerStore for Arc<S> {
    fn get(&self, key: &str) -> impl Future<Output = LedgerResult<Vec<u8>>> + Send {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Vec<u8>) -> impl Future<Output = LedgerResult<()>> + Send {
        (**self).set(key, value)
    }
}

impl<S: ConditionalLedgerStore> ConditionalLedgerStore for Arc<S> {
    fn compare_and_set(
        &self,
        key: &str,
        expected: &[u8],
        value: Vec<u8>,
    ) -> impl Future<Output = LedgerResult<bool>> + Send {
        (**self).compare_and_set(key, expected, value)
    }
}
