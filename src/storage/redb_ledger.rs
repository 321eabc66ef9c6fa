// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded ledger backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `ledger`: key → raw value bytes
//!
//! redb offers real transactions, but the registry only relies on the
//! `get`/`set` contract. The compare-and-swap path runs the read and the
//! write inside one write transaction.

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use super::{ConditionalLedgerStore, LedgerError, LedgerResult, LedgerStore};

/// Single table: ledger key → value bytes.
const LEDGER: TableDefinition<&str, &[u8]> = TableDefinition::new("ledger");

fn backend(e: impl std::fmt::Display) -> LedgerError {
    LedgerError::Backend(e.to_string())
}

/// redb-backed ledger.
pub struct RedbLedger {
    db: Database,
}

impl RedbLedger {
    /// Open (or create) the ledger at the given path.
    pub fn open(path: &Path) -> LedgerResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| LedgerError::Unavailable(format!("{}: {e}", parent.display())))?;
        }
        let db = Database::create(path).map_err(|e| LedgerError::Unavailable(e.to_string()))?;

        // Pre-create the table so read transactions never see it missing
        let write_txn = db.begin_write().map_err(backend)?;
        {
            let _ = write_txn.open_table(LEDGER).map_err(backend)?;
        }
        write_txn.commit().map_err(backend)?;

        Ok(Self { db })
    }

    fn read(&self, key: &str) -> LedgerResult<Vec<u8>> {
        let read_txn = self.db.begin_read().map_err(backend)?;
        let table = read_txn.open_table(LEDGER).map_err(backend)?;
        match table.get(key).map_err(backend)? {
            Some(value) => Ok(value.value().to_vec()),
            None => Ok(Vec::new()),
        }
    }

    fn write(&self, key: &str, value: &[u8]) -> LedgerResult<()> {
        let write_txn = self.db.begin_write().map_err(backend)?;
        {
            let mut table = write_txn.open_table(LEDGER).map_err(backend)?;
            table.insert(key, value).map_err(backend)?;
        }
        write_txn.commit().map_err(backend)?;
        Ok(())
    }

    fn swap(&self, key: &str, expected: &[u8], value: &[u8]) -> LedgerResult<bool> {
        let write_txn = self.db.begin_write().map_err(backend)?;
        let swapped = {
            let mut table = write_txn.open_table(LEDGER).map_err(backend)?;
            let current = table
                .get(key)
                .map_err(backend)?
                .map(|v| v.value().to_vec())
                .unwrap_or_default();
            if current == expected {
                table.insert(key, value).map_err(backend)?;
                true
            } else {
                false
            }
        };
        if swapped {
            write_txn.commit().map_err(backend)?;
        } else {
            write_txn.abort().map_err(backend)?;
        }
        Ok(swapped)
    }
}

impl LedgerStore for RedbLedger {
    async fn get(&self, key: &str) -> LedgerResult<Vec<u8>> {
        self.read(key)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> LedgerResult<()> {
        self.write(key, &value)
    }
}

impl ConditionalLedgerStore for RedbLedger {
    async fn compare_and_set(&self, key: &str, expected: &[u8], value: Vec<u8>) -> LedgerResult<bool> {
        self.swap(key, expected, &value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_ledger() -> (RedbLedger, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let ledger = RedbLedger::open(&dir.path().join("ledger.redb")).unwrap();
        (ledger, dir)
    }

    #[tokio::test]
    async fn unset_key_reads_empty() {
        let (ledger, _dir) = temp_ledger();
        assert!(ledger.get("bond_keys").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn set_and_get_round_trip() {
        let (ledger, _dir) = temp_ledger();
        ledger.set("bond_keys", br#"["a"]"#.to_vec()).await.unwrap();
        assert_eq!(ledger.get("bond_keys").await.unwrap(), br#"["a"]"#);
    }

    #[tokio::test]
    async fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.redb");
        {
            let ledger = RedbLedger::open(&path).unwrap();
            ledger.set("k", b"durable".to_vec()).await.unwrap();
        }
        let reopened = RedbLedger::open(&path).unwrap();
        assert_eq!(reopened.get("k").await.unwrap(), b"durable");
    }

    #[tokio::test]
    async fn compare_and_set_rejects_stale_expectation() {
        let (ledger, _dir) = temp_ledger();
        assert!(ledger.compare_and_set("k", b"", b"v1".to_vec()).await.unwrap());
        assert!(!ledger.compare_and_set("k", b"", b"v2".to_vec()).await.unwrap());
        assert_eq!(ledger.get("k").await.unwrap(), b"v1");
    }
}
