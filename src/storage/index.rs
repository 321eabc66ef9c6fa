// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Ledger Index Manager
//!
//! Keeps the ordered set of bond ids under [`INDEX_KEY`] and reads/writes
//! individual records under `bond_<id>`.
//!
//! ## Read Path
//!
//! The index payload is parsed leniently: an unset key, an empty payload or
//! unparseable JSON all read as an empty index (logged, never fatal).
//! Listing walks the index and loads each record; an id with no record is a
//! corrupted index entry and is skipped with a warning.
//!
//! ## Write Path
//!
//! [`IndexManager::append_id`] is a plain read-modify-write and loses ids
//! under concurrent writers. [`IndexManager::append_id_atomic`] re-reads and
//! retries through a compare-and-swap when the store supports it.

use crate::models::{BondRecord, StoredBond};

use super::cache::RecordCache;
use super::keys::{record_key, INDEX_KEY};
use super::{ConditionalLedgerStore, LedgerError, LedgerResult, LedgerStore};

/// Upper bound on compare-and-swap rounds for one append.
pub const MAX_APPEND_ATTEMPTS: usize = 8;

/// Outcome of loading every indexed record.
#[derive(Debug, Clone, Default)]
pub struct ListReport {
    /// Records that loaded, in index order.
    pub records: Vec<BondRecord>,
    /// Index entries whose record is absent.
    pub missing: Vec<String>,
    /// Index entries whose payload could not be parsed.
    pub unreadable: Vec<String>,
}

impl ListReport {
    /// Number of index entries that were skipped.
    pub fn skipped(&self) -> usize {
        self.missing.len() + self.unreadable.len()
    }
}

enum Loaded {
    Found(BondRecord),
    Missing,
    Unreadable,
}

/// Typed access to the index and the bond records of a ledger.
pub struct IndexManager<S> {
    store: S,
    cache: Option<RecordCache>,
}

impl<S: LedgerStore> IndexManager<S> {
    pub fn new(store: S) -> Self {
        Self { store, cache: None }
    }

    /// Cache up to `capacity` loaded records in memory.
    pub fn with_cache(store: S, capacity: usize) -> Self {
        Self {
            store,
            cache: Some(RecordCache::new(capacity)),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ========== Index ==========

    /// Current index, deduplicated, in insertion order.
    pub async fn get_index(&self) -> LedgerResult<Vec<String>> {
        let raw = self.store.get(INDEX_KEY).await?;
        Ok(parse_index(&raw))
    }

    /// Append `id` to the index unless already present.
    ///
    /// Not atomic: a concurrent writer that read the same snapshot can
    /// overwrite this append (or have its own append overwritten).
    pub async fn append_id(&self, id: &str) -> LedgerResult<()> {
        let mut ids = self.get_index().await?;
        if ids.iter().any(|existing| existing == id) {
            return Ok(());
        }
        ids.push(id.to_string());
        self.store.set(INDEX_KEY, serde_json::to_vec(&ids)?).await
    }

    // ========== Records ==========

    /// Load one record. Absent and unparseable payloads both yield `None`.
    pub async fn get_record(&self, id: &str) -> LedgerResult<Option<BondRecord>> {
        match self.load(id).await? {
            Loaded::Found(record) => Ok(Some(record)),
            Loaded::Missing | Loaded::Unreadable => Ok(None),
        }
    }

    /// Unconditionally write a record.
    pub async fn put_record(&self, record: &BondRecord) -> LedgerResult<()> {
        let payload = serde_json::to_vec(&record.to_stored())?;
        self.store.set(&record_key(&record.id), payload).await?;
        if let Some(cache) = &self.cache {
            cache.put(record.clone());
        }
        Ok(())
    }

    /// Walk the index and load every record it references.
    ///
    /// Store failures abort; missing or unreadable records are skipped.
    pub async fn load_all(&self) -> LedgerResult<ListReport> {
        let ids = self.get_index().await?;
        let mut report = ListReport::default();

        for id in ids {
            match self.load(&id).await? {
                Loaded::Found(record) => report.records.push(record),
                Loaded::Missing => {
                    tracing::warn!(bond_id = %id, "Corrupted index entry: record is missing, skipping");
                    report.missing.push(id);
                }
                Loaded::Unreadable => report.unreadable.push(id),
            }
        }

        Ok(report)
    }

    async fn load(&self, id: &str) -> LedgerResult<Loaded> {
        if let Some(record) = self.cache.as_ref().and_then(|c| c.get(id)) {
            return Ok(Loaded::Found(record));
        }

        let raw = self.store.get(&record_key(id)).await?;
        if raw.is_empty() {
            return Ok(Loaded::Missing);
        }

        match serde_json::from_slice::<StoredBond>(&raw) {
            Ok(stored) => {
                let record = BondRecord::from_stored(id, stored);
                if let Some(cache) = &self.cache {
                    cache.put(record.clone());
                }
                Ok(Loaded::Found(record))
            }
            Err(e) => {
                tracing::warn!(bond_id = %id, error = %e, "Failed to parse bond record, skipping");
                Ok(Loaded::Unreadable)
            }
        }
    }
}

impl<S: ConditionalLedgerStore> IndexManager<S> {
    /// Append `id` through compare-and-swap so no concurrent append is lost.
    ///
    /// Each round re-reads the raw index, merges `id` in and swaps only if
    /// the payload is unchanged since the read.
    pub async fn append_id_atomic(&self, id: &str) -> LedgerResult<()> {
        for attempt in 1..=MAX_APPEND_ATTEMPTS {
            let raw = self.store.get(INDEX_KEY).await?;
            let mut ids = parse_index(&raw);
            if ids.iter().any(|existing| existing == id) {
                return Ok(());
            }
            ids.push(id.to_string());

            let next = serde_json::to_vec(&ids)?;
            if self.store.compare_and_set(INDEX_KEY, &raw, next).await? {
                return Ok(());
            }
            tracing::debug!(bond_id = %id, attempt, "Index changed underneath append, retrying");
        }

        Err(LedgerError::Contended {
            id: id.to_string(),
            attempts: MAX_APPEND_ATTEMPTS,
        })
    }
}

/// Parse an index payload. Anything unusable reads as empty.
fn parse_index(raw: &[u8]) -> Vec<String> {
    let text = match std::str::from_utf8(raw) {
        Ok(text) => text,
        Err(e) => {
            tracing::error!(error = %e, "Bond index is not valid UTF-8, treating as empty");
            return Vec::new();
        }
    };

    if text.trim().is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<Vec<String>>(text) {
        Ok(ids) => {
            let mut unique = Vec::with_capacity(ids.len());
            for id in ids {
                if !unique.contains(&id) {
                    unique.push(id);
                }
            }
            unique
        }
        Err(e) => {
            tracing::error!(error = %e, "Error parsing bond keys, treating index as empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::models::{BondStatus, Category};
    use crate::storage::MemoryLedger;

    /// Ledger whose swaps never match.
    struct LosingSwapLedger {
        inner: MemoryLedger,
        swaps: AtomicUsize,
    }

    impl LedgerStore for LosingSwapLedger {
        async fn get(&self, key: &str) -> LedgerResult<Vec<u8>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: Vec<u8>) -> LedgerResult<()> {
            self.inner.set(key, value).await
        }
    }

    impl ConditionalLedgerStore for LosingSwapLedger {
        async fn compare_and_set(&self, _: &str, _: &[u8], _: Vec<u8>) -> LedgerResult<bool> {
            self.swaps.fetch_add(1, Ordering::SeqCst);
            Ok(false)
        }
    }

    /// Ledger where another writer replaces the index right before the next
    /// swap, after the appender has already read it.
    struct InterleavedWriterLedger {
        inner: MemoryLedger,
        pending_write: Mutex<Option<Vec<u8>>>,
        swaps: AtomicUsize,
    }

    impl LedgerStore for InterleavedWriterLedger {
        async fn get(&self, key: &str) -> LedgerResult<Vec<u8>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: Vec<u8>) -> LedgerResult<()> {
            self.inner.set(key, value).await
        }
    }

    impl ConditionalLedgerStore for InterleavedWriterLedger {
        async fn compare_and_set(
            &self,
            key: &str,
            expected: &[u8],
            value: Vec<u8>,
        ) -> LedgerResult<bool> {
            self.swaps.fetch_add(1, Ordering::SeqCst);
            let intruder = self.pending_write.lock().unwrap().take();
            if let Some(payload) = intruder {
                self.inner.set(key, payload).await?;
            }
            self.inner.compare_and_set(key, expected, value).await
        }
    }

    fn record(id: &str, timestamp: i64) -> BondRecord {
        BondRecord {
            id: id.to_string(),
            project_name: format!("Project {id}"),
            encrypted_yield: "FHE-NS41".to_string(),
            encrypted_amount: "FHE-MTAwMA==".to_string(),
            timestamp,
            issuer: "0x2222222222222222222222222222222222222222".to_string(),
            category: Category::Hydro,
            status: BondStatus::Active,
            description: String::new(),
        }
    }

    #[test]
    fn parse_index_handles_empty_and_garbage() {
        assert!(parse_index(b"").is_empty());
        assert!(parse_index(b"   ").is_empty());
        assert!(parse_index(b"{not json").is_empty());
        assert!(parse_index(&[0xff, 0xfe]).is_empty());
        assert_eq!(parse_index(br#"["a","b","a"]"#), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn append_is_idempotent_and_ordered() {
        let manager = IndexManager::new(MemoryLedger::new());
        manager.append_id("first").await.unwrap();
        manager.append_id("second").await.unwrap();
        manager.append_id("first").await.unwrap();

        assert_eq!(manager.get_index().await.unwrap(), vec!["first", "second"]);
        assert_eq!(
            manager.store().raw(INDEX_KEY).unwrap(),
            br#"["first","second"]"#
        );
    }

    #[tokio::test]
    async fn append_over_garbage_index_restarts_it() {
        let ledger = MemoryLedger::new();
        ledger.set(INDEX_KEY, b"garbage".to_vec()).await.unwrap();
        let manager = IndexManager::new(ledger);

        manager.append_id("only").await.unwrap();
        assert_eq!(manager.get_index().await.unwrap(), vec!["only"]);
    }

    #[tokio::test]
    async fn put_and_get_record_use_bond_prefix() {
        let manager = IndexManager::new(MemoryLedger::new());
        let rec = record("bond-1", 10);
        manager.put_record(&rec).await.unwrap();

        assert!(manager.store().raw("bond_bond-1").is_some());
        assert_eq!(manager.get_record("bond-1").await.unwrap(), Some(rec));
        assert_eq!(manager.get_record("bond-2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn load_all_skips_missing_and_unreadable_records() {
        let ledger = MemoryLedger::new();
        ledger.set("bond_broken", b"{oops".to_vec()).await.unwrap();
        let manager = IndexManager::new(ledger);

        manager.put_record(&record("ok", 1)).await.unwrap();
        for id in ["ok", "ghost", "broken"] {
            manager.append_id(id).await.unwrap();
        }

        let report = manager.load_all().await.unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].id, "ok");
        assert_eq!(report.missing, vec!["ghost"]);
        assert_eq!(report.unreadable, vec!["broken"]);
        assert_eq!(report.skipped(), 2);
    }

    #[tokio::test]
    async fn store_outage_propagates() {
        let manager = IndexManager::new(MemoryLedger::new());
        manager.store().set_online(false);

        assert!(matches!(manager.get_index().await, Err(LedgerError::Unavailable(_))));
        assert!(matches!(manager.append_id("x").await, Err(LedgerError::Unavailable(_))));
        assert!(matches!(
            manager.put_record(&record("x", 1)).await,
            Err(LedgerError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn cached_records_survive_outage() {
        let manager = IndexManager::with_cache(MemoryLedger::new(), 8);
        manager.put_record(&record("cached", 3)).await.unwrap();
        manager.store().set_online(false);

        let loaded = manager.get_record("cached").await.unwrap();
        assert_eq!(loaded.map(|r| r.timestamp), Some(3));
    }

    #[tokio::test]
    async fn atomic_append_merges_with_concurrent_writer() {
        let manager = IndexManager::new(MemoryLedger::new());
        manager.append_id_atomic("a").await.unwrap();

        // Another writer updated the index since our last append.
        manager
            .store()
            .set(INDEX_KEY, br#"["a","b"]"#.to_vec())
            .await
            .unwrap();
        manager.append_id_atomic("c").await.unwrap();

        assert_eq!(manager.get_index().await.unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn atomic_append_retries_after_losing_a_swap() {
        let manager = IndexManager::new(InterleavedWriterLedger {
            inner: MemoryLedger::new(),
            pending_write: Mutex::new(Some(br#"["other"]"#.to_vec())),
            swaps: AtomicUsize::new(0),
        });

        manager.append_id_atomic("mine").await.unwrap();

        assert_eq!(manager.get_index().await.unwrap(), vec!["other", "mine"]);
        assert_eq!(manager.store().swaps.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn atomic_append_gives_up_after_bounded_attempts() {
        let manager = IndexManager::new(LosingSwapLedger {
            inner: MemoryLedger::new(),
            swaps: AtomicUsize::new(0),
        });

        let err = manager.append_id_atomic("stuck").await.unwrap_err();

        match err {
            LedgerError::Contended { id, attempts } => {
                assert_eq!(id, "stuck");
                assert_eq!(attempts, MAX_APPEND_ATTEMPTS);
            }
            other => panic!("expected Contended, got {other:?}"),
        }
        assert_eq!(manager.store().swaps.load(Ordering::SeqCst), MAX_APPEND_ATTEMPTS);
        assert!(manager.get_index().await.unwrap().is_empty());
    }
}
