// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory ledger.
//!
//! Process-local stand-in for the external ledger. Shares its semantics
//! (unset keys read as empty, last `set` wins) and can be switched offline to
//! exercise [`LedgerError::Unavailable`] paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::{ConditionalLedgerStore, LedgerError, LedgerResult, LedgerStore};

#[derive(Debug)]
pub struct MemoryLedger {
    entries: Mutex<HashMap<String, Vec<u8>>>,
    online: AtomicBool,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            online: AtomicBool::new(true),
        }
    }
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the ledger becoming unreachable (or reachable again).
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Raw bytes under `key`, bypassing availability. `None` if never set.
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    /// Number of keys ever written.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_online(&self) -> LedgerResult<()> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(LedgerError::Unavailable("memory ledger is offline".to_string()))
        }
    }

    fn lock(&self) -> LedgerResult<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.entries
            .lock()
            .map_err(|_| LedgerError::Backend("memory ledger lock poisoned".to_string()))
    }
}

impl LedgerStore for MemoryLedger {
    async fn get(&self, key: &str) -> LedgerResult<Vec<u8>> {
        self.ensure_online()?;
        Ok(self.lock()?.get(key).cloned().unwrap_or_default())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> LedgerResult<()> {
        self.ensure_online()?;
        self.lock()?.insert(key.to_string(), value);
        Ok(())
    }
}

impl ConditionalLedgerStore for MemoryLedger {
    async fn compare_and_set(&self, key: &str, expected: &[u8], value: Vec<u8>) -> LedgerResult<bool> {
        self.ensure_online()?;
        let mut entries = self.lock()?;
        let current = entries.get(key).map(Vec::as_slice).unwrap_or_default();
        if current != expected {
            return Ok(false);
        }
        entries.insert(key.to_string(), value);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unset_key_reads_empty() {
        let ledger = MemoryLedger::new();
        assert!(ledger.get("missing").await.unwrap().is_empty());
        assert!(ledger.raw("missing").is_none());
    }

    #[tokio::test]
    async fn set_then_get_returns_last_write() {
        let ledger = MemoryLedger::new();
        ledger.set("k", b"one".to_vec()).await.unwrap();
        ledger.set("k", b"two".to_vec()).await.unwrap();
        assert_eq!(ledger.get("k").await.unwrap(), b"two");
        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test]
    async fn offline_ledger_rejects_reads_and_writes() {
        let ledger = MemoryLedger::new();
        ledger.set("k", b"v".to_vec()).await.unwrap();
        ledger.set_online(false);

        assert!(matches!(ledger.get("k").await, Err(LedgerError::Unavailable(_))));
        assert!(matches!(
            ledger.set("k", b"x".to_vec()).await,
            Err(LedgerError::Unavailable(_))
        ));
        assert_eq!(ledger.raw("k").unwrap(), b"v");
    }

    #[tokio::test]
    async fn compare_and_set_only_swaps_matching_value() {
        let ledger = MemoryLedger::new();
        assert!(ledger.compare_and_set("k", b"", b"a".to_vec()).await.unwrap());
        assert!(!ledger.compare_and_set("k", b"", b"b".to_vec()).await.unwrap());
        assert!(ledger.compare_and_set("k", b"a", b"c".to_vec()).await.unwrap());
        assert_eq!(ledger.raw("k").unwrap(), b"c");
    }
}
