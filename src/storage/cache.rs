// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! LRU cache for loaded bond records.
//!
//! Records are immutable once issued, so a cached copy never goes stale and
//! entries need no TTL. Absent records are not cached: an orphaned index
//! entry may still be healed by a late write.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use crate::models::BondRecord;

/// In-process LRU cache keyed by bond id.
pub struct RecordCache {
    cache: Mutex<LruCache<String, BondRecord>>,
}

impl RecordCache {
    /// Create a cache holding at most `capacity` records (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, bond_id: &str) -> Option<BondRecord> {
        let mut cache = self.cache.lock().ok()?;
        cache.get(bond_id).cloned()
    }

    pub fn put(&self, record: BondRecord) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(record.id.clone(), record);
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
