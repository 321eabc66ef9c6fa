// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Key constants for the ledger layout.

/// Key holding the JSON array of every known bond id.
pub const INDEX_KEY: &str = "bond_keys";

/// Prefix of per-bond record keys.
pub const RECORD_PREFIX: &str = "bond_";

/// Ledger key for a specific bond record.
pub fn record_key(bond_id: &str) -> String {
    format!("{RECORD_PREFIX}{bond_id}")
}
