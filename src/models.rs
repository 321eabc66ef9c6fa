// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Bond Data Models
//!
//! Record and request types shared by the registry, the query engine and the
//! HTTP layer.
//!
//! ## Wire Format
//!
//! A record is persisted under `bond_<id>` as a UTF-8 JSON object
//! ([`StoredBond`]). The id lives only in the key; [`BondRecord`] joins the
//! two back together when a record is loaded.
//!
//! ```text
//! {"projectName": "...", "encryptedYield": "FHE-...", "encryptedAmount": "FHE-...",
//!  "timestamp": 1760000000, "issuer": "0x...", "category": "Solar",
//!  "status": "active", "description": "..."}
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Enumerations
// =============================================================================

/// Closed set of project categories.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum Category {
    Solar,
    Wind,
    Hydro,
    Biomass,
    Geothermal,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Solar,
        Category::Wind,
        Category::Hydro,
        Category::Biomass,
        Category::Geothermal,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Solar => "Solar",
            Category::Wind => "Wind",
            Category::Hydro => "Hydro",
            Category::Biomass => "Biomass",
            Category::Geothermal => "Geothermal",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Exact, case-sensitive match against the stored spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category `{s}`"))
    }
}

/// Lifecycle status of a bond.
///
/// Only `Active` is ever written by this crate; `Matured` and `Defaulted`
/// are set by whatever external process owns maturity.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum BondStatus {
    #[default]
    Active,
    Matured,
    Defaulted,
}

// =============================================================================
// Records
// =============================================================================

/// Ledger payload stored under `bond_<id>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredBond {
    pub project_name: String,
    pub encrypted_yield: String,
    pub encrypted_amount: String,
    /// Unix seconds.
    pub timestamp: i64,
    pub issuer: String,
    pub category: Category,
    /// Older payloads omit the status; those bonds are active.
    #[serde(default)]
    pub status: BondStatus,
    #[serde(default)]
    pub description: String,
}

/// One issued bond, as seen by readers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BondRecord {
    /// Opaque unique identifier (never reused).
    pub id: String,
    pub project_name: String,
    /// Codec output, never a raw number.
    pub encrypted_yield: String,
    /// Codec output, never a raw number.
    pub encrypted_amount: String,
    /// Unix seconds, set once at issuance.
    pub timestamp: i64,
    /// Wallet address of the issuing principal.
    pub issuer: String,
    pub category: Category,
    pub status: BondStatus,
    pub description: String,
}

impl BondRecord {
    pub fn from_stored(id: impl Into<String>, stored: StoredBond) -> Self {
        Self {
            id: id.into(),
            project_name: stored.project_name,
            encrypted_yield: stored.encrypted_yield,
            encrypted_amount: stored.encrypted_amount,
            timestamp: stored.timestamp,
            issuer: stored.issuer,
            category: stored.category,
            status: stored.status,
            description: stored.description,
        }
    }

    pub fn to_stored(&self) -> StoredBond {
        StoredBond {
            project_name: self.project_name.clone(),
            encrypted_yield: self.encrypted_yield.clone(),
            encrypted_amount: self.encrypted_amount.clone(),
            timestamp: self.timestamp,
            issuer: self.issuer.clone(),
            category: self.category,
            status: self.status,
            description: self.description.clone(),
        }
    }
}

// =============================================================================
// Requests / Aggregates
// =============================================================================

/// Issuance input. Financials arrive in plaintext and leave encoded.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewBond {
    pub project_name: String,
    /// Must name one of the [`Category`] variants exactly.
    pub category: String,
    /// Expected yield in percent.
    pub expected_yield: f64,
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
}

/// Counts by status over a listing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct BondStats {
    pub total: usize,
    pub active: usize,
    pub matured: usize,
    pub defaulted: usize,
}
