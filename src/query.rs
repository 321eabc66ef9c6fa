// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Filtering and aggregation over an already ordered bond listing.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{BondRecord, BondStats, BondStatus, Category};

/// Wildcard selector spelling.
pub const ALL_CATEGORIES: &str = "All";

/// Category selector: the wildcard or one exact category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => *wanted == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == ALL_CATEGORIES {
            Ok(CategoryFilter::All)
        } else {
            s.parse().map(CategoryFilter::Only)
        }
    }
}

impl TryFrom<String> for CategoryFilter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CategoryFilter> for String {
    fn from(value: CategoryFilter) -> Self {
        match value {
            CategoryFilter::All => ALL_CATEGORIES.to_string(),
            CategoryFilter::Only(category) => category.as_str().to_string(),
        }
    }
}

/// True if `record` matches the search term and the category selector.
///
/// The search term is a case-insensitive substring of either the project
/// name or the category name; an empty term matches everything.
pub fn matches(record: &BondRecord, search_term: &str, category: CategoryFilter) -> bool {
    let needle = search_term.to_lowercase();
    let matches_search = record.project_name.to_lowercase().contains(&needle)
        || record.category.as_str().to_lowercase().contains(&needle);
    matches_search && category.matches(record.category)
}

/// Keep the records that match, preserving their order.
pub fn filter(records: &[BondRecord], search_term: &str, category: CategoryFilter) -> Vec<BondRecord> {
    records
        .iter()
        .filter(|record| matches(record, search_term, category))
        .cloned()
        .collect()
}

/// Count records by status.
pub fn stats(records: &[BondRecord]) -> BondStats {
    records.iter().fold(
        BondStats {
            total: records.len(),
            ..BondStats::default()
        },
        |mut acc, record| {
            match record.status {
                BondStatus::Active => acc.active += 1,
                BondStatus::Matured => acc.matured += 1,
                BondStatus::Defaulted => acc.defaulted += 1,
            }
            acc
        },
    )
}
