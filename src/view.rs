// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Registry View
//!
//! Client-side browsing state as a plain value. Every change goes through
//! [`RegistryView::reduce`]; the ledger (via the registry) stays the only
//! thing that persists.
//!
//! A reveal is driven in two halves: `RevealRequested` moves the view to
//! `Revealing`, the caller runs [`crate::decryption::reveal_bond`], then
//! feeds back `RevealSucceeded` or `RevealFailed`.

use std::collections::VecDeque;

use crate::decryption::RevealedBond;
use crate::models::{BondRecord, BondStats};
use crate::query::{self, CategoryFilter};

/// Number of activity entries kept.
pub const HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RevealState {
    #[default]
    Hidden,
    Revealing,
    Revealed(RevealedBond),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewAction {
    /// Replace the listing with a fresh registry load.
    Loaded(Vec<BondRecord>),
    /// A bond was issued from this client.
    Issued { project_name: String },
    Search(String),
    FilterCategory(CategoryFilter),
    Select(String),
    CloseDetail,
    /// Decrypt the selected bond, or hide it if already revealed.
    RevealRequested,
    RevealSucceeded(RevealedBond),
    RevealFailed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistryView {
    bonds: Vec<BondRecord>,
    search_term: String,
    category: CategoryFilter,
    selected: Option<String>,
    reveal: RevealState,
    history: VecDeque<String>,
}

impl RegistryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reduce(mut self, action: ViewAction) -> Self {
        match action {
            ViewAction::Loaded(bonds) => {
                self.bonds = bonds;
                if self.selected_bond().is_none() {
                    self.selected = None;
                    self.reveal = RevealState::Hidden;
                }
            }
            ViewAction::Issued { project_name } => {
                self.record(format!("Issued bond: {project_name}"));
            }
            ViewAction::Search(term) => self.search_term = term,
            ViewAction::FilterCategory(category) => self.category = category,
            ViewAction::Select(bond_id) => {
                if self.bonds.iter().any(|b| b.id == bond_id) {
                    self.selected = Some(bond_id);
                    self.reveal = RevealState::Hidden;
                }
            }
            ViewAction::CloseDetail => {
                self.selected = None;
                self.reveal = RevealState::Hidden;
            }
            ViewAction::RevealRequested => {
                self.reveal = match (&self.reveal, &self.selected) {
                    (RevealState::Revealed(_), _) => RevealState::Hidden,
                    (RevealState::Hidden, Some(_)) => RevealState::Revealing,
                    (state, _) => state.clone(),
                };
            }
            ViewAction::RevealSucceeded(revealed) => {
                let applies = self.reveal == RevealState::Revealing
                    && self.selected.as_deref() == Some(revealed.bond_id.as_str());
                if applies {
                    if let Some(name) = self.selected_bond().map(|b| b.project_name.clone()) {
                        self.record(format!("Decrypted bond: {name}"));
                    }
                    self.reveal = RevealState::Revealed(revealed);
                }
            }
            ViewAction::RevealFailed => {
                if self.reveal == RevealState::Revealing {
                    self.reveal = RevealState::Hidden;
                }
            }
        }
        self
    }

    fn record(&mut self, entry: String) {
        self.history.push_front(entry);
        self.history.truncate(HISTORY_LIMIT);
    }

    /// Listing after search and category filters, in registry order.
    pub fn visible(&self) -> Vec<BondRecord> {
        query::filter(&self.bonds, &self.search_term, self.category)
    }

    /// Counts over the full listing, ignoring filters.
    pub fn stats(&self) -> BondStats {
        query::stats(&self.bonds)
    }

    pub fn bonds(&self) -> &[BondRecord] {
        &self.bonds
    }

    pub fn selected_bond(&self) -> Option<&BondRecord> {
        let id = self.selected.as_deref()?;
        self.bonds.iter().find(|b| b.id == id)
    }

    pub fn reveal(&self) -> &RevealState {
        &self.reveal
    }

    pub fn is_revealing(&self) -> bool {
        self.reveal == RevealState::Revealing
    }

    /// Newest first.
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn category(&self) -> CategoryFilter {
        self.category
    }
}
