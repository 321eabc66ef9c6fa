// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Decryption
//!
//! Revealing a bond's financials takes one signed challenge per field. Each
//! field runs its own [`DecryptionSession`]; a bond is revealed only when
//! both sessions authorize. Sessions never write to the ledger.

pub mod challenge;
pub mod session;

use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use utoipa::ToSchema;

use crate::codec::NumericCodec;
use crate::models::BondRecord;
use crate::wallet::WalletSigner;

pub use challenge::{generate_session_public_key, ChallengeParams, DEFAULT_WINDOW_DAYS};
pub use session::{DecryptionSession, SessionError, SessionEvent, SessionState};

/// Plaintext financials of one bond.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevealedBond {
    pub bond_id: String,
    pub expected_yield: f64,
    pub amount: f64,
}

/// Decode a bond's yield and amount through two signed sessions.
///
/// Yield is requested first. If either session fails the other value is
/// discarded; callers get both or neither.
pub async fn reveal_bond<W, C>(
    wallet: &W,
    codec: &C,
    params: &ChallengeParams,
    record: &BondRecord,
    timeout: Option<Duration>,
    cancel: &CancellationToken,
) -> Result<RevealedBond, SessionError>
where
    W: WalletSigner,
    C: NumericCodec,
{
    let expected_yield = DecryptionSession::new(wallet, codec, params.clone())
        .with_timeout(timeout)
        .decrypt(&record.encrypted_yield, cancel)
        .await
        .inspect_err(|e| tracing::info!(bond_id = %record.id, error = %e, "Yield reveal aborted"))?;

    let amount = DecryptionSession::new(wallet, codec, params.clone())
        .with_timeout(timeout)
        .decrypt(&record.encrypted_amount, cancel)
        .await
        .inspect_err(|e| tracing::info!(bond_id = %record.id, error = %e, "Amount reveal aborted"))?;

    tracing::info!(bond_id = %record.id, "Bond financials revealed");

    Ok(RevealedBond {
        bond_id: record.id.clone(),
        expected_yield,
        amount,
    })
}
