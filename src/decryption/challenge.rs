// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signature challenge bound to ledger coordinates.

use chrono::Utc;
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::rand_core::OsRng;

use crate::wallet::WalletSigner;

const SECONDS_PER_DAY: i64 = 86_400;

/// Default lifetime of a challenge's validity window.
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Everything a challenge message commits to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeParams {
    /// Session public key (`0x`-prefixed hex).
    pub public_key: String,
    pub contract_address: String,
    pub chain_id: u64,
    /// Unix seconds.
    pub window_start: i64,
    pub duration_days: u32,
}

impl ChallengeParams {
    /// Parameters with a freshly generated session public key.
    pub fn new(
        contract_address: impl Into<String>,
        chain_id: u64,
        window_start: i64,
        duration_days: u32,
    ) -> Self {
        Self {
            public_key: generate_session_public_key(),
            contract_address: contract_address.into(),
            chain_id,
            window_start,
            duration_days,
        }
    }

    /// Parameters for `wallet`'s current chain, with the window opening now.
    pub fn for_wallet<W: WalletSigner>(
        wallet: &W,
        contract_address: impl Into<String>,
        duration_days: u32,
    ) -> Self {
        Self::new(
            contract_address,
            wallet.current_chain_id(),
            Utc::now().timestamp(),
            duration_days,
        )
    }

    /// Unix second at which the window closes.
    pub fn window_end(&self) -> i64 {
        self.window_start
            .saturating_add(i64::from(self.duration_days).saturating_mul(SECONDS_PER_DAY))
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.window_end()
    }

    /// The exact text handed to the wallet for signing.
    pub fn message(&self) -> String {
        format!(
            "publickey:{}\ncontractAddresses:{}\ncontractsChainId:{}\nstartTimestamp:{}\ndurationDays:{}",
            self.public_key,
            self.contract_address,
            self.chain_id,
            self.window_start,
            self.duration_days
        )
    }
}

/// Session public key: the uncompressed secp256k1 point (x ‖ y, 64 bytes)
/// of a freshly generated keypair, as `0x`-prefixed hex.
///
/// The private half is dropped; the placeholder codec has no use for it.
pub fn generate_session_public_key() -> String {
    let signing_key = SigningKey::random(&mut OsRng);
    let point = signing_key.verifying_key().to_encoded_point(false);
    // Skip the 0x04 SEC1 tag
    alloy::hex::encode_prefixed(&point.as_bytes()[1..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ChallengeParams {
        ChallengeParams {
            public_key: "0xabcd".to_string(),
            contract_address: "0x5FbDB2315678afecb367f032d93F642f64180aa3".to_string(),
            chain_id: 11155111,
            window_start: 1_760_000_000,
            duration_days: 30,
        }
    }

    #[test]
    fn message_layout_is_exact() {
        assert_eq!(
            params().message(),
            "publickey:0xabcd\n\
             contractAddresses:0x5FbDB2315678afecb367f032d93F642f64180aa3\n\
             contractsChainId:11155111\n\
             startTimestamp:1760000000\n\
             durationDays:30"
        );
    }

    #[test]
    fn message_is_deterministic() {
        assert_eq!(params().message(), params().message());
    }

    #[test]
    fn window_bounds() {
        let p = params();
        assert_eq!(p.window_end(), 1_760_000_000 + 30 * 86_400);
        assert!(!p.is_expired_at(p.window_start));
        assert!(!p.is_expired_at(p.window_end() - 1));
        assert!(p.is_expired_at(p.window_end()));
    }

    #[test]
    fn session_keys_are_fresh_hex() {
        let a = generate_session_public_key();
        let b = generate_session_public_key();
        assert_ne!(a, b);
        assert!(a.starts_with("0x"));
        assert_eq!(a.len(), 2 + 128);
        assert!(a[2..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn session_key_is_a_curve_point() {
        let key = generate_session_public_key();
        let mut sec1 = vec![0x04];
        sec1.extend(alloy::hex::decode(&key).unwrap());
        assert!(k256::PublicKey::from_sec1_bytes(&sec1).is_ok());
    }
}
