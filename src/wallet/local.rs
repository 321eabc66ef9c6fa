// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Local key wallet.
//!
//! Loads a secp256k1 key from PEM (SEC1 or PKCS#8) and signs personal
//! messages with alloy's local signer. Used by the server to stamp the
//! issuer of bonds it issues.

use alloy::signers::{local::PrivateKeySigner, Signer};
use k256::SecretKey;

use super::{SignerError, WalletSigner};

/// Parse a private key from PEM format to hex string.
///
/// # Returns
/// * `Ok(String)` - Hex-encoded private key (64 characters, no 0x prefix)
/// * `Err(SignerError)` - If PEM parsing fails
pub fn pem_to_hex(pem_bytes: &[u8]) -> Result<String, SignerError> {
    let pem_str = std::str::from_utf8(pem_bytes)
        .map_err(|e| SignerError::InvalidKey(format!("Invalid UTF-8: {e}")))?;

    let pem = pem::parse(pem_str)
        .map_err(|e| SignerError::InvalidKey(format!("Invalid PEM: {e}")))?;

    let secret_key = SecretKey::from_sec1_der(pem.contents())
        .or_else(|_| parse_pkcs8_to_secret_key(pem.contents()))
        .map_err(|e| SignerError::InvalidKey(format!("Invalid key format: {e}")))?;

    Ok(alloy::hex::encode(secret_key.to_bytes()))
}

fn parse_pkcs8_to_secret_key(der: &[u8]) -> Result<SecretKey, String> {
    use k256::pkcs8::DecodePrivateKey;
    SecretKey::from_pkcs8_der(der).map_err(|e| e.to_string())
}

/// Wallet backed by a private key held in process memory.
#[derive(Debug, Clone)]
pub struct LocalWalletSigner {
    signer: PrivateKeySigner,
    chain_id: u64,
}

impl LocalWalletSigner {
    /// Create from a hex private key (with or without `0x`).
    pub fn from_hex(private_key_hex: &str, chain_id: u64) -> Result<Self, SignerError> {
        let key_bytes = alloy::hex::decode(private_key_hex.trim())
            .map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        let signer = PrivateKeySigner::from_slice(&key_bytes)
            .map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        Ok(Self { signer, chain_id })
    }

    /// Create from PEM-encoded private key bytes.
    pub fn from_pem(pem_bytes: &[u8], chain_id: u64) -> Result<Self, SignerError> {
        let hex_key = pem_to_hex(pem_bytes)?;
        Self::from_hex(&hex_key, chain_id)
    }
}

impl WalletSigner for LocalWalletSigner {
    async fn sign(&self, message: &str) -> Result<String, SignerError> {
        let signature = self
            .signer
            .sign_message(message.as_bytes())
            .await
            .map_err(|e| SignerError::Unavailable(e.to_string()))?;
        Ok(alloy::hex::encode_prefixed(signature.as_bytes()))
    }

    fn current_address(&self) -> String {
        self.signer.address().to_checksum(None)
    }

    fn current_chain_id(&self) -> u64 {
        self.chain_id
    }
}
