// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Numeric Codec
//!
//! Reversible encoding of bond financials into opaque, tagged strings.
//!
//! The [`NumericCodec`] trait is the seam a real homomorphic scheme plugs
//! into. Callers only ever see `encode(f64) -> String` and
//! `decode(&str) -> Result<f64, CodecError>`, so a ciphertext-backed codec
//! with its own key material can replace [`PlaceholderCodec`] without touching
//! the registry, the decryption session or the stored payload format.
//!
//! ## Contract
//!
//! - For every finite `x`, `decode(encode(x)) == x` exactly.
//! - Encoded output starts with a format tag, so `decode` can tell it apart
//!   from legacy plain numeric text.
//! - Untagged input is parsed as a plain number; anything else is a
//!   [`CodecError::Format`].

use base64ct::{Base64, Encoding};

/// Tag prefixed to every value produced by [`PlaceholderCodec`].
pub const FHE_TAG: &str = "FHE-";

/// Errors returned by [`NumericCodec::decode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Input is neither tagged nor a plain finite number.
    #[error("Unrecognized encoded value: {0}")]
    Format(String),

    /// Input carries the tag but its body is malformed.
    #[error("Malformed tagged value: {0}")]
    Decode(String),
}

/// Reversible numeric codec.
pub trait NumericCodec: Send + Sync {
    /// Encode a finite value into an opaque tagged string.
    ///
    /// Callers must pass finite input; issuance validation rejects NaN and
    /// infinities before encoding.
    fn encode(&self, value: f64) -> String;

    /// Decode a tagged value, falling back to a plain numeric parse for
    /// untagged input.
    fn decode(&self, encoded: &str) -> Result<f64, CodecError>;
}

/// Stand-in codec: `FHE-` followed by the base64 of the shortest decimal
/// text that round-trips the value.
///
/// Provides no confidentiality whatsoever.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderCodec;

impl PlaceholderCodec {
    pub fn new() -> Self {
        Self
    }
}

impl NumericCodec for PlaceholderCodec {
    fn encode(&self, value: f64) -> String {
        debug_assert!(value.is_finite(), "encode requires a finite value, got {value}");
        // `Display` for f64 emits the shortest text that parses back to the
        // same bits, so the round trip is exact.
        let text = value.to_string();
        format!("{FHE_TAG}{}", Base64::encode_string(text.as_bytes()))
    }

    fn decode(&self, encoded: &str) -> Result<f64, CodecError> {
        if let Some(body) = encoded.strip_prefix(FHE_TAG) {
            let bytes = Base64::decode_vec(body)
                .map_err(|e| CodecError::Decode(format!("invalid base64: {e}")))?;
            let text = String::from_utf8(bytes)
                .map_err(|e| CodecError::Decode(format!("invalid UTF-8: {e}")))?;
            return parse_finite(&text).ok_or_else(|| CodecError::Decode(text));
        }

        parse_finite(encoded.trim()).ok_or_else(|| CodecError::Format(encoded.to_string()))
    }
}

fn parse_finite(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}
