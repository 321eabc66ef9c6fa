// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signature-gated decode session.
//!
//! ```text
//! Idle ─▶ ChallengeBuilt ─▶ AwaitingSignature ─▶ Authorized
//!   │            │                  ├──────────▶ Rejected
//!   └────────────┴──────────────────┴──────────▶ Cancelled
//! ```
//!
//! The codec is only called in `Authorized`. Waiting for the wallet never
//! holds a lock or touches the ledger, so listings and other sessions keep
//! running while one session waits.
//!
//! The produced signature is not verified against the wallet address. This
//! is a user-facing gate, not a confidentiality control.

use std::fmt;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::codec::{CodecError, NumericCodec};
use crate::wallet::{SignerError, WalletSigner};

use super::challenge::ChallengeParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    ChallengeBuilt,
    AwaitingSignature,
    Authorized,
    Cancelled,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    BuildChallenge,
    RequestSignature,
    Signed,
    Cancel,
    Reject,
}

impl SessionState {
    /// Pure transition function.
    pub fn apply(self, event: SessionEvent) -> Result<SessionState, SessionError> {
        use SessionEvent as E;
        use SessionState as S;

        match (self, event) {
            (S::Idle, E::BuildChallenge) => Ok(S::ChallengeBuilt),
            (S::ChallengeBuilt, E::RequestSignature) => Ok(S::AwaitingSignature),
            (S::AwaitingSignature, E::Signed) => Ok(S::Authorized),
            (S::AwaitingSignature, E::Reject) => Ok(S::Rejected),
            (S::Idle | S::ChallengeBuilt | S::AwaitingSignature, E::Cancel) => Ok(S::Cancelled),
            (from, event) => Err(SessionError::InvalidTransition { from, event }),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Authorized | SessionState::Cancelled | SessionState::Rejected
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Ways a session ends without producing a value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("Decryption cancelled")]
    Cancelled,

    /// Auto-cancelled after the configured signature timeout.
    #[error("Signature request timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Signature rejected: {0}")]
    SignatureRejected(String),

    #[error("Challenge window closed at {ended_at}")]
    WindowExpired { ended_at: i64 },

    #[error("Invalid session transition from {from} on {event:?}")]
    InvalidTransition {
        from: SessionState,
        event: SessionEvent,
    },

    #[error(transparent)]
    Decode(#[from] CodecError),
}

enum Outcome {
    Cancelled,
    TimedOut(Duration),
    Signed(Result<String, SignerError>),
}

/// One challenge/sign/decode run. Single use.
pub struct DecryptionSession<'a, W, C> {
    wallet: &'a W,
    codec: &'a C,
    params: ChallengeParams,
    timeout: Option<Duration>,
    state: SessionState,
    signature: Option<String>,
}

impl<'a, W: WalletSigner, C: NumericCodec> DecryptionSession<'a, W, C> {
    pub fn new(wallet: &'a W, codec: &'a C, params: ChallengeParams) -> Self {
        Self {
            wallet,
            codec,
            params,
            timeout: None,
            state: SessionState::Idle,
            signature: None,
        }
    }

    /// Auto-cancel if the wallet has not answered within `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn params(&self) -> &ChallengeParams {
        &self.params
    }

    /// Signature produced by the wallet, once authorized.
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    fn advance(&mut self, event: SessionEvent) -> Result<(), SessionError> {
        let next = self.state.apply(event)?;
        tracing::debug!(from = %self.state, to = %next, "Decryption session transition");
        self.state = next;
        Ok(())
    }

    /// Run the session against `encrypted`, returning the plaintext only if
    /// the wallet signs the challenge.
    ///
    /// Triggering `cancel` at any point before signing completes ends the
    /// session in `Cancelled` with no value.
    pub async fn decrypt(
        &mut self,
        encrypted: &str,
        cancel: &CancellationToken,
    ) -> Result<f64, SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                event: SessionEvent::BuildChallenge,
            });
        }

        if cancel.is_cancelled() {
            self.advance(SessionEvent::Cancel)?;
            return Err(SessionError::Cancelled);
        }

        if self.params.is_expired_at(Utc::now().timestamp()) {
            return Err(SessionError::WindowExpired {
                ended_at: self.params.window_end(),
            });
        }

        let message = self.params.message();
        self.advance(SessionEvent::BuildChallenge)?;
        self.advance(SessionEvent::RequestSignature)?;

        let wallet = self.wallet;
        let timeout = self.timeout;
        let deadline = async move {
            match timeout {
                Some(limit) => {
                    tokio::time::sleep(limit).await;
                    limit
                }
                None => std::future::pending().await,
            }
        };

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Outcome::Cancelled,
            limit = deadline => Outcome::TimedOut(limit),
            signed = wallet.sign(&message) => Outcome::Signed(signed),
        };

        match outcome {
            Outcome::Cancelled => {
                self.advance(SessionEvent::Cancel)?;
                Err(SessionError::Cancelled)
            }
            Outcome::TimedOut(limit) => {
                tracing::warn!(timeout = ?limit, "Signature request timed out, cancelling");
                self.advance(SessionEvent::Cancel)?;
                Err(SessionError::TimedOut(limit))
            }
            Outcome::Signed(Err(e)) => {
                tracing::info!(error = %e, "Wallet declined decryption challenge");
                self.advance(SessionEvent::Reject)?;
                Err(SessionError::SignatureRejected(e.to_string()))
            }
            Outcome::Signed(Ok(signature)) => {
                self.advance(SessionEvent::Signed)?;
                self.signature = Some(signature);
                Ok(self.codec.decode(encrypted)?)
            }
        }
    }
}
