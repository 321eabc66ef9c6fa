// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet signing collaborator.
//!
//! The registry stamps `issuer` from [`WalletSigner::current_address`] and the
//! decryption session asks [`WalletSigner::sign`] for a personal-message
//! signature over its challenge. Signing may take as long as the wallet's
//! owner wants; callers race it against cancellation.

use std::future::Future;

pub mod local;

pub use local::LocalWalletSigner;

/// Errors reported by a wallet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignerError {
    /// The owner declined to sign.
    #[error("Signature rejected: {0}")]
    Rejected(String),

    /// The wallet could not be reached or failed internally.
    #[error("Wallet unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid private key: {0}")]
    InvalidKey(String),
}

/// External signing capability bound to one account on one chain.
pub trait WalletSigner: Send + Sync {
    /// Sign `message` as an EIP-191 personal message. Returns the signature
    /// as `0x`-prefixed hex.
    fn sign(&self, message: &str) -> impl Future<Output = Result<String, SignerError>> + Send;

    /// Connected account address. Empty when no wallet is connected.
    fn current_address(&self) -> String;

    fn current_chain_id(&self) -> u64;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted wallets for exercising signing outcomes.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use tokio::sync::Notify;

    use super::{SignerError, WalletSigner};

    pub const TEST_ADDRESS: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f4aB12";
    pub const TEST_CHAIN_ID: u64 = 43113;

    #[derive(Clone)]
    pub enum Script {
        Approve,
        Reject,
        /// Never completes.
        Hang,
        /// Completes (approving) once the gate is notified.
        Gate(Arc<Notify>),
        /// Approve the first `n` requests, reject the rest.
        ApproveFirst(usize),
    }

    pub struct ScriptedSigner {
        script: Script,
        address: String,
        calls: AtomicUsize,
        messages: Mutex<Vec<String>>,
    }

    impl ScriptedSigner {
        pub fn new(script: Script) -> Self {
            Self {
                script,
                address: TEST_ADDRESS.to_string(),
                calls: AtomicUsize::new(0),
                messages: Mutex::new(Vec::new()),
            }
        }

        pub fn disconnected() -> Self {
            Self {
                address: String::new(),
                ..Self::new(Script::Approve)
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl WalletSigner for ScriptedSigner {
        async fn sign(&self, message: &str) -> Result<String, SignerError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            self.messages.lock().unwrap().push(message.to_string());

            match &self.script {
                Script::Approve => Ok(format!("0xsig{call}")),
                Script::Reject => Err(SignerError::Rejected("user rejected request".into())),
                Script::Hang => std::future::pending().await,
                Script::Gate(gate) => {
                    gate.notified().await;
                    Ok(format!("0xsig{call}"))
                }
                Script::ApproveFirst(n) if call < *n => Ok(format!("0xsig{call}")),
                Script::ApproveFirst(_) => {
                    Err(SignerError::Rejected("user rejected request".into()))
                }
            }
        }

        fn current_address(&self) -> String {
            self.address.clone()
        }

        fn current_chain_id(&self) -> u64 {
            TEST_CHAIN_ID
        }
    }
}
