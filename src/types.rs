//! Common types shared across modules.

use std::fmt;

/// A recent network checkpoint anchoring a transaction's validity
/// window. Single use: every build, including a retry, gets a fresh
/// one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub blockhash: String,
    pub last_valid_height: u64,
}

/// Identifier of a submitted transaction, as returned by the signer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignatureId(pub String);

impl fmt::Display for SignatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of waiting on a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmStatus {
    /// Irreversibly committed by the network.
    Finalized,
    /// The checkpoint's validity window closed before finalization.
    Expired,
}
