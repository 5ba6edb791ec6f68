//! Collaborator seams: the connected signer and the ledger client.
//!
//! The core never constructs or stores private keys and never talks
//! to the network directly; both capabilities are injected so the
//! pipeline can run against a wallet surface in production and
//! scripted fakes in tests.

use async_trait::async_trait;
use thiserror::Error;

use crate::address::Address;
use crate::builder::PreparedTransaction;
use crate::types::{Checkpoint, ConfirmStatus, SignatureId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    /// The signer declined the transaction (user rejection, malformed
    /// payload). Terminal: never retried.
    #[error("signer rejected the transaction: {0}")]
    Rejected(String),
    /// No wallet session to sign with.
    #[error("no signer connected")]
    NotConnected,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    /// The ledger reported the transaction itself as failed.
    #[error("transaction failed on-chain: {0}")]
    TransactionFailed(String),
}

/// The external wallet surface: signs and broadcasts in one step.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Whether a wallet session is currently attached.
    fn is_connected(&self) -> bool;

    /// Sign `tx` and broadcast it, returning the signature.
    async fn sign_and_send(&self, tx: &PreparedTransaction) -> Result<SignatureId, SignerError>;
}

/// Read-side ledger access.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Spendable balance of `address`, in lamports.
    async fn balance(&self, address: &Address) -> Result<u64, ClientError>;

    /// Fetch a fresh checkpoint to anchor one transaction build.
    async fn recent_checkpoint(&self) -> Result<Checkpoint, ClientError>;

    /// Wait until `signature` finalizes or the chain passes
    /// `expiry_height`. Implementations must bound the wait: a
    /// dropped transaction resolves to `Expired`, never a hang.
    async fn confirm(
        &self,
        signature: &SignatureId,
        expiry_height: u64,
    ) -> Result<ConfirmStatus, ClientError>;
}
