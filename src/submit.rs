//! Submission of a prepared transaction through the connected signer.
//!
//! Progress is modeled as an explicit phase enum with a guarded
//! transition table rather than nested error handling, so the
//! single-retry invariant is mechanically checkable. Checkpoint
//! expiry is the only retried failure: an expired transaction was
//! never finalized, so rebuilding against a fresh checkpoint cannot
//! double-spend. Everything else is terminal.

use thiserror::Error;
use tracing::{info, warn};

use crate::address::Address;
use crate::builder::{self, BuildError};
use crate::client::{ClientError, LedgerClient, Signer, SignerError};
use crate::plan::PayableBatch;
use crate::types::{ConfirmStatus, SignatureId};

/// Expiry retries allowed per send. Bounded on purpose: unbounded
/// retry would mask a stuck network or a stale balance snapshot.
pub const MAX_EXPIRY_RETRIES: u32 = 1;

/// Lifecycle of one submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitPhase {
    Built,
    Signing,
    Submitted,
    Confirming,
    Finalized,
    Expired,
    Rejected,
}

impl SubmitPhase {
    /// Legal forward transitions. Everything not listed is a
    /// programming error.
    pub fn can_advance_to(self, next: SubmitPhase) -> bool {
        use SubmitPhase::*;
        matches!(
            (self, next),
            (Built, Signing)
                | (Signing, Submitted)
                | (Signing, Rejected)
                | (Submitted, Confirming)
                | (Confirming, Finalized)
                | (Confirming, Expired)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SubmitPhase::Finalized | SubmitPhase::Expired | SubmitPhase::Rejected
        )
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    /// Signer-side refusal. Terminal, never retried.
    #[error("transaction rejected: {reason}")]
    Rejected { reason: String },
    /// A rebuilt transaction expired again; the send gives up.
    #[error("checkpoint expired again after retrying with a fresh one")]
    RetryExhausted,
    #[error("submission failed: {0}")]
    Network(#[from] ClientError),
    #[error("cannot assemble transaction: {0}")]
    Build(#[from] BuildError),
}

/// Drives sign → submit → confirm for one payable batch.
pub struct SubmissionCoordinator<'a> {
    signer: &'a dyn Signer,
    client: &'a dyn LedgerClient,
}

/// Phase tracker for one attempt. Transitions are asserted against
/// the table above.
#[derive(Debug)]
struct Attempt {
    number: u32,
    phase: SubmitPhase,
}

impl Attempt {
    fn new(number: u32) -> Self {
        Self {
            number,
            phase: SubmitPhase::Built,
        }
    }

    fn advance(&mut self, next: SubmitPhase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal submit transition {:?} -> {:?}",
            self.phase,
            next
        );
        self.phase = next;
    }
}

impl<'a> SubmissionCoordinator<'a> {
    pub fn new(signer: &'a dyn Signer, client: &'a dyn LedgerClient) -> Self {
        Self { signer, client }
    }

    /// Submit `batch` from `payer`, rebuilding once on checkpoint
    /// expiry.
    ///
    /// Each attempt fetches a fresh checkpoint and assembles a new
    /// transaction; an expired payload is discarded, never resent.
    pub async fn send_batch(
        &self,
        batch: &PayableBatch,
        payer: &Address,
    ) -> Result<SignatureId, SubmitError> {
        for attempt_number in 1..=(MAX_EXPIRY_RETRIES + 1) {
            let mut attempt = Attempt::new(attempt_number);

            let checkpoint = self.client.recent_checkpoint().await?;
            let tx = builder::build(batch, payer, &checkpoint)?;
            info!(
                attempt = attempt.number,
                recipients = tx.instructions.len(),
                blockhash = %tx.blockhash,
                expiry_height = tx.expiry_height,
                "submitting batch transfer"
            );

            attempt.advance(SubmitPhase::Signing);
            let signature = match self.signer.sign_and_send(&tx).await {
                Ok(signature) => signature,
                Err(SignerError::Rejected(reason)) => {
                    attempt.advance(SubmitPhase::Rejected);
                    return Err(SubmitError::Rejected { reason });
                }
                Err(SignerError::NotConnected) => {
                    attempt.advance(SubmitPhase::Rejected);
                    return Err(SubmitError::Rejected {
                        reason: "no signer connected".to_string(),
                    });
                }
            };

            attempt.advance(SubmitPhase::Submitted);
            info!(%signature, "transaction broadcast, awaiting finalization");

            attempt.advance(SubmitPhase::Confirming);
            match self.client.confirm(&signature, tx.expiry_height).await? {
                ConfirmStatus::Finalized => {
                    attempt.advance(SubmitPhase::Finalized);
                    info!(%signature, "batch transfer finalized");
                    return Ok(signature);
                }
                ConfirmStatus::Expired => {
                    attempt.advance(SubmitPhase::Expired);
                    if attempt.number > MAX_EXPIRY_RETRIES {
                        warn!(%signature, "checkpoint expired again, giving up");
                        return Err(SubmitError::RetryExhausted);
                    }
                    warn!(
                        %signature,
                        "checkpoint expired before finalization, rebuilding with a fresh one"
                    );
                }
            }
        }

        // The loop always returns from its final iteration.
        unreachable!("send_batch exceeded its attempt bound")
    }
}
