//! End-to-end dispersal pipeline.
//!
//! One send runs as a single sequential flow: snapshot → balance →
//! plan → build/sign/confirm. A second send for the same pipeline is
//! refused outright while one is in flight, never queued, so two
//! prepared transactions cannot race the same balance snapshot.

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use crate::address::Address;
use crate::client::{ClientError, LedgerClient, Signer};
use crate::draft::DraftRow;
use crate::plan::{self, PlanError};
use crate::submit::{SubmissionCoordinator, SubmitError};
use crate::types::SignatureId;
use crate::units::format_sol;

/// Summary of a settled send, for the caller to render.
#[derive(Debug, Clone, PartialEq)]
pub struct DisperseReceipt {
    pub signature: SignatureId,
    pub recipients: usize,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DisperseError {
    #[error("no signer connected")]
    SignerDisconnected,
    #[error("a send is already in flight")]
    SendInFlight,
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// Orchestrates dispersal against injected collaborators.
pub struct DispersePipeline {
    signer: Arc<dyn Signer>,
    client: Arc<dyn LedgerClient>,
    in_flight: Mutex<()>,
}

impl DispersePipeline {
    pub fn new(signer: Arc<dyn Signer>, client: Arc<dyn LedgerClient>) -> Self {
        Self {
            signer,
            client,
            in_flight: Mutex::new(()),
        }
    }

    /// Run one send attempt over a draft snapshot.
    ///
    /// Stages are awaited strictly in order; the only retry lives
    /// inside the submission coordinator (checkpoint expiry).
    pub async fn disperse(
        &self,
        rows: &[DraftRow],
        payer: &Address,
    ) -> Result<DisperseReceipt, DisperseError> {
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| DisperseError::SendInFlight)?;

        if !self.signer.is_connected() {
            return Err(DisperseError::SignerDisconnected);
        }

        let available = self.client.balance(payer).await?;
        let batch = plan::plan(rows, available)?;
        info!(
            recipients = batch.recipients.len(),
            total = %format_sol(batch.total),
            "batch planned, submitting"
        );

        let coordinator = SubmissionCoordinator::new(&*self.signer, &*self.client);
        let signature = coordinator.send_batch(&batch, payer).await?;

        let receipt = DisperseReceipt {
            signature,
            recipients: batch.recipients.len(),
            total: batch.total,
        };
        info!(
            signature = %receipt.signature,
            recipients = receipt.recipients,
            "dispersal complete"
        );
        Ok(receipt)
    }
}
