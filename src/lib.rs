//! Soldisperse - batch SOL dispersal core.
//!
//! Fans a single wallet's balance out to many recipients in one
//! atomic transaction: untrusted recipient input (pasted rows, an
//! uploaded CSV, or manual entry) is parsed and validated, costed
//! against the available balance, packed into a compute-capped
//! transaction bound to a fresh blockhash, and submitted through an
//! injected signer with a single bounded retry on blockhash expiry.
//!
//! The presentation surface (wallet connection UI, file pickers,
//! toasts) lives outside this crate and talks to it through the
//! [`Signer`] and [`LedgerClient`] traits.

pub mod address;
pub mod builder;
pub mod client;
pub mod config;
pub mod draft;
pub mod parse;
pub mod pipeline;
pub mod plan;
pub mod rpc;
pub mod submit;
pub mod types;
pub mod units;

pub use address::Address;
pub use builder::{build, PreparedTransaction, TransferInstruction};
pub use client::{ClientError, LedgerClient, Signer, SignerError};
pub use config::Config;
pub use draft::{DraftField, DraftList, DraftRow};
pub use parse::{parse_recipients, ParseError, Recipient};
pub use pipeline::{DisperseError, DispersePipeline, DisperseReceipt};
pub use plan::{plan, PayableBatch, PlanError};
pub use rpc::RpcLedgerClient;
pub use submit::{SubmissionCoordinator, SubmitError, SubmitPhase};
pub use types::{Checkpoint, ConfirmStatus, SignatureId};
