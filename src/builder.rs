//! Assembly of a payable batch into one prepared transaction.
//!
//! Building is pure: no network or signing I/O, and identical inputs
//! produce an identical instruction set. The compute-unit limit is
//! capped because the ledger enforces a hard per-transaction ceiling;
//! without the cap a large enough recipient list would be rejected
//! outright.

use thiserror::Error;

use crate::address::Address;
use crate::plan::PayableBatch;
use crate::types::Checkpoint;
use crate::units;

/// Compute units budgeted per transfer instruction.
pub const TRANSFER_COMPUTE_UNITS: u32 = 450;

/// Protocol ceiling on compute units per transaction.
pub const MAX_COMPUTE_UNITS: u32 = 1_400_000;

/// One native transfer, in ledger units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferInstruction {
    pub from: Address,
    pub to: Address,
    pub lamports: u64,
}

/// An immutable transaction payload bound to one checkpoint.
///
/// A retry after expiry builds a new one against a new checkpoint;
/// the old payload is never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTransaction {
    pub payer: Address,
    pub instructions: Vec<TransferInstruction>,
    pub compute_unit_limit: u32,
    pub blockhash: String,
    pub expiry_height: u64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("amount {amount} SOL for {to} truncates to zero lamports")]
    AmountRoundsToZero {
        to: Address,
        amount: rust_decimal::Decimal,
    },
    #[error("amount for {to} is not representable in lamports")]
    AmountUnrepresentable { to: Address },
}

/// Compute-unit budget for a transfer count, capped at the protocol
/// ceiling.
pub fn compute_unit_limit(instruction_count: usize) -> u32 {
    let wanted = (instruction_count as u64) * (TRANSFER_COMPUTE_UNITS as u64);
    wanted.min(MAX_COMPUTE_UNITS as u64) as u32
}

/// Pack a batch into a prepared transaction bound to `checkpoint`.
///
/// Amounts convert to lamports truncating toward zero; a positive
/// amount that truncates to zero is a validation failure, not a
/// silent no-op.
pub fn build(
    batch: &PayableBatch,
    payer: &Address,
    checkpoint: &Checkpoint,
) -> Result<PreparedTransaction, BuildError> {
    let mut instructions = Vec::with_capacity(batch.recipients.len());
    for recipient in &batch.recipients {
        let lamports = units::sol_to_lamports(recipient.amount).map_err(|_| {
            BuildError::AmountUnrepresentable {
                to: recipient.address,
            }
        })?;
        if lamports == 0 {
            return Err(BuildError::AmountRoundsToZero {
                to: recipient.address,
                amount: recipient.amount,
            });
        }
        instructions.push(TransferInstruction {
            from: *payer,
            to: recipient.address,
            lamports,
        });
    }

    Ok(PreparedTransaction {
        payer: *payer,
        compute_unit_limit: compute_unit_limit(instructions.len()),
        instructions,
        blockhash: checkpoint.blockhash.clone(),
        expiry_height: checkpoint.last_valid_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::plan;
    use crate::draft::DraftRow;
    use crate::units::LAMPORTS_PER_SOL;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const ADDR_A: &str = "So11111111111111111111111111111111111111112";
    const ADDR_B: &str = "Vote111111111111111111111111111111111111111";
    const PAYER: &str = "Stake11111111111111111111111111111111111111";

    fn checkpoint() -> Checkpoint {
        Checkpoint {
            blockhash: "GfVcyD4kkTrj4bKc7WA9sZCin9JDbdT4Zkd3EittNR1W".to_string(),
            last_valid_height: 250_000_100,
        }
    }

    fn batch(entries: &[(&str, &str)]) -> PayableBatch {
        let rows: Vec<DraftRow> = entries
            .iter()
            .map(|(a, amt)| DraftRow {
                address: a.to_string(),
                amount: Decimal::from_str(amt).unwrap(),
            })
            .collect();
        plan(&rows, 1_000 * LAMPORTS_PER_SOL).unwrap()
    }

    // ==================== build tests ====================

    #[test]
    fn test_build_converts_amounts_in_batch_order() {
        let payer: Address = PAYER.parse().unwrap();
        let tx = build(&batch(&[(ADDR_A, "0.5"), (ADDR_B, "1.2")]), &payer, &checkpoint()).unwrap();
        assert_eq!(tx.instructions.len(), 2);
        assert_eq!(tx.instructions[0].lamports, 500_000_000);
        assert_eq!(tx.instructions[0].to.to_string(), ADDR_A);
        assert_eq!(tx.instructions[0].from, payer);
        assert_eq!(tx.instructions[1].lamports, 1_200_000_000);
        assert_eq!(tx.instructions[1].to.to_string(), ADDR_B);
    }

    #[test]
    fn test_build_binds_checkpoint() {
        let payer: Address = PAYER.parse().unwrap();
        let cp = checkpoint();
        let tx = build(&batch(&[(ADDR_A, "1")]), &payer, &cp).unwrap();
        assert_eq!(tx.blockhash, cp.blockhash);
        assert_eq!(tx.expiry_height, cp.last_valid_height);
        assert_eq!(tx.payer, payer);
    }

    #[test]
    fn test_build_is_deterministic() {
        let payer: Address = PAYER.parse().unwrap();
        let b = batch(&[(ADDR_A, "0.5"), (ADDR_B, "1.2")]);
        let cp = checkpoint();
        assert_eq!(build(&b, &payer, &cp).unwrap(), build(&b, &payer, &cp).unwrap());
    }

    #[test]
    fn test_build_rejects_sub_lamport_amount() {
        let payer: Address = PAYER.parse().unwrap();
        let b = batch(&[(ADDR_A, "1"), (ADDR_B, "0.0000000001")]);
        let err = build(&b, &payer, &checkpoint()).unwrap_err();
        assert!(matches!(err, BuildError::AmountRoundsToZero { .. }));
    }

    // ==================== compute budget tests ====================

    #[test]
    fn test_compute_unit_limit_scales_with_count() {
        assert_eq!(compute_unit_limit(1), TRANSFER_COMPUTE_UNITS);
        assert_eq!(compute_unit_limit(10), 10 * TRANSFER_COMPUTE_UNITS);
    }

    #[test]
    fn test_compute_unit_limit_caps_at_protocol_max() {
        // 450 units * 3112 transfers crosses the 1.4M ceiling
        assert_eq!(compute_unit_limit(3_112), MAX_COMPUTE_UNITS);
        assert_eq!(compute_unit_limit(1_000_000), MAX_COMPUTE_UNITS);
    }

    #[test]
    fn test_build_sets_compute_limit() {
        let payer: Address = PAYER.parse().unwrap();
        let tx = build(&batch(&[(ADDR_A, "1"), (ADDR_B, "1")]), &payer, &checkpoint()).unwrap();
        assert_eq!(tx.compute_unit_limit, 2 * TRANSFER_COMPUTE_UNITS);
    }
}
