//! Turning a draft list into a payable batch.
//!
//! Planning is tolerant where the parser is strict: rows that are
//! blank, non-positive, or carry an invalid address are dropped
//! without per-row errors, since a manual-entry surface routinely
//! holds half-finished rows. What survives must fit the available
//! balance before anything is signed.

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::address::Address;
use crate::draft::DraftRow;
use crate::parse::Recipient;
use crate::units::{self, AmountError};

/// The validated, costed subset of a draft list. Never mutated after
/// construction; discarded once the send attempt settles.
#[derive(Debug, Clone, PartialEq)]
pub struct PayableBatch {
    pub recipients: Vec<Recipient>,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("no payable recipients in the list")]
    EmptyBatch,
    #[error("insufficient balance: need {required} SOL, have {available} SOL")]
    InsufficientBalance {
        required: Decimal,
        available: Decimal,
    },
    #[error("batch total is not representable on the ledger")]
    UnrepresentableTotal(#[from] AmountError),
}

/// Filter a draft snapshot down to payable rows and check the total
/// against the available balance (in lamports).
///
/// Input order is preserved so a batch reads like the list it came
/// from.
pub fn plan(rows: &[DraftRow], available_lamports: u64) -> Result<PayableBatch, PlanError> {
    let recipients: Vec<Recipient> = rows
        .iter()
        .filter(|row| !row.address.is_empty() && row.amount > Decimal::ZERO)
        .filter_map(|row| {
            Address::from_str(&row.address).ok().map(|address| Recipient {
                address,
                amount: row.amount,
            })
        })
        .collect();

    if recipients.is_empty() {
        return Err(PlanError::EmptyBatch);
    }

    let total: Decimal = recipients.iter().map(|r| r.amount).sum();
    let required_lamports = units::sol_to_lamports(total)?;
    if required_lamports > available_lamports {
        return Err(PlanError::InsufficientBalance {
            required: total,
            available: units::lamports_to_sol(available_lamports),
        });
    }

    Ok(PayableBatch { recipients, total })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::LAMPORTS_PER_SOL;

    const ADDR_A: &str = "So11111111111111111111111111111111111111112";
    const ADDR_B: &str = "Vote111111111111111111111111111111111111111";

    fn row(address: &str, amount: &str) -> DraftRow {
        DraftRow {
            address: address.to_string(),
            amount: Decimal::from_str(amount).unwrap(),
        }
    }

    // ==================== filtering tests ====================

    #[test]
    fn test_plan_keeps_valid_rows_in_order() {
        let rows = vec![row(ADDR_A, "0.5"), row(ADDR_B, "1.2")];
        let batch = plan(&rows, 2 * LAMPORTS_PER_SOL).unwrap();
        assert_eq!(batch.recipients.len(), 2);
        assert_eq!(batch.recipients[0].address.to_string(), ADDR_A);
        assert_eq!(batch.recipients[1].address.to_string(), ADDR_B);
        assert_eq!(batch.total, Decimal::from_str("1.7").unwrap());
    }

    #[test]
    fn test_plan_silently_drops_unpayable_rows() {
        let rows = vec![
            row("", "1.0"),
            row(ADDR_A, "0"),
            row("notanaddress", "1.0"),
            row(ADDR_B, "-2"),
            row(ADDR_A, "0.25"),
        ];
        let batch = plan(&rows, LAMPORTS_PER_SOL).unwrap();
        assert_eq!(batch.recipients.len(), 1);
        assert_eq!(batch.total, Decimal::from_str("0.25").unwrap());
    }

    #[test]
    fn test_plan_accepts_hex_prefixed_address() {
        let rows = vec![row(&format!("0x{}", "00".repeat(32)), "0.1")];
        let batch = plan(&rows, LAMPORTS_PER_SOL).unwrap();
        assert_eq!(
            batch.recipients[0].address.to_string(),
            "11111111111111111111111111111111"
        );
    }

    #[test]
    fn test_plan_keeps_repeated_addresses_unmerged() {
        let rows = vec![row(ADDR_A, "0.1"), row(ADDR_A, "0.2")];
        let batch = plan(&rows, LAMPORTS_PER_SOL).unwrap();
        assert_eq!(batch.recipients.len(), 2);
        assert_eq!(batch.total, Decimal::from_str("0.3").unwrap());
    }

    // ==================== error tests ====================

    #[test]
    fn test_plan_empty_batch() {
        assert_eq!(plan(&[], LAMPORTS_PER_SOL), Err(PlanError::EmptyBatch));
        let rows = vec![row("", "0"), row("junk", "1")];
        assert_eq!(plan(&rows, LAMPORTS_PER_SOL), Err(PlanError::EmptyBatch));
    }

    #[test]
    fn test_plan_insufficient_balance() {
        let rows = vec![row(ADDR_A, "0.5"), row(ADDR_B, "1.2")];
        let err = plan(&rows, LAMPORTS_PER_SOL).unwrap_err();
        assert_eq!(
            err,
            PlanError::InsufficientBalance {
                required: Decimal::from_str("1.7").unwrap(),
                available: Decimal::from_str("1.0").unwrap(),
            }
        );
    }

    #[test]
    fn test_plan_exact_balance_passes() {
        let rows = vec![row(ADDR_A, "1")];
        assert!(plan(&rows, LAMPORTS_PER_SOL).is_ok());
        assert!(matches!(
            plan(&rows, LAMPORTS_PER_SOL - 1),
            Err(PlanError::InsufficientBalance { .. })
        ));
    }

    #[test]
    fn test_plan_total_is_exact_over_many_rows() {
        // 0.1 ten times is exactly 1 in decimal arithmetic
        let rows: Vec<DraftRow> = (0..10).map(|_| row(ADDR_A, "0.1")).collect();
        let batch = plan(&rows, LAMPORTS_PER_SOL).unwrap();
        assert_eq!(batch.total, Decimal::from_str("1").unwrap());
    }
}
