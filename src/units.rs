//! Exact SOL amount arithmetic.
//!
//! Amounts stay in `Decimal` through parsing and totals and only
//! become integer lamports at transaction assembly. Binary floating
//! point is never used: drift in a running total could understate the
//! required balance or flip an amount across a lamport rounding
//! threshold.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

/// Lamports per SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount {0} is negative")]
    Negative(Decimal),
    #[error("amount {0} does not fit in a lamport balance")]
    TooLarge(Decimal),
}

/// Convert a SOL amount to lamports, truncating toward zero.
///
/// Truncation is the settlement rule; whether a truncated-to-zero
/// result is acceptable is the caller's decision (the transaction
/// builder treats it as a validation failure).
pub fn sol_to_lamports(amount: Decimal) -> Result<u64, AmountError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AmountError::Negative(amount));
    }
    let scaled = amount
        .checked_mul(Decimal::from(LAMPORTS_PER_SOL))
        .ok_or(AmountError::TooLarge(amount))?;
    scaled
        .trunc()
        .to_u64()
        .ok_or(AmountError::TooLarge(amount))
}

/// Convert lamports back to an exact SOL amount (scale 9).
pub fn lamports_to_sol(lamports: u64) -> Decimal {
    Decimal::from_i128_with_scale(lamports as i128, 9)
}

/// Render a SOL amount without trailing zeros, for diagnostics.
pub fn format_sol(amount: Decimal) -> String {
    amount.normalize().to_string()
}
