//! Strict parsing of pasted or uploaded recipient lists.
//!
//! Input is UTF-8 text, one `address,amount` record per line, with an
//! optional header row. Parsing is all-or-nothing: the first bad row
//! fails the whole parse with the 1-based line number and the raw line
//! verbatim, and no caller state is touched.

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::address::Address;

/// A validated transfer target.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipient {
    pub address: Address,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("recipient input is empty")]
    EmptyInput,
    #[error("no data rows after the header")]
    NoDataRows,
    #[error("line {line_number}: expected `address,amount`, got `{line}`")]
    MalformedRow { line_number: usize, line: String },
    #[error("line {line_number}: `{value}` is not a positive amount (in `{line}`)")]
    InvalidAmount {
        line_number: usize,
        line: String,
        value: String,
    },
    #[error("line {line_number}: `{address}` is not a valid address (in `{line}`)")]
    InvalidAddress {
        line_number: usize,
        line: String,
        address: String,
    },
}

/// Header sniff: a first row whose lowercase form contains "address"
/// is column labels, not data.
fn is_header_row(line: &str) -> bool {
    line.to_lowercase().contains("address")
}

/// Whether an uploaded file name is an accepted recipient list.
pub fn is_supported_upload(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    lower.ends_with(".csv") || lower.ends_with(".txt")
}

/// Split a data row on its first comma into trimmed fields.
fn split_row(line: &str) -> Option<(&str, &str)> {
    let (address, amount) = line.split_once(',')?;
    let (address, amount) = (address.trim(), amount.trim());
    if address.is_empty() || amount.is_empty() {
        return None;
    }
    Some((address, amount))
}

/// Parse recipient rows from raw text.
///
/// Row order is preserved. Line numbers in errors are 1-based and
/// refer to the original input, including blank and header lines.
pub fn parse_recipients(content: &str) -> Result<Vec<Recipient>, ParseError> {
    let mut rows: Vec<(usize, &str)> = content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
        .filter(|(_, line)| !line.trim().is_empty())
        .collect();

    if rows.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    if is_header_row(rows[0].1) {
        rows.remove(0);
        if rows.is_empty() {
            return Err(ParseError::NoDataRows);
        }
    }

    let mut recipients = Vec::with_capacity(rows.len());
    for (line_number, raw) in rows {
        let line = raw.trim();
        let (address_text, amount_text) =
            split_row(line).ok_or_else(|| ParseError::MalformedRow {
                line_number,
                line: raw.to_string(),
            })?;

        let amount = match Decimal::from_str(amount_text) {
            Ok(a) if a > Decimal::ZERO => a,
            _ => {
                return Err(ParseError::InvalidAmount {
                    line_number,
                    line: raw.to_string(),
                    value: amount_text.to_string(),
                })
            }
        };

        let address = match Address::from_str(address_text) {
            Ok(a) => a,
            Err(_) => {
                return Err(ParseError::InvalidAddress {
                    line_number,
                    line: raw.to_string(),
                    address: address_text.to_string(),
                })
            }
        };

        recipients.push(Recipient { address, amount });
    }

    Ok(recipients)
}
