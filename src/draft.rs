//! In-memory recipient list backing manual entry.
//!
//! This model only maintains shape for an editor surface: rows can be
//! appended, edited, and removed freely, and there is always at least
//! one row to edit. Validation is deferred entirely to the planner,
//! which is why `update` coerces unparsable amount text to zero
//! instead of rejecting it (lenient editing, strict planning).

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::parse::Recipient;

/// One editable row. The address is kept as raw text until planning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftRow {
    pub address: String,
    pub amount: Decimal,
}

/// Which field of a row an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Address,
    Amount,
}

/// Mutable recipient list owned by the editing surface.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftList {
    rows: Vec<DraftRow>,
}

impl DraftList {
    /// A list starts with a single empty placeholder row.
    pub fn new() -> Self {
        Self {
            rows: vec![DraftRow::default()],
        }
    }

    pub fn rows(&self) -> &[DraftRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append an empty placeholder row.
    pub fn add(&mut self) {
        self.rows.push(DraftRow::default());
    }

    /// Edit one field of one row.
    ///
    /// Out-of-range indexes are ignored and non-numeric amount text
    /// becomes zero; the planner filters such rows later.
    pub fn update(&mut self, index: usize, field: DraftField, value: &str) {
        let Some(row) = self.rows.get_mut(index) else {
            return;
        };
        match field {
            DraftField::Address => row.address = value.trim().to_string(),
            DraftField::Amount => {
                row.amount = Decimal::from_str(value.trim()).unwrap_or_default()
            }
        }
    }

    /// Remove one row, keeping the single-placeholder invariant.
    pub fn remove(&mut self, index: usize) {
        if index < self.rows.len() {
            self.rows.remove(index);
        }
        if self.rows.is_empty() {
            self.rows.push(DraftRow::default());
        }
    }

    /// Reset to the single-placeholder state.
    pub fn clear(&mut self) {
        self.rows.clear();
        self.rows.push(DraftRow::default());
    }

    /// Replace the whole list with parsed recipients (file import).
    pub fn replace_with(&mut self, recipients: &[Recipient]) {
        self.rows = recipients
            .iter()
            .map(|r| DraftRow {
                address: r.address.to_string(),
                amount: r.amount,
            })
            .collect();
        if self.rows.is_empty() {
            self.rows.push(DraftRow::default());
        }
    }

    /// Snapshot the rows for a send attempt.
    pub fn snapshot(&self) -> Vec<DraftRow> {
        self.rows.clone()
    }
}

impl Default for DraftList {
    fn default() -> Self {
        Self::new()
    }
}
