//! Journal domain types.

use chrono::{DateTime, NaiveDate, Utc};
use payledger_shared::types::{JournalId, JournalLineItemId, TransactionCategoryId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::payroll::error::PayrollError;

/// What a journal was posted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostingReferenceType {
    /// Posted when a payroll (or on-demand salary) is approved.
    PayrollApproved,
    /// Reversal posted when a payroll is voided.
    PayrollVoided,
}

impl PostingReferenceType {
    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PayrollApproved => "PAYROLL_APPROVED",
            Self::PayrollVoided => "PAYROLL_VOIDED",
        }
    }

    /// Parses the stored representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PAYROLL_APPROVED" => Some(Self::PayrollApproved),
            "PAYROLL_VOIDED" => Some(Self::PayrollVoided),
            _ => None,
        }
    }
}

impl fmt::Display for PostingReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One side of a journal.
///
/// Exactly one of `debit` and `credit` is non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLineItem {
    /// Line ID.
    pub id: JournalLineItemId,
    /// Account posted to.
    pub transaction_category_id: TransactionCategoryId,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Payroll or employee the line refers to.
    pub reference_id: Uuid,
    /// Reference kind.
    pub reference_type: PostingReferenceType,
}

/// A balanced journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    /// Journal ID.
    pub id: JournalId,
    /// Accounting date.
    pub journal_date: NaiveDate,
    /// Transaction date.
    pub transaction_date: NaiveDate,
    /// Description.
    pub description: Option<String>,
    /// Reference kind.
    pub reference_type: PostingReferenceType,
    /// Journal this one reverses.
    pub reverses: Option<JournalId>,
    /// Creator.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Lines.
    pub line_items: Vec<JournalLineItem>,
}

impl Journal {
    /// Sum of debits; `Overflow` when it does not fit in a decimal.
    pub fn total_debit(&self) -> Result<Decimal, PayrollError> {
        checked_total(self.line_items.iter().map(|l| l.debit))
    }

    /// Sum of credits; `Overflow` when it does not fit in a decimal.
    pub fn total_credit(&self) -> Result<Decimal, PayrollError> {
        checked_total(self.line_items.iter().map(|l| l.credit))
    }

    /// Moves every line posted to `from` onto `to`.
    pub fn replace_category(&mut self, from: TransactionCategoryId, to: TransactionCategoryId) {
        for line in &mut self.line_items {
            if line.transaction_category_id == from {
                line.transaction_category_id = to;
            }
        }
    }
}

fn checked_total(mut amounts: impl Iterator<Item = Decimal>) -> Result<Decimal, PayrollError> {
    amounts.try_fold(Decimal::ZERO, |acc, amount| {
        acc.checked_add(amount).ok_or(PayrollError::Overflow)
    })
}
