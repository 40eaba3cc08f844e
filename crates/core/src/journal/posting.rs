//! Journal posting for payroll approval and voidance.
//!
//! Approval posts one two-line journal per employee: credit the payroll
//! liability category, debit the employee's wages expense category. Void
//! posts a mirror image of every approval journal; originals are never
//! touched.

use chrono::{DateTime, NaiveDate, Utc};
use payledger_shared::types::{JournalId, JournalLineItemId, TransactionCategoryId, UserId};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::journal::types::{Journal, JournalLineItem, PostingReferenceType};
use crate::payroll::error::PayrollError;

/// Input for one approval journal.
#[derive(Debug, Clone)]
pub struct PostingRequest {
    /// Payroll liability category, credited.
    pub liability_category_id: TransactionCategoryId,
    /// Employee wages expense category, debited.
    pub wages_category_id: TransactionCategoryId,
    /// Amount on both lines.
    pub amount: Decimal,
    /// Payroll id, or employee id for on-demand salary.
    pub reference_id: Uuid,
    /// Accounting date.
    pub journal_date: NaiveDate,
    /// Description, normally the payroll subject.
    pub description: Option<String>,
    /// Poster.
    pub created_by: UserId,
    /// Posting time.
    pub now: DateTime<Utc>,
}

/// Stateless journal builder.
pub struct JournalPostingService;

impl JournalPostingService {
    /// Builds and validates an approval journal.
    pub fn post(request: &PostingRequest) -> Result<Journal, PayrollError> {
        let reference_type = PostingReferenceType::PayrollApproved;
        let journal = Journal {
            id: JournalId::new(),
            journal_date: request.journal_date,
            transaction_date: request.journal_date,
            description: request.description.clone(),
            reference_type,
            reverses: None,
            created_by: request.created_by,
            created_at: request.now,
            line_items: vec![
                JournalLineItem {
                    id: JournalLineItemId::new(),
                    transaction_category_id: request.liability_category_id,
                    debit: Decimal::ZERO,
                    credit: request.amount,
                    reference_id: request.reference_id,
                    reference_type,
                },
                JournalLineItem {
                    id: JournalLineItemId::new(),
                    transaction_category_id: request.wages_category_id,
                    debit: request.amount,
                    credit: Decimal::ZERO,
                    reference_id: request.reference_id,
                    reference_type,
                },
            ],
        };

        Self::validate(&journal)?;
        Ok(journal)
    }

    /// Builds the reversing journal for `original`.
    ///
    /// Every line is copied with debit and credit swapped and tagged
    /// `PayrollVoided`; the new journal is dated `now`.
    pub fn reverse(
        original: &Journal,
        description: Option<String>,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<Journal, PayrollError> {
        let reference_type = PostingReferenceType::PayrollVoided;
        let line_items = original
            .line_items
            .iter()
            .map(|line| JournalLineItem {
                id: JournalLineItemId::new(),
                transaction_category_id: line.transaction_category_id,
                debit: line.credit,
                credit: line.debit,
                reference_id: line.reference_id,
                reference_type,
            })
            .collect();

        let today = now.date_naive();
        let journal = Journal {
            id: JournalId::new(),
            journal_date: today,
            transaction_date: today,
            description,
            reference_type,
            reverses: Some(original.id),
            created_by,
            created_at: now,
            line_items,
        };

        Self::validate(&journal)?;
        Ok(journal)
    }

    /// Checks that a journal balances and every line is one-sided.
    pub fn validate(journal: &Journal) -> Result<(), PayrollError> {
        let debit = journal.total_debit()?;
        let credit = journal.total_credit()?;

        let one_sided = journal
            .line_items
            .iter()
            .all(|l| l.debit.is_zero() || l.credit.is_zero());

        if journal.line_items.is_empty() || !one_sided || debit != credit {
            return Err(PayrollError::UnbalancedJournal { debit, credit });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(amount: Decimal) -> PostingRequest {
        PostingRequest {
            liability_category_id: TransactionCategoryId::new(),
            wages_category_id: TransactionCategoryId::new(),
            amount,
            reference_id: Uuid::now_v7(),
            journal_date: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            description: Some("January 2025 Payroll".to_string()),
            created_by: UserId::new(),
            now: Utc::now(),
        }
    }

    #[test]
    fn test_post_credits_liability_debits_wages() {
        let req = request(dec!(3000));
        let journal = JournalPostingService::post(&req).unwrap();

        assert_eq!(journal.line_items.len(), 2);
        let liability = &journal.line_items[0];
        assert_eq!(liability.transaction_category_id, req.liability_category_id);
        assert_eq!(liability.credit, dec!(3000));
        assert_eq!(liability.debit, Decimal::ZERO);
        let wages = &journal.line_items[1];
        assert_eq!(wages.transaction_category_id, req.wages_category_id);
        assert_eq!(wages.debit, dec!(3000));
        assert_eq!(journal.journal_date, req.journal_date);
        assert_eq!(journal.reference_type, PostingReferenceType::PayrollApproved);
        assert!(journal.line_items.iter().all(|l| l.reference_id == req.reference_id));
    }

    #[test]
    fn test_reverse_swaps_sides() {
        let original = JournalPostingService::post(&request(dec!(3000))).unwrap();
        let snapshot = original.clone();
        let now = Utc::now();
        let reversal = JournalPostingService::reverse(
            &original,
            Some("Reverse Journal Entry Against: January 2025 Payroll".to_string()),
            UserId::new(),
            now,
        )
        .unwrap();

        assert_eq!(original, snapshot);
        assert_eq!(reversal.reverses, Some(original.id));
        assert_eq!(reversal.reference_type, PostingReferenceType::PayrollVoided);
        assert_eq!(reversal.journal_date, now.date_naive());
        assert_eq!(reversal.line_items[0].debit, dec!(3000));
        assert_eq!(reversal.line_items[0].credit, Decimal::ZERO);
        assert_eq!(reversal.line_items[1].credit, dec!(3000));
        assert_eq!(
            reversal.line_items[0].transaction_category_id,
            original.line_items[0].transaction_category_id
        );
    }

    #[test]
    fn test_validate_rejects_unbalanced() {
        let mut journal = JournalPostingService::post(&request(dec!(100))).unwrap();
        journal.line_items[0].credit = dec!(50);
        assert!(matches!(
            JournalPostingService::validate(&journal),
            Err(PayrollError::UnbalancedJournal { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_two_sided_line() {
        let mut journal = JournalPostingService::post(&request(dec!(100))).unwrap();
        journal.line_items[0].debit = dec!(10);
        journal.line_items[1].credit = dec!(10);
        assert!(JournalPostingService::validate(&journal).is_err());
    }

    #[test]
    fn test_validate_rejects_empty() {
        let mut journal = JournalPostingService::post(&request(dec!(100))).unwrap();
        journal.line_items.clear();
        assert!(JournalPostingService::validate(&journal).is_err());
    }

    #[test]
    fn test_validate_reports_overflow() {
        let mut journal = JournalPostingService::post(&request(dec!(100))).unwrap();
        let mut extra = journal.line_items[1].clone();
        extra.id = JournalLineItemId::new();
        extra.debit = Decimal::MAX;
        journal.line_items[1].debit = Decimal::MAX;
        journal.line_items.push(extra);
        assert!(matches!(
            JournalPostingService::validate(&journal),
            Err(PayrollError::Overflow)
        ));
    }
}
