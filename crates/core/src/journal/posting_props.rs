//! Property-based tests for journal posting and reversal.

use chrono::{NaiveDate, Utc};
use payledger_shared::types::{TransactionCategoryId, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::posting::{JournalPostingService, PostingRequest};

/// Strategy for generating random UUIDs.
fn arb_uuid() -> impl Strategy<Value = Uuid> {
    any::<u128>().prop_map(Uuid::from_u128)
}

/// Strategy for non-negative amounts up to 10,000,000.00.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_request() -> impl Strategy<Value = PostingRequest> {
    (arb_uuid(), arb_uuid(), arb_uuid(), arb_amount()).prop_map(
        |(liability, wages, reference, amount)| PostingRequest {
            liability_category_id: TransactionCategoryId::from_uuid(liability),
            wages_category_id: TransactionCategoryId::from_uuid(wages),
            amount,
            reference_id: reference,
            journal_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap_or_default(),
            description: None,
            created_by: UserId::new(),
            now: Utc::now(),
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every approval journal balances.
    #[test]
    fn prop_posted_journal_balances(req in arb_request()) {
        let journal = JournalPostingService::post(&req).unwrap();
        prop_assert_eq!(journal.total_debit().unwrap(), journal.total_credit().unwrap());
        prop_assert_eq!(journal.total_debit().unwrap(), req.amount);
    }

    /// A reversal mirrors its original line by line and nets it to zero.
    #[test]
    fn prop_reversal_mirrors_original(req in arb_request()) {
        let original = JournalPostingService::post(&req).unwrap();
        let reversal = JournalPostingService::reverse(&original, None, UserId::new(), Utc::now()).unwrap();

        prop_assert_eq!(reversal.line_items.len(), original.line_items.len());
        for (o, r) in original.line_items.iter().zip(&reversal.line_items) {
            prop_assert_eq!(o.transaction_category_id, r.transaction_category_id);
            prop_assert_eq!(o.debit, r.credit);
            prop_assert_eq!(o.credit, r.debit);
            prop_assert_eq!(o.reference_id, r.reference_id);
        }
        prop_assert_eq!(
            original.total_debit().unwrap() + reversal.total_debit().unwrap(),
            original.total_credit().unwrap() + reversal.total_credit().unwrap()
        );
    }

    /// Reversing twice gives back the original sides.
    #[test]
    fn prop_double_reversal_restores_sides(req in arb_request()) {
        let original = JournalPostingService::post(&req).unwrap();
        let once = JournalPostingService::reverse(&original, None, UserId::new(), Utc::now()).unwrap();
        let twice = JournalPostingService::reverse(&once, None, UserId::new(), Utc::now()).unwrap();
        for (o, t) in original.line_items.iter().zip(&twice.line_items) {
            prop_assert_eq!(o.debit, t.debit);
            prop_assert_eq!(o.credit, t.credit);
        }
    }
}
