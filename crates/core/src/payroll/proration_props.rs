//! Property-based tests for day proration.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::proration::{AMOUNT_SCALE, ProrationCalculator, RATE_SCALE};

/// Monthly amounts from 0.01 to 100,000,000.00.
fn arb_monthly() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Basis day counts seen in practice.
fn arb_basis() -> impl Strategy<Value = Decimal> {
    (1i64..=31i64).prop_map(Decimal::from)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Prorating over the full basis returns the monthly amount unchanged.
    #[test]
    fn prop_full_basis_is_identity(monthly in arb_monthly(), basis in arb_basis()) {
        let p = ProrationCalculator::prorate(monthly, basis, basis).unwrap();
        prop_assert_eq!(p.prorated_amount, monthly);
    }

    /// Same inputs, same outputs, at the documented scales.
    #[test]
    fn prop_deterministic(
        monthly in arb_monthly(),
        basis in arb_basis(),
        actual in 0i64..=31i64,
    ) {
        let actual = Decimal::from(actual);
        let a = ProrationCalculator::prorate(monthly, basis, actual).unwrap();
        let b = ProrationCalculator::prorate(monthly, basis, actual).unwrap();
        prop_assert_eq!(a, b);
        prop_assert!(a.daily_rate.scale() <= RATE_SCALE);
        prop_assert!(a.prorated_amount.scale() <= AMOUNT_SCALE);
    }

    /// More days never pay less.
    #[test]
    fn prop_monotonic_in_days(
        monthly in arb_monthly(),
        basis in arb_basis(),
        fewer in 0i64..=30i64,
    ) {
        let low = ProrationCalculator::prorate(monthly, basis, Decimal::from(fewer)).unwrap();
        let high = ProrationCalculator::prorate(monthly, basis, Decimal::from(fewer + 1)).unwrap();
        prop_assert!(low.prorated_amount <= high.prorated_amount);
    }

    /// Non-positive basis is always rejected.
    #[test]
    fn prop_non_positive_basis_rejected(monthly in arb_monthly(), basis in -31i64..=0i64) {
        prop_assert!(ProrationCalculator::prorate(monthly, Decimal::from(basis), dec!(30)).is_err());
    }
}
