//! Property-based tests for assignment re-basing.

use payledger_shared::types::{AssignmentId, EmployeeId, SalaryComponentId};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::assignment::AssignmentService;
use super::proration::ProrationCalculator;
use super::types::{EmployeeSalaryComponent, SalaryCategory};

fn arb_assignment() -> impl Strategy<Value = EmployeeSalaryComponent> {
    ((1i64..1_000_000_000i64), (1i64..=31i64)).prop_map(|(cents, days)| {
        let monthly = Decimal::new(cents, 2);
        EmployeeSalaryComponent {
            id: AssignmentId::new(),
            employee_id: EmployeeId::new(),
            component_id: SalaryComponentId::new(),
            category: SalaryCategory::Fixed,
            description: "Basic".to_string(),
            flat_amount: Some(monthly),
            formula: None,
            monthly_amount: monthly,
            yearly_amount: monthly * Decimal::from(12),
            no_of_days: Decimal::from(days),
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// After a rebase, monthly equals the old daily rate times the new days
    /// and yearly stays twelve months.
    #[test]
    fn prop_rebase_invariants(a in arb_assignment(), new_days in 1i64..=31i64) {
        let new_days = Decimal::from(new_days);
        let rebased = AssignmentService::rebase_one(&a, new_days).unwrap();
        let expected = ProrationCalculator::prorate(a.monthly_amount, a.no_of_days, new_days).unwrap();
        prop_assert_eq!(rebased.monthly_amount, expected.prorated_amount);
        prop_assert_eq!(rebased.yearly_amount, rebased.monthly_amount * Decimal::from(12));
        prop_assert_eq!(rebased.no_of_days, new_days);
        prop_assert_eq!(rebased.id, a.id);
    }

    /// Rebasing away and back lands within a millionth of the start.
    #[test]
    fn prop_rebase_round_trip(a in arb_assignment(), via in 1i64..=31i64) {
        let there = AssignmentService::rebase_one(&a, Decimal::from(via)).unwrap();
        let back = AssignmentService::rebase_one(&there, a.no_of_days).unwrap();
        prop_assert!((back.monthly_amount - a.monthly_amount).abs() <= dec!(0.000001));
    }
}
