//! Property-based tests for the payroll state machine.

use proptest::prelude::*;

use super::error::PayrollError;
use super::types::PayrollStatus;
use super::workflow::{PayrollAction, PayrollWorkflow};

fn arb_status() -> impl Strategy<Value = PayrollStatus> {
    prop_oneof![
        Just(PayrollStatus::Draft),
        Just(PayrollStatus::Submitted),
        Just(PayrollStatus::Approved),
        Just(PayrollStatus::PartiallyPaid),
        Just(PayrollStatus::Paid),
        Just(PayrollStatus::Rejected),
        Just(PayrollStatus::Voided),
    ]
}

fn arb_action() -> impl Strategy<Value = PayrollAction> {
    prop_oneof![
        Just(PayrollAction::Generate),
        Just(PayrollAction::Submit),
        Just(PayrollAction::Approve),
        Just(PayrollAction::Reject),
        Just(PayrollAction::Reopen),
        Just(PayrollAction::ConvertToPaid),
        Just(PayrollAction::Void),
        Just(PayrollAction::EditRoster),
    ]
}

proptest! {
    /// A transition either lands on the action's target or reports a
    /// conflict naming the current status.
    #[test]
    fn prop_transition_is_total(status in arb_status(), action in arb_action()) {
        match PayrollWorkflow::transition(status, action) {
            Ok(next) => {
                prop_assert!(action.allowed_from().contains(&status));
                prop_assert_eq!(next, action.target(status));
            }
            Err(PayrollError::TransitionConflict { from, action: verb }) => {
                prop_assert_eq!(from, status);
                prop_assert_eq!(verb, action.as_str());
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    /// Nothing leaves Voided.
    #[test]
    fn prop_voided_is_terminal(action in arb_action()) {
        prop_assert!(PayrollWorkflow::transition(PayrollStatus::Voided, action).is_err());
    }

    /// Only postings can be voided.
    #[test]
    fn prop_void_requires_postings(status in arb_status()) {
        let result = PayrollWorkflow::transition(status, PayrollAction::Void);
        prop_assert_eq!(result.is_ok(), status.is_posted());
    }
}
