//! Payroll state machine.
//!
//! Pure transition rules; the engine applies side effects only after a
//! transition has been accepted here.

use crate::payroll::error::PayrollError;
use crate::payroll::types::PayrollStatus;

/// An action that moves a payroll between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayrollAction {
    /// (Re)generate salary rows.
    Generate,
    /// Send for approval.
    Submit,
    /// Approve and post journals.
    Approve,
    /// Send back to the generator.
    Reject,
    /// Bring a rejected payroll back to draft.
    Reopen,
    /// Mark as paid.
    ConvertToPaid,
    /// Reverse the postings.
    Void,
    /// Drop employees from the roster.
    EditRoster,
}

impl PayrollAction {
    /// Verb used in error messages and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Reopen => "reopen",
            Self::ConvertToPaid => "convert to paid",
            Self::Void => "void",
            Self::EditRoster => "edit roster of",
        }
    }

    /// States the action may start from.
    #[must_use]
    pub const fn allowed_from(self) -> &'static [PayrollStatus] {
        match self {
            Self::Generate | Self::EditRoster => &[PayrollStatus::Draft, PayrollStatus::Rejected],
            Self::Submit => &[PayrollStatus::Draft],
            Self::Approve | Self::Reject => &[PayrollStatus::Submitted],
            Self::Reopen => &[PayrollStatus::Rejected],
            Self::ConvertToPaid => &[PayrollStatus::Approved, PayrollStatus::PartiallyPaid],
            Self::Void => &[
                PayrollStatus::Approved,
                PayrollStatus::PartiallyPaid,
                PayrollStatus::Paid,
            ],
        }
    }

    /// State the action ends in.
    #[must_use]
    pub const fn target(self, current: PayrollStatus) -> PayrollStatus {
        match self {
            Self::Generate | Self::Reopen => PayrollStatus::Draft,
            Self::Submit => PayrollStatus::Submitted,
            Self::Approve => PayrollStatus::Approved,
            Self::Reject => PayrollStatus::Rejected,
            Self::ConvertToPaid => PayrollStatus::Paid,
            Self::Void => PayrollStatus::Voided,
            Self::EditRoster => current,
        }
    }
}

/// Stateless payroll workflow rules.
pub struct PayrollWorkflow;

impl PayrollWorkflow {
    /// Validates `action` from `current` and returns the resulting status.
    ///
    /// # Errors
    ///
    /// `TransitionConflict` when the action is not allowed from `current`.
    pub fn transition(current: PayrollStatus, action: PayrollAction) -> Result<PayrollStatus, PayrollError> {
        if action.allowed_from().contains(&current) {
            Ok(action.target(current))
        } else {
            Err(PayrollError::TransitionConflict {
                from: current,
                action: action.as_str(),
            })
        }
    }

    /// Returns true if some action leads from `from` to `to`.
    #[must_use]
    pub fn is_valid_transition(from: PayrollStatus, to: PayrollStatus) -> bool {
        Self::ALL_ACTIONS
            .iter()
            .any(|a| a.allowed_from().contains(&from) && a.target(from) == to && from != to)
    }

    /// Trims `comment` and rejects it when blank.
    pub fn require_comment(comment: &str) -> Result<String, PayrollError> {
        let trimmed = comment.trim();
        if trimmed.is_empty() {
            return Err(PayrollError::CommentRequired);
        }
        Ok(trimmed.to_string())
    }

    const ALL_ACTIONS: [PayrollAction; 8] = [
        PayrollAction::Generate,
        PayrollAction::Submit,
        PayrollAction::Approve,
        PayrollAction::Reject,
        PayrollAction::Reopen,
        PayrollAction::ConvertToPaid,
        PayrollAction::Void,
        PayrollAction::EditRoster,
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PayrollStatus::Draft, PayrollAction::Submit, PayrollStatus::Submitted)]
    #[case(PayrollStatus::Submitted, PayrollAction::Approve, PayrollStatus::Approved)]
    #[case(PayrollStatus::Submitted, PayrollAction::Reject, PayrollStatus::Rejected)]
    #[case(PayrollStatus::Rejected, PayrollAction::Reopen, PayrollStatus::Draft)]
    #[case(PayrollStatus::Rejected, PayrollAction::Generate, PayrollStatus::Draft)]
    #[case(PayrollStatus::Draft, PayrollAction::Generate, PayrollStatus::Draft)]
    #[case(PayrollStatus::Approved, PayrollAction::ConvertToPaid, PayrollStatus::Paid)]
    #[case(PayrollStatus::PartiallyPaid, PayrollAction::ConvertToPaid, PayrollStatus::Paid)]
    #[case(PayrollStatus::Approved, PayrollAction::Void, PayrollStatus::Voided)]
    #[case(PayrollStatus::Paid, PayrollAction::Void, PayrollStatus::Voided)]
    fn test_allowed_transitions(
        #[case] from: PayrollStatus,
        #[case] action: PayrollAction,
        #[case] to: PayrollStatus,
    ) {
        assert_eq!(PayrollWorkflow::transition(from, action).unwrap(), to);
    }

    #[rstest]
    #[case(PayrollStatus::Draft, PayrollAction::Approve)]
    #[case(PayrollStatus::Draft, PayrollAction::Void)]
    #[case(PayrollStatus::Submitted, PayrollAction::Generate)]
    #[case(PayrollStatus::Approved, PayrollAction::Reject)]
    #[case(PayrollStatus::Paid, PayrollAction::Approve)]
    #[case(PayrollStatus::Voided, PayrollAction::Void)]
    #[case(PayrollStatus::Voided, PayrollAction::Reopen)]
    #[case(PayrollStatus::Draft, PayrollAction::ConvertToPaid)]
    #[case(PayrollStatus::Approved, PayrollAction::EditRoster)]
    fn test_rejected_transitions(#[case] from: PayrollStatus, #[case] action: PayrollAction) {
        let err = PayrollWorkflow::transition(from, action).unwrap_err();
        assert!(matches!(err, PayrollError::TransitionConflict { from: f, .. } if f == from));
    }

    #[test]
    fn test_voided_is_terminal() {
        for to in [
            PayrollStatus::Draft,
            PayrollStatus::Submitted,
            PayrollStatus::Approved,
            PayrollStatus::Paid,
            PayrollStatus::Rejected,
        ] {
            assert!(!PayrollWorkflow::is_valid_transition(PayrollStatus::Voided, to));
        }
    }

    #[test]
    fn test_is_valid_transition() {
        assert!(PayrollWorkflow::is_valid_transition(
            PayrollStatus::Draft,
            PayrollStatus::Submitted
        ));
        assert!(!PayrollWorkflow::is_valid_transition(
            PayrollStatus::Draft,
            PayrollStatus::Approved
        ));
        assert!(!PayrollWorkflow::is_valid_transition(
            PayrollStatus::Draft,
            PayrollStatus::Draft
        ));
    }

    #[test]
    fn test_require_comment() {
        assert_eq!(
            PayrollWorkflow::require_comment("  wrong days  ").unwrap(),
            "wrong days"
        );
        assert!(matches!(
            PayrollWorkflow::require_comment("   "),
            Err(PayrollError::CommentRequired)
        ));
    }
}
