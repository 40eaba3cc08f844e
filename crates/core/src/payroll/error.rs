//! Payroll error types.
//!
//! Every failure the engine can report, with the status code and stable
//! error code shape shared with [`AppError`].

use payledger_shared::error::AppError;
use payledger_shared::types::{AssignmentId, EmployeeId, PayrollId, SalaryComponentId, UserId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::payroll::types::PayrollStatus;

/// Errors raised by the proration arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProrationError {
    /// The basis day count was zero or negative.
    #[error("Basis days must be positive, got {0}")]
    InvalidBasis(Decimal),

    /// The actual day count was negative.
    #[error("Day count cannot be negative, got {0}")]
    InvalidDays(Decimal),

    /// The result does not fit in a decimal.
    #[error("Arithmetic overflow while prorating")]
    Overflow,
}

/// Errors that can occur during payroll operations.
#[derive(Debug, Clone, Error)]
pub enum PayrollError {
    // ========== Computation Errors ==========
    /// Basis day count was zero or negative.
    #[error("Basis days must be positive, got {0}")]
    InvalidBasis(Decimal),

    /// Day count was negative.
    #[error("Day count cannot be negative, got {0}")]
    InvalidDays(Decimal),

    /// Arithmetic overflow.
    #[error("Arithmetic overflow")]
    Overflow,

    /// Employee has no salary component assignments.
    #[error("Employee {0} has no salary component assignments")]
    MissingAssignment(EmployeeId),

    /// A formula assignment needs a gross salary that is not on record.
    #[error("Employee {0} has no gross salary for a formula component")]
    GrossSalaryMissing(EmployeeId),

    /// Pay period string is not `dd/MM/yyyy-dd/MM/yyyy`.
    #[error("Invalid pay period: {0}")]
    InvalidPayPeriod(String),

    /// A journal's debits and credits differ.
    #[error("Journal is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedJournal {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    // ========== Workflow Errors ==========
    /// The payroll is not in a state that allows the action.
    #[error("Cannot {action} payroll in status {from}")]
    TransitionConflict {
        /// The current status.
        from: PayrollStatus,
        /// The attempted action.
        action: &'static str,
    },

    /// Reject and void need a comment.
    #[error("A comment is required")]
    CommentRequired,

    /// A payroll must have at least one employee.
    #[error("Payroll roster is empty")]
    EmptyRoster,

    /// The same employee appears twice in one run.
    #[error("Employee {0} appears more than once in the run")]
    DuplicateRunInput(EmployeeId),

    /// A run input names an employee who is not on the payroll's roster.
    #[error("Employee {0} is not on the payroll roster")]
    NotOnRoster(EmployeeId),

    /// Mail delivery failed after the transition committed.
    #[error("Notification delivery failed: {0}")]
    NotificationDelivery(String),

    // ========== Lookup Errors ==========
    /// Payroll not found.
    #[error("Payroll not found: {0}")]
    PayrollNotFound(PayrollId),

    /// User not found.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// Employee not found.
    #[error("Employee not found: {0}")]
    EmployeeNotFound(EmployeeId),

    /// Salary component not found.
    #[error("Salary component not found: {0}")]
    ComponentNotFound(SalaryComponentId),

    /// Assignment not found for the employee.
    #[error("Salary assignment not found: {0}")]
    AssignmentNotFound(AssignmentId),

    /// Employment or bank details needed for the bank file are missing.
    #[error("Employee {0} is missing employment or bank details")]
    IncompleteProfile(EmployeeId),

    /// The employee has no wages expense category.
    #[error("Employee {0} has no wages expense category")]
    WageCategoryMissing(EmployeeId),

    // ========== Store Errors ==========
    /// Persistence failure.
    #[error("Store error: {0}")]
    Store(String),
}

impl PayrollError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidBasis(_)
            | Self::InvalidDays(_)
            | Self::InvalidPayPeriod(_)
            | Self::CommentRequired
            | Self::EmptyRoster
            | Self::DuplicateRunInput(_)
            | Self::NotOnRoster(_) => 400,

            Self::PayrollNotFound(_)
            | Self::UserNotFound(_)
            | Self::EmployeeNotFound(_)
            | Self::ComponentNotFound(_)
            | Self::AssignmentNotFound(_) => 404,

            Self::TransitionConflict { .. } => 409,

            Self::Overflow
            | Self::MissingAssignment(_)
            | Self::GrossSalaryMissing(_)
            | Self::UnbalancedJournal { .. }
            | Self::IncompleteProfile(_)
            | Self::WageCategoryMissing(_) => 422,

            Self::NotificationDelivery(_) => 502,

            Self::Store(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidBasis(_) => "INVALID_BASIS",
            Self::InvalidDays(_) => "INVALID_DAYS",
            Self::Overflow => "OVERFLOW",
            Self::MissingAssignment(_) => "MISSING_ASSIGNMENT",
            Self::GrossSalaryMissing(_) => "GROSS_SALARY_MISSING",
            Self::InvalidPayPeriod(_) => "INVALID_PAY_PERIOD",
            Self::UnbalancedJournal { .. } => "UNBALANCED_JOURNAL",
            Self::TransitionConflict { .. } => "TRANSITION_CONFLICT",
            Self::CommentRequired => "COMMENT_REQUIRED",
            Self::EmptyRoster => "EMPTY_ROSTER",
            Self::DuplicateRunInput(_) => "DUPLICATE_RUN_INPUT",
            Self::NotOnRoster(_) => "NOT_ON_ROSTER",
            Self::NotificationDelivery(_) => "NOTIFICATION_DELIVERY",
            Self::PayrollNotFound(_) => "PAYROLL_NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::EmployeeNotFound(_) => "EMPLOYEE_NOT_FOUND",
            Self::ComponentNotFound(_) => "COMPONENT_NOT_FOUND",
            Self::AssignmentNotFound(_) => "ASSIGNMENT_NOT_FOUND",
            Self::IncompleteProfile(_) => "INCOMPLETE_PROFILE",
            Self::WageCategoryMissing(_) => "WAGE_CATEGORY_MISSING",
            Self::Store(_) => "STORE_ERROR",
        }
    }
}

impl From<ProrationError> for PayrollError {
    fn from(err: ProrationError) -> Self {
        match err {
            ProrationError::InvalidBasis(days) => Self::InvalidBasis(days),
            ProrationError::InvalidDays(days) => Self::InvalidDays(days),
            ProrationError::Overflow => Self::Overflow,
        }
    }
}

impl From<PayrollError> for AppError {
    fn from(err: PayrollError) -> Self {
        let message = err.to_string();
        match err.status_code() {
            400 => Self::Validation(message),
            404 => Self::NotFound(message),
            409 => Self::Conflict(message),
            422 => Self::BusinessRule(message),
            502 => Self::ExternalService(message),
            _ => Self::Database(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(PayrollError::InvalidBasis(dec!(0)), 400, "INVALID_BASIS")]
    #[case(PayrollError::CommentRequired, 400, "COMMENT_REQUIRED")]
    #[case(PayrollError::EmptyRoster, 400, "EMPTY_ROSTER")]
    #[case(PayrollError::DuplicateRunInput(EmployeeId::new()), 400, "DUPLICATE_RUN_INPUT")]
    #[case(PayrollError::NotOnRoster(EmployeeId::new()), 400, "NOT_ON_ROSTER")]
    #[case(PayrollError::PayrollNotFound(PayrollId::new()), 404, "PAYROLL_NOT_FOUND")]
    #[case(
        PayrollError::TransitionConflict { from: PayrollStatus::Voided, action: "approve" },
        409,
        "TRANSITION_CONFLICT"
    )]
    #[case(PayrollError::WageCategoryMissing(EmployeeId::new()), 422, "WAGE_CATEGORY_MISSING")]
    #[case(PayrollError::NotificationDelivery("smtp".into()), 502, "NOTIFICATION_DELIVERY")]
    #[case(PayrollError::Store("boom".into()), 500, "STORE_ERROR")]
    fn test_status_and_error_codes(
        #[case] err: PayrollError,
        #[case] status: u16,
        #[case] code: &str,
    ) {
        assert_eq!(err.status_code(), status);
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_transition_conflict_display() {
        let err = PayrollError::TransitionConflict {
            from: PayrollStatus::Draft,
            action: "approve",
        };
        assert_eq!(err.to_string(), "Cannot approve payroll in status Draft");
    }

    #[test]
    fn test_unbalanced_display() {
        let err = PayrollError::UnbalancedJournal {
            debit: dec!(100.00),
            credit: dec!(50.00),
        };
        assert_eq!(
            err.to_string(),
            "Journal is not balanced. Debit: 100.00, Credit: 50.00"
        );
    }

    #[test]
    fn test_proration_error_conversion() {
        let err: PayrollError = ProrationError::InvalidBasis(dec!(0)).into();
        assert!(matches!(err, PayrollError::InvalidBasis(d) if d.is_zero()));
        let err: PayrollError = ProrationError::Overflow.into();
        assert!(matches!(err, PayrollError::Overflow));
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = PayrollError::CommentRequired.into();
        assert_eq!(app.status_code(), 400);
        let app: AppError = PayrollError::TransitionConflict {
            from: PayrollStatus::Paid,
            action: "reject",
        }
        .into();
        assert_eq!(app.status_code(), 409);
        let app: AppError = PayrollError::Store("down".into()).into();
        assert_eq!(app.error_code(), "DATABASE_ERROR");
    }
}
