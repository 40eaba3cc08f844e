//! Persistence seam for the payroll engine.
//!
//! The engine reads through [`PayrollStore`] and hands every state change to
//! it as one commit value. Each `commit_*` call must apply atomically and
//! must re-check the payroll's current status against `expected` before
//! writing, failing with `TransitionConflict` when another writer got there
//! first.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use payledger_shared::types::{
    AssignmentId, EmployeeId, PayrollId, SalaryComponentId, TransactionCategoryId, UserId,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::journal::{Journal, PostingReferenceType};
use crate::payroll::error::PayrollError;
use crate::payroll::types::{
    Employee, EmployeeBankDetails, EmployeeSalaryComponent, Employment, Payroll, PayrollEmployee,
    PayrollStatus, Salary, SalaryComponent, TransactionCategory, User, WageRole,
};

/// Status change for one payroll.
#[derive(Debug, Clone)]
pub struct StatusChange {
    /// Payroll.
    pub payroll_id: PayrollId,
    /// Statuses the payroll must be in.
    pub expected: Vec<PayrollStatus>,
    /// New status.
    pub status: PayrollStatus,
    /// Approver to record, if changing.
    pub approver: Option<UserId>,
    /// Comment to record, if changing.
    pub comment: Option<String>,
    /// Run date to record, if changing.
    pub run_date: Option<DateTime<Utc>>,
}

impl StatusChange {
    /// Plain status change with nothing else recorded.
    #[must_use]
    pub fn new(payroll_id: PayrollId, expected: &[PayrollStatus], status: PayrollStatus) -> Self {
        Self {
            payroll_id,
            expected: expected.to_vec(),
            status,
            approver: None,
            comment: None,
            run_date: None,
        }
    }
}

/// Replacement salary rows for a payroll.
#[derive(Debug, Clone)]
pub struct GenerationCommit {
    /// Status change (to Draft).
    pub change: StatusChange,
    /// Rows replacing every existing row of the payroll.
    pub salaries: Vec<Salary>,
    /// Employees with rows.
    pub employee_count: i32,
    /// Sum of employee totals, also the new due amount.
    pub total_amount: Decimal,
}

/// New payroll with its roster and optional first generation.
#[derive(Debug, Clone)]
pub struct NewPayrollCommit {
    /// Payroll to insert.
    pub payroll: Payroll,
    /// Roster rows.
    pub roster: Vec<PayrollEmployee>,
    /// Rows generated in the same unit.
    pub salaries: Vec<Salary>,
}

/// Rewritten header, roster and rows of a payroll still being prepared.
#[derive(Debug, Clone)]
pub struct PayrollUpdateCommit {
    /// Statuses the stored payroll must be in.
    pub expected: Vec<PayrollStatus>,
    /// Header replacing the stored one.
    pub payroll: Payroll,
    /// Roster replacing the stored one.
    pub roster: Vec<PayrollEmployee>,
    /// Rows replacing every existing row of the payroll.
    pub salaries: Vec<Salary>,
}

/// Approval postings.
#[derive(Debug, Clone)]
pub struct ApprovalCommit {
    /// Status change (to Approved).
    pub change: StatusChange,
    /// Liability category to create first, when it did not exist.
    pub bootstrap_category: Option<TransactionCategory>,
    /// Journals to insert.
    pub journals: Vec<Journal>,
}

/// Void reversals.
#[derive(Debug, Clone)]
pub struct VoidCommit {
    /// Status change (to Voided).
    pub change: StatusChange,
    /// Reversing journals to insert.
    pub journals: Vec<Journal>,
}

/// On-demand salary for individual employees.
#[derive(Debug, Clone)]
pub struct SingleSalaryCommit {
    /// Liability category to create first, when it did not exist.
    pub bootstrap_category: Option<TransactionCategory>,
    /// Rows to insert (no payroll).
    pub salaries: Vec<Salary>,
    /// Journals to insert.
    pub journals: Vec<Journal>,
    /// Assignments re-based after payment.
    pub assignments: Vec<EmployeeSalaryComponent>,
}

/// Assignment changes for one employee.
#[derive(Debug, Clone)]
pub struct AssignmentCommit {
    /// Assignments to insert or update.
    pub assignments: Vec<EmployeeSalaryComponent>,
    /// Employment to update alongside, when the gross changed.
    pub employment: Option<Employment>,
}

/// Storage for everything the payroll engine reads and writes.
#[async_trait]
pub trait PayrollStore: Send + Sync {
    // ========== Payrolls ==========

    /// Finds a payroll.
    async fn find_payroll(&self, id: PayrollId) -> Result<Option<Payroll>, PayrollError>;

    /// Lists payrolls in any of `statuses`.
    async fn payrolls_by_status(
        &self,
        statuses: &[PayrollStatus],
    ) -> Result<Vec<Payroll>, PayrollError>;

    /// Roster of a payroll.
    async fn roster(&self, payroll_id: PayrollId) -> Result<Vec<PayrollEmployee>, PayrollError>;

    /// Salary rows of a payroll.
    async fn payroll_salaries(&self, payroll_id: PayrollId) -> Result<Vec<Salary>, PayrollError>;

    /// Salary rows dated strictly before `date`.
    async fn salaries_before(&self, date: NaiveDate) -> Result<Vec<Salary>, PayrollError>;

    /// Employees with at least one salary row.
    async fn employees_with_salary(&self) -> Result<Vec<EmployeeId>, PayrollError>;

    // ========== Catalog & assignments ==========

    /// Every catalog component, including soft-deleted ones.
    async fn components(&self) -> Result<Vec<SalaryComponent>, PayrollError>;

    /// Finds a catalog component.
    async fn find_component(
        &self,
        id: SalaryComponentId,
    ) -> Result<Option<SalaryComponent>, PayrollError>;

    /// Inserts a catalog component.
    async fn insert_component(&self, component: SalaryComponent) -> Result<(), PayrollError>;

    /// Sets the soft-delete flag; returns false if the component is unknown.
    async fn soft_delete_component(&self, id: SalaryComponentId) -> Result<bool, PayrollError>;

    /// Assignments of one employee.
    async fn assignments(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<EmployeeSalaryComponent>, PayrollError>;

    /// Removes one assignment; returns false if it is not the employee's.
    async fn delete_assignment(
        &self,
        employee_id: EmployeeId,
        assignment_id: AssignmentId,
    ) -> Result<bool, PayrollError>;

    // ========== Ledger ==========

    /// Finds a transaction category by name.
    async fn category_by_name(
        &self,
        name: &str,
    ) -> Result<Option<TransactionCategory>, PayrollError>;

    /// Category playing `role` for an employee.
    async fn employee_category(
        &self,
        employee_id: EmployeeId,
        role: WageRole,
    ) -> Result<Option<TransactionCategoryId>, PayrollError>;

    /// Journals with a line referencing `reference_id` as `reference_type`.
    async fn journals_by_reference(
        &self,
        reference_id: Uuid,
        reference_type: PostingReferenceType,
    ) -> Result<Vec<Journal>, PayrollError>;

    // ========== Directory ==========

    /// Finds a back-office user.
    async fn find_user(&self, id: UserId) -> Result<Option<User>, PayrollError>;

    /// Finds an employee.
    async fn find_employee(&self, id: EmployeeId) -> Result<Option<Employee>, PayrollError>;

    /// Every employee.
    async fn employees(&self) -> Result<Vec<Employee>, PayrollError>;

    /// Employment details of an employee.
    async fn employment(&self, employee_id: EmployeeId) -> Result<Option<Employment>, PayrollError>;

    /// Bank details of an employee.
    async fn bank_details(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Option<EmployeeBankDetails>, PayrollError>;

    // ========== Atomic commits ==========

    /// Inserts a payroll, its roster and any generated rows.
    async fn commit_new_payroll(&self, commit: NewPayrollCommit) -> Result<(), PayrollError>;

    /// Replaces a payroll's salary rows.
    async fn commit_generation(&self, commit: GenerationCommit) -> Result<Payroll, PayrollError>;

    /// Applies status changes, all or none.
    async fn commit_status(&self, changes: Vec<StatusChange>) -> Result<Vec<Payroll>, PayrollError>;

    /// Applies an approval with its journals.
    async fn commit_approval(&self, commit: ApprovalCommit) -> Result<Payroll, PayrollError>;

    /// Applies a void with its reversing journals.
    async fn commit_void(&self, commit: VoidCommit) -> Result<Payroll, PayrollError>;

    /// Persists on-demand salary.
    async fn commit_single_salary(&self, commit: SingleSalaryCommit) -> Result<(), PayrollError>;

    /// Upserts assignments (and employment) for one employee.
    async fn commit_assignments(&self, commit: AssignmentCommit) -> Result<(), PayrollError>;

    /// Replaces a payroll's header, roster and rows.
    async fn commit_payroll_update(&self, commit: PayrollUpdateCommit) -> Result<Payroll, PayrollError>;

    /// Deletes a payroll with its roster and rows.
    async fn commit_payroll_delete(
        &self,
        payroll_id: PayrollId,
        expected: Vec<PayrollStatus>,
    ) -> Result<(), PayrollError>;

    /// Removes employees from a roster; returns how many rows went.
    async fn commit_roster_removal(
        &self,
        payroll_id: PayrollId,
        expected: Vec<PayrollStatus>,
        employee_ids: Vec<EmployeeId>,
    ) -> Result<u64, PayrollError>;
}
