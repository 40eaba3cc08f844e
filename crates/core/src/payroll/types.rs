//! Payroll domain types.
//!
//! Salary component templates, per-employee assignments, payroll runs and the
//! salary rows a run produces, plus the directory records the reports read.

use chrono::{DateTime, NaiveDate, Utc};
use payledger_shared::types::{
    AssignmentId, EmployeeId, PayrollEmployeeId, PayrollId, SalaryComponentId, SalaryId,
    TransactionCategoryId, UserId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::payroll::error::PayrollError;

/// Salary structure a component belongs to.
///
/// Storage keeps the numeric ids `1..=4`; everything above the storage edge
/// works with the enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SalaryCategory {
    /// Fixed earning.
    Fixed,
    /// Variable earning.
    Variable,
    /// Deduction from pay.
    Deduction,
    /// Fixed allowance, reported together with fixed pay.
    FixedAllowance,
}

impl SalaryCategory {
    /// Returns the storage id.
    #[must_use]
    pub const fn id(self) -> i32 {
        match self {
            Self::Fixed => 1,
            Self::Variable => 2,
            Self::Deduction => 3,
            Self::FixedAllowance => 4,
        }
    }

    /// Maps a storage id back to a category.
    #[must_use]
    pub const fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Self::Fixed),
            2 => Some(Self::Variable),
            3 => Some(Self::Deduction),
            4 => Some(Self::FixedAllowance),
            _ => None,
        }
    }

    /// Returns the display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fixed => "Fixed",
            Self::Variable => "Variable",
            Self::Deduction => "Deduction",
            Self::FixedAllowance => "Fixed Allowance",
        }
    }

    /// Returns true for deductions.
    #[must_use]
    pub const fn is_deduction(self) -> bool {
        matches!(self, Self::Deduction)
    }
}

impl fmt::Display for SalaryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a component amount is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentAmount {
    /// Flat monthly amount.
    Flat(Decimal),
    /// Percentage of monthly gross salary.
    Formula(Decimal),
}

/// Salary component template from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryComponent {
    /// Component ID.
    pub id: SalaryComponentId,
    /// Description shown on payslips.
    pub description: String,
    /// Short component code.
    pub component_code: String,
    /// Default amount or formula.
    pub default_amount: Option<ComponentAmount>,
    /// Free-form component type label.
    pub component_type: String,
    /// Salary structure.
    pub category: SalaryCategory,
    /// Soft-delete flag.
    pub deleted: bool,
}

/// Input for adding a component to the catalog.
#[derive(Debug, Clone)]
pub struct NewSalaryComponent {
    /// Description shown on payslips.
    pub description: String,
    /// Short component code.
    pub component_code: String,
    /// Default amount or formula.
    pub default_amount: Option<ComponentAmount>,
    /// Free-form component type label.
    pub component_type: String,
    /// Salary structure.
    pub category: SalaryCategory,
}

/// A catalog component instantiated for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSalaryComponent {
    /// Assignment ID.
    pub id: AssignmentId,
    /// Employee the assignment belongs to.
    pub employee_id: EmployeeId,
    /// Source component.
    pub component_id: SalaryComponentId,
    /// Category copied from the component.
    pub category: SalaryCategory,
    /// Description copied from the component.
    pub description: String,
    /// Flat amount, when not formula based.
    pub flat_amount: Option<Decimal>,
    /// Formula percentage of monthly gross.
    pub formula: Option<Decimal>,
    /// Amount for `no_of_days` days.
    pub monthly_amount: Decimal,
    /// Always `monthly_amount * 12`.
    pub yearly_amount: Decimal,
    /// Day basis `monthly_amount` is expressed against.
    pub no_of_days: Decimal,
}

/// Payroll run status.
///
/// Valid transitions:
/// - Draft → Submitted (submit)
/// - Submitted → Approved (approve)
/// - Submitted → Rejected (reject)
/// - Rejected → Draft (reopen, generate)
/// - Approved | Partially Paid → Paid (convert to paid)
/// - Approved | Partially Paid | Paid → Voided (void)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayrollStatus {
    /// Being prepared; salary rows can be regenerated.
    Draft,
    /// Waiting for the approver.
    Submitted,
    /// Approved and posted to the ledger.
    Approved,
    /// Some payments recorded against the run.
    ///
    /// Imported state: no engine action moves a payroll here. Rows carried
    /// over from earlier systems may hold it, and such payrolls can still be
    /// converted to paid, voided and listed as unpaid.
    PartiallyPaid,
    /// Fully paid.
    Paid,
    /// Sent back by the approver.
    Rejected,
    /// Reversed in the ledger (terminal).
    Voided,
}

impl PayrollStatus {
    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Submitted => "Submitted",
            Self::Approved => "Approved",
            Self::PartiallyPaid => "Partially Paid",
            Self::Paid => "Paid",
            Self::Rejected => "Rejected",
            Self::Voided => "Voided",
        }
    }

    /// Parses the stored representation, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "submitted" => Some(Self::Submitted),
            "approved" => Some(Self::Approved),
            "partially paid" => Some(Self::PartiallyPaid),
            "paid" => Some(Self::Paid),
            "rejected" => Some(Self::Rejected),
            "voided" => Some(Self::Voided),
            _ => None,
        }
    }

    /// Returns true if salary rows can still be (re)generated.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::Rejected)
    }

    /// Returns true once the run has ledger postings.
    #[must_use]
    pub const fn is_posted(&self) -> bool {
        matches!(self, Self::Approved | Self::PartiallyPaid | Self::Paid)
    }
}

impl fmt::Display for PayrollStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pay period bounds parsed from `dd/MM/yyyy-dd/MM/yyyy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayPeriod {
    /// First day of the period.
    pub start: NaiveDate,
    /// Last day of the period.
    pub end: NaiveDate,
}

impl PayPeriod {
    const DATE_FORMAT: &'static str = "%d/%m/%Y";

    /// Parses a `start-end` pay period string.
    pub fn parse(raw: &str) -> Result<Self, PayrollError> {
        let invalid = || PayrollError::InvalidPayPeriod(raw.to_string());
        let (start, end) = raw.split_once('-').ok_or_else(invalid)?;
        let start = NaiveDate::parse_from_str(start.trim(), Self::DATE_FORMAT)
            .map_err(|_| invalid())?;
        let end =
            NaiveDate::parse_from_str(end.trim(), Self::DATE_FORMAT).map_err(|_| invalid())?;
        if end < start {
            return Err(invalid());
        }
        Ok(Self { start, end })
    }

    /// Human readable form used in mails, `dd-MM-yyyy  To  dd-MM-yyyy`.
    #[must_use]
    pub fn display_range(&self) -> String {
        format!(
            "{}  To  {}",
            self.start.format("%d-%m-%Y"),
            self.end.format("%d-%m-%Y")
        )
    }
}

/// One pay run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payroll {
    /// Payroll ID.
    pub id: PayrollId,
    /// Subject line, used as journal description.
    pub subject: String,
    /// Pay period, `dd/MM/yyyy-dd/MM/yyyy`.
    pub pay_period: String,
    /// Date journals are posted at.
    pub payroll_date: NaiveDate,
    /// Employees with generated salary.
    pub employee_count: i32,
    /// Current status.
    pub status: PayrollStatus,
    /// Approver, set on submit.
    pub approver: Option<UserId>,
    /// User who created the run.
    pub generated_by: UserId,
    /// Sum of employee totals.
    pub total_amount: Decimal,
    /// Amount still unpaid.
    pub due_amount: Decimal,
    /// When the run was approved.
    pub run_date: Option<DateTime<Utc>>,
    /// Reject or void comment.
    pub comment: Option<String>,
}

/// Roster row joining a payroll and an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollEmployee {
    /// Row ID.
    pub id: PayrollEmployeeId,
    /// Payroll.
    pub payroll_id: PayrollId,
    /// Employee.
    pub employee_id: EmployeeId,
}

/// Kind of salary row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SalaryRowType {
    /// One employee-component amount.
    Component,
    /// The employee's aggregate for the run.
    EmployeeTotal,
}

impl SalaryRowType {
    /// Returns the storage code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Component => 0,
            Self::EmployeeTotal => 1,
        }
    }

    /// Maps a storage code back to a row type.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Component),
            1 => Some(Self::EmployeeTotal),
            _ => None,
        }
    }
}

/// A payable salary row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Salary {
    /// Row ID.
    pub id: SalaryId,
    /// Employee.
    pub employee_id: EmployeeId,
    /// Payroll, absent for on-demand salary.
    pub payroll_id: Option<PayrollId>,
    /// Component, absent on the aggregate row.
    pub component_id: Option<SalaryComponentId>,
    /// Row kind.
    pub row_type: SalaryRowType,
    /// Days paid.
    pub no_of_days: Decimal,
    /// Loss-of-pay days.
    pub lop_days: Decimal,
    /// Amount.
    pub total_amount: Decimal,
    /// Salary date.
    pub salary_date: NaiveDate,
    /// Creator.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Where the actual day count of a run comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunDays {
    /// Days supplied for the run.
    Run(Decimal),
    /// Each assignment's own stored basis.
    StoredBasis,
}

/// Per-employee input to salary generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRunInput {
    /// Employee.
    pub employee_id: EmployeeId,
    /// Days to pay.
    pub days: RunDays,
    /// Loss-of-pay days, recorded on the rows.
    pub lop_days: Decimal,
}

impl EmployeeRunInput {
    /// Input for a run of `no_of_days` days.
    #[must_use]
    pub const fn for_days(employee_id: EmployeeId, no_of_days: Decimal, lop_days: Decimal) -> Self {
        Self {
            employee_id,
            days: RunDays::Run(no_of_days),
            lop_days,
        }
    }
}

/// Ledger account leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionCategory {
    /// Category ID.
    pub id: TransactionCategoryId,
    /// Account code.
    pub code: String,
    /// Name, unique for lookups.
    pub name: String,
    /// Description.
    pub description: String,
    /// Chart-of-account group.
    pub account_group: String,
    /// Users may edit it.
    pub editable: bool,
    /// Users may pick it on forms.
    pub selectable: bool,
}

/// Named role a transaction category plays for an employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WageRole {
    /// Salary payable account.
    SalaryPayable,
    /// Wages expense account debited on approval.
    WagesExpense,
}

impl WageRole {
    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SalaryPayable => "salary_payable",
            Self::WagesExpense => "wages_expense",
        }
    }

    /// Parses the stored representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "salary_payable" => Some(Self::SalaryPayable),
            "wages_expense" => Some(Self::WagesExpense),
            _ => None,
        }
    }
}

/// Back-office user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User ID.
    pub id: UserId,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Mail address.
    pub email: String,
}

impl User {
    /// First and last name.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Employee directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Employee ID.
    pub id: EmployeeId,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Mail address.
    pub email: Option<String>,
    /// Active flag.
    pub active: bool,
}

impl Employee {
    /// First and last name.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Whether gross salary is quoted per month or per year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CtcType {
    /// Monthly gross.
    #[default]
    Monthly,
    /// Annual gross.
    Annual,
}

impl CtcType {
    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Annual => "annual",
        }
    }

    /// Parses the stored representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "monthly" => Some(Self::Monthly),
            "annual" | "annually" | "yearly" => Some(Self::Annual),
            _ => None,
        }
    }
}

/// Employment details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employment {
    /// Employee.
    pub employee_id: EmployeeId,
    /// Gross salary.
    pub gross_salary: Option<Decimal>,
    /// Whether gross is monthly or annual.
    pub ctc_type: CtcType,
    /// Labour card number.
    pub labour_card: Option<String>,
    /// Bank agent id.
    pub agent_id: Option<String>,
}

/// Salary bank account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeBankDetails {
    /// Employee.
    pub employee_id: EmployeeId,
    /// Account holder name.
    pub account_holder: String,
    /// IBAN.
    pub iban: String,
}
