//! Payroll computation, workflow and reporting.
//!
//! # Modules
//!
//! - `types` - Payroll, salary and employee domain types
//! - `error` - Payroll error types
//! - `proration` - Daily-rate proration arithmetic
//! - `assignment` - Per-employee salary component assignments
//! - `ledger` - Salary row generation
//! - `workflow` - Status transition rules
//! - `store` - Persistence seam
//! - `engine` - Orchestration of all payroll operations
//! - `reports` - Salary-per-month, incomplete profile and unpaid views
//! - `bank_export` - Bank salary information file

pub mod assignment;
pub mod bank_export;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod proration;
pub mod reports;
pub mod store;
pub mod types;
pub mod workflow;

#[cfg(test)]
mod assignment_props;
#[cfg(test)]
mod proration_props;
#[cfg(test)]
mod workflow_props;

pub use assignment::{AssignComponentInput, AssignmentAmount, AssignmentService};
pub use bank_export::{BankExportService, BankFile, BankFileEmployee};
pub use engine::{
    CreatePayrollInput, PayrollEngine, PayrollRun, PostedPayroll, SingleSalaryInput,
    SingleSalaryOutcome, UpdatePayrollInput,
};
pub use error::{PayrollError, ProrationError};
pub use ledger::{
    DeductionTreatment, EmployeeTotal, GenerationContext, SalaryGeneration, SalaryLedger,
    SkippedEmployee,
};
pub use proration::{Proration, ProrationCalculator};
pub use reports::{PayrollReports, SalaryEntryStatus, SalaryMonthEntry};
pub use store::{
    ApprovalCommit, AssignmentCommit, GenerationCommit, NewPayrollCommit, PayrollStore,
    PayrollUpdateCommit, SingleSalaryCommit, StatusChange, VoidCommit,
};
pub use types::{
    ComponentAmount, CtcType, Employee, EmployeeBankDetails, EmployeeRunInput,
    EmployeeSalaryComponent, Employment, NewSalaryComponent, PayPeriod, Payroll, PayrollEmployee,
    PayrollStatus, RunDays, Salary, SalaryCategory, SalaryComponent, SalaryRowType,
    TransactionCategory, User, WageRole,
};
pub use workflow::{PayrollAction, PayrollWorkflow};
