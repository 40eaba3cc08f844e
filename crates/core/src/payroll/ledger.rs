//! Salary row generation for a pay run.
//!
//! Turns assignments into one `Component` row per employee-component and one
//! `EmployeeTotal` row per employee. Failures are per employee: a broken
//! employee is reported in [`SalaryGeneration::skipped`] and the run goes on.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use payledger_shared::types::{EmployeeId, PayrollId, SalaryId, UserId};
use rust_decimal::Decimal;
use tracing::warn;

use crate::payroll::error::PayrollError;
use crate::payroll::proration::ProrationCalculator;
use crate::payroll::types::{
    EmployeeRunInput, EmployeeSalaryComponent, RunDays, Salary, SalaryRowType,
};

/// How deduction rows count toward the employee total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeductionTreatment {
    /// Deduction rows are written but left out of the total (pay runs).
    Excluded,
    /// Deduction rows reduce the total (on-demand salary).
    Subtracted,
}

/// Fixed inputs shared by every row of one generation.
#[derive(Debug, Clone, Copy)]
pub struct GenerationContext {
    /// Owning payroll, absent for on-demand salary.
    pub payroll_id: Option<PayrollId>,
    /// Date stamped on every row.
    pub salary_date: NaiveDate,
    /// User generating the rows.
    pub created_by: UserId,
    /// Creation time stamped on every row.
    pub now: DateTime<Utc>,
    /// Deduction handling for this call site.
    pub treatment: DeductionTreatment,
}

/// Aggregate amount for one employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeTotal {
    /// Employee.
    pub employee_id: EmployeeId,
    /// Amount on the `EmployeeTotal` row.
    pub total: Decimal,
}

/// An employee the run could not pay.
#[derive(Debug, Clone)]
pub struct SkippedEmployee {
    /// Employee.
    pub employee_id: EmployeeId,
    /// Why.
    pub reason: PayrollError,
}

/// Output of one generation.
#[derive(Debug, Clone, Default)]
pub struct SalaryGeneration {
    /// Rows to persist.
    pub salaries: Vec<Salary>,
    /// Per-employee totals, in input order.
    pub employee_totals: Vec<EmployeeTotal>,
    /// Sum of employee totals.
    pub total_payroll_amount: Decimal,
    /// Employees left out.
    pub skipped: Vec<SkippedEmployee>,
}

impl SalaryGeneration {
    /// Number of employees with generated rows.
    #[must_use]
    pub fn employee_count(&self) -> usize {
        self.employee_totals.len()
    }

    fn skip(&mut self, employee_id: EmployeeId, reason: PayrollError) {
        warn!(
            employee_id = %employee_id,
            error_code = reason.error_code(),
            error = %reason,
            "Skipping employee in salary generation"
        );
        self.skipped.push(SkippedEmployee {
            employee_id,
            reason,
        });
    }
}

/// Stateless salary row generator.
pub struct SalaryLedger;

impl SalaryLedger {
    /// Generates salary rows for every input employee.
    pub fn generate(
        ctx: &GenerationContext,
        inputs: &[EmployeeRunInput],
        assignments: &HashMap<EmployeeId, Vec<EmployeeSalaryComponent>>,
    ) -> SalaryGeneration {
        let mut generation = SalaryGeneration::default();

        for input in inputs {
            let employee_assignments = assignments
                .get(&input.employee_id)
                .map(Vec::as_slice)
                .unwrap_or_default();

            match Self::generate_employee(ctx, input, employee_assignments) {
                Ok((rows, total)) => match generation.total_payroll_amount.checked_add(total) {
                    Some(sum) => {
                        generation.total_payroll_amount = sum;
                        generation.salaries.extend(rows);
                        generation.employee_totals.push(EmployeeTotal {
                            employee_id: input.employee_id,
                            total,
                        });
                    }
                    None => generation.skip(input.employee_id, PayrollError::Overflow),
                },
                Err(reason) => generation.skip(input.employee_id, reason),
            }
        }

        generation
    }

    fn generate_employee(
        ctx: &GenerationContext,
        input: &EmployeeRunInput,
        assignments: &[EmployeeSalaryComponent],
    ) -> Result<(Vec<Salary>, Decimal), PayrollError> {
        if assignments.is_empty() {
            return Err(PayrollError::MissingAssignment(input.employee_id));
        }

        let mut rows = Vec::with_capacity(assignments.len() + 1);
        let mut total = Decimal::ZERO;
        let mut total_days = Decimal::ZERO;

        for assignment in assignments {
            let actual_days = match input.days {
                RunDays::Run(days) => days,
                RunDays::StoredBasis => assignment.no_of_days,
            };
            let amount = ProrationCalculator::prorate(
                assignment.monthly_amount,
                assignment.no_of_days,
                actual_days,
            )?
            .prorated_amount;

            total = match (assignment.category.is_deduction(), ctx.treatment) {
                (false, _) => total.checked_add(amount),
                (true, DeductionTreatment::Subtracted) => total.checked_sub(amount),
                (true, DeductionTreatment::Excluded) => Some(total),
            }
            .ok_or(PayrollError::Overflow)?;
            total_days = actual_days;

            rows.push(Self::row(
                ctx,
                input,
                Some(assignment),
                SalaryRowType::Component,
                actual_days,
                amount,
            ));
        }

        rows.push(Self::row(
            ctx,
            input,
            None,
            SalaryRowType::EmployeeTotal,
            total_days,
            total,
        ));

        Ok((rows, total))
    }

    fn row(
        ctx: &GenerationContext,
        input: &EmployeeRunInput,
        assignment: Option<&EmployeeSalaryComponent>,
        row_type: SalaryRowType,
        no_of_days: Decimal,
        total_amount: Decimal,
    ) -> Salary {
        Salary {
            id: SalaryId::new(),
            employee_id: input.employee_id,
            payroll_id: ctx.payroll_id,
            component_id: assignment.map(|a| a.component_id),
            row_type,
            no_of_days,
            lop_days: input.lop_days,
            total_amount,
            salary_date: ctx.salary_date,
            created_by: ctx.created_by,
            created_at: ctx.now,
        }
    }
}
