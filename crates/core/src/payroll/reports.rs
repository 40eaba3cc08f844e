//! Read-side payroll reports.
//!
//! Pure functions over data the engine has already loaded from the store.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use payledger_shared::types::{EmployeeId, SalaryComponentId};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::payroll::types::{
    Employee, EmployeeBankDetails, EmployeeSalaryComponent, Employment, Payroll, PayrollStatus,
    Salary, SalaryCategory, SalaryRowType,
};

/// Whether a salary-per-month entry comes from paid rows or assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SalaryEntryStatus {
    /// Built from salary rows.
    Paid,
    /// Built from assignments of an employee never paid yet.
    Draft,
}

/// One line of the salary-per-month listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalaryMonthEntry {
    /// Employee.
    pub employee_id: EmployeeId,
    /// Employee name.
    pub employee_name: String,
    /// Salary date, absent for drafts.
    pub salary_date: Option<NaiveDate>,
    /// Source of the figures.
    pub status: SalaryEntryStatus,
    /// Fixed, variable and allowance earnings.
    pub earnings: Decimal,
    /// Deductions.
    pub deductions: Decimal,
    /// Earnings plus deductions.
    pub gross_salary: Decimal,
    /// Net pay.
    pub net_pay: Decimal,
}

#[derive(Default)]
struct Tally {
    earnings: Decimal,
    deductions: Decimal,
    net_pay: Decimal,
}

impl Tally {
    fn add(&mut self, category: SalaryCategory, amount: Decimal) {
        if category.is_deduction() {
            self.deductions += amount;
        } else {
            self.earnings += amount;
        }
    }

    fn into_entry(
        self,
        employee: &Employee,
        salary_date: Option<NaiveDate>,
        status: SalaryEntryStatus,
    ) -> SalaryMonthEntry {
        SalaryMonthEntry {
            employee_id: employee.id,
            employee_name: employee.full_name(),
            salary_date,
            status,
            earnings: self.earnings,
            deductions: self.deductions,
            gross_salary: self.earnings + self.deductions,
            net_pay: self.net_pay,
        }
    }
}

/// Stateless report builders.
pub struct PayrollReports;

impl PayrollReports {
    /// Paid entries, one per employee and salary date.
    ///
    /// Component rows feed earnings and deductions; the employee total row
    /// gives the net pay. Rows of unknown employees are ignored.
    #[must_use]
    pub fn paid_entries(
        salaries: &[Salary],
        categories: &HashMap<SalaryComponentId, SalaryCategory>,
        employees: &HashMap<EmployeeId, Employee>,
    ) -> Vec<SalaryMonthEntry> {
        let mut tallies: BTreeMap<(NaiveDate, EmployeeId), Tally> = BTreeMap::new();

        for salary in salaries {
            let tally = tallies
                .entry((salary.salary_date, salary.employee_id))
                .or_default();
            match salary.row_type {
                SalaryRowType::EmployeeTotal => tally.net_pay += salary.total_amount,
                SalaryRowType::Component => {
                    if let Some(category) = salary.component_id.and_then(|id| categories.get(&id)) {
                        tally.add(*category, salary.total_amount);
                    }
                }
            }
        }

        tallies
            .into_iter()
            .filter_map(|((date, employee_id), tally)| {
                employees
                    .get(&employee_id)
                    .map(|e| tally.into_entry(e, Some(date), SalaryEntryStatus::Paid))
            })
            .collect()
    }

    /// Draft entry from an employee's assignments.
    #[must_use]
    pub fn draft_entry(employee: &Employee, assignments: &[EmployeeSalaryComponent]) -> SalaryMonthEntry {
        let mut tally = Tally::default();
        for a in assignments {
            tally.add(a.category, a.monthly_amount);
        }
        tally.net_pay = tally.earnings - tally.deductions;
        tally.into_entry(employee, None, SalaryEntryStatus::Draft)
    }

    /// True when the employee has everything needed to be paid.
    #[must_use]
    pub fn is_profile_complete(
        employee: &Employee,
        employment: Option<&Employment>,
        bank_details: Option<&EmployeeBankDetails>,
        assignments: &[EmployeeSalaryComponent],
    ) -> bool {
        let monthly: Decimal = assignments.iter().map(|a| a.monthly_amount).sum();
        let yearly: Decimal = assignments.iter().map(|a| a.yearly_amount).sum();
        employee.active
            && employment.is_some()
            && bank_details.is_some_and(|b| !b.iban.trim().is_empty())
            && monthly > Decimal::ZERO
            && yearly > Decimal::ZERO
    }

    /// Payrolls with money still owed.
    #[must_use]
    pub fn unpaid(payrolls: Vec<Payroll>) -> Vec<Payroll> {
        payrolls
            .into_iter()
            .filter(|p| {
                matches!(p.status, PayrollStatus::Approved | PayrollStatus::PartiallyPaid)
                    && !p.due_amount.is_zero()
            })
            .collect()
    }
}
