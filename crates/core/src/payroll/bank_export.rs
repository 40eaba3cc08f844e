//! Salary information file (SIF) for bank salary transfers.
//!
//! One `EDR` line per employee followed by one `SCR` summary line.

use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use payledger_shared::config::PayrollConfig;
use payledger_shared::types::SalaryComponentId;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::payroll::error::PayrollError;
use crate::payroll::types::{
    EmployeeBankDetails, Employment, PayPeriod, Payroll, Salary, SalaryCategory, SalaryRowType,
};

/// A rendered bank file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankFile {
    /// File name: company number, `yyMMdd`, `HHmmss`.
    pub file_name: String,
    /// File content.
    pub content: String,
}

/// Everything the file needs about one employee.
#[derive(Debug, Clone)]
pub struct BankFileEmployee {
    /// Employment (labour card, agent id).
    pub employment: Employment,
    /// Bank account.
    pub bank_details: EmployeeBankDetails,
    /// The employee's rows in the payroll.
    pub salaries: Vec<Salary>,
}

/// Stateless SIF builder.
pub struct BankExportService;

impl BankExportService {
    /// Renders the file for `employees` of `payroll`.
    pub fn build(
        payroll: &Payroll,
        employees: &[BankFileEmployee],
        categories: &HashMap<SalaryComponentId, SalaryCategory>,
        config: &PayrollConfig,
        now: DateTime<Utc>,
    ) -> Result<BankFile, PayrollError> {
        let period = PayPeriod::parse(&payroll.pay_period)?;
        let start = period.start.format("%Y-%m-%d");
        let end = period.end.format("%Y-%m-%d");

        let mut content = String::new();
        let mut total = Decimal::ZERO;

        for employee in employees {
            let mut fixed = Decimal::ZERO;
            let mut variable = Decimal::ZERO;
            let mut deduction = Decimal::ZERO;
            let mut no_of_days = Decimal::ZERO;
            let mut lop_days = Decimal::ZERO;

            for salary in &employee.salaries {
                if salary.row_type == SalaryRowType::Component {
                    let category = salary.component_id.and_then(|id| categories.get(&id));
                    match category {
                        Some(SalaryCategory::Fixed | SalaryCategory::FixedAllowance) => {
                            fixed += salary.total_amount;
                        }
                        Some(SalaryCategory::Variable) => variable += salary.total_amount,
                        Some(SalaryCategory::Deduction) => deduction += salary.total_amount,
                        None => {}
                    }
                }
                no_of_days = salary.no_of_days;
                lop_days = salary.lop_days;
            }

            let fixed = Self::money(fixed);
            let variable = Self::money(variable - deduction);
            total += fixed + variable;

            let _ = writeln!(
                content,
                "EDR,{},{},{},{start},{end},{},{fixed},{variable},{}",
                Self::or_dash(employee.employment.labour_card.as_deref()),
                Self::or_dash(employee.employment.agent_id.as_deref()),
                employee.bank_details.iban,
                no_of_days.normalize(),
                lop_days.normalize(),
            );
        }

        let _ = writeln!(
            content,
            "SCR,{},{},{},{},{},{},{},{},{}",
            config.company_number,
            config.company_bank_code,
            payroll.payroll_date.format("%Y-%m-%d"),
            now.format("%H%M"),
            payroll.payroll_date.format("%m%Y"),
            employees.len(),
            Self::money(total),
            config.currency_label,
            config.producer_label,
        );

        Ok(BankFile {
            file_name: format!(
                "{}{}{}",
                config.company_number,
                now.format("%y%m%d"),
                now.format("%H%M%S")
            ),
            content,
        })
    }

    fn money(amount: Decimal) -> Decimal {
        let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
        rounded.rescale(2);
        rounded
    }

    fn or_dash(value: Option<&str>) -> &str {
        value.filter(|v| !v.trim().is_empty()).unwrap_or("-")
    }
}
