//! Creating, updating and re-basing employee salary assignments.

use payledger_shared::types::{AssignmentId, EmployeeId, SalaryComponentId};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::payroll::error::PayrollError;
use crate::payroll::proration::{AMOUNT_SCALE, ProrationCalculator};
use crate::payroll::types::{CtcType, EmployeeSalaryComponent, SalaryComponent};

/// Amount requested for an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentAmount {
    /// Flat monthly amount.
    Flat(Decimal),
    /// Percentage of monthly gross salary.
    Formula(Decimal),
}

/// Request to assign a catalog component to an employee.
#[derive(Debug, Clone)]
pub struct AssignComponentInput {
    /// Employee receiving the component.
    pub employee_id: EmployeeId,
    /// Catalog component.
    pub component_id: SalaryComponentId,
    /// Flat amount or formula.
    pub amount: AssignmentAmount,
    /// New gross salary to record on the employment, if any.
    pub gross_salary: Option<Decimal>,
    /// Whether `gross_salary` is monthly or annual.
    pub ctc_type: CtcType,
}

/// Stateless assignment calculations.
pub struct AssignmentService;

impl AssignmentService {
    /// Monthly gross for a quoted gross salary.
    pub fn monthly_gross(gross_salary: Decimal, ctc_type: CtcType) -> Result<Decimal, PayrollError> {
        match ctc_type {
            CtcType::Monthly => Ok(gross_salary),
            CtcType::Annual => gross_salary
                .checked_div(Decimal::from(12))
                .map(|m| m.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointNearestEven))
                .ok_or(PayrollError::Overflow),
        }
    }

    /// Monthly amount for the requested flat amount or formula.
    ///
    /// `gross` is the employee's gross salary and its CTC type; a formula
    /// without a gross is rejected.
    pub fn monthly_amount(
        employee_id: EmployeeId,
        amount: AssignmentAmount,
        gross: Option<(Decimal, CtcType)>,
    ) -> Result<Decimal, PayrollError> {
        match amount {
            AssignmentAmount::Flat(value) => Ok(value),
            AssignmentAmount::Formula(percent) => {
                let (gross_salary, ctc_type) =
                    gross.ok_or(PayrollError::GrossSalaryMissing(employee_id))?;
                let monthly_gross = Self::monthly_gross(gross_salary, ctc_type)?;
                monthly_gross
                    .checked_mul(percent)
                    .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
                    .map(|v| v.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointNearestEven))
                    .ok_or(PayrollError::Overflow)
            }
        }
    }

    /// Builds the assignment for `input`, reusing the id of `existing` when
    /// the employee already has this component.
    pub fn build(
        existing: Option<&EmployeeSalaryComponent>,
        component: &SalaryComponent,
        input: &AssignComponentInput,
        gross: Option<(Decimal, CtcType)>,
        basis_days: Decimal,
    ) -> Result<EmployeeSalaryComponent, PayrollError> {
        if basis_days <= Decimal::ZERO {
            return Err(PayrollError::InvalidBasis(basis_days));
        }
        let monthly_amount = Self::monthly_amount(input.employee_id, input.amount, gross)?;
        let yearly_amount = ProrationCalculator::yearly(monthly_amount)?;
        let (flat_amount, formula) = match input.amount {
            AssignmentAmount::Flat(v) => (Some(v), None),
            AssignmentAmount::Formula(p) => (None, Some(p)),
        };

        Ok(EmployeeSalaryComponent {
            id: existing.map_or_else(AssignmentId::new, |a| a.id),
            employee_id: input.employee_id,
            component_id: component.id,
            category: component.category,
            description: component.description.clone(),
            flat_amount,
            formula,
            monthly_amount,
            yearly_amount,
            no_of_days: basis_days,
        })
    }

    /// Re-expresses one assignment against `new_days`.
    pub fn rebase_one(
        assignment: &EmployeeSalaryComponent,
        new_days: Decimal,
    ) -> Result<EmployeeSalaryComponent, PayrollError> {
        if new_days <= Decimal::ZERO {
            return Err(PayrollError::InvalidBasis(new_days));
        }
        let p = ProrationCalculator::prorate(assignment.monthly_amount, assignment.no_of_days, new_days)?;
        Ok(EmployeeSalaryComponent {
            monthly_amount: p.prorated_amount,
            yearly_amount: ProrationCalculator::yearly(p.prorated_amount)?,
            no_of_days: new_days,
            ..assignment.clone()
        })
    }

    /// Re-expresses every assignment against `new_days`.
    ///
    /// All or nothing: the first failure aborts the rebase.
    pub fn rebase(
        assignments: &[EmployeeSalaryComponent],
        new_days: Decimal,
    ) -> Result<Vec<EmployeeSalaryComponent>, PayrollError> {
        assignments
            .iter()
            .map(|a| Self::rebase_one(a, new_days))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payroll::types::SalaryCategory;
    use rust_decimal_macros::dec;

    fn component(category: SalaryCategory) -> SalaryComponent {
        SalaryComponent {
            id: SalaryComponentId::new(),
            description: "Basic".to_string(),
            component_code: "BASIC".to_string(),
            default_amount: None,
            component_type: "Earning".to_string(),
            category,
            deleted: false,
        }
    }

    fn input(employee_id: EmployeeId, component: &SalaryComponent, amount: AssignmentAmount) -> AssignComponentInput {
        AssignComponentInput {
            employee_id,
            component_id: component.id,
            amount,
            gross_salary: None,
            ctc_type: CtcType::Monthly,
        }
    }

    #[test]
    fn test_flat_assignment() {
        let c = component(SalaryCategory::Fixed);
        let req = input(EmployeeId::new(), &c, AssignmentAmount::Flat(dec!(3000)));
        let a = AssignmentService::build(None, &c, &req, None, dec!(30)).unwrap();
        assert_eq!(a.monthly_amount, dec!(3000));
        assert_eq!(a.yearly_amount, dec!(36000));
        assert_eq!(a.no_of_days, dec!(30));
        assert_eq!(a.flat_amount, Some(dec!(3000)));
        assert_eq!(a.formula, None);
        assert_eq!(a.category, SalaryCategory::Fixed);
    }

    #[test]
    fn test_formula_on_monthly_gross() {
        let c = component(SalaryCategory::Fixed);
        let req = input(EmployeeId::new(), &c, AssignmentAmount::Formula(dec!(40)));
        let a = AssignmentService::build(None, &c, &req, Some((dec!(5000), CtcType::Monthly)), dec!(30))
            .unwrap();
        assert_eq!(a.monthly_amount, dec!(2000));
        assert_eq!(a.yearly_amount, dec!(24000));
    }

    #[test]
    fn test_formula_on_annual_gross() {
        let c = component(SalaryCategory::Variable);
        let req = input(EmployeeId::new(), &c, AssignmentAmount::Formula(dec!(50)));
        let a = AssignmentService::build(None, &c, &req, Some((dec!(120000), CtcType::Annual)), dec!(30))
            .unwrap();
        assert_eq!(a.monthly_amount, dec!(5000));
    }

    #[test]
    fn test_formula_without_gross_rejected() {
        let employee_id = EmployeeId::new();
        let c = component(SalaryCategory::Fixed);
        let req = input(employee_id, &c, AssignmentAmount::Formula(dec!(10)));
        let err = AssignmentService::build(None, &c, &req, None, dec!(30)).unwrap_err();
        assert!(matches!(err, PayrollError::GrossSalaryMissing(id) if id == employee_id));
    }

    #[test]
    fn test_update_keeps_assignment_id() {
        let c = component(SalaryCategory::Fixed);
        let req = input(EmployeeId::new(), &c, AssignmentAmount::Flat(dec!(1000)));
        let first = AssignmentService::build(None, &c, &req, None, dec!(30)).unwrap();
        let req = AssignComponentInput {
            amount: AssignmentAmount::Flat(dec!(1200)),
            ..req
        };
        let second = AssignmentService::build(Some(&first), &c, &req, None, dec!(30)).unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.monthly_amount, dec!(1200));
    }

    #[test]
    fn test_rebase_to_fewer_days() {
        let c = component(SalaryCategory::Fixed);
        let req = input(EmployeeId::new(), &c, AssignmentAmount::Flat(dec!(3000)));
        let a = AssignmentService::build(None, &c, &req, None, dec!(30)).unwrap();
        let rebased = AssignmentService::rebase(&[a], dec!(26)).unwrap();
        assert_eq!(rebased[0].monthly_amount, dec!(2600));
        assert_eq!(rebased[0].yearly_amount, dec!(31200));
        assert_eq!(rebased[0].no_of_days, dec!(26));
    }

    #[test]
    fn test_rebase_rejects_zero_days() {
        let c = component(SalaryCategory::Fixed);
        let req = input(EmployeeId::new(), &c, AssignmentAmount::Flat(dec!(3000)));
        let a = AssignmentService::build(None, &c, &req, None, dec!(30)).unwrap();
        assert!(matches!(
            AssignmentService::rebase(&[a], dec!(0)),
            Err(PayrollError::InvalidBasis(_))
        ));
    }
}
