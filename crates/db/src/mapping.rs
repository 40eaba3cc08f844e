//! Conversions between `SeaORM` models and payroll domain types.

use chrono::Utc;
use payledger_core::journal::{Journal, JournalLineItem, PostingReferenceType};
use payledger_core::payroll::error::PayrollError;
use payledger_core::payroll::types::{
    ComponentAmount, CtcType, Employee, EmployeeBankDetails, EmployeeSalaryComponent, Employment,
    Payroll, PayrollEmployee, PayrollStatus, Salary, SalaryCategory, SalaryComponent,
    SalaryRowType, TransactionCategory, User, WageRole,
};
use sea_orm::ActiveValue::Set;

use crate::entities::{
    employee_bank_details, employee_salary_components, employees, employments,
    journal_line_items, journals, payroll_employees, payrolls, salaries, salary_components,
    sea_orm_active_enums as db_enums, transaction_categories, users,
};

// ============================================================================
// Enums
// ============================================================================

pub(crate) const fn status_to_db(status: PayrollStatus) -> db_enums::PayrollStatus {
    match status {
        PayrollStatus::Draft => db_enums::PayrollStatus::Draft,
        PayrollStatus::Submitted => db_enums::PayrollStatus::Submitted,
        PayrollStatus::Approved => db_enums::PayrollStatus::Approved,
        PayrollStatus::PartiallyPaid => db_enums::PayrollStatus::PartiallyPaid,
        PayrollStatus::Paid => db_enums::PayrollStatus::Paid,
        PayrollStatus::Rejected => db_enums::PayrollStatus::Rejected,
        PayrollStatus::Voided => db_enums::PayrollStatus::Voided,
    }
}

pub(crate) const fn status_from_db(status: db_enums::PayrollStatus) -> PayrollStatus {
    match status {
        db_enums::PayrollStatus::Draft => PayrollStatus::Draft,
        db_enums::PayrollStatus::Submitted => PayrollStatus::Submitted,
        db_enums::PayrollStatus::Approved => PayrollStatus::Approved,
        db_enums::PayrollStatus::PartiallyPaid => PayrollStatus::PartiallyPaid,
        db_enums::PayrollStatus::Paid => PayrollStatus::Paid,
        db_enums::PayrollStatus::Rejected => PayrollStatus::Rejected,
        db_enums::PayrollStatus::Voided => PayrollStatus::Voided,
    }
}

pub(crate) const fn reference_to_db(kind: PostingReferenceType) -> db_enums::PostingReferenceType {
    match kind {
        PostingReferenceType::PayrollApproved => db_enums::PostingReferenceType::PayrollApproved,
        PostingReferenceType::PayrollVoided => db_enums::PostingReferenceType::PayrollVoided,
    }
}

const fn reference_from_db(kind: db_enums::PostingReferenceType) -> PostingReferenceType {
    match kind {
        db_enums::PostingReferenceType::PayrollApproved => PostingReferenceType::PayrollApproved,
        db_enums::PostingReferenceType::PayrollVoided => PostingReferenceType::PayrollVoided,
    }
}

pub(crate) const fn role_to_db(role: WageRole) -> db_enums::WageRole {
    match role {
        WageRole::SalaryPayable => db_enums::WageRole::SalaryPayable,
        WageRole::WagesExpense => db_enums::WageRole::WagesExpense,
    }
}

const fn ctc_to_db(ctc: CtcType) -> db_enums::CtcType {
    match ctc {
        CtcType::Monthly => db_enums::CtcType::Monthly,
        CtcType::Annual => db_enums::CtcType::Annual,
    }
}

const fn ctc_from_db(ctc: db_enums::CtcType) -> CtcType {
    match ctc {
        db_enums::CtcType::Monthly => CtcType::Monthly,
        db_enums::CtcType::Annual => CtcType::Annual,
    }
}

fn category_from_db(id: i32) -> Result<SalaryCategory, PayrollError> {
    SalaryCategory::from_id(id)
        .ok_or_else(|| PayrollError::Store(format!("Unknown salary category id {id}")))
}

// ============================================================================
// Models -> domain
// ============================================================================

pub(crate) fn payroll(model: payrolls::Model) -> Payroll {
    Payroll {
        id: model.id.into(),
        subject: model.subject,
        pay_period: model.pay_period,
        payroll_date: model.payroll_date,
        employee_count: model.employee_count,
        status: status_from_db(model.status),
        approver: model.approver_id.map(Into::into),
        generated_by: model.generated_by.into(),
        total_amount: model.total_amount,
        due_amount: model.due_amount,
        run_date: model.run_date.map(|d| d.with_timezone(&Utc)),
        comment: model.comment,
    }
}

pub(crate) fn roster_row(model: payroll_employees::Model) -> PayrollEmployee {
    PayrollEmployee {
        id: model.id.into(),
        payroll_id: model.payroll_id.into(),
        employee_id: model.employee_id.into(),
    }
}

pub(crate) fn salary(model: salaries::Model) -> Result<Salary, PayrollError> {
    let row_type = SalaryRowType::from_code(model.row_type)
        .ok_or_else(|| PayrollError::Store(format!("Unknown salary row type {}", model.row_type)))?;
    Ok(Salary {
        id: model.id.into(),
        employee_id: model.employee_id.into(),
        payroll_id: model.payroll_id.map(Into::into),
        component_id: model.salary_component_id.map(Into::into),
        row_type,
        no_of_days: model.no_of_days,
        lop_days: model.lop_days,
        total_amount: model.total_amount,
        salary_date: model.salary_date,
        created_by: model.created_by.into(),
        created_at: model.created_at.with_timezone(&Utc),
    })
}

pub(crate) fn component(model: salary_components::Model) -> Result<SalaryComponent, PayrollError> {
    let default_amount = match (model.flat_amount, model.formula) {
        (Some(flat), _) => Some(ComponentAmount::Flat(flat)),
        (None, Some(percent)) => Some(ComponentAmount::Formula(percent)),
        (None, None) => None,
    };
    Ok(SalaryComponent {
        id: model.id.into(),
        description: model.description,
        component_code: model.component_code,
        default_amount,
        component_type: model.component_type,
        category: category_from_db(model.category_id)?,
        deleted: model.is_deleted,
    })
}

pub(crate) fn assignment(
    model: employee_salary_components::Model,
) -> Result<EmployeeSalaryComponent, PayrollError> {
    Ok(EmployeeSalaryComponent {
        id: model.id.into(),
        employee_id: model.employee_id.into(),
        component_id: model.salary_component_id.into(),
        category: category_from_db(model.category_id)?,
        description: model.description,
        flat_amount: model.flat_amount,
        formula: model.formula,
        monthly_amount: model.monthly_amount,
        yearly_amount: model.yearly_amount,
        no_of_days: model.no_of_days,
    })
}

pub(crate) fn category(model: transaction_categories::Model) -> TransactionCategory {
    TransactionCategory {
        id: model.id.into(),
        code: model.code,
        name: model.name,
        description: model.description,
        account_group: model.account_group,
        editable: model.is_editable,
        selectable: model.is_selectable,
    }
}

pub(crate) fn journal(model: journals::Model, mut lines: Vec<journal_line_items::Model>) -> Journal {
    lines.sort_by_key(|l| l.line_no);
    Journal {
        id: model.id.into(),
        journal_date: model.journal_date,
        transaction_date: model.transaction_date,
        description: model.description,
        reference_type: reference_from_db(model.reference_type),
        reverses: model.reverses_journal_id.map(Into::into),
        created_by: model.created_by.into(),
        created_at: model.created_at.with_timezone(&Utc),
        line_items: lines
            .into_iter()
            .map(|l| JournalLineItem {
                id: l.id.into(),
                transaction_category_id: l.transaction_category_id.into(),
                debit: l.debit,
                credit: l.credit,
                reference_id: l.reference_id,
                reference_type: reference_from_db(l.reference_type),
            })
            .collect(),
    }
}

pub(crate) fn user(model: users::Model) -> User {
    User {
        id: model.id.into(),
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
    }
}

pub(crate) fn employee(model: employees::Model) -> Employee {
    Employee {
        id: model.id.into(),
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
        active: model.is_active,
    }
}

pub(crate) fn employment(model: employments::Model) -> Employment {
    Employment {
        employee_id: model.employee_id.into(),
        gross_salary: model.gross_salary,
        ctc_type: ctc_from_db(model.ctc_type),
        labour_card: model.labour_card,
        agent_id: model.agent_id,
    }
}

pub(crate) fn bank_details(model: employee_bank_details::Model) -> EmployeeBankDetails {
    EmployeeBankDetails {
        employee_id: model.employee_id.into(),
        account_holder: model.account_holder,
        iban: model.iban,
    }
}

// ============================================================================
// Domain -> active models
// ============================================================================

pub(crate) fn payroll_active(payroll: &Payroll) -> payrolls::ActiveModel {
    payrolls::ActiveModel {
        id: Set(payroll.id.into_inner()),
        subject: Set(payroll.subject.clone()),
        pay_period: Set(payroll.pay_period.clone()),
        payroll_date: Set(payroll.payroll_date),
        employee_count: Set(payroll.employee_count),
        status: Set(status_to_db(payroll.status)),
        approver_id: Set(payroll.approver.map(|a| a.into_inner())),
        generated_by: Set(payroll.generated_by.into_inner()),
        total_amount: Set(payroll.total_amount),
        due_amount: Set(payroll.due_amount),
        run_date: Set(payroll.run_date.map(Into::into)),
        comment: Set(payroll.comment.clone()),
    }
}

pub(crate) fn roster_active(row: &PayrollEmployee) -> payroll_employees::ActiveModel {
    payroll_employees::ActiveModel {
        id: Set(row.id.into_inner()),
        payroll_id: Set(row.payroll_id.into_inner()),
        employee_id: Set(row.employee_id.into_inner()),
    }
}

pub(crate) fn salary_active(salary: &Salary) -> salaries::ActiveModel {
    salaries::ActiveModel {
        id: Set(salary.id.into_inner()),
        employee_id: Set(salary.employee_id.into_inner()),
        payroll_id: Set(salary.payroll_id.map(|p| p.into_inner())),
        salary_component_id: Set(salary.component_id.map(|c| c.into_inner())),
        row_type: Set(salary.row_type.code()),
        no_of_days: Set(salary.no_of_days),
        lop_days: Set(salary.lop_days),
        total_amount: Set(salary.total_amount),
        salary_date: Set(salary.salary_date),
        created_by: Set(salary.created_by.into_inner()),
        created_at: Set(salary.created_at.into()),
    }
}

pub(crate) fn component_active(component: &SalaryComponent) -> salary_components::ActiveModel {
    let (flat_amount, formula) = match component.default_amount {
        Some(ComponentAmount::Flat(v)) => (Some(v), None),
        Some(ComponentAmount::Formula(p)) => (None, Some(p)),
        None => (None, None),
    };
    salary_components::ActiveModel {
        id: Set(component.id.into_inner()),
        description: Set(component.description.clone()),
        component_code: Set(component.component_code.clone()),
        flat_amount: Set(flat_amount),
        formula: Set(formula),
        component_type: Set(component.component_type.clone()),
        category_id: Set(component.category.id()),
        is_deleted: Set(component.deleted),
    }
}

pub(crate) fn assignment_active(
    assignment: &EmployeeSalaryComponent,
) -> employee_salary_components::ActiveModel {
    employee_salary_components::ActiveModel {
        id: Set(assignment.id.into_inner()),
        employee_id: Set(assignment.employee_id.into_inner()),
        salary_component_id: Set(assignment.component_id.into_inner()),
        category_id: Set(assignment.category.id()),
        description: Set(assignment.description.clone()),
        flat_amount: Set(assignment.flat_amount),
        formula: Set(assignment.formula),
        monthly_amount: Set(assignment.monthly_amount),
        yearly_amount: Set(assignment.yearly_amount),
        no_of_days: Set(assignment.no_of_days),
    }
}

pub(crate) fn category_active(category: &TransactionCategory) -> transaction_categories::ActiveModel {
    transaction_categories::ActiveModel {
        id: Set(category.id.into_inner()),
        code: Set(category.code.clone()),
        name: Set(category.name.clone()),
        description: Set(category.description.clone()),
        account_group: Set(category.account_group.clone()),
        is_editable: Set(category.editable),
        is_selectable: Set(category.selectable),
    }
}

pub(crate) fn journal_active(
    journal: &Journal,
) -> (journals::ActiveModel, Vec<journal_line_items::ActiveModel>) {
    let header = journals::ActiveModel {
        id: Set(journal.id.into_inner()),
        journal_date: Set(journal.journal_date),
        transaction_date: Set(journal.transaction_date),
        description: Set(journal.description.clone()),
        reference_type: Set(reference_to_db(journal.reference_type)),
        reverses_journal_id: Set(journal.reverses.map(|j| j.into_inner())),
        created_by: Set(journal.created_by.into_inner()),
        created_at: Set(journal.created_at.into()),
    };
    let lines = journal
        .line_items
        .iter()
        .zip(1..)
        .map(|(line, line_no)| journal_line_items::ActiveModel {
            id: Set(line.id.into_inner()),
            journal_id: Set(journal.id.into_inner()),
            line_no: Set(line_no),
            transaction_category_id: Set(line.transaction_category_id.into_inner()),
            debit: Set(line.debit),
            credit: Set(line.credit),
            reference_id: Set(line.reference_id),
            reference_type: Set(reference_to_db(line.reference_type)),
        })
        .collect();
    (header, lines)
}

pub(crate) fn employment_active(employment: &Employment) -> employments::ActiveModel {
    employments::ActiveModel {
        employee_id: Set(employment.employee_id.into_inner()),
        gross_salary: Set(employment.gross_salary),
        ctc_type: Set(ctc_to_db(employment.ctc_type)),
        labour_card: Set(employment.labour_card.clone()),
        agent_id: Set(employment.agent_id.clone()),
    }
}
