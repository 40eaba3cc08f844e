//! `SeaORM` implementation of the payroll store.
//!
//! Every `commit_*` call runs in one database transaction. Status changes
//! take a `FOR UPDATE` lock on the payroll row and re-check its status
//! before writing.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use payledger_core::journal::{Journal, PostingReferenceType};
use payledger_core::payroll::error::PayrollError;
use payledger_core::payroll::store::{
    ApprovalCommit, AssignmentCommit, GenerationCommit, NewPayrollCommit, PayrollStore,
    PayrollUpdateCommit, SingleSalaryCommit, StatusChange, VoidCommit,
};
use payledger_core::payroll::types::{
    Employee, EmployeeBankDetails, EmployeeSalaryComponent, Employment, Payroll, PayrollEmployee,
    PayrollStatus, Salary, SalaryComponent, TransactionCategory, User, WageRole,
};
use payledger_core::payroll::workflow::PayrollAction;
use payledger_shared::types::{
    AssignmentId, EmployeeId, PayrollId, SalaryComponentId, TransactionCategoryId, UserId,
};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use crate::entities::{
    employee_bank_details, employee_salary_components, employee_transaction_categories,
    employees, employments, journal_line_items, journals, payroll_employees, payrolls, salaries,
    salary_components, transaction_categories, users,
};
use crate::mapping;

#[allow(clippy::needless_pass_by_value)]
fn db_err(e: DbErr) -> PayrollError {
    PayrollError::Store(e.to_string())
}

/// Payroll store backed by `PostgreSQL` through `SeaORM`.
#[derive(Debug, Clone)]
pub struct SeaPayrollStore {
    db: DatabaseConnection,
}

impl SeaPayrollStore {
    /// Creates a new store.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Locks the payroll row and checks it is in one of `expected`.
    async fn lock_payroll<C: ConnectionTrait>(
        conn: &C,
        payroll_id: PayrollId,
        expected: &[PayrollStatus],
        action: &'static str,
    ) -> Result<payrolls::Model, PayrollError> {
        let model = payrolls::Entity::find_by_id(payroll_id.into_inner())
            .lock_exclusive()
            .one(conn)
            .await
            .map_err(db_err)?
            .ok_or(PayrollError::PayrollNotFound(payroll_id))?;

        let status = mapping::status_from_db(model.status);
        if !expected.contains(&status) {
            return Err(PayrollError::TransitionConflict {
                from: status,
                action,
            });
        }
        Ok(model)
    }

    fn changed(model: payrolls::Model, change: &StatusChange) -> payrolls::ActiveModel {
        let mut active: payrolls::ActiveModel = model.into();
        active.status = Set(mapping::status_to_db(change.status));
        if let Some(approver) = change.approver {
            active.approver_id = Set(Some(approver.into_inner()));
        }
        if let Some(comment) = &change.comment {
            active.comment = Set(Some(comment.clone()));
        }
        if let Some(run_date) = change.run_date {
            active.run_date = Set(Some(run_date.into()));
        }
        active
    }

    async fn apply<C: ConnectionTrait>(
        conn: &C,
        change: &StatusChange,
        action: &'static str,
    ) -> Result<Payroll, PayrollError> {
        let model = Self::lock_payroll(conn, change.payroll_id, &change.expected, action).await?;
        let updated = Self::changed(model, change)
            .update(conn)
            .await
            .map_err(db_err)?;
        Ok(mapping::payroll(updated))
    }

    async fn insert_salaries<C: ConnectionTrait>(
        conn: &C,
        rows: &[Salary],
    ) -> Result<(), PayrollError> {
        if rows.is_empty() {
            return Ok(());
        }
        salaries::Entity::insert_many(rows.iter().map(mapping::salary_active))
            .exec(conn)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn insert_journals<C: ConnectionTrait>(
        conn: &C,
        journals: &[Journal],
    ) -> Result<(), PayrollError> {
        for journal in journals {
            let (header, lines) = mapping::journal_active(journal);
            header.insert(conn).await.map_err(db_err)?;
            if !lines.is_empty() {
                journal_line_items::Entity::insert_many(lines)
                    .exec(conn)
                    .await
                    .map_err(db_err)?;
            }
        }
        Ok(())
    }

    /// Inserts the bootstrap liability category unless a concurrent commit
    /// stored one under the same name first, then moves `journals` onto the
    /// category actually stored.
    async fn bootstrap_category<C: ConnectionTrait>(
        conn: &C,
        category: Option<&TransactionCategory>,
        journals: &mut [Journal],
    ) -> Result<(), PayrollError> {
        let Some(category) = category else {
            return Ok(());
        };
        transaction_categories::Entity::insert(mapping::category_active(category))
            .on_conflict(
                OnConflict::column(transaction_categories::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .do_nothing()
            .exec(conn)
            .await
            .map_err(db_err)?;

        let stored = transaction_categories::Entity::find()
            .filter(transaction_categories::Column::Name.eq(category.name.as_str()))
            .one(conn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| {
                PayrollError::Store(format!("category {} missing after insert", category.name))
            })?;
        let stored_id = TransactionCategoryId::from(stored.id);
        if stored_id == category.id {
            debug!(category = %category.name, "Liability category created");
        } else {
            debug!(
                category = %category.name,
                category_id = %stored_id,
                "Liability category already stored, journals remapped"
            );
            for journal in journals.iter_mut() {
                journal.replace_category(category.id, stored_id);
            }
        }
        Ok(())
    }

    async fn upsert_assignments<C: ConnectionTrait>(
        conn: &C,
        assignments: &[EmployeeSalaryComponent],
    ) -> Result<(), PayrollError> {
        for assignment in assignments {
            employee_salary_components::Entity::insert(mapping::assignment_active(assignment))
                .on_conflict(
                    OnConflict::column(employee_salary_components::Column::Id)
                        .update_columns([
                            employee_salary_components::Column::Description,
                            employee_salary_components::Column::CategoryId,
                            employee_salary_components::Column::FlatAmount,
                            employee_salary_components::Column::Formula,
                            employee_salary_components::Column::MonthlyAmount,
                            employee_salary_components::Column::YearlyAmount,
                            employee_salary_components::Column::NoOfDays,
                        ])
                        .to_owned(),
                )
                .exec(conn)
                .await
                .map_err(db_err)?;
        }
        Ok(())
    }
}

#[async_trait]
impl PayrollStore for SeaPayrollStore {
    // ========== Payrolls ==========

    async fn find_payroll(&self, id: PayrollId) -> Result<Option<Payroll>, PayrollError> {
        Ok(payrolls::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(mapping::payroll))
    }

    async fn payrolls_by_status(
        &self,
        statuses: &[PayrollStatus],
    ) -> Result<Vec<Payroll>, PayrollError> {
        let statuses: Vec<_> = statuses.iter().map(|s| mapping::status_to_db(*s)).collect();
        Ok(payrolls::Entity::find()
            .filter(payrolls::Column::Status.is_in(statuses))
            .order_by_desc(payrolls::Column::PayrollDate)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(mapping::payroll)
            .collect())
    }

    async fn roster(&self, payroll_id: PayrollId) -> Result<Vec<PayrollEmployee>, PayrollError> {
        Ok(payroll_employees::Entity::find()
            .filter(payroll_employees::Column::PayrollId.eq(payroll_id.into_inner()))
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(mapping::roster_row)
            .collect())
    }

    async fn payroll_salaries(&self, payroll_id: PayrollId) -> Result<Vec<Salary>, PayrollError> {
        salaries::Entity::find()
            .filter(salaries::Column::PayrollId.eq(payroll_id.into_inner()))
            .order_by_asc(salaries::Column::EmployeeId)
            .order_by_asc(salaries::Column::RowType)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(mapping::salary)
            .collect()
    }

    async fn salaries_before(&self, date: NaiveDate) -> Result<Vec<Salary>, PayrollError> {
        salaries::Entity::find()
            .filter(salaries::Column::SalaryDate.lt(date))
            .order_by_asc(salaries::Column::SalaryDate)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(mapping::salary)
            .collect()
    }

    async fn employees_with_salary(&self) -> Result<Vec<EmployeeId>, PayrollError> {
        let ids: Vec<Uuid> = salaries::Entity::find()
            .select_only()
            .column(salaries::Column::EmployeeId)
            .distinct()
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(ids.into_iter().map(EmployeeId::from).collect())
    }

    // ========== Catalog & assignments ==========

    async fn components(&self) -> Result<Vec<SalaryComponent>, PayrollError> {
        salary_components::Entity::find()
            .order_by_asc(salary_components::Column::ComponentCode)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(mapping::component)
            .collect()
    }

    async fn find_component(
        &self,
        id: SalaryComponentId,
    ) -> Result<Option<SalaryComponent>, PayrollError> {
        salary_components::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(mapping::component)
            .transpose()
    }

    async fn insert_component(&self, component: SalaryComponent) -> Result<(), PayrollError> {
        mapping::component_active(&component)
            .insert(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn soft_delete_component(&self, id: SalaryComponentId) -> Result<bool, PayrollError> {
        let result = salary_components::Entity::update_many()
            .col_expr(salary_components::Column::IsDeleted, Expr::value(true))
            .filter(salary_components::Column::Id.eq(id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn assignments(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<EmployeeSalaryComponent>, PayrollError> {
        employee_salary_components::Entity::find()
            .filter(employee_salary_components::Column::EmployeeId.eq(employee_id.into_inner()))
            .order_by_asc(employee_salary_components::Column::CategoryId)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(mapping::assignment)
            .collect()
    }

    async fn delete_assignment(
        &self,
        employee_id: EmployeeId,
        assignment_id: AssignmentId,
    ) -> Result<bool, PayrollError> {
        let result = employee_salary_components::Entity::delete_many()
            .filter(employee_salary_components::Column::Id.eq(assignment_id.into_inner()))
            .filter(employee_salary_components::Column::EmployeeId.eq(employee_id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }

    // ========== Ledger ==========

    async fn category_by_name(
        &self,
        name: &str,
    ) -> Result<Option<TransactionCategory>, PayrollError> {
        Ok(transaction_categories::Entity::find()
            .filter(transaction_categories::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(mapping::category))
    }

    async fn employee_category(
        &self,
        employee_id: EmployeeId,
        role: WageRole,
    ) -> Result<Option<TransactionCategoryId>, PayrollError> {
        Ok(employee_transaction_categories::Entity::find()
            .filter(employee_transaction_categories::Column::EmployeeId.eq(employee_id.into_inner()))
            .filter(employee_transaction_categories::Column::Role.eq(mapping::role_to_db(role)))
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(|m| m.transaction_category_id.into()))
    }

    async fn journals_by_reference(
        &self,
        reference_id: Uuid,
        reference_type: PostingReferenceType,
    ) -> Result<Vec<Journal>, PayrollError> {
        let journal_ids: Vec<Uuid> = journal_line_items::Entity::find()
            .select_only()
            .column(journal_line_items::Column::JournalId)
            .filter(journal_line_items::Column::ReferenceId.eq(reference_id))
            .filter(
                journal_line_items::Column::ReferenceType
                    .eq(mapping::reference_to_db(reference_type)),
            )
            .distinct()
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(db_err)?;
        if journal_ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(journals::Entity::find()
            .filter(journals::Column::Id.is_in(journal_ids))
            .order_by_asc(journals::Column::CreatedAt)
            .order_by_asc(journals::Column::Id)
            .find_with_related(journal_line_items::Entity)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(|(journal, lines)| mapping::journal(journal, lines))
            .collect())
    }

    // ========== Directory ==========

    async fn find_user(&self, id: UserId) -> Result<Option<User>, PayrollError> {
        Ok(users::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(mapping::user))
    }

    async fn find_employee(&self, id: EmployeeId) -> Result<Option<Employee>, PayrollError> {
        Ok(employees::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(mapping::employee))
    }

    async fn employees(&self) -> Result<Vec<Employee>, PayrollError> {
        Ok(employees::Entity::find()
            .order_by_asc(employees::Column::FirstName)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(mapping::employee)
            .collect())
    }

    async fn employment(&self, employee_id: EmployeeId) -> Result<Option<Employment>, PayrollError> {
        Ok(employments::Entity::find_by_id(employee_id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(mapping::employment))
    }

    async fn bank_details(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Option<EmployeeBankDetails>, PayrollError> {
        Ok(employee_bank_details::Entity::find_by_id(employee_id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(mapping::bank_details))
    }

    // ========== Atomic commits ==========

    async fn commit_new_payroll(&self, commit: NewPayrollCommit) -> Result<(), PayrollError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        mapping::payroll_active(&commit.payroll)
            .insert(&txn)
            .await
            .map_err(db_err)?;
        if !commit.roster.is_empty() {
            payroll_employees::Entity::insert_many(commit.roster.iter().map(mapping::roster_active))
                .exec(&txn)
                .await
                .map_err(db_err)?;
        }
        Self::insert_salaries(&txn, &commit.salaries).await?;

        txn.commit().await.map_err(db_err)
    }

    async fn commit_generation(&self, commit: GenerationCommit) -> Result<Payroll, PayrollError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let payroll_id = commit.change.payroll_id;

        let model = Self::lock_payroll(
            &txn,
            payroll_id,
            &commit.change.expected,
            PayrollAction::Generate.as_str(),
        )
        .await?;

        let removed = salaries::Entity::delete_many()
            .filter(salaries::Column::PayrollId.eq(payroll_id.into_inner()))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        Self::insert_salaries(&txn, &commit.salaries).await?;

        let mut active = Self::changed(model, &commit.change);
        active.employee_count = Set(commit.employee_count);
        active.total_amount = Set(commit.total_amount);
        active.due_amount = Set(commit.total_amount);
        let updated = active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        debug!(
            payroll_id = %payroll_id,
            removed = removed.rows_affected,
            inserted = commit.salaries.len(),
            "Salary rows replaced"
        );
        Ok(mapping::payroll(updated))
    }

    async fn commit_status(&self, changes: Vec<StatusChange>) -> Result<Vec<Payroll>, PayrollError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let ordered: BTreeSet<PayrollId> = changes.iter().map(|c| c.payroll_id).collect();

        let mut updated = Vec::with_capacity(changes.len());
        for payroll_id in ordered {
            for change in changes.iter().filter(|c| c.payroll_id == payroll_id) {
                updated.push(Self::apply(&txn, change, "change status of").await?);
            }
        }

        txn.commit().await.map_err(db_err)?;
        Ok(updated)
    }

    async fn commit_approval(&self, commit: ApprovalCommit) -> Result<Payroll, PayrollError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let model = Self::lock_payroll(
            &txn,
            commit.change.payroll_id,
            &commit.change.expected,
            PayrollAction::Approve.as_str(),
        )
        .await?;
        let mut journals = commit.journals;
        Self::bootstrap_category(&txn, commit.bootstrap_category.as_ref(), &mut journals).await?;
        Self::insert_journals(&txn, &journals).await?;
        let updated = Self::changed(model, &commit.change)
            .update(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(mapping::payroll(updated))
    }

    async fn commit_void(&self, commit: VoidCommit) -> Result<Payroll, PayrollError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let model = Self::lock_payroll(
            &txn,
            commit.change.payroll_id,
            &commit.change.expected,
            PayrollAction::Void.as_str(),
        )
        .await?;
        Self::insert_journals(&txn, &commit.journals).await?;
        let updated = Self::changed(model, &commit.change)
            .update(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(mapping::payroll(updated))
    }

    async fn commit_single_salary(&self, commit: SingleSalaryCommit) -> Result<(), PayrollError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let mut journals = commit.journals;
        Self::bootstrap_category(&txn, commit.bootstrap_category.as_ref(), &mut journals).await?;
        Self::insert_salaries(&txn, &commit.salaries).await?;
        Self::insert_journals(&txn, &journals).await?;
        Self::upsert_assignments(&txn, &commit.assignments).await?;

        txn.commit().await.map_err(db_err)
    }

    async fn commit_assignments(&self, commit: AssignmentCommit) -> Result<(), PayrollError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        Self::upsert_assignments(&txn, &commit.assignments).await?;
        if let Some(employment) = &commit.employment {
            employments::Entity::insert(mapping::employment_active(employment))
                .on_conflict(
                    OnConflict::column(employments::Column::EmployeeId)
                        .update_columns([
                            employments::Column::GrossSalary,
                            employments::Column::CtcType,
                        ])
                        .to_owned(),
                )
                .exec(&txn)
                .await
                .map_err(db_err)?;
        }

        txn.commit().await.map_err(db_err)
    }

    async fn commit_payroll_update(&self, commit: PayrollUpdateCommit) -> Result<Payroll, PayrollError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let payroll_id = commit.payroll.id;

        Self::lock_payroll(
            &txn,
            payroll_id,
            &commit.expected,
            PayrollAction::EditRoster.as_str(),
        )
        .await?;

        payroll_employees::Entity::delete_many()
            .filter(payroll_employees::Column::PayrollId.eq(payroll_id.into_inner()))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if !commit.roster.is_empty() {
            payroll_employees::Entity::insert_many(commit.roster.iter().map(mapping::roster_active))
                .exec(&txn)
                .await
                .map_err(db_err)?;
        }
        salaries::Entity::delete_many()
            .filter(salaries::Column::PayrollId.eq(payroll_id.into_inner()))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        Self::insert_salaries(&txn, &commit.salaries).await?;

        let updated = mapping::payroll_active(&commit.payroll)
            .update(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        debug!(
            payroll_id = %payroll_id,
            roster = commit.roster.len(),
            inserted = commit.salaries.len(),
            "Payroll rewritten"
        );
        Ok(mapping::payroll(updated))
    }

    async fn commit_payroll_delete(
        &self,
        payroll_id: PayrollId,
        expected: Vec<PayrollStatus>,
    ) -> Result<(), PayrollError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        Self::lock_payroll(
            &txn,
            payroll_id,
            &expected,
            PayrollAction::EditRoster.as_str(),
        )
        .await?;
        payroll_employees::Entity::delete_many()
            .filter(payroll_employees::Column::PayrollId.eq(payroll_id.into_inner()))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        salaries::Entity::delete_many()
            .filter(salaries::Column::PayrollId.eq(payroll_id.into_inner()))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        payrolls::Entity::delete_by_id(payroll_id.into_inner())
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)
    }

    async fn commit_roster_removal(
        &self,
        payroll_id: PayrollId,
        expected: Vec<PayrollStatus>,
        employee_ids: Vec<EmployeeId>,
    ) -> Result<u64, PayrollError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        Self::lock_payroll(
            &txn,
            payroll_id,
            &expected,
            PayrollAction::EditRoster.as_str(),
        )
        .await?;
        let ids: Vec<Uuid> = employee_ids.iter().map(|e| e.into_inner()).collect();
        let result = payroll_employees::Entity::delete_many()
            .filter(payroll_employees::Column::PayrollId.eq(payroll_id.into_inner()))
            .filter(payroll_employees::Column::EmployeeId.is_in(ids))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(result.rows_affected)
    }
}
