//! Payroll engine: orchestrates generation, workflow, postings and reports.
//!
//! Every state-changing operation runs under a per-payroll async mutex, is
//! validated by [`PayrollWorkflow`] and handed to the store as a single
//! commit. Mails go out after the commit, on a spawned task.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use payledger_shared::config::PayrollConfig;
use payledger_shared::types::{
    AssignmentId, EmployeeId, PayrollEmployeeId, PayrollId, SalaryComponentId,
    TransactionCategoryId, UserId,
};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};
use uuid::Uuid;

use crate::journal::{Journal, JournalPostingService, PostingReferenceType, PostingRequest};
use crate::notification::{Notification, PayrollNotifier};
use crate::payroll::assignment::{AssignComponentInput, AssignmentService};
use crate::payroll::bank_export::{BankExportService, BankFile, BankFileEmployee};
use crate::payroll::error::PayrollError;
use crate::payroll::ledger::{
    DeductionTreatment, GenerationContext, SalaryGeneration, SalaryLedger, SkippedEmployee,
};
use crate::payroll::reports::{PayrollReports, SalaryMonthEntry};
use crate::payroll::store::{
    ApprovalCommit, AssignmentCommit, GenerationCommit, NewPayrollCommit, PayrollStore,
    PayrollUpdateCommit, SingleSalaryCommit, StatusChange, VoidCommit,
};
use crate::payroll::types::{
    Employee, EmployeeRunInput, EmployeeSalaryComponent, Employment, NewSalaryComponent, PayPeriod,
    Payroll, PayrollEmployee, PayrollStatus, RunDays, Salary, SalaryCategory, SalaryComponent,
    SalaryRowType, TransactionCategory, User, WageRole,
};
use crate::payroll::workflow::{PayrollAction, PayrollWorkflow};

/// Input for [`PayrollEngine::create_payroll`].
#[derive(Debug, Clone)]
pub struct CreatePayrollInput {
    /// Subject line.
    pub subject: String,
    /// Pay period, `dd/MM/yyyy-dd/MM/yyyy`.
    pub pay_period: String,
    /// Posting date.
    pub payroll_date: NaiveDate,
    /// Creator.
    pub generated_by: UserId,
    /// Approver chosen up front, if any.
    pub approver: Option<UserId>,
    /// Roster.
    pub employee_ids: Vec<EmployeeId>,
    /// Run inputs to generate salary in the same unit.
    pub run: Option<Vec<EmployeeRunInput>>,
}

/// Input for [`PayrollEngine::update_payroll`].
///
/// Header fields left as `None` keep their stored value. The roster and
/// run replace the stored ones wholesale.
#[derive(Debug, Clone)]
pub struct UpdatePayrollInput {
    /// Payroll to rewrite.
    pub payroll_id: PayrollId,
    /// New subject line.
    pub subject: Option<String>,
    /// New pay period, `dd/MM/yyyy-dd/MM/yyyy`.
    pub pay_period: Option<String>,
    /// New posting date.
    pub payroll_date: Option<NaiveDate>,
    /// Approver; replaces the stored one, `None` clears it.
    pub approver: Option<UserId>,
    /// User editing the run; recorded as its generator.
    pub updated_by: UserId,
    /// New roster.
    pub employee_ids: Vec<EmployeeId>,
    /// Run inputs to regenerate with; without them the payroll keeps no rows.
    pub run: Option<Vec<EmployeeRunInput>>,
}

/// Input for [`PayrollEngine::generate_salary`].
#[derive(Debug, Clone)]
pub struct SingleSalaryInput {
    /// Employees to pay.
    pub employee_ids: Vec<EmployeeId>,
    /// Date stamped on the rows.
    pub salary_date: NaiveDate,
    /// User paying.
    pub created_by: UserId,
}

/// A payroll and the employees its generation left out.
#[derive(Debug, Clone)]
pub struct PayrollRun {
    /// Payroll after the operation.
    pub payroll: Payroll,
    /// Employees without rows.
    pub skipped: Vec<SkippedEmployee>,
}

/// A payroll and the journals an operation posted.
#[derive(Debug, Clone)]
pub struct PostedPayroll {
    /// Payroll after the operation.
    pub payroll: Payroll,
    /// Journals posted.
    pub journals: Vec<Journal>,
}

/// Result of on-demand salary.
#[derive(Debug, Clone)]
pub struct SingleSalaryOutcome {
    /// Rows written.
    pub salaries: Vec<Salary>,
    /// Journals posted, one per paid employee.
    pub journals: Vec<Journal>,
    /// Employees left out.
    pub skipped: Vec<SkippedEmployee>,
}

/// The payroll computation and ledger-posting engine.
pub struct PayrollEngine {
    store: Arc<dyn PayrollStore>,
    notifier: PayrollNotifier,
    config: PayrollConfig,
    locks: DashMap<PayrollId, Arc<Mutex<()>>>,
}

impl PayrollEngine {
    /// Creates an engine over `store`.
    pub fn new(store: Arc<dyn PayrollStore>, notifier: PayrollNotifier, config: PayrollConfig) -> Self {
        Self {
            store,
            notifier,
            config,
            locks: DashMap::new(),
        }
    }

    // ===== Payroll lifecycle =====

    /// Creates a Draft payroll with its roster, generating salary in the same
    /// unit when run inputs are supplied.
    pub async fn create_payroll(&self, input: CreatePayrollInput) -> Result<PayrollRun, PayrollError> {
        PayPeriod::parse(&input.pay_period)?;

        let employee_ids: BTreeSet<EmployeeId> = input.employee_ids.iter().copied().collect();
        if employee_ids.is_empty() {
            return Err(PayrollError::EmptyRoster);
        }

        let mut payroll = Payroll {
            id: PayrollId::new(),
            subject: input.subject.trim().to_string(),
            pay_period: input.pay_period,
            payroll_date: input.payroll_date,
            employee_count: Self::count(employee_ids.len())?,
            status: PayrollStatus::Draft,
            approver: input.approver,
            generated_by: input.generated_by,
            total_amount: Decimal::ZERO,
            due_amount: Decimal::ZERO,
            run_date: None,
            comment: None,
        };
        let roster = Self::roster_rows(payroll.id, &employee_ids);
        let (salaries, skipped) = self
            .roster_generation(&mut payroll, &employee_ids, input.run)
            .await?;

        self.store
            .commit_new_payroll(NewPayrollCommit {
                payroll: payroll.clone(),
                roster,
                salaries,
            })
            .await?;

        info!(
            payroll_id = %payroll.id,
            employee_count = payroll.employee_count,
            skipped = skipped.len(),
            "Payroll created"
        );
        Ok(PayrollRun { payroll, skipped })
    }

    /// Replaces the payroll's salary rows; allowed from Draft and Rejected.
    pub async fn generate(
        &self,
        payroll_id: PayrollId,
        inputs: Vec<EmployeeRunInput>,
        generated_by: UserId,
    ) -> Result<PayrollRun, PayrollError> {
        let _guard = self.lock(payroll_id).await;
        let payroll = self.load(payroll_id).await?;
        let status = PayrollWorkflow::transition(payroll.status, PayrollAction::Generate)?;
        if inputs.is_empty() {
            return Err(PayrollError::EmptyRoster);
        }
        let roster: BTreeSet<EmployeeId> = self
            .store
            .roster(payroll_id)
            .await?
            .into_iter()
            .map(|r| r.employee_id)
            .collect();
        Self::check_run_inputs(&roster, &inputs)?;

        let generation = self.run_generation(&payroll, &inputs, generated_by).await?;
        let payroll = self
            .store
            .commit_generation(GenerationCommit {
                change: StatusChange::new(payroll_id, PayrollAction::Generate.allowed_from(), status),
                employee_count: Self::count(roster.len())?,
                total_amount: generation.total_payroll_amount,
                salaries: generation.salaries,
            })
            .await?;

        info!(
            payroll_id = %payroll_id,
            status = %payroll.status,
            employee_count = payroll.employee_count,
            total = %payroll.total_amount,
            skipped = generation.skipped.len(),
            "Payroll generated"
        );
        Ok(PayrollRun {
            payroll,
            skipped: generation.skipped,
        })
    }

    /// Sends a Draft payroll to `approver`.
    pub async fn submit(&self, payroll_id: PayrollId, approver: UserId) -> Result<Payroll, PayrollError> {
        let _guard = self.lock(payroll_id).await;
        let payroll = self.load(payroll_id).await?;
        let status = PayrollWorkflow::transition(payroll.status, PayrollAction::Submit)?;
        let approver_user = self.user(approver).await?;

        let mut change = StatusChange::new(payroll_id, PayrollAction::Submit.allowed_from(), status);
        change.approver = Some(approver);
        let payroll = self.single_change(change).await?;

        info!(payroll_id = %payroll_id, status = %payroll.status, approver = %approver, "Payroll submitted");

        if let Some(generator) = self.optional_user(payroll.generated_by).await {
            self.notify(vec![PayrollNotifier::approval_request(
                &payroll,
                &generator,
                &approver_user,
            )]);
        }
        Ok(payroll)
    }

    /// Sends a Submitted payroll back to its generator.
    pub async fn reject(&self, payroll_id: PayrollId, comment: &str) -> Result<Payroll, PayrollError> {
        let comment = PayrollWorkflow::require_comment(comment)?;
        let _guard = self.lock(payroll_id).await;
        let payroll = self.load(payroll_id).await?;
        let status = PayrollWorkflow::transition(payroll.status, PayrollAction::Reject)?;

        let mut change = StatusChange::new(payroll_id, PayrollAction::Reject.allowed_from(), status);
        change.comment = Some(comment.clone());
        let payroll = self.single_change(change).await?;

        info!(payroll_id = %payroll_id, status = %payroll.status, "Payroll rejected");

        if let Some(generator) = self.optional_user(payroll.generated_by).await {
            let approver = match payroll.approver {
                Some(id) => self.optional_user(id).await,
                None => None,
            };
            self.notify(vec![PayrollNotifier::rejection(
                &payroll,
                &generator,
                approver.as_ref(),
                &comment,
            )]);
        }
        Ok(payroll)
    }

    /// Brings a Rejected payroll back to Draft.
    pub async fn reopen(&self, payroll_id: PayrollId) -> Result<Payroll, PayrollError> {
        let _guard = self.lock(payroll_id).await;
        let payroll = self.load(payroll_id).await?;
        let status = PayrollWorkflow::transition(payroll.status, PayrollAction::Reopen)?;
        let payroll = self
            .single_change(StatusChange::new(
                payroll_id,
                PayrollAction::Reopen.allowed_from(),
                status,
            ))
            .await?;
        info!(payroll_id = %payroll_id, status = %payroll.status, "Payroll reopened");
        Ok(payroll)
    }

    /// Approves a Submitted payroll, posting one journal per employee total.
    ///
    /// Payslips are mailed to `payslip_recipients` after the commit.
    pub async fn approve_run(
        &self,
        payroll_id: PayrollId,
        approved_by: UserId,
        payslip_recipients: &[EmployeeId],
    ) -> Result<PostedPayroll, PayrollError> {
        let _guard = self.lock(payroll_id).await;
        let payroll = self.load(payroll_id).await?;
        let status = PayrollWorkflow::transition(payroll.status, PayrollAction::Approve)?;

        let salaries = self.store.payroll_salaries(payroll_id).await?;
        let (liability, bootstrap_category) = self.liability_category().await?;
        let now = Utc::now();

        let mut journals = Vec::new();
        for total in salaries
            .iter()
            .filter(|s| s.row_type == SalaryRowType::EmployeeTotal)
        {
            let wages_category_id = self.wages_category(total.employee_id).await?;
            journals.push(JournalPostingService::post(&PostingRequest {
                liability_category_id: liability,
                wages_category_id,
                amount: total.total_amount,
                reference_id: payroll_id.into_inner(),
                journal_date: payroll.payroll_date,
                description: Some(payroll.subject.clone()).filter(|s| !s.is_empty()),
                created_by: approved_by,
                now,
            })?);
        }

        let mut change = StatusChange::new(payroll_id, PayrollAction::Approve.allowed_from(), status);
        change.run_date = Some(now);
        let payroll = self
            .store
            .commit_approval(ApprovalCommit {
                change,
                bootstrap_category: bootstrap_category.clone(),
                journals: journals.clone(),
            })
            .await?;
        self.settle_liability(bootstrap_category.as_ref(), &mut journals)
            .await;

        info!(
            payroll_id = %payroll_id,
            status = %payroll.status,
            journals = journals.len(),
            "Payroll approved"
        );

        match self.payslips(&payroll, &salaries, payslip_recipients).await {
            Ok(payslips) => self.notify(payslips),
            Err(e) => warn!(payroll_id = %payroll_id, error = %e, "Payslips not sent"),
        }

        Ok(PostedPayroll { payroll, journals })
    }

    /// Marks payrolls as paid, all or none.
    pub async fn convert_to_paid(&self, payroll_ids: &[PayrollId]) -> Result<Vec<Payroll>, PayrollError> {
        let ids: BTreeSet<PayrollId> = payroll_ids.iter().copied().collect();
        let mut guards = Vec::with_capacity(ids.len());
        for id in &ids {
            guards.push(self.lock(*id).await);
        }

        let mut changes = Vec::with_capacity(ids.len());
        for id in &ids {
            let payroll = self.load(*id).await?;
            let status = PayrollWorkflow::transition(payroll.status, PayrollAction::ConvertToPaid)?;
            changes.push(StatusChange::new(
                *id,
                PayrollAction::ConvertToPaid.allowed_from(),
                status,
            ));
        }

        let payrolls = self.store.commit_status(changes).await?;
        info!(count = payrolls.len(), "Payrolls marked paid");
        Ok(payrolls)
    }

    /// Voids an approved or paid payroll by posting a reversal of every
    /// approval journal. Originals stay untouched.
    pub async fn void(
        &self,
        payroll_id: PayrollId,
        comment: &str,
        voided_by: UserId,
    ) -> Result<PostedPayroll, PayrollError> {
        let comment = PayrollWorkflow::require_comment(comment)?;
        let _guard = self.lock(payroll_id).await;
        let payroll = self.load(payroll_id).await?;
        let status = PayrollWorkflow::transition(payroll.status, PayrollAction::Void)?;

        let originals = self
            .store
            .journals_by_reference(payroll_id.into_inner(), PostingReferenceType::PayrollApproved)
            .await?;
        let now = Utc::now();
        let description = Some(format!(
            "Reverse Journal Entry Against: {}",
            payroll.subject
        ));
        let journals = originals
            .iter()
            .filter(|j| j.reference_type == PostingReferenceType::PayrollApproved)
            .map(|j| JournalPostingService::reverse(j, description.clone(), voided_by, now))
            .collect::<Result<Vec<_>, _>>()?;

        let mut change = StatusChange::new(payroll_id, PayrollAction::Void.allowed_from(), status);
        change.comment = Some(comment.clone());
        let payroll = self
            .store
            .commit_void(VoidCommit {
                change,
                journals: journals.clone(),
            })
            .await?;

        info!(
            payroll_id = %payroll_id,
            status = %payroll.status,
            reversals = journals.len(),
            "Payroll voided"
        );

        let generator = self.optional_user(payroll.generated_by).await;
        match self.void_recipients(&payroll, generator.as_ref()).await {
            Ok(recipients) => self.notify(PayrollNotifier::voidance(
                &payroll,
                generator.as_ref(),
                &recipients,
                &comment,
            )),
            Err(e) => warn!(payroll_id = %payroll_id, error = %e, "Void notices not sent"),
        }

        Ok(PostedPayroll { payroll, journals })
    }

    /// Removes employees from the roster of a payroll still being prepared.
    pub async fn remove_roster_employees(
        &self,
        payroll_id: PayrollId,
        employee_ids: Vec<EmployeeId>,
    ) -> Result<u64, PayrollError> {
        let _guard = self.lock(payroll_id).await;
        let payroll = self.load(payroll_id).await?;
        PayrollWorkflow::transition(payroll.status, PayrollAction::EditRoster)?;
        let removed = self
            .store
            .commit_roster_removal(
                payroll_id,
                PayrollAction::EditRoster.allowed_from().to_vec(),
                employee_ids,
            )
            .await?;
        info!(payroll_id = %payroll_id, removed, "Roster employees removed");
        Ok(removed)
    }

    /// Rewrites a Draft or Rejected payroll in one commit: header, roster
    /// and salary rows. The payroll comes back as Draft with its comment
    /// cleared and the editor recorded as generator.
    pub async fn update_payroll(&self, input: UpdatePayrollInput) -> Result<PayrollRun, PayrollError> {
        let payroll_id = input.payroll_id;
        let _guard = self.lock(payroll_id).await;
        let current = self.load(payroll_id).await?;
        PayrollWorkflow::transition(current.status, PayrollAction::EditRoster)?;
        let status = PayrollWorkflow::transition(current.status, PayrollAction::Generate)?;
        if let Some(period) = &input.pay_period {
            PayPeriod::parse(period)?;
        }

        let employee_ids: BTreeSet<EmployeeId> = input.employee_ids.iter().copied().collect();
        if employee_ids.is_empty() {
            return Err(PayrollError::EmptyRoster);
        }

        let mut payroll = Payroll {
            id: payroll_id,
            subject: input
                .subject
                .map_or(current.subject, |s| s.trim().to_string()),
            pay_period: input.pay_period.unwrap_or(current.pay_period),
            payroll_date: input.payroll_date.unwrap_or(current.payroll_date),
            employee_count: Self::count(employee_ids.len())?,
            status,
            approver: input.approver,
            generated_by: input.updated_by,
            total_amount: Decimal::ZERO,
            due_amount: Decimal::ZERO,
            run_date: current.run_date,
            comment: None,
        };
        let roster = Self::roster_rows(payroll_id, &employee_ids);
        let (salaries, skipped) = self
            .roster_generation(&mut payroll, &employee_ids, input.run)
            .await?;

        let payroll = self
            .store
            .commit_payroll_update(PayrollUpdateCommit {
                expected: PayrollAction::EditRoster.allowed_from().to_vec(),
                payroll,
                roster,
                salaries,
            })
            .await?;

        info!(
            payroll_id = %payroll_id,
            status = %payroll.status,
            employee_count = payroll.employee_count,
            total = %payroll.total_amount,
            skipped = skipped.len(),
            "Payroll updated"
        );
        Ok(PayrollRun { payroll, skipped })
    }

    /// Deletes a Draft or Rejected payroll with its roster and salary rows.
    pub async fn delete_payroll(&self, payroll_id: PayrollId) -> Result<(), PayrollError> {
        let guard = self.lock(payroll_id).await;
        let payroll = self.load(payroll_id).await?;
        PayrollWorkflow::transition(payroll.status, PayrollAction::EditRoster)?;
        self.store
            .commit_payroll_delete(payroll_id, PayrollAction::EditRoster.allowed_from().to_vec())
            .await?;
        drop(guard);
        self.locks.remove(&payroll_id);

        info!(payroll_id = %payroll_id, status = %payroll.status, "Payroll deleted");
        Ok(())
    }

    // ===== On-demand salary =====

    /// Pays employees outside a payroll run.
    ///
    /// Each assignment is paid over its own stored basis with deductions
    /// subtracted, one journal per employee is posted against the employee,
    /// and every paid assignment is re-based to the default basis.
    pub async fn generate_salary(&self, input: SingleSalaryInput) -> Result<SingleSalaryOutcome, PayrollError> {
        if input.employee_ids.is_empty() {
            return Err(PayrollError::EmptyRoster);
        }
        for id in &input.employee_ids {
            if self.store.find_employee(*id).await?.is_none() {
                return Err(PayrollError::EmployeeNotFound(*id));
            }
        }

        let inputs: Vec<EmployeeRunInput> = input
            .employee_ids
            .iter()
            .map(|&employee_id| EmployeeRunInput {
                employee_id,
                days: RunDays::StoredBasis,
                lop_days: Decimal::ZERO,
            })
            .collect();
        let assignments = self.assignments_for(&input.employee_ids).await?;
        let now = Utc::now();
        let ctx = GenerationContext {
            payroll_id: None,
            salary_date: input.salary_date,
            created_by: input.created_by,
            now,
            treatment: DeductionTreatment::Subtracted,
        };
        let generation = SalaryLedger::generate(&ctx, &inputs, &assignments);

        let (liability, bootstrap_category) = self.liability_category().await?;
        let mut journals = Vec::with_capacity(generation.employee_totals.len());
        let mut rebased = Vec::new();
        for total in &generation.employee_totals {
            let wages_category_id = self.wages_category(total.employee_id).await?;
            journals.push(JournalPostingService::post(&PostingRequest {
                liability_category_id: liability,
                wages_category_id,
                amount: total.total,
                reference_id: total.employee_id.into_inner(),
                journal_date: now.date_naive(),
                description: None,
                created_by: input.created_by,
                now,
            })?);
            if let Some(paid) = assignments.get(&total.employee_id) {
                rebased.extend(AssignmentService::rebase(paid, self.config.default_basis_days)?);
            }
        }

        self.store
            .commit_single_salary(SingleSalaryCommit {
                bootstrap_category: bootstrap_category.clone(),
                salaries: generation.salaries.clone(),
                journals: journals.clone(),
                assignments: rebased,
            })
            .await?;
        self.settle_liability(bootstrap_category.as_ref(), &mut journals)
            .await;

        info!(
            employees = generation.employee_totals.len(),
            skipped = generation.skipped.len(),
            total = %generation.total_payroll_amount,
            "On-demand salary generated"
        );
        Ok(SingleSalaryOutcome {
            salaries: generation.salaries,
            journals,
            skipped: generation.skipped,
        })
    }

    // ===== Assignments =====

    /// Creates or updates the employee's assignment of a catalog component.
    pub async fn assign_component(
        &self,
        input: AssignComponentInput,
    ) -> Result<EmployeeSalaryComponent, PayrollError> {
        self.employee(input.employee_id).await?;
        let component = self.find_component(input.component_id).await?;

        let stored = self.store.employment(input.employee_id).await?;
        let gross = input
            .gross_salary
            .map(|g| (g, input.ctc_type))
            .or_else(|| {
                stored
                    .as_ref()
                    .and_then(|e| e.gross_salary.map(|g| (g, e.ctc_type)))
            });

        let existing = self.store.assignments(input.employee_id).await?;
        let current = existing.iter().find(|a| a.component_id == component.id);
        let assignment = AssignmentService::build(
            current,
            &component,
            &input,
            gross,
            self.config.default_basis_days,
        )?;

        let employment = input.gross_salary.map(|gross_salary| match stored {
            Some(e) => Employment {
                gross_salary: Some(gross_salary),
                ctc_type: input.ctc_type,
                ..e
            },
            None => Employment {
                employee_id: input.employee_id,
                gross_salary: Some(gross_salary),
                ctc_type: input.ctc_type,
                labour_card: None,
                agent_id: None,
            },
        });

        self.store
            .commit_assignments(AssignmentCommit {
                assignments: vec![assignment.clone()],
                employment,
            })
            .await?;

        info!(
            employee_id = %input.employee_id,
            component_id = %component.id,
            monthly = %assignment.monthly_amount,
            "Salary component assigned"
        );
        Ok(assignment)
    }

    /// Re-expresses all of an employee's assignments against `new_days`.
    pub async fn rebase_working_days(
        &self,
        employee_id: EmployeeId,
        new_days: Decimal,
    ) -> Result<Vec<EmployeeSalaryComponent>, PayrollError> {
        self.employee(employee_id).await?;
        let assignments = self.store.assignments(employee_id).await?;
        let rebased = AssignmentService::rebase(&assignments, new_days)?;
        self.store
            .commit_assignments(AssignmentCommit {
                assignments: rebased.clone(),
                employment: None,
            })
            .await?;
        info!(employee_id = %employee_id, days = %new_days, "Working days rebased");
        Ok(rebased)
    }

    /// Removes one of an employee's assignments.
    pub async fn remove_assignment(
        &self,
        employee_id: EmployeeId,
        assignment_id: AssignmentId,
    ) -> Result<(), PayrollError> {
        if !self.store.delete_assignment(employee_id, assignment_id).await? {
            return Err(PayrollError::AssignmentNotFound(assignment_id));
        }
        info!(employee_id = %employee_id, assignment_id = %assignment_id, "Assignment removed");
        Ok(())
    }

    // ===== Catalog =====

    /// Active catalog components.
    pub async fn list_components(&self) -> Result<Vec<SalaryComponent>, PayrollError> {
        Ok(self
            .store
            .components()
            .await?
            .into_iter()
            .filter(|c| !c.deleted)
            .collect())
    }

    /// Finds an active catalog component.
    pub async fn find_component(&self, id: SalaryComponentId) -> Result<SalaryComponent, PayrollError> {
        self.store
            .find_component(id)
            .await?
            .filter(|c| !c.deleted)
            .ok_or(PayrollError::ComponentNotFound(id))
    }

    /// Adds a component to the catalog.
    pub async fn create_component(&self, input: NewSalaryComponent) -> Result<SalaryComponent, PayrollError> {
        let component = SalaryComponent {
            id: SalaryComponentId::new(),
            description: input.description,
            component_code: input.component_code,
            default_amount: input.default_amount,
            component_type: input.component_type,
            category: input.category,
            deleted: false,
        };
        self.store.insert_component(component.clone()).await?;
        info!(component_id = %component.id, category = %component.category, "Salary component created");
        Ok(component)
    }

    /// Soft-deletes a catalog component.
    pub async fn soft_delete_component(&self, id: SalaryComponentId) -> Result<(), PayrollError> {
        if !self.store.soft_delete_component(id).await? {
            return Err(PayrollError::ComponentNotFound(id));
        }
        Ok(())
    }

    // ===== Reports =====

    /// Salary per employee and month before `as_of`, plus Draft entries for
    /// complete profiles that were never paid.
    pub async fn salary_per_month_list(&self, as_of: NaiveDate) -> Result<Vec<SalaryMonthEntry>, PayrollError> {
        let salaries = self.store.salaries_before(as_of).await?;
        let categories = self.component_categories().await?;
        let employees: HashMap<EmployeeId, Employee> = self
            .store
            .employees()
            .await?
            .into_iter()
            .map(|e| (e.id, e))
            .collect();

        let mut entries = PayrollReports::paid_entries(&salaries, &categories, &employees);

        let paid: HashSet<EmployeeId> = self.store.employees_with_salary().await?.into_iter().collect();
        let mut unpaid: Vec<&Employee> = employees.values().filter(|e| !paid.contains(&e.id)).collect();
        unpaid.sort_by_key(|e| e.id);
        for employee in unpaid {
            let assignments = self.store.assignments(employee.id).await?;
            if self.profile_complete(employee, &assignments).await? {
                entries.push(PayrollReports::draft_entry(employee, &assignments));
            }
        }
        Ok(entries)
    }

    /// Active employees that cannot be paid yet.
    pub async fn incomplete_employee_list(&self) -> Result<Vec<Employee>, PayrollError> {
        let mut incomplete = Vec::new();
        for employee in self.store.employees().await?.into_iter().filter(|e| e.active) {
            let assignments = self.store.assignments(employee.id).await?;
            if !self.profile_complete(&employee, &assignments).await? {
                incomplete.push(employee);
            }
        }
        Ok(incomplete)
    }

    /// Approved or partially paid payrolls with money still due.
    pub async fn unpaid_payrolls(&self) -> Result<Vec<Payroll>, PayrollError> {
        let payrolls = self
            .store
            .payrolls_by_status(&[PayrollStatus::Approved, PayrollStatus::PartiallyPaid])
            .await?;
        Ok(PayrollReports::unpaid(payrolls))
    }

    /// Bank salary information file for `employee_ids`, or the whole
    /// roster when none are given.
    pub async fn bank_export(
        &self,
        payroll_id: PayrollId,
        employee_ids: Option<Vec<EmployeeId>>,
    ) -> Result<BankFile, PayrollError> {
        let payroll = self.load(payroll_id).await?;
        let employee_ids = match employee_ids {
            Some(ids) => ids,
            None => self
                .store
                .roster(payroll_id)
                .await?
                .into_iter()
                .map(|r| r.employee_id)
                .collect(),
        };

        let salaries = self.store.payroll_salaries(payroll_id).await?;
        let mut employees = Vec::with_capacity(employee_ids.len());
        for employee_id in employee_ids {
            let employment = self.store.employment(employee_id).await?;
            let bank_details = self.store.bank_details(employee_id).await?;
            let (Some(employment), Some(bank_details)) = (employment, bank_details) else {
                return Err(PayrollError::IncompleteProfile(employee_id));
            };
            employees.push(BankFileEmployee {
                employment,
                bank_details,
                salaries: salaries
                    .iter()
                    .filter(|s| s.employee_id == employee_id)
                    .cloned()
                    .collect(),
            });
        }

        let categories = self.component_categories().await?;
        let file = BankExportService::build(&payroll, &employees, &categories, &self.config, Utc::now())?;
        info!(payroll_id = %payroll_id, file_name = %file.file_name, "Bank file exported");
        Ok(file)
    }

    /// Approval and reversal journals referencing `reference_id` (a payroll
    /// or, for on-demand salary, an employee), oldest first.
    pub async fn payroll_journals(&self, reference_id: Uuid) -> Result<Vec<Journal>, PayrollError> {
        let mut journals = self
            .store
            .journals_by_reference(reference_id, PostingReferenceType::PayrollApproved)
            .await?;
        journals.extend(
            self.store
                .journals_by_reference(reference_id, PostingReferenceType::PayrollVoided)
                .await?,
        );
        journals.sort_by_key(|j| (j.created_at, j.id));
        journals.dedup_by_key(|j| j.id);
        Ok(journals)
    }

    // ===== Helpers =====

    async fn lock(&self, payroll_id: PayrollId) -> OwnedMutexGuard<()> {
        let mutex = Arc::clone(
            self.locks
                .entry(payroll_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );
        mutex.lock_owned().await
    }

    async fn load(&self, payroll_id: PayrollId) -> Result<Payroll, PayrollError> {
        self.store
            .find_payroll(payroll_id)
            .await?
            .ok_or(PayrollError::PayrollNotFound(payroll_id))
    }

    async fn user(&self, id: UserId) -> Result<User, PayrollError> {
        self.store
            .find_user(id)
            .await?
            .ok_or(PayrollError::UserNotFound(id))
    }

    async fn optional_user(&self, id: UserId) -> Option<User> {
        match self.store.find_user(id).await {
            Ok(Some(user)) => Some(user),
            Ok(None) => {
                warn!(user_id = %id, "User not found, skipping notification");
                None
            }
            Err(e) => {
                warn!(user_id = %id, error = %e, "User lookup failed, skipping notification");
                None
            }
        }
    }

    async fn employee(&self, id: EmployeeId) -> Result<Employee, PayrollError> {
        self.store
            .find_employee(id)
            .await?
            .ok_or(PayrollError::EmployeeNotFound(id))
    }

    async fn single_change(&self, change: StatusChange) -> Result<Payroll, PayrollError> {
        let payroll_id = change.payroll_id;
        self.store
            .commit_status(vec![change])
            .await?
            .into_iter()
            .next()
            .ok_or(PayrollError::PayrollNotFound(payroll_id))
    }

    async fn assignments_for(
        &self,
        employee_ids: &[EmployeeId],
    ) -> Result<HashMap<EmployeeId, Vec<EmployeeSalaryComponent>>, PayrollError> {
        let mut map = HashMap::with_capacity(employee_ids.len());
        for &id in employee_ids {
            map.insert(id, self.store.assignments(id).await?);
        }
        Ok(map)
    }

    async fn run_generation(
        &self,
        payroll: &Payroll,
        inputs: &[EmployeeRunInput],
        generated_by: UserId,
    ) -> Result<SalaryGeneration, PayrollError> {
        let employee_ids: Vec<EmployeeId> = inputs.iter().map(|i| i.employee_id).collect();
        let assignments = self.assignments_for(&employee_ids).await?;
        let ctx = GenerationContext {
            payroll_id: Some(payroll.id),
            salary_date: payroll.payroll_date,
            created_by: generated_by,
            now: Utc::now(),
            treatment: DeductionTreatment::Excluded,
        };
        Ok(SalaryLedger::generate(&ctx, inputs, &assignments))
    }

    /// Rejects run inputs that repeat an employee or name one off `roster`.
    fn check_run_inputs(
        roster: &BTreeSet<EmployeeId>,
        inputs: &[EmployeeRunInput],
    ) -> Result<(), PayrollError> {
        let mut seen = HashSet::with_capacity(inputs.len());
        for input in inputs {
            if !roster.contains(&input.employee_id) {
                return Err(PayrollError::NotOnRoster(input.employee_id));
            }
            if !seen.insert(input.employee_id) {
                return Err(PayrollError::DuplicateRunInput(input.employee_id));
            }
        }
        Ok(())
    }

    fn roster_rows(payroll_id: PayrollId, employee_ids: &BTreeSet<EmployeeId>) -> Vec<PayrollEmployee> {
        employee_ids
            .iter()
            .map(|&employee_id| PayrollEmployee {
                id: PayrollEmployeeId::new(),
                payroll_id,
                employee_id,
            })
            .collect()
    }

    /// Generates a payroll being written with `roster`, filling in its
    /// totals. No run means no rows.
    async fn roster_generation(
        &self,
        payroll: &mut Payroll,
        roster: &BTreeSet<EmployeeId>,
        run: Option<Vec<EmployeeRunInput>>,
    ) -> Result<(Vec<Salary>, Vec<SkippedEmployee>), PayrollError> {
        let Some(run) = run.filter(|r| !r.is_empty()) else {
            return Ok((Vec::new(), Vec::new()));
        };
        Self::check_run_inputs(roster, &run)?;
        let generation = self
            .run_generation(payroll, &run, payroll.generated_by)
            .await?;
        payroll.total_amount = generation.total_payroll_amount;
        payroll.due_amount = generation.total_payroll_amount;
        Ok((generation.salaries, generation.skipped))
    }

    /// Liability category, plus the category to create when it is missing.
    async fn liability_category(
        &self,
    ) -> Result<(TransactionCategoryId, Option<TransactionCategory>), PayrollError> {
        if let Some(existing) = self
            .store
            .category_by_name(&self.config.liability_category_name)
            .await?
        {
            return Ok((existing.id, None));
        }

        let category = TransactionCategory {
            id: TransactionCategoryId::new(),
            code: self.config.liability_category_code.clone(),
            name: self.config.liability_category_name.clone(),
            description: self.config.liability_category_description.clone(),
            account_group: self.config.liability_account_group.clone(),
            editable: false,
            selectable: true,
        };
        info!(category = %category.name, code = %category.code, "Bootstrapping payroll liability category");
        Ok((category.id, Some(category)))
    }

    /// Points journals built against `bootstrapped` at the liability category
    /// the store kept, which differs when another commit created it first.
    async fn settle_liability(&self, bootstrapped: Option<&TransactionCategory>, journals: &mut [Journal]) {
        let Some(category) = bootstrapped else {
            return;
        };
        match self.store.category_by_name(&category.name).await {
            Ok(Some(stored)) if stored.id != category.id => {
                for journal in journals.iter_mut() {
                    journal.replace_category(category.id, stored.id);
                }
            }
            Ok(_) => {}
            Err(e) => warn!(category = %category.name, error = %e, "Liability category not re-read"),
        }
    }

    async fn wages_category(&self, employee_id: EmployeeId) -> Result<TransactionCategoryId, PayrollError> {
        self.store
            .employee_category(employee_id, WageRole::WagesExpense)
            .await?
            .ok_or(PayrollError::WageCategoryMissing(employee_id))
    }

    async fn component_categories(&self) -> Result<HashMap<SalaryComponentId, SalaryCategory>, PayrollError> {
        Ok(self
            .store
            .components()
            .await?
            .into_iter()
            .map(|c| (c.id, c.category))
            .collect())
    }

    async fn profile_complete(
        &self,
        employee: &Employee,
        assignments: &[EmployeeSalaryComponent],
    ) -> Result<bool, PayrollError> {
        let employment = self.store.employment(employee.id).await?;
        let bank_details = self.store.bank_details(employee.id).await?;
        Ok(PayrollReports::is_profile_complete(
            employee,
            employment.as_ref(),
            bank_details.as_ref(),
            assignments,
        ))
    }

    async fn payslips(
        &self,
        payroll: &Payroll,
        salaries: &[Salary],
        recipients: &[EmployeeId],
    ) -> Result<Vec<Notification>, PayrollError> {
        if recipients.is_empty() {
            return Ok(Vec::new());
        }
        let descriptions: HashMap<SalaryComponentId, String> = self
            .store
            .components()
            .await?
            .into_iter()
            .map(|c| (c.id, c.description))
            .collect();

        let mut mails = Vec::with_capacity(recipients.len());
        for &employee_id in recipients {
            let Some(employee) = self.store.find_employee(employee_id).await? else {
                warn!(employee_id = %employee_id, "Payslip recipient not found");
                continue;
            };
            let rows: Vec<&Salary> = salaries.iter().filter(|s| s.employee_id == employee_id).collect();
            let lines: Vec<(String, Decimal)> = rows
                .iter()
                .filter_map(|s| {
                    let id = s.component_id?;
                    let label = descriptions.get(&id).cloned().unwrap_or_else(|| id.to_string());
                    Some((label, s.total_amount))
                })
                .collect();
            let net_pay = rows
                .iter()
                .filter(|s| s.row_type == SalaryRowType::EmployeeTotal)
                .map(|s| s.total_amount)
                .sum();
            if let Some(mail) = PayrollNotifier::payslip(payroll, &employee, &lines, net_pay) {
                mails.push(mail);
            }
        }
        Ok(mails)
    }

    async fn void_recipients(
        &self,
        payroll: &Payroll,
        generator: Option<&User>,
    ) -> Result<Vec<String>, PayrollError> {
        let mut recipients: Vec<String> = generator.map(|g| g.email.clone()).into_iter().collect();
        if let Some(approver) = payroll.approver {
            if let Some(user) = self.optional_user(approver).await {
                recipients.push(user.email);
            }
        }
        for row in self.store.roster(payroll.id).await? {
            if let Some(email) = self
                .store
                .find_employee(row.employee_id)
                .await?
                .and_then(|e| e.email)
            {
                recipients.push(email);
            }
        }
        Ok(recipients)
    }

    fn notify(&self, notifications: Vec<Notification>) {
        if !notifications.is_empty() {
            drop(self.notifier.dispatch(notifications));
        }
    }

    fn count(n: usize) -> Result<i32, PayrollError> {
        i32::try_from(n).map_err(|_| PayrollError::Overflow)
    }
}
