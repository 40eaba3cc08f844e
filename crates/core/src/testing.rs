//! In-memory store and recording mailer for engine tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use payledger_shared::email::{EmailError, Mailer};
use payledger_shared::types::{
    AssignmentId, EmployeeId, PayrollId, SalaryComponentId, TransactionCategoryId, UserId,
};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::journal::{Journal, PostingReferenceType};
use crate::payroll::error::PayrollError;
use crate::payroll::store::{
    ApprovalCommit, AssignmentCommit, GenerationCommit, NewPayrollCommit, PayrollStore,
    PayrollUpdateCommit, SingleSalaryCommit, StatusChange, VoidCommit,
};
use crate::payroll::types::{
    Employee, EmployeeBankDetails, EmployeeSalaryComponent, Employment, Payroll, PayrollEmployee,
    PayrollStatus, Salary, SalaryComponent, TransactionCategory, User, WageRole,
};
use crate::payroll::workflow::PayrollAction;

#[derive(Default)]
pub struct MemoryState {
    pub payrolls: HashMap<PayrollId, Payroll>,
    pub roster: Vec<PayrollEmployee>,
    pub salaries: Vec<Salary>,
    pub components: HashMap<SalaryComponentId, SalaryComponent>,
    pub assignments: Vec<EmployeeSalaryComponent>,
    pub categories: Vec<TransactionCategory>,
    pub employee_categories: HashMap<(EmployeeId, WageRole), TransactionCategoryId>,
    pub journals: Vec<Journal>,
    pub users: HashMap<UserId, User>,
    pub employees: HashMap<EmployeeId, Employee>,
    pub employment: HashMap<EmployeeId, Employment>,
    pub bank_details: HashMap<EmployeeId, EmployeeBankDetails>,
}

impl MemoryState {
    fn check(&self, change: &StatusChange, action: &'static str) -> Result<(), PayrollError> {
        let payroll = self
            .payrolls
            .get(&change.payroll_id)
            .ok_or(PayrollError::PayrollNotFound(change.payroll_id))?;
        if change.expected.contains(&payroll.status) {
            Ok(())
        } else {
            Err(PayrollError::TransitionConflict {
                from: payroll.status,
                action,
            })
        }
    }

    fn apply(&mut self, change: &StatusChange) -> Result<Payroll, PayrollError> {
        let payroll = self
            .payrolls
            .get_mut(&change.payroll_id)
            .ok_or(PayrollError::PayrollNotFound(change.payroll_id))?;
        payroll.status = change.status;
        if let Some(approver) = change.approver {
            payroll.approver = Some(approver);
        }
        if let Some(comment) = &change.comment {
            payroll.comment = Some(comment.clone());
        }
        if let Some(run_date) = change.run_date {
            payroll.run_date = Some(run_date);
        }
        Ok(payroll.clone())
    }

    /// Keeps the first category stored under a name and moves `journals`
    /// onto it.
    fn bootstrap_category(&mut self, category: Option<TransactionCategory>, journals: &mut [Journal]) {
        let Some(category) = category else {
            return;
        };
        match self.categories.iter().find(|c| c.name == category.name) {
            Some(stored) => {
                for journal in journals.iter_mut() {
                    journal.replace_category(category.id, stored.id);
                }
            }
            None => self.categories.push(category),
        }
    }

    fn upsert_assignment(&mut self, assignment: EmployeeSalaryComponent) {
        match self.assignments.iter_mut().find(|a| a.id == assignment.id) {
            Some(existing) => *existing = assignment,
            None => self.assignments.push(assignment),
        }
    }
}

/// `PayrollStore` over plain maps behind one lock.
#[derive(Default)]
pub struct MemoryStore {
    pub state: RwLock<MemoryState>,
    /// When set, every commit fails after its status check.
    pub fail_commits: std::sync::atomic::AtomicBool,
}

impl MemoryStore {
    fn commit_guard(&self) -> Result<(), PayrollError> {
        if self.fail_commits.load(std::sync::atomic::Ordering::SeqCst) {
            Err(PayrollError::Store("commit refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PayrollStore for MemoryStore {
    async fn find_payroll(&self, id: PayrollId) -> Result<Option<Payroll>, PayrollError> {
        Ok(self.state.read().await.payrolls.get(&id).cloned())
    }

    async fn payrolls_by_status(
        &self,
        statuses: &[PayrollStatus],
    ) -> Result<Vec<Payroll>, PayrollError> {
        let state = self.state.read().await;
        let mut payrolls: Vec<Payroll> = state
            .payrolls
            .values()
            .filter(|p| statuses.contains(&p.status))
            .cloned()
            .collect();
        payrolls.sort_by_key(|p| p.id);
        Ok(payrolls)
    }

    async fn roster(&self, payroll_id: PayrollId) -> Result<Vec<PayrollEmployee>, PayrollError> {
        Ok(self
            .state
            .read()
            .await
            .roster
            .iter()
            .filter(|r| r.payroll_id == payroll_id)
            .cloned()
            .collect())
    }

    async fn payroll_salaries(&self, payroll_id: PayrollId) -> Result<Vec<Salary>, PayrollError> {
        Ok(self
            .state
            .read()
            .await
            .salaries
            .iter()
            .filter(|s| s.payroll_id == Some(payroll_id))
            .cloned()
            .collect())
    }

    async fn salaries_before(&self, date: NaiveDate) -> Result<Vec<Salary>, PayrollError> {
        Ok(self
            .state
            .read()
            .await
            .salaries
            .iter()
            .filter(|s| s.salary_date < date)
            .cloned()
            .collect())
    }

    async fn employees_with_salary(&self) -> Result<Vec<EmployeeId>, PayrollError> {
        let state = self.state.read().await;
        let mut ids: Vec<EmployeeId> = state.salaries.iter().map(|s| s.employee_id).collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    async fn components(&self) -> Result<Vec<SalaryComponent>, PayrollError> {
        Ok(self.state.read().await.components.values().cloned().collect())
    }

    async fn find_component(
        &self,
        id: SalaryComponentId,
    ) -> Result<Option<SalaryComponent>, PayrollError> {
        Ok(self.state.read().await.components.get(&id).cloned())
    }

    async fn insert_component(&self, component: SalaryComponent) -> Result<(), PayrollError> {
        self.state
            .write()
            .await
            .components
            .insert(component.id, component);
        Ok(())
    }

    async fn soft_delete_component(&self, id: SalaryComponentId) -> Result<bool, PayrollError> {
        let mut state = self.state.write().await;
        Ok(state.components.get_mut(&id).is_some_and(|c| {
            c.deleted = true;
            true
        }))
    }

    async fn assignments(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Vec<EmployeeSalaryComponent>, PayrollError> {
        Ok(self
            .state
            .read()
            .await
            .assignments
            .iter()
            .filter(|a| a.employee_id == employee_id)
            .cloned()
            .collect())
    }

    async fn delete_assignment(
        &self,
        employee_id: EmployeeId,
        assignment_id: AssignmentId,
    ) -> Result<bool, PayrollError> {
        let mut state = self.state.write().await;
        let before = state.assignments.len();
        state
            .assignments
            .retain(|a| !(a.id == assignment_id && a.employee_id == employee_id));
        Ok(state.assignments.len() < before)
    }

    async fn category_by_name(
        &self,
        name: &str,
    ) -> Result<Option<TransactionCategory>, PayrollError> {
        Ok(self
            .state
            .read()
            .await
            .categories
            .iter()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn employee_category(
        &self,
        employee_id: EmployeeId,
        role: WageRole,
    ) -> Result<Option<TransactionCategoryId>, PayrollError> {
        Ok(self
            .state
            .read()
            .await
            .employee_categories
            .get(&(employee_id, role))
            .copied())
    }

    async fn journals_by_reference(
        &self,
        reference_id: Uuid,
        reference_type: PostingReferenceType,
    ) -> Result<Vec<Journal>, PayrollError> {
        Ok(self
            .state
            .read()
            .await
            .journals
            .iter()
            .filter(|j| {
                j.line_items.iter().any(|l| {
                    l.reference_id == reference_id && l.reference_type == reference_type
                })
            })
            .cloned()
            .collect())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, PayrollError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_employee(&self, id: EmployeeId) -> Result<Option<Employee>, PayrollError> {
        Ok(self.state.read().await.employees.get(&id).cloned())
    }

    async fn employees(&self) -> Result<Vec<Employee>, PayrollError> {
        Ok(self.state.read().await.employees.values().cloned().collect())
    }

    async fn employment(&self, employee_id: EmployeeId) -> Result<Option<Employment>, PayrollError> {
        Ok(self.state.read().await.employment.get(&employee_id).cloned())
    }

    async fn bank_details(
        &self,
        employee_id: EmployeeId,
    ) -> Result<Option<EmployeeBankDetails>, PayrollError> {
        Ok(self.state.read().await.bank_details.get(&employee_id).cloned())
    }

    async fn commit_new_payroll(&self, commit: NewPayrollCommit) -> Result<(), PayrollError> {
        self.commit_guard()?;
        let mut state = self.state.write().await;
        state.payrolls.insert(commit.payroll.id, commit.payroll);
        state.roster.extend(commit.roster);
        state.salaries.extend(commit.salaries);
        Ok(())
    }

    async fn commit_generation(&self, commit: GenerationCommit) -> Result<Payroll, PayrollError> {
        let mut state = self.state.write().await;
        state.check(&commit.change, PayrollAction::Generate.as_str())?;
        self.commit_guard()?;
        let payroll_id = commit.change.payroll_id;
        state.salaries.retain(|s| s.payroll_id != Some(payroll_id));
        state.salaries.extend(commit.salaries);
        state.apply(&commit.change)?;
        let payroll = state
            .payrolls
            .get_mut(&payroll_id)
            .ok_or(PayrollError::PayrollNotFound(payroll_id))?;
        payroll.employee_count = commit.employee_count;
        payroll.total_amount = commit.total_amount;
        payroll.due_amount = commit.total_amount;
        Ok(payroll.clone())
    }

    async fn commit_status(&self, changes: Vec<StatusChange>) -> Result<Vec<Payroll>, PayrollError> {
        let mut state = self.state.write().await;
        for change in &changes {
            state.check(change, "change status of")?;
        }
        self.commit_guard()?;
        changes.iter().map(|c| state.apply(c)).collect()
    }

    async fn commit_approval(&self, commit: ApprovalCommit) -> Result<Payroll, PayrollError> {
        let mut state = self.state.write().await;
        state.check(&commit.change, PayrollAction::Approve.as_str())?;
        self.commit_guard()?;
        let mut journals = commit.journals;
        state.bootstrap_category(commit.bootstrap_category, &mut journals);
        state.journals.extend(journals);
        state.apply(&commit.change)
    }

    async fn commit_void(&self, commit: VoidCommit) -> Result<Payroll, PayrollError> {
        let mut state = self.state.write().await;
        state.check(&commit.change, PayrollAction::Void.as_str())?;
        self.commit_guard()?;
        state.journals.extend(commit.journals);
        state.apply(&commit.change)
    }

    async fn commit_single_salary(&self, commit: SingleSalaryCommit) -> Result<(), PayrollError> {
        self.commit_guard()?;
        let mut state = self.state.write().await;
        let mut journals = commit.journals;
        state.bootstrap_category(commit.bootstrap_category, &mut journals);
        state.salaries.extend(commit.salaries);
        state.journals.extend(journals);
        for assignment in commit.assignments {
            state.upsert_assignment(assignment);
        }
        Ok(())
    }

    async fn commit_assignments(&self, commit: AssignmentCommit) -> Result<(), PayrollError> {
        self.commit_guard()?;
        let mut state = self.state.write().await;
        for assignment in commit.assignments {
            state.upsert_assignment(assignment);
        }
        if let Some(employment) = commit.employment {
            state.employment.insert(employment.employee_id, employment);
        }
        Ok(())
    }

    async fn commit_payroll_update(&self, commit: PayrollUpdateCommit) -> Result<Payroll, PayrollError> {
        let mut state = self.state.write().await;
        let payroll_id = commit.payroll.id;
        let change = StatusChange::new(payroll_id, &commit.expected, commit.payroll.status);
        state.check(&change, PayrollAction::EditRoster.as_str())?;
        self.commit_guard()?;
        state.roster.retain(|r| r.payroll_id != payroll_id);
        state.roster.extend(commit.roster);
        state.salaries.retain(|s| s.payroll_id != Some(payroll_id));
        state.salaries.extend(commit.salaries);
        state.payrolls.insert(payroll_id, commit.payroll.clone());
        Ok(commit.payroll)
    }

    async fn commit_payroll_delete(
        &self,
        payroll_id: PayrollId,
        expected: Vec<PayrollStatus>,
    ) -> Result<(), PayrollError> {
        let mut state = self.state.write().await;
        let change = StatusChange::new(payroll_id, &expected, PayrollStatus::Draft);
        state.check(&change, PayrollAction::EditRoster.as_str())?;
        self.commit_guard()?;
        state.roster.retain(|r| r.payroll_id != payroll_id);
        state.salaries.retain(|s| s.payroll_id != Some(payroll_id));
        state.payrolls.remove(&payroll_id);
        Ok(())
    }

    async fn commit_roster_removal(
        &self,
        payroll_id: PayrollId,
        expected: Vec<PayrollStatus>,
        employee_ids: Vec<EmployeeId>,
    ) -> Result<u64, PayrollError> {
        let mut state = self.state.write().await;
        let change = StatusChange::new(payroll_id, &expected, PayrollStatus::Draft);
        state.check(&change, PayrollAction::EditRoster.as_str())?;
        self.commit_guard()?;
        let before = state.roster.len();
        state
            .roster
            .retain(|r| !(r.payroll_id == payroll_id && employee_ids.contains(&r.employee_id)));
        Ok(u64::try_from(before - state.roster.len()).unwrap_or(u64::MAX))
    }
}

/// A delivered mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mailer that records every mail, or fails every send when `fail` is set.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<SentMail>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::default(),
            fail: true,
        })
    }

    pub async fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_email(&self, to_email: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        if self.fail {
            return Err(EmailError::SendError("relay refused".to_string()));
        }
        self.sent.lock().await.push(SentMail {
            to: to_email.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
