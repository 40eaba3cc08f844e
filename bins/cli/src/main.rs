//! Payledger operator CLI.
//!
//! Drives payroll runs against the configured database and SMTP relay.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use payledger_core::notification::PayrollNotifier;
use payledger_core::payroll::{
    CreatePayrollInput, EmployeeRunInput, PayrollEngine, PayrollError, PayrollStore,
    SingleSalaryInput, SkippedEmployee, UpdatePayrollInput,
};
use payledger_db::{SeaPayrollStore, connect};
use payledger_shared::types::{EmployeeId, PayrollId, UserId};
use payledger_shared::{AppConfig, AppError, EmailService};

#[derive(Debug, Parser)]
#[command(name = "payledger", version, about = "Payroll runs and ledger postings")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a payroll, optionally generating salary for the whole roster.
    Create {
        #[arg(long)]
        subject: String,
        /// Pay period as dd/MM/yyyy-dd/MM/yyyy.
        #[arg(long)]
        pay_period: String,
        #[arg(long)]
        payroll_date: NaiveDate,
        #[arg(long)]
        generated_by: UserId,
        #[arg(long)]
        approver: Option<UserId>,
        #[arg(long = "employee", required = true)]
        employees: Vec<EmployeeId>,
        /// Days to pay; generates salary immediately when set.
        #[arg(long)]
        days: Option<Decimal>,
        #[arg(long, default_value = "0")]
        lop_days: Decimal,
    },
    /// Regenerate salary rows for every employee on the roster.
    Generate {
        payroll: PayrollId,
        #[arg(long)]
        user: UserId,
        #[arg(long)]
        days: Decimal,
        #[arg(long, default_value = "0")]
        lop_days: Decimal,
    },
    /// Rewrite a Draft or Rejected payroll with a new roster.
    Update {
        payroll: PayrollId,
        #[arg(long)]
        user: UserId,
        #[arg(long)]
        subject: Option<String>,
        /// Pay period as dd/MM/yyyy-dd/MM/yyyy.
        #[arg(long)]
        pay_period: Option<String>,
        #[arg(long)]
        payroll_date: Option<NaiveDate>,
        #[arg(long)]
        approver: Option<UserId>,
        #[arg(long = "employee", required = true)]
        employees: Vec<EmployeeId>,
        /// Days to pay; regenerates salary when set.
        #[arg(long)]
        days: Option<Decimal>,
        #[arg(long, default_value = "0")]
        lop_days: Decimal,
    },
    /// Delete a Draft or Rejected payroll.
    Delete { payroll: PayrollId },
    /// Remove employees from a roster before generation.
    RemoveEmployees {
        payroll: PayrollId,
        #[arg(long = "employee", required = true)]
        employees: Vec<EmployeeId>,
    },
    /// Submit a payroll for approval.
    Submit {
        payroll: PayrollId,
        #[arg(long)]
        approver: UserId,
    },
    /// Approve a payroll and post its journals.
    Approve {
        payroll: PayrollId,
        #[arg(long)]
        user: UserId,
        /// Mail payslips to everyone on the roster.
        #[arg(long)]
        payslips: bool,
    },
    /// Reject a submitted payroll.
    Reject {
        payroll: PayrollId,
        #[arg(long)]
        comment: String,
    },
    /// Move a rejected payroll back to Draft.
    Reopen { payroll: PayrollId },
    /// Void an approved payroll and reverse its journals.
    Void {
        payroll: PayrollId,
        #[arg(long)]
        comment: String,
        #[arg(long)]
        user: UserId,
    },
    /// Mark approved payrolls as paid.
    ConvertToPaid {
        #[arg(required = true)]
        payrolls: Vec<PayrollId>,
    },
    /// Pay individual employees outside a payroll.
    PaySalary {
        #[arg(long = "employee", required = true)]
        employees: Vec<EmployeeId>,
        #[arg(long)]
        user: UserId,
        /// Defaults to today.
        #[arg(long)]
        salary_date: Option<NaiveDate>,
    },
    /// Re-base an employee's assignments to a new day count.
    Rebase {
        employee: EmployeeId,
        #[arg(long)]
        days: Decimal,
    },
    /// List the salary component catalog.
    Components,
    /// List approved payrolls with an outstanding amount.
    Unpaid,
    /// Per-employee salary summary.
    SalaryList {
        /// Defaults to today.
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// List employees whose profile is not ready for payroll.
    Incomplete,
    /// Write the bank salary information file for a payroll.
    BankExport {
        payroll: PayrollId,
        #[arg(long = "employee")]
        employees: Vec<EmployeeId>,
        /// Directory to write the file to.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// List journals posted against a payroll or employee.
    Journals { reference: Uuid },
}

fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report_skipped(skipped: &[SkippedEmployee]) {
    for skip in skipped {
        warn!(employee_id = %skip.employee_id, reason = %skip.reason, "Employee skipped");
    }
}

fn run_inputs(
    employees: &[EmployeeId],
    days: Option<Decimal>,
    lop_days: Decimal,
) -> Option<Vec<EmployeeRunInput>> {
    let distinct: BTreeSet<EmployeeId> = employees.iter().copied().collect();
    days.map(|days| {
        distinct
            .into_iter()
            .map(|e| EmployeeRunInput::for_days(e, days, lop_days))
            .collect()
    })
}

async fn roster_inputs(
    store: &SeaPayrollStore,
    payroll: PayrollId,
    days: Decimal,
    lop_days: Decimal,
) -> anyhow::Result<Vec<EmployeeRunInput>> {
    Ok(store
        .roster(payroll)
        .await?
        .into_iter()
        .map(|row| EmployeeRunInput::for_days(row.employee_id, days, lop_days))
        .collect())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "payledger=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    let email_service = EmailService::new(config.email.clone());
    info!(
        smtp_host = %config.email.smtp_host,
        smtp_port = %config.email.smtp_port,
        "Email service configured"
    );

    let store = Arc::new(SeaPayrollStore::new(db));
    let engine = PayrollEngine::new(
        store.clone(),
        PayrollNotifier::new(Arc::new(email_service)),
        config.payroll.clone(),
    );

    if let Err(e) = run(cli.command, &engine, &store).await {
        if let Some(payroll_error) = e.downcast_ref::<PayrollError>() {
            let app_error = AppError::from(payroll_error.clone());
            error!(
                status = app_error.status_code(),
                code = app_error.error_code(),
                "{app_error}"
            );
        }
        return Err(e);
    }
    Ok(())
}

#[allow(clippy::too_many_lines)]
async fn run(command: Command, engine: &PayrollEngine, store: &SeaPayrollStore) -> anyhow::Result<()> {
    match command {
        Command::Create {
            subject,
            pay_period,
            payroll_date,
            generated_by,
            approver,
            employees,
            days,
            lop_days,
        } => {
            let run = run_inputs(&employees, days, lop_days);
            let created = engine
                .create_payroll(CreatePayrollInput {
                    subject,
                    pay_period,
                    payroll_date,
                    generated_by,
                    approver,
                    employee_ids: employees,
                    run,
                })
                .await?;
            report_skipped(&created.skipped);
            print(&created.payroll)?;
        }
        Command::Generate {
            payroll,
            user,
            days,
            lop_days,
        } => {
            let inputs = roster_inputs(store, payroll, days, lop_days).await?;
            let run = engine.generate(payroll, inputs, user).await?;
            report_skipped(&run.skipped);
            print(&run.payroll)?;
        }
        Command::Update {
            payroll,
            user,
            subject,
            pay_period,
            payroll_date,
            approver,
            employees,
            days,
            lop_days,
        } => {
            let run = run_inputs(&employees, days, lop_days);
            let updated = engine
                .update_payroll(UpdatePayrollInput {
                    payroll_id: payroll,
                    subject,
                    pay_period,
                    payroll_date,
                    approver,
                    updated_by: user,
                    employee_ids: employees,
                    run,
                })
                .await?;
            report_skipped(&updated.skipped);
            print(&updated.payroll)?;
        }
        Command::Delete { payroll } => {
            engine.delete_payroll(payroll).await?;
            info!(payroll_id = %payroll, "Payroll deleted");
        }
        Command::RemoveEmployees { payroll, employees } => {
            let removed = engine.remove_roster_employees(payroll, employees).await?;
            info!(payroll_id = %payroll, removed, "Roster updated");
        }
        Command::Submit { payroll, approver } => {
            print(&engine.submit(payroll, approver).await?)?;
        }
        Command::Approve {
            payroll,
            user,
            payslips,
        } => {
            let recipients: Vec<EmployeeId> = if payslips {
                store
                    .roster(payroll)
                    .await?
                    .into_iter()
                    .map(|row| row.employee_id)
                    .collect()
            } else {
                Vec::new()
            };
            let posted = engine.approve_run(payroll, user, &recipients).await?;
            print(&posted.journals)?;
            print(&posted.payroll)?;
        }
        Command::Reject { payroll, comment } => {
            print(&engine.reject(payroll, &comment).await?)?;
        }
        Command::Reopen { payroll } => {
            print(&engine.reopen(payroll).await?)?;
        }
        Command::Void {
            payroll,
            comment,
            user,
        } => {
            let posted = engine.void(payroll, &comment, user).await?;
            print(&posted.journals)?;
            print(&posted.payroll)?;
        }
        Command::ConvertToPaid { payrolls } => {
            print(&engine.convert_to_paid(&payrolls).await?)?;
        }
        Command::PaySalary {
            employees,
            user,
            salary_date,
        } => {
            let outcome = engine
                .generate_salary(SingleSalaryInput {
                    employee_ids: employees,
                    salary_date: salary_date.unwrap_or_else(|| Utc::now().date_naive()),
                    created_by: user,
                })
                .await?;
            report_skipped(&outcome.skipped);
            print(&outcome.salaries)?;
            print(&outcome.journals)?;
        }
        Command::Rebase { employee, days } => {
            print(&engine.rebase_working_days(employee, days).await?)?;
        }
        Command::Components => {
            print(&engine.list_components().await?)?;
        }
        Command::Unpaid => {
            print(&engine.unpaid_payrolls().await?)?;
        }
        Command::SalaryList { as_of } => {
            let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
            print(&engine.salary_per_month_list(as_of).await?)?;
        }
        Command::Incomplete => {
            print(&engine.incomplete_employee_list().await?)?;
        }
        Command::BankExport {
            payroll,
            employees,
            out_dir,
        } => {
            let selection = (!employees.is_empty()).then_some(employees);
            let file = engine.bank_export(payroll, selection).await?;
            let path = out_dir.join(&file.file_name);
            tokio::fs::write(&path, file.content).await?;
            info!(payroll_id = %payroll, path = %path.display(), "Bank file written");
        }
        Command::Journals { reference } => {
            print(&engine.payroll_journals(reference).await?)?;
        }
    }

    Ok(())
}
