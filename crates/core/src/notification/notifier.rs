//! Builds payroll notifications and delivers them in the background.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use payledger_shared::email::Mailer;
use rust_decimal::Decimal;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::notification::templates::{
    APPROVAL_BODY, APPROVAL_SUBJECT, PAYSLIP_BODY, PAYSLIP_SUBJECT, REJECTION_BODY,
    REJECTION_SUBJECT, VOID_BODY, VOID_SUBJECT, render,
};
use crate::payroll::error::PayrollError;
use crate::payroll::types::{Employee, PayPeriod, Payroll, User};

/// A rendered mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// Renders payroll mails and sends them through a [`Mailer`].
#[derive(Clone)]
pub struct PayrollNotifier {
    mailer: Arc<dyn Mailer>,
}

impl PayrollNotifier {
    /// Creates a notifier over `mailer`.
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    /// Sends `notifications` on a spawned task.
    ///
    /// Failures are logged and returned from the task; they never reach the
    /// caller's transition.
    pub fn dispatch(&self, notifications: Vec<Notification>) -> JoinHandle<Vec<PayrollError>> {
        let mailer = Arc::clone(&self.mailer);
        tokio::spawn(async move {
            let mut failures = Vec::new();
            for n in notifications {
                match mailer.send_email(&n.to, &n.subject, &n.body).await {
                    Ok(()) => debug!(to = %n.to, subject = %n.subject, "Payroll notification sent"),
                    Err(e) => {
                        let err = PayrollError::NotificationDelivery(e.to_string());
                        error!(
                            to = %n.to,
                            subject = %n.subject,
                            error_code = err.error_code(),
                            error = %err,
                            "Payroll notification failed"
                        );
                        failures.push(err);
                    }
                }
            }
            failures
        })
    }

    /// Approval request for the approver.
    #[must_use]
    pub fn approval_request(payroll: &Payroll, generator: &User, approver: &User) -> Notification {
        let mut values = Self::payroll_values(payroll);
        values.insert("generaterName", generator.full_name());
        values.insert("approverName", approver.full_name());
        Notification {
            to: approver.email.clone(),
            subject: APPROVAL_SUBJECT.to_string(),
            body: render(APPROVAL_BODY, &values),
        }
    }

    /// Rejection notice for the generator.
    #[must_use]
    pub fn rejection(
        payroll: &Payroll,
        generator: &User,
        approver: Option<&User>,
        comment: &str,
    ) -> Notification {
        let mut values = Self::payroll_values(payroll);
        values.insert("generaterName", generator.full_name());
        values.insert(
            "approverName",
            approver.map_or_else(|| "the approver".to_string(), User::full_name),
        );
        values.insert("comment", comment.to_string());
        Notification {
            to: generator.email.clone(),
            subject: REJECTION_SUBJECT.to_string(),
            body: render(REJECTION_BODY, &values),
        }
    }

    /// Voidance notice, one mail per distinct recipient.
    #[must_use]
    pub fn voidance(
        payroll: &Payroll,
        generator: Option<&User>,
        recipients: &[String],
        comment: &str,
    ) -> Vec<Notification> {
        let mut values = Self::payroll_values(payroll);
        values.insert(
            "generaterName",
            generator.map_or_else(|| "an unknown user".to_string(), User::full_name),
        );
        values.insert("comment", comment.to_string());
        let body = render(VOID_BODY, &values);

        let mut mails: Vec<Notification> = Vec::with_capacity(recipients.len());
        for to in recipients {
            if to.trim().is_empty() || mails.iter().any(|m| &m.to == to) {
                continue;
            }
            mails.push(Notification {
                to: to.clone(),
                subject: VOID_SUBJECT.to_string(),
                body: body.clone(),
            });
        }
        mails
    }

    /// Payslip for one employee; `None` when the employee has no address.
    #[must_use]
    pub fn payslip(
        payroll: &Payroll,
        employee: &Employee,
        lines: &[(String, Decimal)],
        net_pay: Decimal,
    ) -> Option<Notification> {
        let to = employee.email.clone().filter(|e| !e.trim().is_empty())?;
        let mut values = Self::payroll_values(payroll);
        values.insert("employeeName", employee.full_name());
        values.insert("netPay", net_pay.round_dp(2).to_string());
        let mut rendered = String::new();
        for (label, amount) in lines {
            let _ = writeln!(rendered, "{label}: {}", amount.round_dp(2));
        }
        values.insert("lines", rendered);

        Some(Notification {
            to,
            subject: render(PAYSLIP_SUBJECT, &values),
            body: render(PAYSLIP_BODY, &values),
        })
    }

    fn payroll_values(payroll: &Payroll) -> HashMap<&'static str, String> {
        let period = PayPeriod::parse(&payroll.pay_period).map_or_else(
            |_| payroll.pay_period.replace('-', "  To  ").replace('/', "-"),
            |p| p.display_range(),
        );
        HashMap::from([
            ("payrollSubject", payroll.subject.clone()),
            ("payPeriod", period),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payroll::types::PayrollStatus;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use payledger_shared::email::EmailError;
    use payledger_shared::types::{EmployeeId, PayrollId, UserId};
    use rust_decimal_macros::dec;

    fn user(first: &str, email: &str) -> User {
        User {
            id: UserId::new(),
            first_name: first.to_string(),
            last_name: "Smith".to_string(),
            email: email.to_string(),
        }
    }

    fn payroll() -> Payroll {
        Payroll {
            id: PayrollId::new(),
            subject: "January Payroll".to_string(),
            pay_period: "01/01/2025-31/01/2025".to_string(),
            payroll_date: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
            employee_count: 1,
            status: PayrollStatus::Submitted,
            approver: None,
            generated_by: UserId::new(),
            total_amount: dec!(3000),
            due_amount: dec!(3000),
            run_date: None,
            comment: None,
        }
    }

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send_email(&self, _: &str, _: &str, _: &str) -> Result<(), EmailError> {
            Err(EmailError::SendError("connection refused".to_string()))
        }
    }

    #[test]
    fn test_approval_goes_to_approver() {
        let n = PayrollNotifier::approval_request(
            &payroll(),
            &user("Gina", "gina@example.com"),
            &user("Abe", "abe@example.com"),
        );
        assert_eq!(n.to, "abe@example.com");
        assert_eq!(n.subject, "Payroll Approval Request");
        assert!(n.body.contains("Dear Abe Smith"));
        assert!(n.body.contains("Gina Smith has submitted"));
        assert!(n.body.contains("01-01-2025  To  31-01-2025"));
    }

    #[test]
    fn test_rejection_goes_to_generator() {
        let n = PayrollNotifier::rejection(
            &payroll(),
            &user("Gina", "gina@example.com"),
            None,
            "wrong days",
        );
        assert_eq!(n.to, "gina@example.com");
        assert_eq!(n.subject, "Payroll Rejection Request");
        assert!(n.body.contains("Reason: wrong days"));
    }

    #[test]
    fn test_voidance_dedups_recipients() {
        let recipients = vec![
            "gina@example.com".to_string(),
            "abe@example.com".to_string(),
            "gina@example.com".to_string(),
            String::new(),
        ];
        let mails = PayrollNotifier::voidance(
            &payroll(),
            Some(&user("Gina", "gina@example.com")),
            &recipients,
            "duplicate run",
        );
        assert_eq!(mails.len(), 2);
        assert!(mails.iter().all(|m| m.subject == "Payroll Voidance Request"));
    }

    #[test]
    fn test_voidance_without_generator() {
        let recipients = vec!["abe@example.com".to_string()];
        let mails = PayrollNotifier::voidance(&payroll(), None, &recipients, "duplicate run");
        assert_eq!(mails.len(), 1);
        assert!(mails[0].body.contains("generated by an unknown user"));
        assert!(!mails[0].body.contains('{'));
    }

    #[test]
    fn test_payslip_needs_address() {
        let mut employee = Employee {
            id: EmployeeId::new(),
            first_name: "Ema".to_string(),
            last_name: "Lee".to_string(),
            email: None,
            active: true,
        };
        let lines = vec![("Basic".to_string(), dec!(3000))];
        assert!(PayrollNotifier::payslip(&payroll(), &employee, &lines, dec!(3000)).is_none());

        employee.email = Some("ema@example.com".to_string());
        let n = PayrollNotifier::payslip(&payroll(), &employee, &lines, dec!(3000)).unwrap();
        assert_eq!(n.subject, "Payslip for 01-01-2025  To  31-01-2025");
        assert!(n.body.contains("Basic: 3000"));
        assert!(n.body.contains("Net pay: 3000"));
    }

    #[tokio::test]
    async fn test_dispatch_reports_failures() {
        let notifier = PayrollNotifier::new(Arc::new(FailingMailer));
        let failures = notifier
            .dispatch(vec![Notification {
                to: "abe@example.com".to_string(),
                subject: "s".to_string(),
                body: "b".to_string(),
            }])
            .await
            .unwrap();
        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0], PayrollError::NotificationDelivery(_)));
    }
}
