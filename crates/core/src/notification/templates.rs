//! Mail templates and placeholder rendering.

use std::collections::HashMap;

/// Subject of the mail sent to the approver on submit.
pub const APPROVAL_SUBJECT: &str = "Payroll Approval Request";

/// Subject of the mail sent to the generator on reject.
pub const REJECTION_SUBJECT: &str = "Payroll Rejection Request";

/// Subject of the mail sent to everyone involved on void.
pub const VOID_SUBJECT: &str = "Payroll Voidance Request";

/// Subject of a payslip mail.
pub const PAYSLIP_SUBJECT: &str = "Payslip for {payPeriod}";

/// Body of the approval request.
pub const APPROVAL_BODY: &str = "Dear {approverName},

{generaterName} has submitted the payroll \"{payrollSubject}\" for the period {payPeriod}. \
It is awaiting your approval.
";

/// Body of the rejection notice.
pub const REJECTION_BODY: &str = "Dear {generaterName},

The payroll \"{payrollSubject}\" for the period {payPeriod} was rejected by {approverName}.

Reason: {comment}
";

/// Body of the voidance notice.
pub const VOID_BODY: &str = "Hello,

The payroll \"{payrollSubject}\" for the period {payPeriod}, generated by {generaterName}, \
has been voided and its journal entries reversed.

Reason: {comment}
";

/// Body of a payslip.
pub const PAYSLIP_BODY: &str = "Dear {employeeName},

Your salary for \"{payrollSubject}\" ({payPeriod}) has been approved.

{lines}
Net pay: {netPay}
";

/// Replaces every `{key}` in `template` with its value.
///
/// Unknown placeholders are left as they are.
#[must_use]
pub fn render(template: &str, values: &HashMap<&str, String>) -> String {
    values
        .iter()
        .fold(template.to_string(), |acc, (key, value)| {
            acc.replace(&format!("{{{key}}}"), value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_replaces_placeholders() {
        let values = HashMap::from([
            ("approverName", "Jane Roe".to_string()),
            ("generaterName", "John Doe".to_string()),
            ("payrollSubject", "January Payroll".to_string()),
            ("payPeriod", "01-01-2025  To  31-01-2025".to_string()),
        ]);
        let body = render(APPROVAL_BODY, &values);
        assert!(body.starts_with("Dear Jane Roe,"));
        assert!(body.contains("John Doe has submitted the payroll \"January Payroll\""));
        assert!(body.contains("01-01-2025  To  31-01-2025"));
        assert!(!body.contains('{'));
    }

    #[test]
    fn test_render_keeps_unknown_placeholders() {
        let values = HashMap::from([("payPeriod", "Jan".to_string())]);
        assert_eq!(render("{payPeriod} {other}", &values), "Jan {other}");
    }

    #[test]
    fn test_render_subject() {
        let values = HashMap::from([("payPeriod", "01-01-2025  To  31-01-2025".to_string())]);
        assert_eq!(
            render(PAYSLIP_SUBJECT, &values),
            "Payslip for 01-01-2025  To  31-01-2025"
        );
    }
}
