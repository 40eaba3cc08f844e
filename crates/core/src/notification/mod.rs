//! Payroll mail notifications.
//!
//! Mails are rendered here from data maps and handed to a
//! [`Mailer`](payledger_shared::email::Mailer) on a spawned task, after the
//! transition that triggered them has committed.

pub mod notifier;
pub mod templates;

pub use notifier::{Notification, PayrollNotifier};
