//! Mail transport for payroll notifications.
//!
//! Uses `lettre` for SMTP transport. The payroll engine only ever talks to
//! the [`Mailer`] trait, so tests and alternative transports can stand in.

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor, message::header::ContentType,
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;

use crate::config::EmailConfig;

/// Email service errors.
#[derive(Debug, Error)]
pub enum EmailError {
    /// Failed to build email message.
    #[error("Failed to build email: {0}")]
    BuildError(String),
    /// Failed to send email.
    #[error("Failed to send email: {0}")]
    SendError(String),
    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Something that can deliver a rendered message to one recipient.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends one message.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be built or delivered.
    async fn send_email(&self, to_email: &str, subject: &str, body: &str)
    -> Result<(), EmailError>;
}

/// SMTP-backed mailer.
#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    /// Creates a new email service.
    #[must_use]
    pub const fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Creates an SMTP transport.
    fn create_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
            .map_err(|e| EmailError::SendError(e.to_string()))?
            .port(self.config.smtp_port)
            .credentials(creds)
            .build();

        Ok(transport)
    }

    fn build_message(&self, to_email: &str, subject: &str, body: &str) -> Result<Message, EmailError> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        Message::builder()
            .from(
                from.parse()
                    .map_err(|e| EmailError::InvalidAddress(format!("{e}")))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| EmailError::InvalidAddress(format!("{e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| EmailError::BuildError(e.to_string()))
    }
}

#[async_trait]
impl Mailer for EmailService {
    async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), EmailError> {
        let email = self.build_message(to_email, subject, body)?;

        let transport = self.create_transport()?;
        transport
            .send(email)
            .await
            .map_err(|e| EmailError::SendError(e.to_string()))?;

        tracing::debug!(to = %to_email, subject = %subject, "Email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> EmailService {
        EmailService::new(EmailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: "user".to_string(),
            smtp_password: "password".to_string(),
            from_email: "payroll@example.com".to_string(),
            from_name: "Payroll".to_string(),
        })
    }

    #[tokio::test]
    async fn test_create_transport() {
        assert!(service().create_transport().is_ok());
    }

    #[test]
    fn test_build_message() {
        let message = service().build_message("approver@example.com", "Payroll Approval Request", "body");
        assert!(message.is_ok());
    }

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let message = service().build_message("not an address", "subject", "body");
        assert!(matches!(message, Err(EmailError::InvalidAddress(_))));
    }

    #[test]
    fn test_email_error_display() {
        assert_eq!(
            format!("{}", EmailError::BuildError("msg".into())),
            "Failed to build email: msg"
        );
        assert_eq!(
            format!("{}", EmailError::SendError("msg".into())),
            "Failed to send email: msg"
        );
        assert_eq!(
            format!("{}", EmailError::InvalidAddress("msg".into())),
            "Invalid email address: msg"
        );
    }
}
