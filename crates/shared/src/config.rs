//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Outgoing mail configuration.
    #[serde(default)]
    pub email: EmailConfig,
    /// Payroll engine settings.
    #[serde(default)]
    pub payroll: PayrollConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// SMTP configuration for payroll notifications.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// SMTP relay host.
    pub smtp_host: String,
    /// SMTP relay port.
    pub smtp_port: u16,
    /// SMTP username.
    pub smtp_username: String,
    /// SMTP password.
    pub smtp_password: String,
    /// Sender address.
    pub from_email: String,
    /// Sender display name.
    pub from_name: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: "payroll@localhost".to_string(),
            from_name: "Payroll Admin".to_string(),
        }
    }
}

/// Payroll engine settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PayrollConfig {
    /// Name of the liability category credited on approval.
    pub liability_category_name: String,
    /// Code used when the liability category has to be bootstrapped.
    pub liability_category_code: String,
    /// Description used when the liability category has to be bootstrapped.
    pub liability_category_description: String,
    /// Chart-of-accounts group the bootstrapped category is filed under.
    pub liability_account_group: String,
    /// Basis (days per month) that stored monthly amounts are reconciled to.
    pub default_basis_days: Decimal,
    /// Employer registration number printed on the bank salary file.
    pub company_number: String,
    /// Employer bank routing code printed on the bank salary file.
    pub company_bank_code: String,
    /// Currency label printed on the bank salary file.
    pub currency_label: String,
    /// Producer label printed on the bank salary file.
    pub producer_label: String,
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self {
            liability_category_name: "Payroll Liability".to_string(),
            liability_category_code: "02-02-016".to_string(),
            liability_category_description: "Other Liability".to_string(),
            liability_account_group: "Other Liability".to_string(),
            default_basis_days: Decimal::from(30),
            company_number: String::new(),
            company_bank_code: String::new(),
            currency_label: "AED".to_string(),
            producer_label: "Payledger".to_string(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("PAYLEDGER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payroll_config_defaults() {
        let config = PayrollConfig::default();
        assert_eq!(config.liability_category_name, "Payroll Liability");
        assert_eq!(config.default_basis_days, Decimal::from(30));
        assert_eq!(config.currency_label, "AED");
    }

    #[test]
    fn test_email_config_default() {
        let config = EmailConfig::default();
        assert_eq!(config.smtp_host, "localhost");
        assert_eq!(config.smtp_port, 1025);
    }

    #[test]
    fn test_load_reads_environment() {
        temp_env::with_vars(
            [
                (
                    "PAYLEDGER__DATABASE__URL",
                    Some("postgres://payroll@localhost/payledger"),
                ),
                ("PAYLEDGER__PAYROLL__COMPANY_NUMBER", Some("AE-0123")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://payroll@localhost/payledger");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.payroll.company_number, "AE-0123");
                assert_eq!(config.payroll.liability_category_name, "Payroll Liability");
            },
        );
    }

    #[test]
    fn test_load_without_database_fails() {
        temp_env::with_vars_unset(["PAYLEDGER__DATABASE__URL"], || {
            assert!(AppConfig::load().is_err());
        });
    }
}
