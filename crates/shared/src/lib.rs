//! Shared types, errors, and configuration for Payledger.
//!
//! This crate provides common building blocks used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management
//! - Mail transport used by payroll notifications

pub mod config;
pub mod email;
pub mod error;
pub mod types;

pub use config::{AppConfig, DatabaseConfig, EmailConfig, PayrollConfig};
pub use email::{EmailError, EmailService, Mailer};
pub use error::{AppError, AppResult};
