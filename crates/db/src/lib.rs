//! Database layer with `SeaORM` entities and the payroll store.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - [`SeaPayrollStore`], the `PostgreSQL` implementation of the payroll store
//! - Database migrations

pub mod entities;
mod mapping;
pub mod migration;
pub mod store;

pub use store::SeaPayrollStore;

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
