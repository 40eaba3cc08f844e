//! Core business logic for Payledger.
//!
//! Payroll computation, approval workflow and the journals payroll posts.
//! Persistence and mail delivery sit behind traits so this crate stays free
//! of database code.
//!
//! # Modules
//!
//! - `payroll` - Proration, salary generation, workflow, reports and the engine
//! - `journal` - Double-entry journals for approval and voidance
//! - `notification` - Payroll mail rendering and dispatch

pub mod journal;
pub mod notification;
pub mod payroll;

#[cfg(test)]
mod testing;
