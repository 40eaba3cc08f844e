//! Double-entry journals for payroll approval and voidance.
//!
//! # Modules
//!
//! - `types` - Journal, line item and reference types
//! - `posting` - Building, reversing and validating journals

pub mod posting;
pub mod types;

#[cfg(test)]
mod posting_props;

pub use posting::{JournalPostingService, PostingRequest};
pub use types::{Journal, JournalLineItem, PostingReferenceType};
