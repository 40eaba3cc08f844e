//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing an `EmployeeId` where a `PayrollId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

typed_id!(UserId, "Unique identifier for a back-office user.");
typed_id!(EmployeeId, "Unique identifier for an employee.");
typed_id!(PayrollId, "Unique identifier for a payroll run.");
typed_id!(PayrollEmployeeId, "Unique identifier for a payroll roster row.");
typed_id!(SalaryId, "Unique identifier for a salary row.");
typed_id!(SalaryComponentId, "Unique identifier for a salary component template.");
typed_id!(
    AssignmentId,
    "Unique identifier for an employee salary component assignment."
);
typed_id!(JournalId, "Unique identifier for a journal.");
typed_id!(JournalLineItemId, "Unique identifier for a journal line item.");
typed_id!(
    TransactionCategoryId,
    "Unique identifier for a transaction category (chart of accounts leaf)."
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(PayrollId::new(), PayrollId::new());
    }

    #[test]
    fn test_id_round_trips_through_string() {
        let id = EmployeeId::new();
        let parsed = EmployeeId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_id_rejects_garbage() {
        assert!(JournalId::from_str("not-a-uuid").is_err());
    }
}
