//! Identifier newtypes
//!
//! Identifiers are opaque strings. Reference records (governments, schools,
//! menus, students) keep the ids they were seeded with; allocations and
//! claims get generated ids.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Provincial authority that owns schools, menus and allocations
    GovernmentId
);
string_id!(
    /// School receiving allocations
    SchoolId
);
string_id!(
    /// Menu offering
    MenuId
);
string_id!(
    /// Student enrolled at exactly one school
    StudentId
);
string_id!(
    /// Allocation (quota) identifier
    AllocationId
);
string_id!(
    /// Claim event identifier
    ClaimId
);

impl AllocationId {
    /// Generate a fresh allocation id
    pub fn generate() -> Self {
        Self(format!("alloc_{}", Uuid::new_v4().simple()))
    }
}

impl ClaimId {
    /// Generate a fresh claim id
    pub fn generate() -> Self {
        Self(format!("claim_{}", Uuid::new_v4().simple()))
    }
}
