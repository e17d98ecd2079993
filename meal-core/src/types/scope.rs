//! Caller scope
//!
//! A government owns its schools and menus; a school owns its students and
//! allocations. Records outside the caller's scope are reported as missing.

use serde::{Deserialize, Serialize};

use super::ids::{GovernmentId, SchoolId};
use super::reference::School;

/// Tenant a caller acts for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Scope {
    Government(GovernmentId),
    School(SchoolId),
}

impl Scope {
    /// Whether a school (and therefore its allocations) is visible
    pub fn owns_school(&self, school: &School) -> bool {
        match self {
            Self::Government(id) => &school.government_id == id,
            Self::School(id) => &school.id == id,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Government(id) => id.as_str(),
            Self::School(id) => id.as_str(),
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Government(id) => write!(f, "government:{}", id),
            Self::School(id) => write!(f, "school:{}", id),
        }
    }
}
