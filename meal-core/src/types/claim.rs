//! Claim events - the append-only ledger entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{AllocationId, ClaimId, GovernmentId, MenuId, SchoolId, StudentId};
use super::scope::Scope;
use crate::calendar::TimeRange;

/// One student consuming one portion of one allocation.
///
/// Never updated and never deleted. At most one exists per
/// (student, allocation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimEvent {
    pub id: ClaimId,
    pub student_id: StudentId,
    pub allocation_id: AllocationId,
    pub claimed_at: DateTime<Utc>,
}

impl ClaimEvent {
    /// Create a new claim event with a generated id
    pub fn new(student_id: StudentId, allocation_id: AllocationId, claimed_at: DateTime<Utc>) -> Self {
        Self {
            id: ClaimId::generate(),
            student_id,
            allocation_id,
            claimed_at,
        }
    }
}

/// Claim event joined with the names a history view needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimDetail {
    pub claim_id: ClaimId,
    pub claimed_at: DateTime<Utc>,
    pub allocation_id: AllocationId,
    pub student_id: StudentId,
    pub student_name: String,
    pub menu_id: MenuId,
    pub menu_name: String,
    pub school_id: SchoolId,
}

/// Selection of claim events.
///
/// The single parameterised counting primitive: every aggregate in the
/// system is "count (or list) the events matching this filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimFilter {
    pub allocation_id: Option<AllocationId>,
    pub student_id: Option<StudentId>,
    pub school_id: Option<SchoolId>,
    pub government_id: Option<GovernmentId>,
    pub menu_id: Option<MenuId>,
    pub range: Option<TimeRange>,
}

impl ClaimFilter {
    pub fn allocation(id: &AllocationId) -> Self {
        Self {
            allocation_id: Some(id.clone()),
            ..Default::default()
        }
    }

    pub fn student(id: &StudentId) -> Self {
        Self {
            student_id: Some(id.clone()),
            ..Default::default()
        }
    }

    pub fn school(id: &SchoolId) -> Self {
        Self {
            school_id: Some(id.clone()),
            ..Default::default()
        }
    }

    pub fn government(id: &GovernmentId) -> Self {
        Self {
            government_id: Some(id.clone()),
            ..Default::default()
        }
    }

    /// Every event visible to a caller scope
    pub fn scoped(scope: &Scope) -> Self {
        match scope {
            Scope::Government(id) => Self::government(id),
            Scope::School(id) => Self::school(id),
        }
    }

    /// Narrow the filter to a menu
    pub fn with_menu(mut self, id: &MenuId) -> Self {
        self.menu_id = Some(id.clone());
        self
    }

    /// Narrow the filter to a time range
    pub fn within(mut self, range: TimeRange) -> Self {
        self.range = Some(range);
        self
    }
}
