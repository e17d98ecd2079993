//! Allocation (quota) records

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{AllocationId, MenuId, SchoolId};
use super::reference::{Menu, School};
use crate::error::{MealError, MealResult};

/// A quota of `quantity` portions of one menu for one school on one date.
///
/// Unique per (school, menu, service date).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub id: AllocationId,
    pub school_id: SchoolId,
    pub menu_id: MenuId,
    pub quantity: u32,
    pub service_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Allocation with the school and menu it references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationDetail {
    #[serde(flatten)]
    pub allocation: Allocation,
    pub school: School,
    pub menu: Menu,
}

/// Request to create an allocation
///
/// `quantity` is signed so that a non-positive request is reported as a
/// validation failure rather than a deserialization failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAllocation {
    pub school_id: SchoolId,
    pub menu_id: MenuId,
    pub quantity: i64,
    pub service_date: NaiveDate,
}

/// Partial update of an allocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationUpdate {
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub service_date: Option<NaiveDate>,
}

impl AllocationUpdate {
    pub fn is_empty(&self) -> bool {
        self.quantity.is_none() && self.service_date.is_none()
    }
}

/// Validate a requested quantity: a positive integer that fits the ledger.
pub fn validate_quantity(quantity: i64) -> MealResult<u32> {
    if quantity <= 0 {
        return Err(MealError::InvalidQuantity(quantity));
    }
    u32::try_from(quantity).map_err(|_| MealError::InvalidQuantity(quantity))
}

/// Validate a service date against the current calendar day.
pub fn validate_service_date(date: NaiveDate, today: NaiveDate) -> MealResult<()> {
    if date < today {
        return Err(MealError::DateInPast { date, today });
    }
    Ok(())
}
