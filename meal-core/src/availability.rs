//! Availability arithmetic
//!
//! `distributed` is always the number of claim events referencing the
//! allocation, read from the ledger. `remaining` is the signed value used
//! for enforcement; `available` is the display value floored at zero.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::percentage;
use crate::types::{Allocation, AllocationId};

/// Signed remaining portions. Never clamp this before comparing.
pub fn remaining(quantity: u32, distributed: u64) -> i64 {
    i64::from(quantity) - i64::try_from(distributed).unwrap_or(i64::MAX)
}

/// Display value of remaining portions, floored at zero
pub fn available_for_display(quantity: u32, distributed: u64) -> u64 {
    u64::try_from(remaining(quantity, distributed)).unwrap_or(0)
}

/// Raw ledger counts for one allocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionCounts {
    pub distributed: u64,
    pub distributed_today: u64,
    pub distributed_this_week: u64,
    pub distributed_this_month: u64,
    pub unique_students_served: u64,
    pub last_claim_at: Option<DateTime<Utc>>,
}

/// Distribution summary of one allocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilitySummary {
    pub allocation_id: AllocationId,
    pub service_date: NaiveDate,
    pub allocated: u32,
    pub distributed: u64,
    pub available: u64,
    pub distributed_today: u64,
    pub distributed_this_week: u64,
    pub distributed_this_month: u64,
    pub unique_students_served: u64,
    /// Percent of the allocation distributed, two decimals
    pub utilization_rate: f64,
    pub last_claim_at: Option<DateTime<Utc>>,
}

impl AvailabilitySummary {
    pub fn from_counts(allocation: &Allocation, counts: DistributionCounts) -> Self {
        Self {
            allocation_id: allocation.id.clone(),
            service_date: allocation.service_date,
            allocated: allocation.quantity,
            distributed: counts.distributed,
            available: available_for_display(allocation.quantity, counts.distributed),
            distributed_today: counts.distributed_today,
            distributed_this_week: counts.distributed_this_week,
            distributed_this_month: counts.distributed_this_month,
            unique_students_served: counts.unique_students_served,
            utilization_rate: percentage(counts.distributed, u64::from(allocation.quantity)),
            last_claim_at: counts.last_claim_at,
        }
    }
}
