//! Rollup report types and arithmetic
//!
//! Reports are assembled by the rollup engine from ledger counts. Nothing
//! here holds state; every field is a function of the ledger and the
//! allocation registry at the moment of the read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::{Calendar, DailyCount, MonthlyCount};
use crate::types::{ClaimDetail, MenuId, School, Scope, StudentId};

/// Days since the last claim within which a student counts as active
pub const ACTIVE_WITHIN_DAYS: i64 = 7;

/// Days since the last claim within which a student counts as occasional
pub const OCCASIONAL_WITHIN_DAYS: i64 = 30;

/// Number of recent claims embedded in school and student reports
pub const RECENT_ACTIVITY_LIMIT: u32 = 10;

/// `numerator / denominator` as a percentage rounded to two decimals; 0 when
/// the denominator is 0.
pub fn percentage(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    let pct = numerator as f64 / denominator as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

/// Student engagement classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Active,
    Occasional,
    Inactive,
    Never,
}

impl ActivityStatus {
    /// Classify by whole local days elapsed since the last claim
    pub fn classify(
        last_claim_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        calendar: &Calendar,
    ) -> Self {
        match days_since(last_claim_at, now, calendar) {
            None => Self::Never,
            Some(days) if days <= ACTIVE_WITHIN_DAYS => Self::Active,
            Some(days) if days <= OCCASIONAL_WITHIN_DAYS => Self::Occasional,
            Some(_) => Self::Inactive,
        }
    }
}

/// Whole local calendar days between the last claim and today
pub fn days_since(
    last_claim_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    calendar: &Calendar,
) -> Option<i64> {
    last_claim_at.map(|at| {
        (calendar.today(now) - calendar.date_of(at))
            .num_days()
            .max(0)
    })
}

/// Claim totals over the standard windows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowTotals {
    pub today: u64,
    pub this_week: u64,
    pub this_month: u64,
    pub last_30_days: u64,
    pub last_12_months: u64,
}

/// Per-school participation report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolPerformance {
    pub school: School,
    pub total_students: u64,
    pub unique_students_served: u64,
    pub unique_students_served_this_month: u64,
    /// Unique students served / total students, percent
    pub participation_rate: f64,
    pub total_claims: u64,
    pub claims_today: u64,
    pub claims_this_week: u64,
    pub claims_this_month: u64,
    pub allocation_count: u64,
    pub total_allocated: u64,
    pub last_claim_at: Option<DateTime<Utc>>,
    pub recent_activity: Vec<ClaimDetail>,
}

/// Per-menu utilization within a scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuUtilization {
    pub menu_id: MenuId,
    pub menu_name: String,
    pub allocation_count: u64,
    pub allocated_quantity: u64,
    pub claims: u64,
    /// Claims / allocated quantity, percent
    pub utilization_rate: f64,
}

impl MenuUtilization {
    pub fn new(
        menu_id: MenuId,
        menu_name: String,
        allocation_count: u64,
        allocated_quantity: u64,
        claims: u64,
    ) -> Self {
        Self {
            menu_id,
            menu_name,
            allocation_count,
            allocated_quantity,
            claims,
            utilization_rate: percentage(claims, allocated_quantity),
        }
    }
}

/// Order menus by utilization, highest first, then by name
pub fn rank_menus(menus: &mut [MenuUtilization]) {
    menus.sort_by(|a, b| {
        b.utilization_rate
            .total_cmp(&a.utilization_rate)
            .then_with(|| a.menu_name.cmp(&b.menu_name))
    });
}

/// Per-student meal history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentMealStats {
    pub student_id: StudentId,
    pub name: String,
    pub student_number: String,
    pub class_name: String,
    pub grade: String,
    pub total_meals: u64,
    pub meals_this_week: u64,
    pub meals_this_month: u64,
    pub first_claim_at: Option<DateTime<Utc>>,
    pub last_claim_at: Option<DateTime<Utc>>,
    pub days_since_last_claim: Option<i64>,
    pub activity: ActivityStatus,
    pub recent_claims: Vec<ClaimDetail>,
}

/// Time trend for a scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendReport {
    pub scope: Scope,
    pub generated_at: DateTime<Utc>,
    pub totals: WindowTotals,
    /// One entry per local day, oldest first, 30 entries
    pub daily: Vec<DailyCount>,
    /// One entry per local month, oldest first, 12 entries
    pub monthly: Vec<MonthlyCount>,
}
