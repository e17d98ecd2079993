//! Claim Ledger - append-only redemption events

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};

use crate::calendar::DailyCount;
use crate::error::MealResult;
use crate::types::{AllocationId, ClaimDetail, ClaimEvent, ClaimFilter, StudentId};

/// First and last claim instants of a selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClaimSpan {
    pub first: Option<DateTime<Utc>>,
    pub last: Option<DateTime<Utc>>,
}

/// Claim Ledger trait
#[async_trait]
pub trait ClaimLedger: Send + Sync {
    /// Append an event if the allocation still has a portion left.
    ///
    /// The quota check and the insert are one atomic step. Fails with
    /// `QuotaExhausted` when no portion is left and `AlreadyClaimed` when
    /// the (student, allocation) pair already exists.
    async fn append(&self, event: ClaimEvent) -> MealResult<ClaimEvent>;

    /// Number of events matching the filter
    async fn count(&self, filter: &ClaimFilter) -> MealResult<u64>;

    /// Number of distinct students among events matching the filter
    async fn count_students(&self, filter: &ClaimFilter) -> MealResult<u64>;

    /// Whether the student already claimed the allocation
    async fn exists(&self, student_id: &StudentId, allocation_id: &AllocationId)
        -> MealResult<bool>;

    /// Matching events per local calendar day at `offset`, oldest first.
    /// Days without events are omitted.
    async fn daily_counts(
        &self,
        filter: &ClaimFilter,
        offset: FixedOffset,
    ) -> MealResult<Vec<DailyCount>>;

    /// Most recent matching events with names attached
    async fn recent(&self, filter: &ClaimFilter, limit: u32) -> MealResult<Vec<ClaimDetail>>;

    /// First and last claim instants of the matching events
    async fn span(&self, filter: &ClaimFilter) -> MealResult<ClaimSpan>;
}
