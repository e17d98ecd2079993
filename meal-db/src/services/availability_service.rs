//! Availability Calculator
//!
//! Every number is read from the claim ledger at call time. Nothing is
//! cached and no counter is kept beside the ledger.

use chrono::{DateTime, Utc};
use meal_core::ledger::{AllocationRegistry, ClaimLedger};
use meal_core::{
    remaining, Allocation, AllocationId, AvailabilitySummary, ClaimFilter, Clock,
    DistributionCounts, MealError, MealResult, Scope, TimeWindow,
};
use std::sync::Arc;

use super::WindowCounter;

/// Availability Calculator Service
pub struct AvailabilityService {
    registry: Arc<dyn AllocationRegistry>,
    claims: Arc<dyn ClaimLedger>,
    counter: WindowCounter,
    clock: Arc<dyn Clock>,
}

impl AvailabilityService {
    pub fn new(
        registry: Arc<dyn AllocationRegistry>,
        claims: Arc<dyn ClaimLedger>,
        counter: WindowCounter,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            claims,
            counter,
            clock,
        }
    }

    /// Events referencing the allocation
    pub async fn distributed(&self, allocation_id: &AllocationId) -> MealResult<u64> {
        self.claims.count(&ClaimFilter::allocation(allocation_id)).await
    }

    /// Events referencing the allocation inside a window
    pub async fn distributed_within(
        &self,
        allocation_id: &AllocationId,
        window: TimeWindow,
    ) -> MealResult<u64> {
        self.counter
            .count(&ClaimFilter::allocation(allocation_id), window, self.clock.now())
            .await
    }

    /// Signed remaining portions, the value quota checks compare against zero
    pub async fn remaining(&self, allocation: &Allocation) -> MealResult<i64> {
        let distributed = self.distributed(&allocation.id).await?;
        Ok(remaining(allocation.quantity, distributed))
    }

    /// Full distribution summary of an allocation
    pub async fn summarize(&self, allocation: &Allocation) -> MealResult<AvailabilitySummary> {
        let now: DateTime<Utc> = self.clock.now();
        let filter = ClaimFilter::allocation(&allocation.id);

        let counts = DistributionCounts {
            distributed: self.claims.count(&filter).await?,
            distributed_today: self.counter.count(&filter, TimeWindow::Today, now).await?,
            distributed_this_week: self.counter.count(&filter, TimeWindow::ThisWeek, now).await?,
            distributed_this_month: self.counter.count(&filter, TimeWindow::ThisMonth, now).await?,
            unique_students_served: self.claims.count_students(&filter).await?,
            last_claim_at: self.claims.span(&filter).await?.last,
        };
        Ok(AvailabilitySummary::from_counts(allocation, counts))
    }

    /// Summary of an allocation visible to `scope`
    pub async fn summary(
        &self,
        allocation_id: &AllocationId,
        scope: &Scope,
    ) -> MealResult<AvailabilitySummary> {
        let allocation = self
            .registry
            .find_in_scope(allocation_id, scope)
            .await?
            .ok_or_else(|| MealError::AllocationNotFound(allocation_id.to_string()))?;
        self.summarize(&allocation).await
    }
}
