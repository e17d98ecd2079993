//! Allocation Registry - quota records

use async_trait::async_trait;

use crate::error::MealResult;
use crate::types::{
    Allocation, AllocationId, AllocationUpdate, GovernmentId, MenuId, NewAllocation, Page,
    PageRequest, SchoolId, Scope,
};

/// Allocation count and summed quantity over a set of allocations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocationTotals {
    pub allocation_count: u64,
    pub total_allocated: u64,
}

/// Allocation Registry trait
#[async_trait]
pub trait AllocationRegistry: Send + Sync {
    /// Create an allocation on behalf of a government
    async fn create(
        &self,
        government_id: &GovernmentId,
        request: NewAllocation,
    ) -> MealResult<Allocation>;

    /// Apply a partial update
    async fn update(
        &self,
        government_id: &GovernmentId,
        allocation_id: &AllocationId,
        update: AllocationUpdate,
    ) -> MealResult<Allocation>;

    /// Delete an allocation that has no claims
    async fn delete(&self, government_id: &GovernmentId, allocation_id: &AllocationId)
        -> MealResult<()>;

    /// Get allocation by ID, unscoped
    async fn find_by_id(&self, allocation_id: &AllocationId) -> MealResult<Option<Allocation>>;

    /// Get allocation by ID if it is visible to `scope`
    async fn find_in_scope(
        &self,
        allocation_id: &AllocationId,
        scope: &Scope,
    ) -> MealResult<Option<Allocation>>;

    /// List a school's allocations, newest service date first
    async fn find_by_school(
        &self,
        school_id: &SchoolId,
        page: PageRequest,
    ) -> MealResult<Page<Allocation>>;

    /// List every allocation under a government, newest service date first
    async fn find_by_government(
        &self,
        government_id: &GovernmentId,
        page: PageRequest,
    ) -> MealResult<Page<Allocation>>;

    /// Totals over every allocation visible to `scope`
    async fn totals(&self, scope: &Scope) -> MealResult<AllocationTotals>;

    /// Totals per menu over every allocation visible to `scope`
    async fn totals_by_menu(&self, scope: &Scope) -> MealResult<Vec<(MenuId, AllocationTotals)>>;
}
