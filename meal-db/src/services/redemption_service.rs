//! Redemption Orchestrator
//!
//! One scan moves through parse -> resolve student -> load allocation ->
//! availability -> duplicate -> commit, stopping at the first failure.
//! The availability and duplicate checks reject early; the commit itself is
//! the atomic conditional insert, so a request that slips past the checks
//! under contention still cannot overrun the quota or claim twice.

use meal_core::ledger::{AllocationRegistry, ClaimLedger, IdentityResolver, ReferenceDirectory};
use meal_core::{
    ClaimEvent, Clock, MealError, MealResult, RedemptionReceipt, RedemptionRequest, SchoolId,
    Scope,
};
use std::sync::Arc;
use tracing::{info, warn};

use super::AvailabilityService;

/// Redemption Orchestrator Service
pub struct RedemptionService {
    identity: Arc<dyn IdentityResolver>,
    registry: Arc<dyn AllocationRegistry>,
    claims: Arc<dyn ClaimLedger>,
    references: Arc<dyn ReferenceDirectory>,
    availability: Arc<AvailabilityService>,
    clock: Arc<dyn Clock>,
}

impl RedemptionService {
    pub fn new(
        identity: Arc<dyn IdentityResolver>,
        registry: Arc<dyn AllocationRegistry>,
        claims: Arc<dyn ClaimLedger>,
        references: Arc<dyn ReferenceDirectory>,
        availability: Arc<AvailabilityService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            identity,
            registry,
            claims,
            references,
            availability,
            clock,
        }
    }

    /// Redeem one portion for the student presenting `request.student_token`
    /// at `school_id`
    pub async fn redeem(
        &self,
        school_id: &SchoolId,
        request: RedemptionRequest,
    ) -> MealResult<RedemptionReceipt> {
        let student = self.identity.resolve(&request.student_token, school_id).await?;

        let allocation = self
            .registry
            .find_in_scope(&request.allocation_id, &Scope::School(school_id.clone()))
            .await?
            .ok_or_else(|| MealError::AllocationNotFound(request.allocation_id.to_string()))?;

        if self.availability.remaining(&allocation).await? <= 0 {
            warn!(
                allocation_id = %allocation.id,
                student_id = %student.id,
                "redemption rejected: quota exhausted"
            );
            return Err(MealError::QuotaExhausted(allocation.id.to_string()));
        }

        if self.claims.exists(&student.id, &allocation.id).await? {
            return Err(MealError::AlreadyClaimed {
                student_id: student.id.to_string(),
                allocation_id: allocation.id.to_string(),
            });
        }

        let event = ClaimEvent::new(student.id.clone(), allocation.id.clone(), self.clock.now());
        let event = match self.claims.append(event).await {
            Ok(event) => event,
            Err(err) => {
                if matches!(
                    err,
                    MealError::QuotaExhausted(_) | MealError::AlreadyClaimed { .. }
                ) {
                    warn!(
                        allocation_id = %allocation.id,
                        student_id = %student.id,
                        code = err.code(),
                        "redemption lost a race at commit"
                    );
                }
                return Err(err);
            }
        };

        let distributed = self.availability.distributed(&allocation.id).await?;
        let menu = self
            .references
            .menu(&allocation.menu_id)
            .await?
            .ok_or_else(|| MealError::storage(format!("menu {} vanished", allocation.menu_id)))?;

        info!(
            claim_id = %event.id,
            allocation_id = %allocation.id,
            student_id = %student.id,
            school_id = %school_id,
            distributed,
            "meal redeemed"
        );

        Ok(RedemptionReceipt::new(
            &event,
            &student,
            &menu,
            &allocation,
            distributed,
        ))
    }
}
