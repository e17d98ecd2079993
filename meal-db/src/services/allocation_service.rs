//! Allocation Registry Service Implementation

use async_trait::async_trait;
use meal_core::ledger::{AllocationRegistry, AllocationTotals, ReferenceDirectory};
use meal_core::{
    validate_quantity, validate_service_date, Allocation, AllocationDetail, AllocationId,
    AllocationUpdate, Calendar, Clock, GovernmentId, MealError, MealResult, MenuId,
    NewAllocation, Page, PageRequest, SchoolId, Scope,
};
use std::sync::Arc;
use tracing::info;

use crate::repos::MealDatabase;

/// Allocation Registry Service
pub struct AllocationService {
    database: Arc<MealDatabase>,
    clock: Arc<dyn Clock>,
    calendar: Calendar,
}

impl AllocationService {
    pub fn new(database: Arc<MealDatabase>, clock: Arc<dyn Clock>, calendar: Calendar) -> Self {
        Self {
            database,
            clock,
            calendar,
        }
    }

    /// Attach the referenced school and menu
    pub async fn describe(&self, allocation: Allocation) -> MealResult<AllocationDetail> {
        let school = self
            .database
            .references
            .school(&allocation.school_id)
            .await?
            .ok_or_else(|| MealError::storage(format!("school {} vanished", allocation.school_id)))?;
        let menu = self
            .database
            .references
            .menu(&allocation.menu_id)
            .await?
            .ok_or_else(|| MealError::storage(format!("menu {} vanished", allocation.menu_id)))?;
        Ok(AllocationDetail {
            allocation,
            school,
            menu,
        })
    }

    fn today(&self) -> chrono::NaiveDate {
        self.calendar.today(self.clock.now())
    }
}

#[async_trait]
impl AllocationRegistry for AllocationService {
    async fn create(
        &self,
        government_id: &GovernmentId,
        request: NewAllocation,
    ) -> MealResult<Allocation> {
        let quantity = validate_quantity(request.quantity)?;
        validate_service_date(request.service_date, self.today())?;

        let scope = Scope::Government(government_id.clone());
        self.database
            .references
            .school(&request.school_id)
            .await?
            .filter(|school| scope.owns_school(school))
            .ok_or_else(|| MealError::invalid_reference("school", request.school_id.as_str()))?;
        self.database
            .references
            .menu(&request.menu_id)
            .await?
            .filter(|menu| &menu.government_id == government_id)
            .ok_or_else(|| MealError::invalid_reference("menu", request.menu_id.as_str()))?;

        let now = self.clock.now();
        let allocation = self
            .database
            .allocations
            .insert(Allocation {
                id: AllocationId::generate(),
                school_id: request.school_id,
                menu_id: request.menu_id,
                quantity,
                service_date: request.service_date,
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!(
            allocation_id = %allocation.id,
            school_id = %allocation.school_id,
            menu_id = %allocation.menu_id,
            quantity = allocation.quantity,
            service_date = %allocation.service_date,
            "allocation created"
        );
        Ok(allocation)
    }

    async fn update(
        &self,
        government_id: &GovernmentId,
        allocation_id: &AllocationId,
        update: AllocationUpdate,
    ) -> MealResult<Allocation> {
        let quantity = update.quantity.map(validate_quantity).transpose()?;
        if let Some(date) = update.service_date {
            validate_service_date(date, self.today())?;
        }

        let scope = Scope::Government(government_id.clone());
        if update.is_empty() {
            return self
                .find_in_scope(allocation_id, &scope)
                .await?
                .ok_or_else(|| MealError::AllocationNotFound(allocation_id.to_string()));
        }

        let allocation = self
            .database
            .allocations
            .update_checked(
                &scope,
                allocation_id,
                quantity,
                update.service_date,
                self.clock.now(),
            )
            .await?;

        info!(
            allocation_id = %allocation.id,
            quantity = allocation.quantity,
            service_date = %allocation.service_date,
            "allocation updated"
        );
        Ok(allocation)
    }

    async fn delete(
        &self,
        government_id: &GovernmentId,
        allocation_id: &AllocationId,
    ) -> MealResult<()> {
        self.database
            .allocations
            .delete_checked(&Scope::Government(government_id.clone()), allocation_id)
            .await?;
        info!(allocation_id = %allocation_id, "allocation deleted");
        Ok(())
    }

    async fn find_by_id(&self, allocation_id: &AllocationId) -> MealResult<Option<Allocation>> {
        Ok(self.database.allocations.get(allocation_id).await?)
    }

    async fn find_in_scope(
        &self,
        allocation_id: &AllocationId,
        scope: &Scope,
    ) -> MealResult<Option<Allocation>> {
        Ok(self
            .database
            .allocations
            .get_in_scope(allocation_id, scope)
            .await?)
    }

    async fn find_by_school(
        &self,
        school_id: &SchoolId,
        page: PageRequest,
    ) -> MealResult<Page<Allocation>> {
        Ok(self
            .database
            .allocations
            .list(&Scope::School(school_id.clone()), page)
            .await?)
    }

    async fn find_by_government(
        &self,
        government_id: &GovernmentId,
        page: PageRequest,
    ) -> MealResult<Page<Allocation>> {
        Ok(self
            .database
            .allocations
            .list(&Scope::Government(government_id.clone()), page)
            .await?)
    }

    async fn totals(&self, scope: &Scope) -> MealResult<AllocationTotals> {
        Ok(self.database.allocations.totals(scope).await?)
    }

    async fn totals_by_menu(&self, scope: &Scope) -> MealResult<Vec<(MenuId, AllocationTotals)>> {
        Ok(self.database.allocations.totals_by_menu(scope).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::test_support::seeded_db;
    use chrono::{DateTime, NaiveDate, Utc};
    use meal_core::FixedClock;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn service() -> AllocationService {
        let now = DateTime::parse_from_rfc3339("2024-05-09T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        AllocationService::new(
            Arc::new(seeded_db().await),
            Arc::new(FixedClock::new(now)),
            Calendar::utc(),
        )
    }

    fn request(school: &str, menu: &str, quantity: i64, service_date: NaiveDate) -> NewAllocation {
        NewAllocation {
            school_id: SchoolId::new(school),
            menu_id: MenuId::new(menu),
            quantity,
            service_date,
        }
    }

    fn gov() -> GovernmentId {
        GovernmentId::new("gov_1")
    }

    #[tokio::test]
    async fn test_create_then_duplicate() {
        let registry = service().await;
        let created = registry
            .create(&gov(), request("school_a", "menu_1", 150, date(2024, 5, 10)))
            .await
            .unwrap();
        assert_eq!(created.quantity, 150);

        let err = registry
            .create(&gov(), request("school_a", "menu_1", 20, date(2024, 5, 10)))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "DUPLICATE_ALLOCATION");
    }

    #[tokio::test]
    async fn test_validation_precedes_lookup() {
        let registry = service().await;
        let err = registry
            .create(&gov(), request("school_missing", "menu_1", 0, date(2024, 5, 10)))
            .await
            .unwrap_err();
        assert_eq!(err, MealError::InvalidQuantity(0));

        let err = registry
            .create(&gov(), request("school_missing", "menu_1", 5, date(2024, 5, 8)))
            .await
            .unwrap_err();
        assert!(matches!(err, MealError::DateInPast { .. }));
    }

    #[tokio::test]
    async fn test_invalid_references() {
        let registry = service().await;
        let err = registry
            .create(&gov(), request("school_missing", "menu_1", 5, date(2024, 5, 10)))
            .await
            .unwrap_err();
        assert_eq!(err, MealError::invalid_reference("school", "school_missing"));

        // school_c belongs to another government
        let err = registry
            .create(&gov(), request("school_c", "menu_1", 5, date(2024, 5, 10)))
            .await
            .unwrap_err();
        assert_eq!(err, MealError::invalid_reference("school", "school_c"));

        let err = registry
            .create(&gov(), request("school_a", "menu_3", 5, date(2024, 5, 10)))
            .await
            .unwrap_err();
        assert_eq!(err, MealError::invalid_reference("menu", "menu_3"));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let registry = service().await;
        let created = registry
            .create(&gov(), request("school_a", "menu_2", 10, date(2024, 5, 10)))
            .await
            .unwrap();

        let updated = registry
            .update(
                &gov(),
                &created.id,
                AllocationUpdate {
                    quantity: Some(12),
                    service_date: Some(date(2024, 5, 11)),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.quantity, 12);
        assert_eq!(updated.service_date, date(2024, 5, 11));

        let err = registry
            .update(
                &gov(),
                &created.id,
                AllocationUpdate {
                    quantity: Some(-1),
                    service_date: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err, MealError::InvalidQuantity(-1));

        let err = registry
            .update(&GovernmentId::new("gov_2"), &created.id, AllocationUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "ALLOCATION_NOT_FOUND");

        registry.delete(&gov(), &created.id).await.unwrap();
        assert!(registry.find_by_id(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_describe() {
        let registry = service().await;
        let created = registry
            .create(&gov(), request("school_a", "menu_1", 10, date(2024, 5, 10)))
            .await
            .unwrap();
        let detail = registry.describe(created).await.unwrap();
        assert_eq!(detail.school.name, "SCHOOL_A");
        assert_eq!(detail.menu.name, "Rice");
    }
}
