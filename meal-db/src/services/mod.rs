//! Ledger service implementations
//!
//! Services implement the `meal_core::ledger` traits on top of the
//! repositories, and compose them into the availability calculator, the
//! redemption orchestrator and the rollup engine.

mod allocation_service;
mod analytics_service;
mod availability_service;
mod identity_service;
mod redemption_service;

pub use allocation_service::AllocationService;
pub use analytics_service::AnalyticsService;
pub use availability_service::AvailabilityService;
pub use identity_service::IdentityService;
pub use redemption_service::RedemptionService;

use chrono::{DateTime, Utc};
use meal_core::ledger::{ClaimLedger, ReferenceDirectory};
use meal_core::{
    Calendar, ClaimFilter, Clock, MealResult, SystemClock, TimeWindow, TokenFormat, WindowTotals,
};
use std::sync::Arc;

use crate::repos::MealDatabase;

/// Knobs shared by the services
#[derive(Clone)]
pub struct ServiceSettings {
    pub token_format: TokenFormat,
    pub calendar: Calendar,
    pub clock: Arc<dyn Clock>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            token_format: TokenFormat::default(),
            calendar: Calendar::utc(),
            clock: Arc::new(SystemClock),
        }
    }
}

/// Every service, wired over one database
#[derive(Clone)]
pub struct MealServices {
    pub database: Arc<MealDatabase>,
    pub allocations: Arc<AllocationService>,
    pub identity: Arc<IdentityService>,
    pub availability: Arc<AvailabilityService>,
    pub redemption: Arc<RedemptionService>,
    pub analytics: Arc<AnalyticsService>,
}

impl MealServices {
    pub fn new(database: Arc<MealDatabase>, settings: ServiceSettings) -> Self {
        let ServiceSettings {
            token_format,
            calendar,
            clock,
        } = settings;

        let claims: Arc<dyn ClaimLedger> = Arc::new(database.claims.clone());
        let references: Arc<dyn ReferenceDirectory> = Arc::new(database.references.clone());
        let counter = WindowCounter::new(claims.clone(), calendar);

        let allocations = Arc::new(AllocationService::new(
            database.clone(),
            clock.clone(),
            calendar,
        ));
        let identity = Arc::new(IdentityService::new(database.clone(), token_format));
        let availability = Arc::new(AvailabilityService::new(
            allocations.clone(),
            claims.clone(),
            counter.clone(),
            clock.clone(),
        ));
        let redemption = Arc::new(RedemptionService::new(
            identity.clone(),
            allocations.clone(),
            claims.clone(),
            references.clone(),
            availability.clone(),
            clock.clone(),
        ));
        let analytics = Arc::new(AnalyticsService::new(
            allocations.clone(),
            claims,
            references,
            counter,
            clock,
        ));

        Self {
            database,
            allocations,
            identity,
            availability,
            redemption,
            analytics,
        }
    }
}

/// Counts ledger events inside calendar windows.
///
/// The only place a window is turned into a count; the availability
/// calculator and the rollup engine both go through it.
#[derive(Clone)]
pub struct WindowCounter {
    claims: Arc<dyn ClaimLedger>,
    calendar: Calendar,
}

impl WindowCounter {
    pub fn new(claims: Arc<dyn ClaimLedger>, calendar: Calendar) -> Self {
        Self { claims, calendar }
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Events matching `filter` inside `window`
    pub async fn count(
        &self,
        filter: &ClaimFilter,
        window: TimeWindow,
        now: DateTime<Utc>,
    ) -> MealResult<u64> {
        let range = self.calendar.resolve(window, now);
        self.claims.count(&filter.clone().within(range)).await
    }

    /// Distinct students among events matching `filter` inside `window`
    pub async fn count_students(
        &self,
        filter: &ClaimFilter,
        window: TimeWindow,
        now: DateTime<Utc>,
    ) -> MealResult<u64> {
        let range = self.calendar.resolve(window, now);
        self.claims.count_students(&filter.clone().within(range)).await
    }

    /// Counts over every standard window
    pub async fn totals(&self, filter: &ClaimFilter, now: DateTime<Utc>) -> MealResult<WindowTotals> {
        Ok(WindowTotals {
            today: self.count(filter, TimeWindow::Today, now).await?,
            this_week: self.count(filter, TimeWindow::ThisWeek, now).await?,
            this_month: self.count(filter, TimeWindow::ThisMonth, now).await?,
            last_30_days: self.count(filter, TimeWindow::Last30Days, now).await?,
            last_12_months: self.count(filter, TimeWindow::Last12Months, now).await?,
        })
    }
}
