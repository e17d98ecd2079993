//! Rollup/Analytics Engine
//!
//! A second read path over the claim ledger and the allocation registry.
//! Reports are assembled per call; the engine keeps no counters of its own.

use meal_core::ledger::{AllocationRegistry, ClaimLedger, ReferenceDirectory};
use meal_core::{
    days_since, percentage, rank_menus, ActivityStatus, ClaimFilter, Clock, MealError,
    MealResult, MenuUtilization, SchoolId, SchoolPerformance, Scope, StudentId, StudentMealStats,
    TimeWindow, TrendReport, RECENT_ACTIVITY_LIMIT,
};
use std::sync::Arc;

use super::WindowCounter;

/// Days in the daily trend series
pub const TREND_DAYS: u32 = 30;

/// Months in the monthly trend series
pub const TREND_MONTHS: u32 = 12;

/// Rollup/Analytics Engine Service
pub struct AnalyticsService {
    registry: Arc<dyn AllocationRegistry>,
    claims: Arc<dyn ClaimLedger>,
    references: Arc<dyn ReferenceDirectory>,
    counter: WindowCounter,
    clock: Arc<dyn Clock>,
}

impl AnalyticsService {
    pub fn new(
        registry: Arc<dyn AllocationRegistry>,
        claims: Arc<dyn ClaimLedger>,
        references: Arc<dyn ReferenceDirectory>,
        counter: WindowCounter,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            claims,
            references,
            counter,
            clock,
        }
    }

    /// Participation report of one school visible to `scope`
    pub async fn school_performance(
        &self,
        scope: &Scope,
        school_id: &SchoolId,
    ) -> MealResult<SchoolPerformance> {
        let school = self
            .references
            .school(school_id)
            .await?
            .filter(|school| scope.owns_school(school))
            .ok_or_else(|| MealError::not_found("school", school_id.as_str()))?;

        let now = self.clock.now();
        let filter = ClaimFilter::school(school_id);

        let total_students = self.references.count_students(school_id).await?;
        let unique_students_served = self.claims.count_students(&filter).await?;
        let totals = self.registry.totals(&Scope::School(school_id.clone())).await?;

        Ok(SchoolPerformance {
            total_students,
            unique_students_served,
            unique_students_served_this_month: self
                .counter
                .count_students(&filter, TimeWindow::ThisMonth, now)
                .await?,
            participation_rate: percentage(unique_students_served, total_students),
            total_claims: self.claims.count(&filter).await?,
            claims_today: self.counter.count(&filter, TimeWindow::Today, now).await?,
            claims_this_week: self.counter.count(&filter, TimeWindow::ThisWeek, now).await?,
            claims_this_month: self.counter.count(&filter, TimeWindow::ThisMonth, now).await?,
            allocation_count: totals.allocation_count,
            total_allocated: totals.total_allocated,
            last_claim_at: self.claims.span(&filter).await?.last,
            recent_activity: self.claims.recent(&filter, RECENT_ACTIVITY_LIMIT).await?,
            school,
        })
    }

    /// Utilization per menu, highest first
    pub async fn menu_utilization(&self, scope: &Scope) -> MealResult<Vec<MenuUtilization>> {
        let scoped = ClaimFilter::scoped(scope);
        let mut menus = Vec::new();

        for (menu_id, totals) in self.registry.totals_by_menu(scope).await? {
            let menu_name = self
                .references
                .menu(&menu_id)
                .await?
                .map(|menu| menu.name)
                .unwrap_or_else(|| menu_id.to_string());
            let claims = self.claims.count(&scoped.clone().with_menu(&menu_id)).await?;
            menus.push(MenuUtilization::new(
                menu_id,
                menu_name,
                totals.allocation_count,
                totals.total_allocated,
                claims,
            ));
        }

        rank_menus(&mut menus);
        Ok(menus)
    }

    /// Meal history of one student visible to `scope`
    pub async fn student_history(
        &self,
        scope: &Scope,
        student_id: &StudentId,
    ) -> MealResult<StudentMealStats> {
        let not_found = || MealError::not_found("student", student_id.as_str());
        let student = self.references.student(student_id).await?.ok_or_else(not_found)?;
        self.references
            .school(&student.school_id)
            .await?
            .filter(|school| scope.owns_school(school))
            .ok_or_else(not_found)?;

        let now = self.clock.now();
        let calendar = self.counter.calendar();
        let filter = ClaimFilter::student(student_id);
        let span = self.claims.span(&filter).await?;

        Ok(StudentMealStats {
            total_meals: self.claims.count(&filter).await?,
            meals_this_week: self.counter.count(&filter, TimeWindow::ThisWeek, now).await?,
            meals_this_month: self.counter.count(&filter, TimeWindow::ThisMonth, now).await?,
            first_claim_at: span.first,
            last_claim_at: span.last,
            days_since_last_claim: days_since(span.last, now, calendar),
            activity: ActivityStatus::classify(span.last, now, calendar),
            recent_claims: self.claims.recent(&filter, RECENT_ACTIVITY_LIMIT).await?,
            student_id: student.id,
            name: student.name,
            student_number: student.student_number,
            class_name: student.class_name,
            grade: student.grade,
        })
    }

    /// Window totals and zero-filled daily and monthly series for a scope
    pub async fn trends(&self, scope: &Scope) -> MealResult<TrendReport> {
        let now = self.clock.now();
        let calendar = self.counter.calendar();
        let filter = ClaimFilter::scoped(scope);

        let totals = self.counter.totals(&filter, now).await?;
        let year = calendar.resolve(TimeWindow::Last12Months, now);
        let per_day = self
            .claims
            .daily_counts(&filter.within(year), calendar.offset())
            .await?;

        Ok(TrendReport {
            scope: scope.clone(),
            generated_at: now,
            totals,
            daily: calendar.daily_series(&per_day, now, TREND_DAYS),
            monthly: calendar.monthly_series(&per_day, now, TREND_MONTHS),
        })
    }
}
