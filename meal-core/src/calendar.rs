//! Calendar windows
//!
//! Every time-windowed number in the system (today / this week / this month /
//! last 30 days / last 12 months) is resolved here into a half-open
//! [`TimeRange`] and then handed to the ledger as part of a
//! [`ClaimFilter`](crate::types::ClaimFilter). Day boundaries follow a fixed
//! UTC offset so that "today" means the school's day, not the server's.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{MealError, MealResult};

/// Half-open instant range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

/// Named reporting window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    Today,
    /// ISO week, Monday first
    ThisWeek,
    ThisMonth,
    /// Rolling 30 calendar days ending today
    Last30Days,
    /// Current month plus the eleven before it
    Last12Months,
    Range(TimeRange),
}

/// Claims on one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}

/// Claims in one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCount {
    pub year: i32,
    pub month: u32,
    pub count: u64,
}

/// Window resolver bound to a fixed UTC offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    offset: FixedOffset,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::utc()
    }
}

impl Calendar {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Build from an offset in minutes east of UTC
    pub fn from_offset_minutes(minutes: i32) -> MealResult<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Self::new)
            .ok_or_else(|| MealError::validation(format!("invalid UTC offset: {} minutes", minutes)))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Local calendar day of an instant
    pub fn date_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    /// Local calendar day of `now`
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.date_of(now)
    }

    /// First instant of a local calendar day
    pub fn day_start(&self, date: NaiveDate) -> DateTime<Utc> {
        let local_midnight = date.and_time(NaiveTime::MIN);
        (local_midnight - Duration::seconds(i64::from(self.offset.local_minus_utc()))).and_utc()
    }

    /// Range covering whole local days `[from, to]`
    pub fn days(&self, from: NaiveDate, to: NaiveDate) -> TimeRange {
        TimeRange::new(self.day_start(from), self.day_start(to + Duration::days(1)))
    }

    /// Resolve a named window relative to `now`
    pub fn resolve(&self, window: TimeWindow, now: DateTime<Utc>) -> TimeRange {
        let today = self.today(now);
        match window {
            TimeWindow::Today => self.days(today, today),
            TimeWindow::ThisWeek => {
                let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
                self.days(monday, monday + Duration::days(6))
            }
            TimeWindow::ThisMonth => {
                let first = first_of_month(today);
                TimeRange::new(self.day_start(first), self.day_start(next_month(first)))
            }
            TimeWindow::Last30Days => self.days(today - Duration::days(29), today),
            TimeWindow::Last12Months => {
                let current = first_of_month(today);
                let mut first = current;
                for _ in 0..11 {
                    first = previous_month(first);
                }
                TimeRange::new(self.day_start(first), self.day_start(next_month(current)))
            }
            TimeWindow::Range(range) => range,
        }
    }

    /// Zero-filled daily series for the `days` local days ending today,
    /// built from sparse per-day counts
    pub fn daily_series(
        &self,
        per_day: &[DailyCount],
        now: DateTime<Utc>,
        days: u32,
    ) -> Vec<DailyCount> {
        let today = self.today(now);
        let mut buckets: BTreeMap<NaiveDate, u64> = (0..i64::from(days))
            .map(|back| (today - Duration::days(back), 0))
            .collect();

        for day in per_day {
            if let Some(count) = buckets.get_mut(&day.date) {
                *count += day.count;
            }
        }

        buckets
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect()
    }

    /// Zero-filled monthly series for the `months` local months ending with
    /// the current one, built from sparse per-day counts
    pub fn monthly_series(
        &self,
        per_day: &[DailyCount],
        now: DateTime<Utc>,
        months: u32,
    ) -> Vec<MonthlyCount> {
        let mut first = first_of_month(self.today(now));
        let mut buckets: BTreeMap<(i32, u32), u64> = BTreeMap::new();
        for _ in 0..months {
            buckets.insert((first.year(), first.month()), 0);
            first = previous_month(first);
        }

        for day in per_day {
            if let Some(count) = buckets.get_mut(&(day.date.year(), day.date.month())) {
                *count += day.count;
            }
        }

        buckets
            .into_iter()
            .map(|((year, month), count)| MonthlyCount { year, month, count })
            .collect()
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

fn next_month(first: NaiveDate) -> NaiveDate {
    first_of_month(first + Duration::days(32))
}

fn previous_month(first: NaiveDate) -> NaiveDate {
    first_of_month(first - Duration::days(1))
}
