//! Time abstraction for calendar-day logic.
//!
//! Streaks, daily challenge refreshes and seasonal event windows all compare
//! calendar days, not raw 24h durations. The `Clock` trait keeps "now" and
//! the timestamp-to-day bucketing injectable so tests can pin time.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Timelike, Utc};

/// Supplies "now" and calendar-day arithmetic to the engines.
///
/// The service layer owns a single clock; engine methods take the resolved
/// timestamps/days as arguments so engine state stays a pure function of its
/// inputs.
pub trait Clock {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// The calendar day a timestamp falls on.
    fn day_of(&self, ts: DateTime<Utc>) -> NaiveDate;

    /// Hour of day (0-23) a timestamp falls on, in the same calendar
    /// the day bucketing uses. Drives the morning/evening challenge windows.
    fn hour_of(&self, ts: DateTime<Utc>) -> u32;

    /// Today's calendar day.
    fn today(&self) -> NaiveDate {
        self.day_of(self.now())
    }
}

/// Signed difference in whole calendar days (`a - b`).
pub fn day_difference(a: NaiveDate, b: NaiveDate) -> i64 {
    (a - b).num_days()
}

/// Production clock: wall clock, device-local calendar.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn day_of(&self, ts: DateTime<Utc>) -> NaiveDate {
        ts.with_timezone(&Local).date_naive()
    }

    fn hour_of(&self, ts: DateTime<Utc>) -> u32 {
        ts.with_timezone(&Local).hour()
    }
}

/// Deterministic clock for tests: buckets days in UTC and only moves when
/// told to. Clones share the same instant, so a test can keep a handle and
/// advance a clock it already handed to a service.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: std::rc::Rc<std::cell::Cell<DateTime<Utc>>>,
}

impl FixedClock {
    /// Pin the clock to a specific instant.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: std::rc::Rc::new(std::cell::Cell::new(now)),
        }
    }

    /// Pin the clock to noon on a specific calendar day.
    pub fn on_day(year: i32, month: u32, day: u32) -> Self {
        let now = Utc
            .with_ymd_and_hms(year, month, day, 12, 0, 0)
            .single()
            .unwrap_or_else(|| Utc.timestamp_opt(0, 0).unwrap());
        Self::at(now)
    }

    /// Move the clock to a new instant.
    pub fn set(&self, now: DateTime<Utc>) {
        self.now.set(now);
    }

    /// Advance by whole days, keeping the time of day.
    pub fn advance_days(&self, days: i64) {
        self.now.set(self.now.get() + chrono::Duration::days(days));
    }

    /// Advance by hours.
    pub fn advance_hours(&self, hours: i64) {
        self.now.set(self.now.get() + chrono::Duration::hours(hours));
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }

    fn day_of(&self, ts: DateTime<Utc>) -> NaiveDate {
        ts.date_naive()
    }

    fn hour_of(&self, ts: DateTime<Utc>) -> u32 {
        ts.hour()
    }
}
