//! UTC calendar days and the matching of forecast periods to target days.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Serialize, Serializer};

use crate::types::{ForecastDetail, Period};

/// Number of days a forecast covers: today and the next two.
pub const TARGET_DAY_COUNT: usize = 3;

/// A (year, month, day) in UTC.
///
/// Displays and serializes as the 8-character `YYYYMMDD` key used by the
/// period cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarDay(NaiveDate);

impl CalendarDay {
    /// Calendar day of an instant, evaluated in UTC regardless of the
    /// instant's own offset.
    pub fn of<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self(instant.with_timezone(&Utc).date_naive())
    }

    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y%m%d"))
    }
}

impl Serialize for CalendarDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Today, +1 and +2, fixed at the instant a forecast request began.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetDays([CalendarDay; TARGET_DAY_COUNT]);

impl TargetDays {
    pub fn starting(now: DateTime<Utc>) -> Self {
        Self([
            CalendarDay::of(&now),
            CalendarDay::of(&(now + Duration::days(1))),
            CalendarDay::of(&(now + Duration::days(2))),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = CalendarDay> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Display for TargetDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [today, next, last] = self.0;
        write!(f, "{}, {}, {}", today, next, last)
    }
}

/// Pick, for each target day in order, the first period that starts on it.
///
/// Days without a matching period are left out; source order breaks ties.
pub fn match_periods(periods: &[Period], days: &TargetDays) -> Vec<ForecastDetail> {
    days.iter()
        .filter_map(|day| {
            periods
                .iter()
                .find(|period| period.calendar_day() == day)
                .cloned()
                .map(ForecastDetail::from)
        })
        .collect()
}
