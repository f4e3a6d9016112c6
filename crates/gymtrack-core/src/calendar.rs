//! Calendar-day keys and day arithmetic.
//!
//! Every daily aggregate (steps, gym visits, weight) is keyed by a
//! [`CalendarDay`]. Day differences are always taken between calendar dates,
//! never by dividing millisecond spans, so a 23- or 25-hour day across a
//! daylight-saving switch still counts as exactly one day.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

const DAY_FORMAT: &str = "%Y-%m-%d";

/// A date truncated to local-day granularity, serialized as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarDay(NaiveDate);

impl CalendarDay {
    pub fn new(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(CalendarDay)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        CalendarDay(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Day of `instant` in the instant's own time zone.
    pub fn of<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        CalendarDay(instant.date_naive())
    }

    /// Day of `instant` in the device's local time zone.
    pub fn local(instant: &DateTime<Utc>) -> Self {
        Self::of(&instant.with_timezone(&Local))
    }

    pub fn today() -> Self {
        Self::local(&Utc::now())
    }

    /// Signed number of days from `self` to `other`.
    pub fn days_until(&self, other: CalendarDay) -> i64 {
        other.0.signed_duration_since(self.0).num_days()
    }

    /// The day `days` after this one (negative goes back).
    ///
    /// Saturates at chrono's supported date range.
    pub fn add_days(&self, days: i64) -> Self {
        let bound = if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX };
        CalendarDay(
            self.0
                .checked_add_signed(Duration::days(days))
                .unwrap_or(bound),
        )
    }

    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn same_month(&self, other: &CalendarDay) -> bool {
        self.year() == other.year() && self.month() == other.month()
    }
}

/// Truncates an instant to its local calendar day.
pub fn calendar_day(instant: &DateTime<Utc>) -> CalendarDay {
    CalendarDay::local(instant)
}

/// Signed whole-day difference `b - a`.
pub fn days_between(a: CalendarDay, b: CalendarDay) -> i64 {
    a.days_until(b)
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DAY_FORMAT))
    }
}

impl FromStr for CalendarDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), DAY_FORMAT)
            .map(CalendarDay)
            .map_err(|_| ValidationError::InvalidDay(s.to_string()))
    }
}

impl TryFrom<String> for CalendarDay {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CalendarDay> for String {
    fn from(day: CalendarDay) -> Self {
        day.to_string()
    }
}
