//! Membership day accounting and gym entry logging.
//!
//! The ledger is a checkpointed counter: `tick()` subtracts the whole
//! calendar days elapsed since `last_checked` and moves the checkpoint to
//! `now`, so calling it again for the same day is a no-op. The new count and
//! checkpoint are always returned together and must be persisted together.
//!
//! ## Usage
//!
//! ```ignore
//! let ledger = MembershipLedgerState::new(30, purchase_instant);
//! let ledger = ledger.tick(&Local::now());
//! let (log, outcome) = log_entry(&log, &ledger, today, EntryTime::now());
//! ```

use chrono::{DateTime, Local, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::calendar::CalendarDay;
use crate::error::ValidationError;

const TIME_FORMAT: &str = "%H:%M";

/// Time of day with minute precision, serialized as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntryTime(NaiveTime);

impl EntryTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(EntryTime)
    }

    pub fn of<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        let t = instant.time();
        EntryTime(t.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(t))
    }

    pub fn now() -> Self {
        Self::of(&Local::now())
    }
}

impl fmt::Display for EntryTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIME_FORMAT))
    }
}

impl FromStr for EntryTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), TIME_FORMAT)
            .map(EntryTime)
            .map_err(|_| ValidationError::InvalidTime(s.to_string()))
    }
}

impl TryFrom<String> for EntryTime {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntryTime> for String {
    fn from(time: EntryTime) -> Self {
        time.to_string()
    }
}

/// One gym visit. At most one per calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GymEntryLogRecord {
    pub date: CalendarDay,
    pub time: EntryTime,
}

/// Result of a gym entry attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryOutcome {
    /// A new record was appended
    Logged,
    /// A record for today already exists
    AlreadyLogged,
    /// No membership days left; access denied
    MembershipExpired,
}

/// Remaining membership days and the instant they were last reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipLedgerState {
    pub days_left: u32,
    pub last_checked_date: DateTime<Utc>,
}

impl MembershipLedgerState {
    pub fn new(days_left: u32, last_checked_date: DateTime<Utc>) -> Self {
        Self {
            days_left,
            last_checked_date,
        }
    }

    pub fn is_active(&self) -> bool {
        self.days_left > 0
    }

    /// Reconcile against `now`. Elapsed days are counted between calendar
    /// days in `now`'s zone. With no whole day elapsed the state is returned
    /// unchanged; otherwise the checkpoint moves to `now` even when
    /// `days_left` is already zero.
    pub fn tick<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Self {
        let zone = now.timezone();
        let last_day = CalendarDay::of(&self.last_checked_date.with_timezone(&zone));
        let elapsed = last_day.days_until(CalendarDay::of(now));
        if elapsed < 1 {
            return *self;
        }

        let elapsed = u32::try_from(elapsed).unwrap_or(u32::MAX);
        let days_left = self.days_left.saturating_sub(elapsed);
        tracing::debug!(
            elapsed,
            before = self.days_left,
            after = days_left,
            "membership ledger ticked"
        );
        if self.days_left > 0 && days_left == 0 {
            tracing::info!("membership expired");
        }
        Self {
            days_left,
            last_checked_date: now.with_timezone(&Utc),
        }
    }

    /// Add purchased days; the checkpoint resets to the purchase instant.
    pub fn purchase(&self, days: u32, at: DateTime<Utc>) -> Self {
        let days_left = self.days_left.saturating_add(days);
        tracing::info!(days, days_left, "membership extended");
        Self {
            days_left,
            last_checked_date: at,
        }
    }
}

/// Append a visit for `today` unless one exists or the membership is over.
pub fn log_entry(
    log: &[GymEntryLogRecord],
    ledger: &MembershipLedgerState,
    today: CalendarDay,
    time: EntryTime,
) -> (Vec<GymEntryLogRecord>, EntryOutcome) {
    if !ledger.is_active() {
        tracing::info!(%today, "entry refused, membership expired");
        return (log.to_vec(), EntryOutcome::MembershipExpired);
    }
    if log.iter().any(|r| r.date == today) {
        tracing::debug!(%today, "entry already logged today");
        return (log.to_vec(), EntryOutcome::AlreadyLogged);
    }

    let mut updated = log.to_vec();
    updated.push(GymEntryLogRecord { date: today, time });
    tracing::info!(%today, %time, "gym entry logged");
    (updated, EntryOutcome::Logged)
}
