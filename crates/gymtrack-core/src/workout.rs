//! Saved workout plan and the workout stopwatch.
//!
//! A plan is "current" for twelve hours after it is saved and "previous"
//! after that. The stopwatch keeps only its start instant, so a restarted
//! process resumes the same count.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// How long a saved plan stays the current one (inclusive).
pub const CURRENT_PLAN_HOURS: i64 = 12;

/// A named list of exercises, stored as `workoutPlan` in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlan {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "selectedExercises")]
    pub exercises: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Where a saved plan sits relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanRecency {
    Current,
    Previous,
}

impl fmt::Display for PlanRecency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanRecency::Current => write!(f, "current"),
            PlanRecency::Previous => write!(f, "previous"),
        }
    }
}

impl WorkoutPlan {
    /// Build a plan saved at `at`. The name is trimmed and must not be
    /// empty. Blank exercise names are dropped, as are repeats, keeping
    /// first-selection order. At least one exercise must remain.
    pub fn new<I, S>(name: &str, exercises: I, at: DateTime<Utc>) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::invalid_input(
                "name",
                "plan name must not be empty",
            ));
        }

        let mut selected: Vec<String> = Vec::new();
        for exercise in exercises {
            let exercise = exercise.as_ref().trim();
            if !exercise.is_empty() && !selected.iter().any(|e| e == exercise) {
                selected.push(exercise.to_string());
            }
        }
        if selected.is_empty() {
            return Err(ValidationError::invalid_input(
                "exercises",
                "select at least one exercise",
            ));
        }

        Ok(Self {
            name: name.to_string(),
            exercises: selected,
            timestamp: at,
        })
    }

    /// A plan saved in the future (clock skew) counts as current.
    pub fn recency(&self, now: DateTime<Utc>) -> PlanRecency {
        if now - self.timestamp <= Duration::hours(CURRENT_PLAN_HOURS) {
            PlanRecency::Current
        } else {
            PlanRecency::Previous
        }
    }
}

/// Whole seconds from `start` to `now`, zero if `now` is earlier.
pub fn elapsed_secs(start: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    u64::try_from((now - start).num_seconds()).unwrap_or(0)
}

/// `mm:ss`. Minutes are not wrapped into hours, so 75 minutes prints as
/// `75:00`.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Stopwatch state as persisted: the start instant while running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkoutTimer {
    pub started_at: Option<DateTime<Utc>>,
}

impl WorkoutTimer {
    pub fn new(started_at: Option<DateTime<Utc>>) -> Self {
        Self { started_at }
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Start at `now`. Returns `None` if already running; the original
    /// start is kept.
    pub fn start(&self, now: DateTime<Utc>) -> Option<WorkoutTimer> {
        if self.is_running() {
            return None;
        }
        tracing::debug!(%now, "workout timer started");
        Some(WorkoutTimer::new(Some(now)))
    }

    /// Seconds on the clock at `now`; zero when stopped.
    pub fn elapsed(&self, now: DateTime<Utc>) -> u64 {
        self.started_at
            .map(|start| elapsed_secs(start, now))
            .unwrap_or(0)
    }

    /// Stop and report the final count, or `None` if it was not running.
    pub fn stop(&self, now: DateTime<Utc>) -> Option<u64> {
        let elapsed = self.started_at.map(|start| elapsed_secs(start, now))?;
        tracing::debug!(elapsed, "workout timer stopped");
        Some(elapsed)
    }
}
