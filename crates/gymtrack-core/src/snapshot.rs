//! The per-user document the engine reads and the patch it writes back.
//!
//! Field names are the camelCase keys of the stored document. Writes are
//! partial: a [`SnapshotPatch`] only carries the fields an operation
//! changed, and the store merges them over the existing document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::badges::{Badge, BadgeSet, GoalBadgeLevel};
use crate::goal::{GoalState, WeightHistoryEntry};
use crate::membership::{GymEntryLogRecord, MembershipLedgerState};
use crate::steps::StepHistoryEntry;
use crate::workout::{WorkoutPlan, WorkoutTimer};

/// Snapshot of a user's stored metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSnapshot {
    #[serde(default)]
    pub step_history: Vec<StepHistoryEntry>,
    #[serde(default)]
    pub gym_entry_log: Vec<GymEntryLogRecord>,
    #[serde(default, deserialize_with = "lenient_badges")]
    pub badges: BadgeSet,
    #[serde(default)]
    pub badge_level: Option<GoalBadgeLevel>,
    #[serde(default)]
    pub weight_history: Vec<WeightHistoryEntry>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub target_weight: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub daily_calories: Option<f64>,
    #[serde(default)]
    pub goal_reached: bool,
    #[serde(default)]
    pub goal_count: u32,
    #[serde(default)]
    pub membership_days_left: u32,
    #[serde(default)]
    pub last_checked_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub workout_plan: Option<WorkoutPlan>,
    #[serde(default)]
    pub workout_timer_start: Option<DateTime<Utc>>,
}

impl UserSnapshot {
    pub fn goal_state(&self) -> GoalState {
        GoalState {
            goal_reached: self.goal_reached,
            goal_count: self.goal_count,
            badge_level: self.badge_level,
        }
    }

    /// Ledger view of the membership fields. A document that has never
    /// been checked is treated as checked at `now`.
    pub fn ledger(&self, now: DateTime<Utc>) -> MembershipLedgerState {
        MembershipLedgerState::new(
            self.membership_days_left,
            self.last_checked_date.unwrap_or(now),
        )
    }

    pub fn workout_timer(&self) -> WorkoutTimer {
        WorkoutTimer::new(self.workout_timer_start)
    }
}

/// Fields to write back. `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_history: Option<Vec<StepHistoryEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gym_entry_log: Option<Vec<GymEntryLogRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badges: Option<BadgeSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge_level: Option<GoalBadgeLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_history: Option<Vec<WeightHistoryEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_reached: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub membership_days_left: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checked_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout_plan: Option<WorkoutPlan>,
    /// `Some(None)` writes `null`, clearing a stopped timer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout_timer_start: Option<Option<DateTime<Utc>>>,
}

impl SnapshotPatch {
    pub fn is_empty(&self) -> bool {
        *self == SnapshotPatch::default()
    }

    /// Write goal fields, always together.
    pub fn with_goal(mut self, state: GoalState) -> Self {
        self.goal_reached = Some(state.goal_reached);
        self.goal_count = Some(state.goal_count);
        self.badge_level = state.badge_level;
        self
    }

    /// Write both ledger fields, always together.
    pub fn with_ledger(mut self, ledger: MembershipLedgerState) -> Self {
        self.membership_days_left = Some(ledger.days_left);
        self.last_checked_date = Some(ledger.last_checked_date);
        self
    }

    /// Fold `other` into `self`; fields set in `other` win.
    pub fn merge(mut self, other: SnapshotPatch) -> Self {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        take!(
            step_history,
            gym_entry_log,
            badges,
            badge_level,
            weight_history,
            target_weight,
            daily_calories,
            goal_reached,
            goal_count,
            membership_days_left,
            last_checked_date,
            workout_plan,
            workout_timer_start
        );
        self
    }

    /// Apply the patch to an in-memory snapshot.
    pub fn apply_to(&self, snapshot: &mut UserSnapshot) {
        let patch = self.clone();
        if let Some(v) = patch.step_history {
            snapshot.step_history = v;
        }
        if let Some(v) = patch.gym_entry_log {
            snapshot.gym_entry_log = v;
        }
        if let Some(v) = patch.badges {
            snapshot.badges = v;
        }
        if patch.badge_level.is_some() {
            snapshot.badge_level = patch.badge_level;
        }
        if let Some(v) = patch.weight_history {
            snapshot.weight_history = v;
        }
        if patch.target_weight.is_some() {
            snapshot.target_weight = patch.target_weight;
        }
        if patch.daily_calories.is_some() {
            snapshot.daily_calories = patch.daily_calories;
        }
        if let Some(v) = patch.goal_reached {
            snapshot.goal_reached = v;
        }
        if let Some(v) = patch.goal_count {
            snapshot.goal_count = v;
        }
        if let Some(v) = patch.membership_days_left {
            snapshot.membership_days_left = v;
        }
        if patch.last_checked_date.is_some() {
            snapshot.last_checked_date = patch.last_checked_date;
        }
        if patch.workout_plan.is_some() {
            snapshot.workout_plan = patch.workout_plan;
        }
        if let Some(v) = patch.workout_timer_start {
            snapshot.workout_timer_start = v;
        }
    }
}

/// Accepts `75`, `75.5`, `"75.5"` or `""`. Values that do not parse as a
/// number read as absent rather than failing the whole document.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
        Null(()),
    }

    let value = match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Some(n),
        NumberOrText::Text(s) if s.trim().is_empty() => None,
        NumberOrText::Text(s) => {
            let parsed = s.trim().parse::<f64>().ok();
            if parsed.is_none() {
                tracing::warn!(value = %s, "ignoring unparsable numeric field");
            }
            parsed
        }
        NumberOrText::Null(()) => None,
    };
    Ok(value.filter(|n| n.is_finite()))
}

/// Badge ids this build does not know (or non-string entries) are skipped
/// so one stray value does not make the whole document unreadable.
fn lenient_badges<'de, D>(deserializer: D) -> Result<BadgeSet, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    let mut badges = BadgeSet::new();
    for value in raw.unwrap_or_default() {
        match value.as_str().map(str::parse::<Badge>) {
            Some(Ok(badge)) => {
                badges.insert(badge);
            }
            _ => tracing::warn!(%value, "ignoring unknown badge id"),
        }
    }
    Ok(badges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn missing_fields_take_defaults() {
        let snapshot: UserSnapshot = serde_json::from_str(r#"{"fullName":"Ada"}"#).unwrap();
        assert_eq!(snapshot, UserSnapshot::default());
    }

    #[test]
    fn reads_stored_document() {
        let json = r#"{
            "stepHistory": [{"date": "2024-01-01", "steps": 1200}],
            "gymEntryLog": [{"date": "2024-01-01", "time": "18:05"}],
            "badges": ["First-Entry"],
            "badgeLevel": "silver",
            "weightHistory": [{"date": "2024-01-01", "weight": 80.5}],
            "targetWeight": "75",
            "dailyCalories": 500,
            "goalReached": false,
            "goalCount": 3,
            "membershipDaysLeft": 12,
            "lastCheckedDate": "2024-01-01T08:00:00.000Z"
        }"#;
        let snapshot: UserSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.step_history[0].steps, 1200);
        assert_eq!(snapshot.badges, BadgeSet::from([Badge::FirstEntry]));
        assert_eq!(snapshot.badge_level, Some(GoalBadgeLevel::Silver));
        assert_eq!(snapshot.target_weight, Some(75.0));
        assert_eq!(snapshot.daily_calories, Some(500.0));
        assert_eq!(snapshot.goal_state().goal_count, 3);
        assert_eq!(
            snapshot.last_checked_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap())
        );
    }

    #[test]
    fn unparsable_numbers_read_as_absent() {
        let snapshot: UserSnapshot =
            serde_json::from_str(r#"{"targetWeight": "abc", "dailyCalories": ""}"#).unwrap();
        assert_eq!(snapshot.target_weight, None);
        assert_eq!(snapshot.daily_calories, None);

        let snapshot: UserSnapshot = serde_json::from_str(r#"{"targetWeight": null}"#).unwrap();
        assert_eq!(snapshot.target_weight, None);
    }

    #[test]
    fn unknown_badge_ids_are_skipped() {
        let snapshot: UserSnapshot = serde_json::from_str(
            r#"{"badges": ["Early-Bird", "First-Entry", 7], "membershipDaysLeft": 5}"#,
        )
        .unwrap();
        assert_eq!(snapshot.badges, BadgeSet::from([Badge::FirstEntry]));
        assert_eq!(snapshot.membership_days_left, 5);

        let snapshot: UserSnapshot = serde_json::from_str(r#"{"badges": null}"#).unwrap();
        assert!(snapshot.badges.is_empty());
    }

    #[test]
    fn patch_serializes_only_changed_fields() {
        let patch = SnapshotPatch {
            goal_count: Some(2),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"goalCount":2}"#);
        assert!(SnapshotPatch::default().is_empty());
        assert!(!patch.is_empty());
    }

    #[test]
    fn stopping_the_timer_writes_null() {
        let started = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let mut snapshot = UserSnapshot {
            workout_timer_start: Some(started),
            ..Default::default()
        };
        let patch = SnapshotPatch {
            workout_timer_start: Some(None),
            ..Default::default()
        };
        assert!(!patch.is_empty());
        assert_eq!(
            serde_json::to_string(&patch).unwrap(),
            r#"{"workoutTimerStart":null}"#
        );
        patch.apply_to(&mut snapshot);
        assert!(!snapshot.workout_timer().is_running());
    }

    #[test]
    fn ledger_fields_travel_together() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let patch = SnapshotPatch::default().with_ledger(MembershipLedgerState::new(4, at));
        assert_eq!(patch.membership_days_left, Some(4));
        assert_eq!(patch.last_checked_date, Some(at));
    }

    #[test]
    fn apply_and_merge() {
        let mut snapshot = UserSnapshot {
            goal_count: 1,
            membership_days_left: 9,
            ..Default::default()
        };
        let patch = SnapshotPatch {
            goal_count: Some(2),
            ..Default::default()
        }
        .merge(SnapshotPatch {
            membership_days_left: Some(8),
            goal_count: Some(3),
            ..Default::default()
        });
        patch.apply_to(&mut snapshot);
        assert_eq!(snapshot.goal_count, 3);
        assert_eq!(snapshot.membership_days_left, 8);
    }
}
