//! Snapshot-in, patch-out facade over the metrics components.
//!
//! Each operation reads a [`UserSnapshot`] and returns the
//! [`SnapshotPatch`] the caller should persist. Nothing is retained between
//! calls except the caller-owned [`StepAggregator`].

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::badges::{self, Badge, GoalBadgeLevel, StreakSummary};
use crate::calendar::CalendarDay;
use crate::error::ValidationError;
use crate::goal::{self, BmiReading, GoalProjector, GoalTargets, Projection};
use crate::membership::{self, EntryOutcome, EntryTime};
use crate::snapshot::{SnapshotPatch, UserSnapshot};
use crate::steps::{self, MotionSample, StepAggregator, StepDetectorConfig};
use crate::storage::Config;
use crate::workout::WorkoutPlan;

/// Read-only overview of a user's metrics for one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub today: CalendarDay,
    pub steps_today: u32,
    pub kcal_today: f64,
    pub membership_days_left: u32,
    pub membership_active: bool,
    pub badges: Vec<Badge>,
    pub badge_level: Option<GoalBadgeLevel>,
    pub streak: StreakSummary,
    pub projection: Option<Projection>,
    pub bmi: Option<BmiReading>,
}

#[derive(Debug, Clone, Default)]
pub struct MetricsEngine {
    steps: StepDetectorConfig,
    goal: GoalProjector,
}

impl MetricsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            steps: config.steps.clone(),
            goal: GoalProjector::with_config(config.goal.clone()),
        }
    }

    /// A fresh debouncer using this engine's step settings.
    pub fn aggregator(&self) -> StepAggregator {
        StepAggregator::with_config(self.steps.clone())
    }

    pub fn record_motion(
        &self,
        snapshot: &UserSnapshot,
        aggregator: &mut StepAggregator,
        today: CalendarDay,
        sample: &MotionSample,
    ) -> SnapshotPatch {
        let step_history = aggregator.record_sample(&snapshot.step_history, today, sample);
        SnapshotPatch {
            step_history,
            ..Default::default()
        }
    }

    pub fn roll_over_steps(
        &self,
        snapshot: &UserSnapshot,
        aggregator: &mut StepAggregator,
        today: CalendarDay,
    ) -> SnapshotPatch {
        SnapshotPatch {
            step_history: aggregator.roll_over(&snapshot.step_history, today),
            ..Default::default()
        }
    }

    /// A gym entry scan: reconcile the ledger, log today's visit if allowed
    /// and re-evaluate badges.
    pub fn scan_entry<Tz: TimeZone>(
        &self,
        snapshot: &UserSnapshot,
        now: &DateTime<Tz>,
    ) -> (SnapshotPatch, EntryOutcome) {
        let ledger = snapshot.ledger(now.with_timezone(&Utc)).tick(now);
        let today = CalendarDay::of(now);
        let (log, outcome) =
            membership::log_entry(&snapshot.gym_entry_log, &ledger, today, EntryTime::of(now));

        let mut patch = SnapshotPatch::default().with_ledger(ledger);
        if outcome == EntryOutcome::Logged {
            let earned = badges::evaluate(&log, &snapshot.badges);
            if earned != snapshot.badges {
                patch.badges = Some(earned);
            }
            patch.gym_entry_log = Some(log);
        }
        (patch, outcome)
    }

    /// Reconcile remaining membership days against `now`.
    pub fn refresh_membership<Tz: TimeZone>(
        &self,
        snapshot: &UserSnapshot,
        now: &DateTime<Tz>,
    ) -> SnapshotPatch {
        let before = snapshot.ledger(now.with_timezone(&Utc));
        let after = before.tick(now);
        if after == before && snapshot.last_checked_date.is_some() {
            return SnapshotPatch::default();
        }
        SnapshotPatch::default().with_ledger(after)
    }

    pub fn purchase(&self, snapshot: &UserSnapshot, days: u32, at: DateTime<Utc>) -> SnapshotPatch {
        let ledger = snapshot.ledger(at).purchase(days, at);
        SnapshotPatch::default().with_ledger(ledger)
    }

    /// Record today's weight and re-evaluate the goal.
    ///
    /// A goal that cannot be evaluated (bad calorie setting) does not block
    /// the weight entry; the projection is just skipped.
    pub fn log_weight(
        &self,
        snapshot: &UserSnapshot,
        today: CalendarDay,
        weight: f64,
    ) -> Result<SnapshotPatch, ValidationError> {
        let history = goal::log_weight(&snapshot.weight_history, today, weight)?;
        let patch = SnapshotPatch {
            weight_history: Some(history),
            ..Default::default()
        };
        Ok(self.follow_with_goal(snapshot, patch))
    }

    /// Store new targets, re-arm the crossing and re-evaluate the goal.
    pub fn set_targets(
        &self,
        snapshot: &UserSnapshot,
        target_weight: f64,
        daily_calories: f64,
    ) -> Result<SnapshotPatch, ValidationError> {
        let targets = GoalTargets::new(target_weight, daily_calories)?;
        let patch = SnapshotPatch {
            target_weight: Some(targets.target_weight),
            daily_calories: Some(targets.daily_calories),
            ..Default::default()
        }
        .with_goal(targets.rearm(&snapshot.goal_state()));
        Ok(self.follow_with_goal(snapshot, patch))
    }

    /// Run the projection. `Ok((None, empty))` when there is no history or
    /// no targets yet.
    pub fn refresh_goal(
        &self,
        snapshot: &UserSnapshot,
    ) -> Result<(Option<Projection>, SnapshotPatch), ValidationError> {
        let (Some(target), Some(calories)) = (snapshot.target_weight, snapshot.daily_calories)
        else {
            return Ok((None, SnapshotPatch::default()));
        };

        let projection = self.goal.project(
            &snapshot.weight_history,
            target,
            calories,
            &snapshot.goal_state(),
        )?;
        let patch = match projection {
            Some(p) if p.crossed => SnapshotPatch::default().with_goal(p.state()),
            _ => SnapshotPatch::default(),
        };
        Ok((projection, patch))
    }

    /// Save a named plan, replacing the stored one.
    pub fn save_workout_plan<I, S>(
        &self,
        name: &str,
        exercises: I,
        at: DateTime<Utc>,
    ) -> Result<SnapshotPatch, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let plan = WorkoutPlan::new(name, exercises, at)?;
        tracing::info!(name = %plan.name, exercises = plan.exercises.len(), "workout plan saved");
        Ok(SnapshotPatch {
            workout_plan: Some(plan),
            ..Default::default()
        })
    }

    /// Start the workout timer. Empty patch if it is already running.
    pub fn start_workout_timer(&self, snapshot: &UserSnapshot, now: DateTime<Utc>) -> SnapshotPatch {
        match snapshot.workout_timer().start(now) {
            Some(timer) => SnapshotPatch {
                workout_timer_start: Some(timer.started_at),
                ..Default::default()
            },
            None => SnapshotPatch::default(),
        }
    }

    /// Stop the workout timer, returning the seconds it ran.
    pub fn stop_workout_timer(
        &self,
        snapshot: &UserSnapshot,
        now: DateTime<Utc>,
    ) -> (SnapshotPatch, Option<u64>) {
        match snapshot.workout_timer().stop(now) {
            Some(elapsed) => (
                SnapshotPatch {
                    workout_timer_start: Some(None),
                    ..Default::default()
                },
                Some(elapsed),
            ),
            None => (SnapshotPatch::default(), None),
        }
    }

    pub fn summary(
        &self,
        snapshot: &UserSnapshot,
        today: CalendarDay,
        height_cm: Option<f64>,
    ) -> DashboardSummary {
        let steps_today = steps::steps_on(&snapshot.step_history, today);
        let projection = match self.refresh_goal(snapshot) {
            Ok((projection, _)) => projection,
            Err(e) => {
                tracing::warn!(error = %e, "goal projection skipped");
                None
            }
        };
        let latest_weight = goal::normalize_history(&snapshot.weight_history)
            .last()
            .map(|e| e.weight);
        let bmi = match (latest_weight, height_cm) {
            (Some(w), Some(h)) => goal::bmi(w, h),
            _ => None,
        };

        DashboardSummary {
            today,
            steps_today,
            kcal_today: self.steps.calories(steps_today),
            membership_days_left: snapshot.membership_days_left,
            membership_active: snapshot.membership_days_left > 0,
            badges: snapshot.badges.iter().copied().collect(),
            badge_level: snapshot.badge_level,
            streak: badges::streak_summary(&snapshot.gym_entry_log),
            projection,
            bmi,
        }
    }

    fn follow_with_goal(&self, snapshot: &UserSnapshot, patch: SnapshotPatch) -> SnapshotPatch {
        let mut updated = snapshot.clone();
        patch.apply_to(&mut updated);
        match self.refresh_goal(&updated) {
            Ok((_, goal_patch)) => patch.merge(goal_patch),
            Err(e) => {
                tracing::warn!(error = %e, "goal projection skipped");
                patch
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::badges::BadgeSet;
    use chrono::Duration;

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, h, 0, 0).unwrap()
    }

    fn member(days: u32) -> UserSnapshot {
        UserSnapshot {
            membership_days_left: days,
            last_checked_date: Some(at(1, 8)),
            ..Default::default()
        }
    }

    #[test]
    fn scan_logs_entry_ticks_ledger_and_awards_badge() {
        let engine = MetricsEngine::new();
        let (patch, outcome) = engine.scan_entry(&member(10), &at(3, 18));
        assert_eq!(outcome, EntryOutcome::Logged);
        assert_eq!(patch.membership_days_left, Some(8));
        assert_eq!(patch.last_checked_date, Some(at(3, 18)));
        assert_eq!(patch.gym_entry_log.as_ref().map(Vec::len), Some(1));
        assert_eq!(patch.badges, Some(BadgeSet::from([Badge::FirstEntry])));
    }

    #[test]
    fn second_scan_same_day_changes_nothing_but_checkpoint() {
        let engine = MetricsEngine::new();
        let mut snapshot = member(10);
        let (patch, _) = engine.scan_entry(&snapshot, &at(3, 9));
        patch.apply_to(&mut snapshot);

        let (patch, outcome) = engine.scan_entry(&snapshot, &at(3, 20));
        assert_eq!(outcome, EntryOutcome::AlreadyLogged);
        assert!(patch.gym_entry_log.is_none());
        assert_eq!(patch.membership_days_left, Some(8));
    }

    #[test]
    fn scan_with_expired_membership_is_refused() {
        let engine = MetricsEngine::new();
        let (patch, outcome) = engine.scan_entry(&member(1), &at(5, 9));
        assert_eq!(outcome, EntryOutcome::MembershipExpired);
        assert_eq!(patch.membership_days_left, Some(0));
        assert!(patch.gym_entry_log.is_none());
    }

    #[test]
    fn refresh_membership_is_empty_when_nothing_elapsed() {
        let engine = MetricsEngine::new();
        assert!(engine.refresh_membership(&member(5), &at(1, 20)).is_empty());
        let patch = engine.refresh_membership(&member(5), &at(2, 8));
        assert_eq!(patch.membership_days_left, Some(4));
    }

    #[test]
    fn purchase_extends_without_ticking() {
        let engine = MetricsEngine::new();
        let patch = engine.purchase(&member(5), 30, at(9, 12));
        assert_eq!(patch.membership_days_left, Some(35));
        assert_eq!(patch.last_checked_date, Some(at(9, 12)));
    }

    #[test]
    fn logging_weight_below_target_crosses_goal() {
        let engine = MetricsEngine::new();
        let snapshot = UserSnapshot {
            target_weight: Some(75.0),
            daily_calories: Some(500.0),
            ..Default::default()
        };
        let patch = engine
            .log_weight(&snapshot, "2024-01-10".parse().unwrap(), 74.8)
            .unwrap();
        assert_eq!(patch.goal_reached, Some(true));
        assert_eq!(patch.goal_count, Some(1));
        assert_eq!(patch.badge_level, Some(GoalBadgeLevel::Bronze));
    }

    #[test]
    fn logging_weight_with_bad_calories_still_records_weight() {
        let engine = MetricsEngine::new();
        let snapshot = UserSnapshot {
            target_weight: Some(75.0),
            daily_calories: Some(0.0),
            ..Default::default()
        };
        let patch = engine
            .log_weight(&snapshot, "2024-01-10".parse().unwrap(), 74.8)
            .unwrap();
        assert!(patch.weight_history.is_some());
        assert!(patch.goal_reached.is_none());
        assert!(engine.refresh_goal(&snapshot).is_err());
    }

    #[test]
    fn set_targets_rearms_goal() {
        let engine = MetricsEngine::new();
        let snapshot = UserSnapshot {
            weight_history: goal::log_weight(&[], "2024-01-01".parse().unwrap(), 80.0).unwrap(),
            goal_reached: true,
            goal_count: 1,
            badge_level: Some(GoalBadgeLevel::Bronze),
            ..Default::default()
        };
        let patch = engine.set_targets(&snapshot, 70.0, 500.0).unwrap();
        assert_eq!(patch.goal_reached, Some(false));
        assert_eq!(patch.goal_count, Some(1));
        assert_eq!(patch.target_weight, Some(70.0));
        assert!(engine.set_targets(&snapshot, 70.0, -1.0).is_err());
    }

    #[test]
    fn refresh_goal_without_targets_is_nothing_to_do() {
        let engine = MetricsEngine::new();
        let (projection, patch) = engine.refresh_goal(&UserSnapshot::default()).unwrap();
        assert!(projection.is_none());
        assert!(patch.is_empty());
    }

    #[test]
    fn motion_and_rollover_patch_step_history() {
        let engine = MetricsEngine::new();
        let mut aggregator = engine.aggregator();
        let mut snapshot = UserSnapshot::default();
        let day1: CalendarDay = "2024-01-01".parse().unwrap();
        let sample = MotionSample { x: 1.0, y: 1.0, z: 1.0, at: at(1, 9) };

        let patch = engine.record_motion(&snapshot, &mut aggregator, day1, &sample);
        patch.apply_to(&mut snapshot);
        let again = MotionSample { at: sample.at + Duration::milliseconds(100), ..sample };
        assert!(engine.record_motion(&snapshot, &mut aggregator, day1, &again).is_empty());

        let patch = engine.roll_over_steps(&snapshot, &mut aggregator, day1.add_days(1));
        patch.apply_to(&mut snapshot);
        assert_eq!(snapshot.step_history.len(), 2);
    }

    #[test]
    fn summary_collects_dashboard_figures() {
        let engine = MetricsEngine::new();
        let today: CalendarDay = "2024-01-02".parse().unwrap();
        let snapshot = UserSnapshot {
            step_history: vec![steps::StepHistoryEntry { date: today, steps: 5000 }],
            weight_history: goal::log_weight(&[], today, 70.0).unwrap(),
            target_weight: Some(65.0),
            daily_calories: Some(500.0),
            membership_days_left: 3,
            ..Default::default()
        };
        let summary = engine.summary(&snapshot, today, Some(175.0));
        assert_eq!(summary.steps_today, 5000);
        assert!((summary.kcal_today - 200.0).abs() < 1e-9);
        assert!(summary.membership_active);
        assert_eq!(summary.projection.map(|p| p.estimated_days_left), Some(77));
        assert_eq!(summary.bmi.map(|b| b.rounded()), Some(22.9));
    }

    #[test]
    fn summary_serializes_camel_case_throughout() {
        let engine = MetricsEngine::new();
        let today: CalendarDay = "2024-01-02".parse().unwrap();
        let snapshot = UserSnapshot {
            weight_history: goal::log_weight(&[], today, 70.0).unwrap(),
            target_weight: Some(65.0),
            daily_calories: Some(500.0),
            ..Default::default()
        };
        let json = serde_json::to_value(engine.summary(&snapshot, today, None)).unwrap();
        assert_eq!(json["stepsToday"], 0);
        assert_eq!(json["membershipActive"], false);
        assert_eq!(json["streak"]["uniqueDays"], 0);
        assert_eq!(json["projection"]["estimatedDaysLeft"], 77);
        assert!(json.get("steps_today").is_none());
    }

    #[test]
    fn workout_timer_start_is_kept_until_stopped() {
        let engine = MetricsEngine::new();
        let mut snapshot = UserSnapshot::default();

        engine.start_workout_timer(&snapshot, at(1, 9)).apply_to(&mut snapshot);
        assert_eq!(snapshot.workout_timer_start, Some(at(1, 9)));
        assert!(engine.start_workout_timer(&snapshot, at(1, 10)).is_empty());

        let (patch, elapsed) = engine.stop_workout_timer(&snapshot, at(1, 10));
        assert_eq!(elapsed, Some(3600));
        patch.apply_to(&mut snapshot);
        assert_eq!(snapshot.workout_timer_start, None);

        let (patch, elapsed) = engine.stop_workout_timer(&snapshot, at(1, 11));
        assert!(patch.is_empty());
        assert_eq!(elapsed, None);
    }

    #[test]
    fn saving_a_plan_validates_and_stamps_it() {
        let engine = MetricsEngine::new();
        let patch = engine
            .save_workout_plan("Pull", ["Row", "Curl"], at(1, 9))
            .unwrap();
        let plan = patch.workout_plan.unwrap();
        assert_eq!(plan.exercises, vec!["Row", "Curl"]);
        assert_eq!(plan.timestamp, at(1, 9));
        assert!(engine.save_workout_plan("", ["Row"], at(1, 9)).is_err());
    }
}
