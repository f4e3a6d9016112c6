//! Weight goal projection.
//!
//! Estimates how many days of the configured calorie delta it takes to move
//! from the latest recorded weight to the target, and detects goal
//! crossings. A crossing fires once: after it `goal_reached` stays true
//! until the caller re-arms it by setting new targets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::badges::GoalBadgeLevel;
use crate::calendar::CalendarDay;
use crate::error::ValidationError;

/// Weight recorded on one calendar day (kg).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightHistoryEntry {
    pub date: CalendarDay,
    pub weight: f64,
}

/// Goal projection tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalConfig {
    /// Energy per kilogram of body weight (kcal)
    #[serde(default = "default_kcal_per_kg")]
    pub kcal_per_kg: f64,
}

fn default_kcal_per_kg() -> f64 {
    7700.0
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            kcal_per_kg: default_kcal_per_kg(),
        }
    }
}

/// Persisted goal progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalState {
    pub goal_reached: bool,
    pub goal_count: u32,
    pub badge_level: Option<GoalBadgeLevel>,
}

/// Validated weight target and daily calorie delta.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalTargets {
    pub target_weight: f64,
    pub daily_calories: f64,
}

impl GoalTargets {
    /// Validate new targets. Both must be finite and positive.
    pub fn new(target_weight: f64, daily_calories: f64) -> Result<Self, ValidationError> {
        Ok(Self {
            target_weight: positive("target_weight", target_weight)?,
            daily_calories: positive("daily_calories", daily_calories)?,
        })
    }

    /// Goal state after switching to these targets: the crossing is re-armed,
    /// the lifetime count and level are kept.
    pub fn rearm(&self, state: &GoalState) -> GoalState {
        GoalState {
            goal_reached: false,
            ..*state
        }
    }
}

/// Outcome of a projection run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub latest_weight: f64,
    pub estimated_days_left: u32,
    pub goal_reached: bool,
    pub goal_count: u32,
    pub badge_level: Option<GoalBadgeLevel>,
    /// True when this run is the one that crossed the target
    pub crossed: bool,
}

impl Projection {
    pub fn state(&self) -> GoalState {
        GoalState {
            goal_reached: self.goal_reached,
            goal_count: self.goal_count,
            badge_level: self.badge_level,
        }
    }
}

/// Goal projection calculator.
#[derive(Debug, Clone, Default)]
pub struct GoalProjector {
    config: GoalConfig,
}

impl GoalProjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: GoalConfig) -> Self {
        Self { config }
    }

    /// Project days to goal and evaluate a goal crossing.
    ///
    /// # Returns
    /// `Ok(None)` when there is no weight history yet.
    ///
    /// # Errors
    /// `InvalidInput` when `daily_calories` or `target_weight` is not a
    /// positive finite number.
    pub fn project(
        &self,
        history: &[WeightHistoryEntry],
        target_weight: f64,
        daily_calories: f64,
        state: &GoalState,
    ) -> Result<Option<Projection>, ValidationError> {
        let Some(latest) = normalize_history(history).last().map(|e| e.weight) else {
            return Ok(None);
        };
        let targets = GoalTargets::new(target_weight, daily_calories)?;

        let delta_kcal = (latest - targets.target_weight).abs() * self.config.kcal_per_kg;
        let estimated_days_left = (delta_kcal / targets.daily_calories).ceil() as u32;

        let crossed = !state.goal_reached && latest <= targets.target_weight;
        let mut next = *state;
        if crossed {
            next.goal_reached = true;
            next.goal_count = state.goal_count.saturating_add(1);
            next.badge_level = GoalBadgeLevel::merge(
                state.badge_level,
                GoalBadgeLevel::for_goal_count(next.goal_count),
            );
            tracing::info!(
                goal_count = next.goal_count,
                badge_level = ?next.badge_level,
                "weight goal reached"
            );
        }

        Ok(Some(Projection {
            latest_weight: latest,
            estimated_days_left,
            goal_reached: next.goal_reached,
            goal_count: next.goal_count,
            badge_level: next.badge_level,
            crossed,
        }))
    }
}

/// [`GoalProjector::project`] with the default 7700 kcal/kg.
pub fn project(
    history: &[WeightHistoryEntry],
    target_weight: f64,
    daily_calories: f64,
    state: &GoalState,
) -> Result<Option<Projection>, ValidationError> {
    GoalProjector::new().project(history, target_weight, daily_calories, state)
}

/// One entry per day, last write wins, ordered by date.
pub fn normalize_history(history: &[WeightHistoryEntry]) -> Vec<WeightHistoryEntry> {
    let by_day: BTreeMap<CalendarDay, WeightHistoryEntry> =
        history.iter().map(|e| (e.date, *e)).collect();
    by_day.into_values().collect()
}

/// Record `weight` for `day`, replacing any earlier entry for that day.
pub fn log_weight(
    history: &[WeightHistoryEntry],
    day: CalendarDay,
    weight: f64,
) -> Result<Vec<WeightHistoryEntry>, ValidationError> {
    let weight = positive("weight", weight)?;
    let mut updated = history.to_vec();
    updated.push(WeightHistoryEntry { date: day, weight });
    Ok(normalize_history(&updated))
}

/// Chart window over the weight history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryWindow {
    #[default]
    Week,
    Month,
    All,
}

impl HistoryWindow {
    pub fn days(&self) -> Option<i64> {
        match self {
            HistoryWindow::Week => Some(7),
            HistoryWindow::Month => Some(30),
            HistoryWindow::All => None,
        }
    }
}

impl FromStr for HistoryWindow {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "7" | "week" => Ok(HistoryWindow::Week),
            "30" | "month" => Ok(HistoryWindow::Month),
            "all" => Ok(HistoryWindow::All),
            other => Err(ValidationError::invalid_input(
                "window",
                format!("expected 7, 30 or all, got '{other}'"),
            )),
        }
    }
}

/// Entries fewer than the window's days before `today`, in date order.
/// A week window therefore holds today and the six days before it.
pub fn within_window(
    history: &[WeightHistoryEntry],
    today: CalendarDay,
    window: HistoryWindow,
) -> Vec<WeightHistoryEntry> {
    let entries = normalize_history(history);
    match window.days() {
        None => entries,
        Some(days) => entries
            .into_iter()
            .filter(|e| e.date.days_until(today) < days)
            .collect(),
    }
}

fn positive(field: &str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::invalid_input(
            field,
            format!("must be a positive number, got {value}"),
        ))
    }
}
