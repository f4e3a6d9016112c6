//! Step counting from accelerometer samples.
//!
//! A sample counts as a footfall when its acceleration magnitude is above
//! the threshold and the debounce window since the last accepted step has
//! passed. Accepted steps are merged into a per-day [`StepHistoryEntry`]
//! list; only the entry for the current day is ever replaced.
//!
//! The [`StepAggregator`] carries the debounce state (last accepted instant
//! and last seen day). It is owned by the caller, one per user, and step
//! recording must be serialized per user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarDay;

/// Steps recorded on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepHistoryEntry {
    pub date: CalendarDay,
    pub steps: u32,
}

/// One accelerometer reading, in g.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub at: DateTime<Utc>,
}

impl MotionSample {
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Step detection tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDetectorConfig {
    /// Magnitude a sample must exceed to count as a footfall (g)
    #[serde(default = "default_threshold_g")]
    pub threshold_g: f64,
    /// Minimum gap between two accepted steps (milliseconds)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: i64,
    /// Linear calorie model coefficient
    #[serde(default = "default_kcal_per_step")]
    pub kcal_per_step: f64,
}

fn default_threshold_g() -> f64 {
    1.2
}
fn default_debounce_ms() -> i64 {
    500
}
fn default_kcal_per_step() -> f64 {
    0.04
}

impl Default for StepDetectorConfig {
    fn default() -> Self {
        Self {
            threshold_g: default_threshold_g(),
            debounce_ms: default_debounce_ms(),
            kcal_per_step: default_kcal_per_step(),
        }
    }
}

impl StepDetectorConfig {
    /// Estimated kilocalories for a step count. Derived, never stored.
    pub fn calories(&self, steps: u32) -> f64 {
        steps as f64 * self.kcal_per_step
    }
}

/// Debounced step aggregator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepAggregator {
    #[serde(default)]
    config: StepDetectorConfig,
    #[serde(default)]
    last_accepted: Option<DateTime<Utc>>,
    #[serde(default)]
    last_seen_day: Option<CalendarDay>,
}

impl StepAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StepDetectorConfig) -> Self {
        Self {
            config,
            last_accepted: None,
            last_seen_day: None,
        }
    }

    pub fn config(&self) -> &StepDetectorConfig {
        &self.config
    }

    pub fn last_accepted(&self) -> Option<DateTime<Utc>> {
        self.last_accepted
    }

    /// Whether `sample` would be accepted as a step right now.
    pub fn qualifies(&self, sample: &MotionSample) -> bool {
        if !sample.is_finite() || sample.magnitude() <= self.config.threshold_g {
            return false;
        }
        match self.last_accepted {
            None => true,
            Some(prev) => (sample.at - prev).num_milliseconds() >= self.config.debounce_ms,
        }
    }

    /// Feed one sample. Returns the updated history when the sample was
    /// accepted as a step, `None` when it was filtered out.
    pub fn record_sample(
        &mut self,
        history: &[StepHistoryEntry],
        today: CalendarDay,
        sample: &MotionSample,
    ) -> Option<Vec<StepHistoryEntry>> {
        if !sample.is_finite() {
            tracing::warn!(at = %sample.at, "ignoring non-finite motion sample");
            return None;
        }
        if !self.qualifies(sample) {
            return None;
        }

        self.last_accepted = Some(sample.at);
        self.last_seen_day = Some(today);
        let steps = steps_on(history, today).saturating_add(1);
        tracing::debug!(%today, steps, "step accepted");
        Some(upsert_day(history, StepHistoryEntry { date: today, steps }))
    }

    /// Detect a day change since the last call. On rollover the history gets
    /// a zero entry for `today` (unless one already exists) so counting
    /// restarts instead of continuing yesterday's total.
    pub fn roll_over(
        &mut self,
        history: &[StepHistoryEntry],
        today: CalendarDay,
    ) -> Option<Vec<StepHistoryEntry>> {
        let previous = self.last_seen_day.replace(today);
        match previous {
            Some(day) if day != today => {
                tracing::info!(from = %day, to = %today, "step counter rolled over");
                if history.iter().any(|e| e.date == today) {
                    Some(history.to_vec())
                } else {
                    Some(upsert_day(history, StepHistoryEntry { date: today, steps: 0 }))
                }
            }
            _ => None,
        }
    }
}

/// Steps recorded for `day`, zero when absent.
pub fn steps_on(history: &[StepHistoryEntry], day: CalendarDay) -> u32 {
    history
        .iter()
        .find(|e| e.date == day)
        .map(|e| e.steps)
        .unwrap_or(0)
}

/// The last `days` entries in date order.
pub fn recent(history: &[StepHistoryEntry], days: usize) -> Vec<StepHistoryEntry> {
    let mut sorted = history.to_vec();
    sorted.sort_by_key(|e| e.date);
    let skip = sorted.len().saturating_sub(days);
    sorted.split_off(skip)
}

fn upsert_day(history: &[StepHistoryEntry], entry: StepHistoryEntry) -> Vec<StepHistoryEntry> {
    let mut updated: Vec<StepHistoryEntry> = history
        .iter()
        .filter(|e| e.date != entry.date)
        .copied()
        .collect();
    updated.push(entry);
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day(s: &str) -> CalendarDay {
        s.parse().unwrap()
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    fn shake(at: DateTime<Utc>) -> MotionSample {
        MotionSample { x: 0.9, y: 0.9, z: 0.6, at }
    }

    #[test]
    fn magnitude_is_euclidean() {
        let s = MotionSample { x: 3.0, y: 4.0, z: 0.0, at: t0() };
        assert_eq!(s.magnitude(), 5.0);
    }

    #[test]
    fn first_strong_sample_creates_todays_entry() {
        let mut agg = StepAggregator::new();
        let today = day("2024-06-01");
        let history = agg.record_sample(&[], today, &shake(t0())).unwrap();
        assert_eq!(history, vec![StepHistoryEntry { date: today, steps: 1 }]);
    }

    #[test]
    fn weak_samples_are_ignored() {
        let mut agg = StepAggregator::new();
        let resting = MotionSample { x: 0.0, y: 0.0, z: 1.0, at: t0() };
        assert!(agg.record_sample(&[], day("2024-06-01"), &resting).is_none());

        let at_threshold = MotionSample { x: 0.0, y: 0.0, z: 1.2, at: t0() };
        assert!(agg.record_sample(&[], day("2024-06-01"), &at_threshold).is_none());
    }

    #[test]
    fn non_finite_samples_are_ignored() {
        let mut agg = StepAggregator::new();
        let broken = MotionSample { x: f64::NAN, y: 5.0, z: 5.0, at: t0() };
        assert!(agg.record_sample(&[], day("2024-06-01"), &broken).is_none());
        assert!(agg.last_accepted().is_none());
    }

    #[test]
    fn debounce_suppresses_oscillation() {
        let mut agg = StepAggregator::new();
        let today = day("2024-06-01");
        let h1 = agg.record_sample(&[], today, &shake(t0())).unwrap();
        assert!(agg
            .record_sample(&h1, today, &shake(t0() + Duration::milliseconds(499)))
            .is_none());
        let h2 = agg
            .record_sample(&h1, today, &shake(t0() + Duration::milliseconds(500)))
            .unwrap();
        assert_eq!(steps_on(&h2, today), 2);
    }

    #[test]
    fn other_days_are_untouched() {
        let mut agg = StepAggregator::new();
        let history = vec![
            StepHistoryEntry { date: day("2024-05-30"), steps: 4000 },
            StepHistoryEntry { date: day("2024-06-01"), steps: 10 },
        ];
        let updated = agg.record_sample(&history, day("2024-06-01"), &shake(t0())).unwrap();
        assert_eq!(steps_on(&updated, day("2024-05-30")), 4000);
        assert_eq!(steps_on(&updated, day("2024-06-01")), 11);
        assert_eq!(updated.len(), 2);
    }

    #[test]
    fn rollover_starts_a_fresh_day() {
        let mut agg = StepAggregator::new();
        let history = agg.record_sample(&[], day("2024-06-01"), &shake(t0())).unwrap();

        assert!(agg.roll_over(&history, day("2024-06-01")).is_none());

        let rolled = agg.roll_over(&history, day("2024-06-02")).unwrap();
        assert_eq!(steps_on(&rolled, day("2024-06-02")), 0);
        assert_eq!(steps_on(&rolled, day("2024-06-01")), 1);
        assert_eq!(rolled.len(), 2);

        // Already rolled: nothing to do until the next day.
        assert!(agg.roll_over(&rolled, day("2024-06-02")).is_none());
    }

    #[test]
    fn recent_returns_last_days_sorted() {
        let history: Vec<_> = (1..=10)
            .rev()
            .map(|d| StepHistoryEntry {
                date: CalendarDay::new(2024, 6, d).unwrap(),
                steps: d * 100,
            })
            .collect();
        let week = recent(&history, 7);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, day("2024-06-04"));
        assert_eq!(week[6].date, day("2024-06-10"));
        assert_eq!(recent(&history[..2], 7).len(), 2);
    }

    #[test]
    fn calories_follow_linear_model() {
        let config = StepDetectorConfig::default();
        assert!((config.calories(10_000) - 400.0).abs() < 1e-9);
        assert_eq!(config.calories(0), 0.0);
    }
}
