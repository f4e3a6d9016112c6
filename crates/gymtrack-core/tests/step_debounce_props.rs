//! Property tests for step debouncing and badge monotonicity.

use chrono::{Duration, TimeZone, Utc};
use gymtrack_core::badges::{evaluate, BadgeSet};
use gymtrack_core::steps::steps_on;
use gymtrack_core::{CalendarDay, EntryTime, GymEntryLogRecord, MotionSample, StepAggregator};
use proptest::prelude::*;

fn today() -> CalendarDay {
    CalendarDay::new(2024, 6, 1).unwrap()
}

proptest! {
    #[test]
    fn samples_within_debounce_window_never_add_steps(
        offsets in prop::collection::vec(0i64..500, 1..20),
        x in 1.3f64..3.0,
        z in 0.5f64..2.0,
    ) {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 7, 0, 0).unwrap();
        let mut agg = StepAggregator::new();
        let first = MotionSample { x, y: 0.0, z, at: t0 };
        let history = agg.record_sample(&[], today(), &first).unwrap();

        for offset in offsets {
            let sample = MotionSample { x, y: 0.0, z, at: t0 + Duration::milliseconds(offset) };
            prop_assert!(agg.record_sample(&history, today(), &sample).is_none());
        }
        prop_assert_eq!(steps_on(&history, today()), 1);
    }

    #[test]
    fn accepted_steps_never_exceed_debounce_budget(
        gaps in prop::collection::vec(1i64..2000, 1..50),
    ) {
        let mut at = Utc.with_ymd_and_hms(2024, 6, 1, 7, 0, 0).unwrap();
        let mut agg = StepAggregator::new();
        let mut history = Vec::new();
        let start = at;

        for gap in gaps {
            at += Duration::milliseconds(gap);
            let sample = MotionSample { x: 1.0, y: 1.0, z: 1.0, at };
            if let Some(updated) = agg.record_sample(&history, today(), &sample) {
                history = updated;
            }
        }

        let elapsed_ms = (at - start).num_milliseconds();
        let steps = i64::from(steps_on(&history, today()));
        prop_assert!(steps <= elapsed_ms / 500 + 1);
    }

    #[test]
    fn badges_only_grow(
        day_offsets in prop::collection::vec(0i64..40, 0..15),
        extra in prop::collection::vec(0i64..40, 0..5),
    ) {
        let base = CalendarDay::new(2024, 1, 1).unwrap();
        let visit = |offset: i64| GymEntryLogRecord {
            date: base.add_days(offset),
            time: EntryTime::new(18, 0).unwrap(),
        };
        let log: Vec<_> = day_offsets.iter().copied().map(visit).collect();
        let before = evaluate(&log, &BadgeSet::new());

        let mut longer = log.clone();
        longer.extend(extra.iter().copied().map(visit));
        let after = evaluate(&longer, &before);
        prop_assert!(after.is_superset(&before));
    }
}
