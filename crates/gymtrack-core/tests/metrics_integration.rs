//! Integration tests for the metrics engine over a stored user document.
//!
//! Walks a member through purchase, a week of gym scans, weight logging
//! and goal crossings, persisting every patch through the document store.

use chrono::{DateTime, Duration, TimeZone, Utc};
use gymtrack_core::{
    Badge, CalendarDay, DocumentStore, EntryOutcome, GoalBadgeLevel, MetricsEngine, MotionSample,
};

fn day_at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 4, day, hour, 0, 0).unwrap()
}

fn store() -> (tempfile::TempDir, DocumentStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = DocumentStore::new(dir.path().join("user.json"));
    (dir, store)
}

#[test]
fn test_week_of_visits_earns_streak_badges() {
    let (_dir, store) = store();
    let engine = MetricsEngine::new();

    store
        .merge(&engine.purchase(&store.load().unwrap(), 30, day_at(1, 9)))
        .unwrap();

    for day in 1..=7 {
        let snapshot = store.load().unwrap();
        let (patch, outcome) = engine.scan_entry(&snapshot, &day_at(day, 18));
        assert_eq!(outcome, EntryOutcome::Logged, "day {day}");
        store.merge(&patch).unwrap();

        // A second scan on the same day is absorbed.
        let snapshot = store.load().unwrap();
        let (patch, outcome) = engine.scan_entry(&snapshot, &day_at(day, 20));
        assert_eq!(outcome, EntryOutcome::AlreadyLogged);
        store.merge(&patch).unwrap();
    }

    let snapshot = store.load().unwrap();
    assert_eq!(snapshot.gym_entry_log.len(), 7);
    assert_eq!(snapshot.membership_days_left, 24);
    for badge in Badge::ALL {
        assert!(snapshot.badges.contains(&badge), "missing {badge}");
    }

    let summary = engine.summary(&snapshot, CalendarDay::of(&day_at(7, 21)), None);
    assert_eq!(summary.streak.current, 7);
    assert_eq!(summary.streak.longest, 7);
}

#[test]
fn test_membership_runs_out_and_blocks_entry() {
    let (_dir, store) = store();
    let engine = MetricsEngine::new();
    store
        .merge(&engine.purchase(&store.load().unwrap(), 2, day_at(1, 9)))
        .unwrap();

    let (patch, outcome) = engine.scan_entry(&store.load().unwrap(), &day_at(5, 9));
    assert_eq!(outcome, EntryOutcome::MembershipExpired);
    let snapshot = store.merge(&patch).unwrap();
    assert_eq!(snapshot.membership_days_left, 0);
    assert_eq!(snapshot.last_checked_date, Some(day_at(5, 9)));

    // Renewing restores access the same day.
    let snapshot = store
        .merge(&engine.purchase(&snapshot, 30, day_at(5, 10)))
        .unwrap();
    let (_, outcome) = engine.scan_entry(&snapshot, &day_at(5, 11));
    assert_eq!(outcome, EntryOutcome::Logged);
}

#[test]
fn test_goal_crossings_climb_badge_levels() {
    let (_dir, store) = store();
    let engine = MetricsEngine::new();
    let mut weight = 80.0;

    for round in 1..=5u32 {
        let target = weight - 1.0;
        let snapshot = store.load().unwrap();
        store
            .merge(&engine.set_targets(&snapshot, target, 500.0).unwrap())
            .unwrap();

        let day: CalendarDay = CalendarDay::new(2024, 4, round).unwrap();
        weight = target - 0.2;
        let snapshot = store.load().unwrap();
        let snapshot = store
            .merge(&engine.log_weight(&snapshot, day, weight).unwrap())
            .unwrap();
        assert!(snapshot.goal_reached);
        assert_eq!(snapshot.goal_count, round);

        // Further weigh-ins under the same target do not count again.
        let again = engine
            .log_weight(&snapshot, day.add_days(10), weight - 0.5)
            .unwrap();
        assert!(again.goal_count.is_none());
    }

    let snapshot = store.load().unwrap();
    assert_eq!(snapshot.badge_level, Some(GoalBadgeLevel::Gold));
    assert_eq!(snapshot.weight_history.len(), 5);
}

#[test]
fn test_steps_persist_across_rollover() {
    let (_dir, store) = store();
    let engine = MetricsEngine::new();
    let mut aggregator = engine.aggregator();
    let start = day_at(3, 23);

    for i in 0..10 {
        let at = start + Duration::milliseconds(600 * i);
        let sample = MotionSample { x: 1.1, y: 0.8, z: 0.9, at };
        let snapshot = store.load().unwrap();
        let patch = engine.record_motion(&snapshot, &mut aggregator, CalendarDay::of(&at), &sample);
        store.merge(&patch).unwrap();
    }

    let next_day = CalendarDay::of(&day_at(4, 0));
    let snapshot = store.load().unwrap();
    store
        .merge(&engine.roll_over_steps(&snapshot, &mut aggregator, next_day))
        .unwrap();

    let snapshot = store.load().unwrap();
    let summary = engine.summary(&snapshot, next_day, None);
    assert_eq!(summary.steps_today, 0);
    let yesterday = engine.summary(&snapshot, next_day.add_days(-1), None);
    assert_eq!(yesterday.steps_today, 10);
    assert!((yesterday.kcal_today - 0.4).abs() < 1e-9);
}
