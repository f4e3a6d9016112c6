//! # gymtrack Core Library
//!
//! Derived fitness metrics for a gym-tracking app. The library is a set of
//! pure computations over an already-fetched user document: it takes a
//! [`UserSnapshot`] and returns a [`SnapshotPatch`] for the caller to
//! persist. A standalone CLI binary exposes every operation over a local
//! JSON document.
//!
//! ## Architecture
//!
//! - **Calendar**: calendar-day keys and DST-safe day differences
//! - **Steps**: debounced step detection from accelerometer samples
//! - **Badges**: visit streaks and achievement badges, never revoked
//! - **Goal**: weight-goal projection, goal crossings, BMI
//! - **Membership**: remaining-day ledger and idempotent gym entry log
//! - **Workout**: saved workout plan and the resumable workout timer
//! - **Storage**: TOML configuration and the local JSON document store
//!
//! ## Key Components
//!
//! - [`MetricsEngine`]: snapshot-in, patch-out facade
//! - [`StepAggregator`]: caller-owned step debouncer
//! - [`MembershipLedgerState`]: checkpointed membership counter
//! - [`Config`]: Application configuration management
//! - [`spawn_polling`]: cancellable periodic jobs

pub mod badges;
pub mod calendar;
pub mod engine;
pub mod error;
pub mod goal;
pub mod membership;
pub mod polling;
pub mod snapshot;
pub mod steps;
pub mod storage;
pub mod workout;

pub use badges::{Badge, BadgeSet, GoalBadgeLevel, StreakSummary};
pub use calendar::{calendar_day, days_between, CalendarDay};
pub use engine::{DashboardSummary, MetricsEngine};
pub use error::{ConfigError, CoreError, ValidationError};
pub use goal::{BmiCategory, BmiReading, GoalState, HistoryWindow, Projection, WeightHistoryEntry};
pub use membership::{EntryOutcome, EntryTime, GymEntryLogRecord, MembershipLedgerState};
pub use polling::{spawn_polling, PollingConfig, PollingHandle};
pub use snapshot::{SnapshotPatch, UserSnapshot};
pub use steps::{MotionSample, StepAggregator, StepHistoryEntry};
pub use storage::{Config, DocumentStore};
pub use workout::{PlanRecency, WorkoutPlan, WorkoutTimer};
