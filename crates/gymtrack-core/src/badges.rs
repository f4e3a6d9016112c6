//! Gym visit badges and goal badge levels.
//!
//! Badges are derived from the gym entry log and are never revoked: every
//! evaluation returns the union of what was already earned and what the
//! log earns now. Goal levels are an ordered enum merged with `max`, so a
//! stored level can only ever move up.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::calendar::CalendarDay;
use crate::error::ValidationError;
use crate::membership::GymEntryLogRecord;

/// Achievement earned from gym visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Badge {
    #[serde(rename = "First-Entry")]
    FirstEntry,
    #[serde(rename = "3-Day-Streak")]
    ThreeDayStreak,
    #[serde(rename = "5-Entry")]
    FiveEntries,
    #[serde(rename = "7-Day-Streak")]
    SevenDayStreak,
}

impl Badge {
    pub const ALL: [Badge; 4] = [
        Badge::FirstEntry,
        Badge::ThreeDayStreak,
        Badge::FiveEntries,
        Badge::SevenDayStreak,
    ];

    /// Identifier as stored in the user document.
    pub fn id(&self) -> &'static str {
        match self {
            Badge::FirstEntry => "First-Entry",
            Badge::ThreeDayStreak => "3-Day-Streak",
            Badge::FiveEntries => "5-Entry",
            Badge::SevenDayStreak => "7-Day-Streak",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Badge::FirstEntry => "First Entry",
            Badge::ThreeDayStreak => "3 Day Streak",
            Badge::FiveEntries => "5 Visits",
            Badge::SevenDayStreak => "7 Day Streak",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Badge::FirstEntry => "Scanned your first QR!",
            Badge::ThreeDayStreak => "Visited gym 3 days in a row!",
            Badge::FiveEntries => "Logged 5 gym entries!",
            Badge::SevenDayStreak => "1 full week of streak!",
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Badge {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Badge::ALL
            .into_iter()
            .find(|b| b.id() == s)
            .ok_or_else(|| ValidationError::invalid_input("badge", format!("unknown badge '{s}'")))
    }
}

pub type BadgeSet = BTreeSet<Badge>;

/// Level earned by reaching weight goals. Ordered `Bronze < Silver < Gold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalBadgeLevel {
    Bronze,
    Silver,
    Gold,
}

impl GoalBadgeLevel {
    pub const ALL: [GoalBadgeLevel; 3] = [
        GoalBadgeLevel::Bronze,
        GoalBadgeLevel::Silver,
        GoalBadgeLevel::Gold,
    ];

    /// Level for a lifetime goal count: 5+ gold, 3+ silver, 1+ bronze.
    pub fn for_goal_count(count: u32) -> Option<Self> {
        match count {
            0 => None,
            1..=2 => Some(GoalBadgeLevel::Bronze),
            3..=4 => Some(GoalBadgeLevel::Silver),
            _ => Some(GoalBadgeLevel::Gold),
        }
    }

    /// Max-so-far merge. Never lowers `current`.
    pub fn merge(current: Option<Self>, candidate: Option<Self>) -> Option<Self> {
        current.max(candidate)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalBadgeLevel::Bronze => "bronze",
            GoalBadgeLevel::Silver => "silver",
            GoalBadgeLevel::Gold => "gold",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            GoalBadgeLevel::Bronze => "Reached your goal once!",
            GoalBadgeLevel::Silver => "Reached your goal 3 times!",
            GoalBadgeLevel::Gold => "Reached your goal 5+ times!",
        }
    }
}

impl fmt::Display for GoalBadgeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Streak figures derived from the entry log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakSummary {
    /// Consecutive days ending on the most recent visit
    pub current: u32,
    /// Longest run of consecutive days ever
    pub longest: u32,
    /// Distinct days with at least one visit
    pub unique_days: usize,
}

/// Distinct visit days in ascending order.
pub fn unique_days(log: &[GymEntryLogRecord]) -> Vec<CalendarDay> {
    log.iter()
        .map(|r| r.date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Derive the badges `log` earns and union them with `existing`.
///
/// Callers keep the log at one record per day; only the streak walk works
/// on distinct days, while `5-Entry` counts raw records.
pub fn evaluate(log: &[GymEntryLogRecord], existing: &BadgeSet) -> BadgeSet {
    let mut earned = existing.clone();
    let days = unique_days(log);

    if days.len() == 1 {
        earned.insert(Badge::FirstEntry);
    }
    if log.len() >= 5 {
        earned.insert(Badge::FiveEntries);
    }

    let mut run = 1u32;
    for pair in days.windows(2).rev() {
        if pair[0].days_until(pair[1]) == 1 {
            run += 1;
        } else {
            run = 1;
        }
        if run >= 3 {
            earned.insert(Badge::ThreeDayStreak);
        }
        if run >= 7 {
            earned.insert(Badge::SevenDayStreak);
        }
    }

    for badge in earned.difference(existing) {
        tracing::info!(badge = %badge, "badge earned");
    }
    earned
}

/// Badges in `after` that were not in `before`.
pub fn newly_earned(before: &BadgeSet, after: &BadgeSet) -> Vec<Badge> {
    after.difference(before).copied().collect()
}

pub fn streak_summary(log: &[GymEntryLogRecord]) -> StreakSummary {
    let days = unique_days(log);
    if days.is_empty() {
        return StreakSummary::default();
    }

    let mut longest = 1u32;
    let mut run = 1u32;
    for pair in days.windows(2) {
        run = if pair[0].days_until(pair[1]) == 1 { run + 1 } else { 1 };
        longest = longest.max(run);
    }

    StreakSummary {
        current: run,
        longest,
        unique_days: days.len(),
    }
}

/// A badge as shown in the gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryItem {
    pub id: &'static str,
    pub title: String,
    pub description: &'static str,
    pub earned: bool,
}

/// Every gym badge and goal level, marked earned or locked.
pub fn gallery(badges: &BadgeSet, level: Option<GoalBadgeLevel>) -> Vec<GalleryItem> {
    let gym = Badge::ALL.into_iter().map(|b| GalleryItem {
        id: b.id(),
        title: b.title().to_string(),
        description: b.description(),
        earned: badges.contains(&b),
    });
    let goal = GoalBadgeLevel::ALL.into_iter().map(|l| GalleryItem {
        id: l.as_str(),
        title: format!("{} Goal Badge", capitalize(l.as_str())),
        description: l.description(),
        earned: level.is_some_and(|have| have >= l),
    });
    gym.chain(goal).collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
