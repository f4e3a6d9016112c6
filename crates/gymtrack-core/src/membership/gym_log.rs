//! Read-side views over the gym entry log: chronological order, the
//! current-month filter, per-weekday counts and CSV export.

use super::ledger::GymEntryLogRecord;
use crate::calendar::CalendarDay;

/// Sunday-first labels matching [`weekday_histogram`] buckets.
pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Records ordered by day, then time.
pub fn sorted_log(log: &[GymEntryLogRecord]) -> Vec<GymEntryLogRecord> {
    let mut sorted = log.to_vec();
    sorted.sort_by_key(|r| (r.date, r.time));
    sorted
}

/// Records falling in the same month as `reference`, in order.
pub fn in_month(log: &[GymEntryLogRecord], reference: CalendarDay) -> Vec<GymEntryLogRecord> {
    sorted_log(log)
        .into_iter()
        .filter(|r| r.date.same_month(&reference))
        .collect()
}

/// Visit counts per weekday, index 0 = Sunday.
pub fn weekday_histogram(log: &[GymEntryLogRecord]) -> [u32; 7] {
    let mut week = [0u32; 7];
    for record in log {
        let idx = record.date.weekday().num_days_from_sunday() as usize;
        week[idx] += 1;
    }
    week
}

/// `Date,Time` CSV of the whole log in chronological order.
pub fn export_csv(log: &[GymEntryLogRecord]) -> String {
    let mut csv = String::from("Date,Time\n");
    for record in sorted_log(log) {
        csv.push_str(&format!("{},{}\n", record.date, record.time));
    }
    csv
}
