mod gym_log;
mod ledger;

pub use gym_log::{export_csv, in_month, sorted_log, weekday_histogram, WEEKDAY_LABELS};
pub use ledger::{
    log_entry, EntryOutcome, EntryTime, GymEntryLogRecord, MembershipLedgerState,
};
