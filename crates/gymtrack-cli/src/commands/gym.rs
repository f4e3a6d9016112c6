use chrono::Local;
use clap::Subcommand;
use gymtrack_core::badges::{gallery, newly_earned};
use gymtrack_core::membership::{
    export_csv, in_month, sorted_log, weekday_histogram, WEEKDAY_LABELS,
};
use gymtrack_core::{CalendarDay, EntryOutcome};
use std::path::PathBuf;

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum GymAction {
    /// Record a gym entry scan for now
    Enter,
    /// Show the entry log in date order
    Log {
        /// Only entries from the current month
        #[arg(long)]
        month: bool,
    },
    /// Entries per weekday, Sunday first
    Weekly {
        /// Only entries from the current month
        #[arg(long)]
        month: bool,
    },
    /// Entry log as CSV
    Export,
    /// Badge gallery
    Badges {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(file: Option<PathBuf>, action: GymAction) -> CliResult {
    let ctx = Context::open(file)?;

    match action {
        GymAction::Enter => {
            let snapshot = ctx.store.load()?;
            let (patch, outcome) = ctx.engine.scan_entry(&snapshot, &Local::now());
            let updated = ctx.store.merge(&patch)?;

            match outcome {
                EntryOutcome::Logged => {
                    println!("entry logged ({} days left)", updated.membership_days_left);
                    for badge in newly_earned(&snapshot.badges, &updated.badges) {
                        println!("badge earned: {badge}");
                    }
                }
                EntryOutcome::AlreadyLogged => println!("already logged today"),
                EntryOutcome::MembershipExpired => {
                    return Err("membership expired, purchase more days first".into());
                }
            }
        }
        GymAction::Log { month } => {
            let snapshot = ctx.store.load()?;
            let entries = if month {
                in_month(&snapshot.gym_entry_log, CalendarDay::today())
            } else {
                sorted_log(&snapshot.gym_entry_log)
            };
            if entries.is_empty() {
                println!("no entries");
            }
            for entry in entries {
                println!("{} {}", entry.date, entry.time);
            }
        }
        GymAction::Weekly { month } => {
            let snapshot = ctx.store.load()?;
            let counts = if month {
                weekday_histogram(&in_month(&snapshot.gym_entry_log, CalendarDay::today()))
            } else {
                weekday_histogram(&snapshot.gym_entry_log)
            };
            for (label, count) in WEEKDAY_LABELS.iter().zip(counts) {
                println!("{label} {count}");
            }
        }
        GymAction::Export => {
            let snapshot = ctx.store.load()?;
            print!("{}", export_csv(&snapshot.gym_entry_log));
        }
        GymAction::Badges { json } => {
            let snapshot = ctx.store.load()?;
            let items = gallery(&snapshot.badges, snapshot.badge_level);
            if json {
                return print_json(&items);
            }
            for item in items {
                let mark = if item.earned { "x" } else { " " };
                println!("[{mark}] {}: {}", item.title, item.description);
            }
        }
    }
    Ok(())
}
