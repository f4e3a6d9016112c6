use chrono::{Local, Utc};
use clap::Subcommand;
use std::path::PathBuf;

use super::{CliResult, Context};

#[derive(Subcommand)]
pub enum MembershipAction {
    /// Remaining days as stored
    Status,
    /// Count down the days elapsed since the last check
    Tick,
    /// Add membership days
    Purchase { days: u32 },
}

pub fn run(file: Option<PathBuf>, action: MembershipAction) -> CliResult {
    let ctx = Context::open(file)?;
    let snapshot = ctx.store.load()?;

    match action {
        MembershipAction::Status => {
            print_days(snapshot.membership_days_left);
            if let Some(checked) = snapshot.last_checked_date {
                let checked = checked.with_timezone(&Local);
                println!("last checked {}", checked.format("%Y-%m-%d %H:%M"));
            }
        }
        MembershipAction::Tick => {
            let patch = ctx.engine.refresh_membership(&snapshot, &Local::now());
            let updated = ctx.store.merge(&patch)?;
            print_days(updated.membership_days_left);
        }
        MembershipAction::Purchase { days } => {
            if days == 0 {
                return Err("days must be positive".into());
            }
            let patch = ctx.engine.purchase(&snapshot, days, Utc::now());
            let updated = ctx.store.merge(&patch)?;
            print_days(updated.membership_days_left);
        }
    }
    Ok(())
}

fn print_days(days: u32) {
    if days == 0 {
        println!("membership expired");
    } else {
        println!("{days} days left");
    }
}
