use clap::Subcommand;
use gymtrack_core::goal::within_window;
use gymtrack_core::{CalendarDay, HistoryWindow};
use std::path::PathBuf;

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum ProgressAction {
    /// Log today's weight (kg)
    Weight { kg: f64 },
    /// Set target weight and daily calorie deficit
    Target {
        /// Target weight (kg)
        #[arg(long)]
        weight: f64,
        /// Daily calorie deficit (kcal)
        #[arg(long)]
        calories: f64,
    },
    /// Estimate days until the target weight
    Project {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Weight history for a chart window
    History {
        /// 7, 30 or all
        #[arg(long, default_value = "7")]
        window: HistoryWindow,
    },
}

pub fn run(file: Option<PathBuf>, action: ProgressAction) -> CliResult {
    let ctx = Context::open(file)?;

    match action {
        ProgressAction::Weight { kg } => {
            let snapshot = ctx.store.load()?;
            let patch = ctx.engine.log_weight(&snapshot, CalendarDay::today(), kg)?;
            let updated = ctx.store.merge(&patch)?;
            println!("logged {kg} kg");
            if patch.goal_reached == Some(true) {
                println!("goal reached! ({} times)", updated.goal_count);
            }
        }
        ProgressAction::Target { weight, calories } => {
            let snapshot = ctx.store.load()?;
            let patch = ctx.engine.set_targets(&snapshot, weight, calories)?;
            ctx.store.merge(&patch)?;
            println!("target set: {weight} kg at {calories} kcal/day");
        }
        ProgressAction::Project { json } => {
            let snapshot = ctx.store.load()?;
            let (projection, patch) = ctx.engine.refresh_goal(&snapshot)?;
            ctx.store.merge(&patch)?;

            if json {
                return print_json(&projection);
            }
            match projection {
                None => println!("no weight history or targets yet"),
                Some(p) if p.goal_reached => {
                    println!("goal reached at {} kg ({} times)", p.latest_weight, p.goal_count)
                }
                Some(p) => println!(
                    "{} kg now, about {} days to target",
                    p.latest_weight, p.estimated_days_left
                ),
            }
        }
        ProgressAction::History { window } => {
            let snapshot = ctx.store.load()?;
            print_json(&within_window(
                &snapshot.weight_history,
                CalendarDay::today(),
                window,
            ))?;
        }
    }
    Ok(())
}
