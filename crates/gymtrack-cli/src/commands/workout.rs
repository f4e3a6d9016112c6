use chrono::Utc;
use clap::Subcommand;
use gymtrack_core::workout::format_clock;
use gymtrack_core::PlanRecency;
use std::path::PathBuf;

use super::{CliResult, Context};

#[derive(Subcommand)]
pub enum WorkoutAction {
    /// Save a named plan from the selected exercises
    Save {
        name: String,
        #[arg(required = true)]
        exercises: Vec<String>,
    },
    /// Show the plan saved in the last 12 hours
    Show {
        /// Show the plan only if it is older than 12 hours
        #[arg(long)]
        previous: bool,
    },
    /// Workout stopwatch
    Timer {
        #[command(subcommand)]
        action: TimerAction,
    },
}

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start counting; a running timer keeps its original start
    Start,
    /// Elapsed time as mm:ss
    Status,
    Stop,
}

pub fn run(file: Option<PathBuf>, action: WorkoutAction) -> CliResult {
    let ctx = Context::open(file)?;

    match action {
        WorkoutAction::Save { name, exercises } => {
            let patch = ctx.engine.save_workout_plan(&name, &exercises, Utc::now())?;
            let updated = ctx.store.merge(&patch)?;
            if let Some(plan) = updated.workout_plan {
                println!(
                    "workout plan \"{}\" saved ({} exercises)",
                    plan.name,
                    plan.exercises.len()
                );
            }
        }
        WorkoutAction::Show { previous } => {
            let snapshot = ctx.store.load()?;
            let wanted = if previous {
                PlanRecency::Previous
            } else {
                PlanRecency::Current
            };
            match snapshot
                .workout_plan
                .filter(|plan| plan.recency(Utc::now()) == wanted)
            {
                Some(plan) => {
                    println!("{wanted} plan: {}", plan.name);
                    for exercise in plan.exercises {
                        println!("  {exercise}");
                    }
                }
                None => println!("no {wanted} workout plan"),
            }
        }
        WorkoutAction::Timer { action } => timer(&ctx, action)?,
    }
    Ok(())
}

fn timer(ctx: &Context, action: TimerAction) -> CliResult {
    let snapshot = ctx.store.load()?;
    let now = Utc::now();

    match action {
        TimerAction::Start => {
            let patch = ctx.engine.start_workout_timer(&snapshot, now);
            if patch.is_empty() {
                let elapsed = snapshot.workout_timer().elapsed(now);
                println!("timer already running ({})", format_clock(elapsed));
            } else {
                ctx.store.merge(&patch)?;
                println!("timer started");
            }
        }
        TimerAction::Status => {
            let timer = snapshot.workout_timer();
            if timer.is_running() {
                println!("{}", format_clock(timer.elapsed(now)));
            } else {
                println!("timer stopped");
            }
        }
        TimerAction::Stop => match ctx.engine.stop_workout_timer(&snapshot, now) {
            (patch, Some(elapsed)) => {
                ctx.store.merge(&patch)?;
                println!("timer stopped at {}", format_clock(elapsed));
            }
            (_, None) => println!("timer not running"),
        },
    }
    Ok(())
}
