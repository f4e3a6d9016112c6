use clap::Subcommand;
use gymtrack_core::steps::{recent, steps_on};
use gymtrack_core::{CalendarDay, MotionSample, SnapshotPatch};
use std::io::BufRead;
use std::path::PathBuf;

use super::{print_json, CliResult, Context};

#[derive(Subcommand)]
pub enum StepsAction {
    /// Feed recorded accelerometer samples (JSON lines: {"x","y","z","at"})
    Replay {
        /// Sample file, `-` for stdin
        samples: PathBuf,
    },
    /// Today's step count and calories
    Today,
    /// Step history for the last days
    History {
        #[arg(long, default_value_t = 7)]
        days: usize,
    },
}

pub fn run(file: Option<PathBuf>, action: StepsAction) -> CliResult {
    let ctx = Context::open(file)?;

    match action {
        StepsAction::Replay { samples } => {
            let reader: Box<dyn BufRead> = if samples.as_os_str() == "-" {
                Box::new(std::io::stdin().lock())
            } else {
                Box::new(std::io::BufReader::new(std::fs::File::open(&samples)?))
            };

            let mut snapshot = ctx.store.load()?;
            let mut aggregator = ctx.engine.aggregator();
            let mut accepted = 0u32;
            for (lineno, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let sample: MotionSample = serde_json::from_str(&line)
                    .map_err(|e| format!("line {}: {e}", lineno + 1))?;
                let today = CalendarDay::local(&sample.at);

                let rolled = ctx.engine.roll_over_steps(&snapshot, &mut aggregator, today);
                rolled.apply_to(&mut snapshot);
                let patch = ctx
                    .engine
                    .record_motion(&snapshot, &mut aggregator, today, &sample);
                if !patch.is_empty() {
                    accepted += 1;
                }
                patch.apply_to(&mut snapshot);
            }

            ctx.store.merge(&SnapshotPatch {
                step_history: Some(snapshot.step_history),
                ..Default::default()
            })?;
            println!("{accepted} steps recorded");
        }
        StepsAction::Today => {
            let snapshot = ctx.store.load()?;
            let steps = steps_on(&snapshot.step_history, CalendarDay::today());
            println!(
                "{steps} steps\n{:.0} kcal",
                ctx.config.steps.calories(steps)
            );
        }
        StepsAction::History { days } => {
            let snapshot = ctx.store.load()?;
            print_json(&recent(&snapshot.step_history, days))?;
        }
    }
    Ok(())
}
