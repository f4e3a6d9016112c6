use gymtrack_core::goal::bmi_from_input;
use gymtrack_core::CalendarDay;
use std::path::PathBuf;

use super::{print_json, CliResult, Context};

pub fn run(file: Option<PathBuf>, json: bool) -> CliResult {
    let ctx = Context::open(file)?;
    let snapshot = ctx.store.load()?;
    let summary = ctx
        .engine
        .summary(&snapshot, CalendarDay::today(), ctx.config.profile.height_cm);

    if json {
        return print_json(&summary);
    }

    println!(
        "{}: {} steps ({:.0} kcal)",
        summary.today, summary.steps_today, summary.kcal_today
    );
    if summary.membership_active {
        println!("Membership: {} days left", summary.membership_days_left);
    } else {
        println!("Membership: expired");
    }
    let badges: Vec<String> = summary.badges.iter().map(ToString::to_string).collect();
    if badges.is_empty() {
        println!("Badges: none yet");
    } else {
        println!("Badges: {}", badges.join(", "));
    }
    if let Some(level) = summary.badge_level {
        println!("Goal badge: {level}");
    }
    println!(
        "Streak: {} current, {} longest",
        summary.streak.current, summary.streak.longest
    );
    if let Some(p) = summary.projection {
        if p.goal_reached {
            println!("Goal: reached ({} times)", p.goal_count);
        } else {
            println!("Goal: ~{} days to target", p.estimated_days_left);
        }
    }
    if let Some(reading) = summary.bmi {
        println!("BMI: {:.1} ({})", reading.value, reading.category);
    }
    Ok(())
}

pub fn bmi(weight: &str, height: &str) -> CliResult {
    match bmi_from_input(weight, height) {
        Some(reading) => {
            println!("{:.1} {}", reading.rounded(), reading.category);
            Ok(())
        }
        None => Err(format!(
            "cannot compute BMI from weight '{weight}' and height '{height}'"
        )
        .into()),
    }
}
