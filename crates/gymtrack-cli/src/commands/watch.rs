use chrono::Local;
use gymtrack_core::{spawn_polling, CalendarDay, DocumentStore, MetricsEngine};
use std::path::PathBuf;
use std::time::Duration;

use super::{CliResult, Context};

/// Poll the user document until Ctrl-C (or `seconds` elapse): reconcile
/// membership days and print a status line on every refresh, and roll the
/// step history over when the calendar day changes. Both jobs share one
/// store, whose write lock keeps their load-and-merge cycles apart.
pub fn run(file: Option<PathBuf>, seconds: Option<u64>) -> CliResult {
    let ctx = Context::open(file)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(watch(ctx, seconds))
}

async fn watch(ctx: Context, seconds: Option<u64>) -> CliResult {
    let refresh = {
        let engine = ctx.engine.clone();
        let store = ctx.store.clone();
        let height = ctx.config.profile.height_cm;
        spawn_polling(ctx.config.polling.refresh_period(), move || {
            if let Err(e) = refresh_once(&engine, &store, height) {
                tracing::warn!(error = %e, "refresh failed");
            }
        })?
    };

    let rollover = {
        let engine = ctx.engine.clone();
        let store = ctx.store.clone();
        let mut aggregator = engine.aggregator();
        spawn_polling(ctx.config.polling.rollover_period(), move || {
            let result = store.update(|snapshot| {
                engine.roll_over_steps(snapshot, &mut aggregator, CalendarDay::today())
            });
            if let Err(e) = result {
                tracing::warn!(error = %e, "step rollover failed");
            }
        })?
    };

    match seconds {
        Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
        None => tokio::signal::ctrl_c().await?,
    }

    refresh.stop().await;
    rollover.stop().await;
    Ok(())
}

fn refresh_once(
    engine: &MetricsEngine,
    store: &DocumentStore,
    height_cm: Option<f64>,
) -> gymtrack_core::error::Result<()> {
    let snapshot = store.update(|snapshot| engine.refresh_membership(snapshot, &Local::now()))?;
    let summary = engine.summary(&snapshot, CalendarDay::today(), height_cm);
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}
