//! Periodic background jobs with a caller-owned cancel handle.
//!
//! Used for the dashboard refresh and the midnight rollover check. The job
//! runs once immediately, then once per period. Ticks missed while the job
//! was busy are delayed rather than fired in a burst. Each run happens on
//! tokio's blocking pool, since jobs do file I/O.
//!
//! ## Usage
//!
//! ```ignore
//! let handle = spawn_polling(config.polling.refresh_period(), move || refresh())?;
//! // ...
//! handle.stop().await;
//! ```
//!
//! Dropping the handle also cancels the job.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::ValidationError;

/// Polling periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Dashboard refresh period (seconds)
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
    /// Day rollover check period (seconds)
    #[serde(default = "default_rollover_check_secs")]
    pub rollover_check_secs: u64,
}

fn default_refresh_secs() -> u64 {
    2
}
fn default_rollover_check_secs() -> u64 {
    60
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            refresh_secs: default_refresh_secs(),
            rollover_check_secs: default_rollover_check_secs(),
        }
    }
}

impl PollingConfig {
    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }

    pub fn rollover_period(&self) -> Duration {
        Duration::from_secs(self.rollover_check_secs)
    }
}

/// Handle to a running polling job.
#[derive(Debug)]
pub struct PollingHandle {
    cancel: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl PollingHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel the job and wait for it to wind down. A tick already in
    /// progress completes first.
    pub async fn stop(self) {
        let PollingHandle { cancel, task } = self;
        let _ = cancel.send(());
        if let Err(e) = task.await {
            tracing::warn!(error = %e, "polling task ended abnormally");
        }
    }
}

/// Run `job` every `period` on the current tokio runtime.
///
/// # Errors
/// `InvalidInput` for a zero period.
pub fn spawn_polling<F>(period: Duration, job: F) -> Result<PollingHandle, ValidationError>
where
    F: FnMut() + Send + 'static,
{
    if period.is_zero() {
        return Err(ValidationError::invalid_input(
            "period",
            "polling period must be greater than zero",
        ));
    }

    let job = Arc::new(Mutex::new(job));
    let (cancel, mut cancelled) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = &mut cancelled => break,
                _ = ticker.tick() => {
                    let job = Arc::clone(&job);
                    let run = tokio::task::spawn_blocking(move || {
                        let mut job = job.lock().unwrap_or_else(PoisonError::into_inner);
                        job();
                    });
                    if let Err(e) = run.await {
                        tracing::warn!(error = %e, "polling job panicked");
                    }
                }
            }
        }
        tracing::debug!(?period, "polling stopped");
    });

    Ok(PollingHandle { cancel, task })
}
