use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::{Error, pipeline::FetchPipeline, types::FetchSummary};

/// What a single scheduler iteration did.
#[derive(Debug)]
pub enum TickOutcome {
    /// Nobody has logged in yet.
    Skipped,
    Completed(FetchSummary),
    Failed(Error),
}

/// Periodic driver of the fetch cycle for the current user.
///
/// The loop waits one interval before the first cycle. A failing cycle is
/// logged and the loop carries on with the next tick; only the cancellation
/// token ends it.
pub struct Scheduler {
    pipeline: Arc<FetchPipeline>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl Scheduler {
    pub fn new(pipeline: Arc<FetchPipeline>, interval: Duration, shutdown: CancellationToken) -> Self {
        Self {
            pipeline,
            interval,
            shutdown,
        }
    }

    pub async fn run(self) {
        tracing::info!(interval_secs = self.interval.as_secs(), "scheduler.started");

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }

            // an in-flight cycle is abandoned on shutdown; its transaction rolls back
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = self.tick() => {}
            }
        }

        tracing::info!("scheduler.stopped");
    }

    /// Runs one cycle for the current user, if there is one.
    pub async fn tick(&self) -> TickOutcome {
        let Some(user) = self.pipeline.sessions().current_user().await else {
            tracing::info!("scheduler.tick.skipped: no authenticated user");
            return TickOutcome::Skipped;
        };

        match self.pipeline.run_fetch_cycle(&user.user_id).await {
            Ok(summary) => {
                tracing::debug!(user_id = %user.user_id, "scheduler.tick.completed");
                TickOutcome::Completed(summary)
            }
            Err(e) => {
                tracing::error!(user_id = %user.user_id, error = %e, "scheduler.tick.failed");
                TickOutcome::Failed(e)
            }
        }
    }
}
