use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::error::AppError;
use crate::sync::orchestrator::Orchestrator;

/// Periodic polling sweep against the carrier. Skips a tick when a sync
/// is already holding the lease instead of queueing behind it.
pub async fn run_scheduler(orchestrator: Arc<Orchestrator>, interval: Duration) {
    info!(interval_secs = interval.as_secs(), "sync scheduler started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // interval fires immediately; consume the first tick so the initial
    // sweep runs one full interval after startup
    ticker.tick().await;

    loop {
        ticker.tick().await;

        match orchestrator.sync_all().await {
            Ok(summary) => {
                info!(
                    updated = summary.updated,
                    errors = summary.errors,
                    "scheduled sweep finished"
                );
            }
            Err(AppError::SyncInProgress) => {
                warn!("scheduled sweep skipped: sync already running");
            }
            Err(err) => {
                error!(error = %err, "scheduled sweep failed");
            }
        }
    }
}
