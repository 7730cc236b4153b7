use dioxus_logger::tracing;
use tokio_cron_scheduler::Job;

use crate::error::AppError;
use crate::state::AppState;

/// Job refreshing every configured index and group index on `cron`.
///
/// A sweep that overlaps the previous one waits on the per-index locks, so no index is written
/// by two sweeps at once.
pub fn job(cron: &str, state: AppState) -> Result<Job, AppError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let state = state.clone();

        Box::pin(async move {
            match state.indexes.sweep().await {
                Ok(report) => tracing::info!(
                    "Scheduled index sweep: {} refreshed, {} unchanged, {} failed",
                    report.refreshed,
                    report.unchanged,
                    report.failed
                ),
                Err(e) => tracing::error!("Error running scheduled index sweep: {}", e),
            }
        })
    })?;

    Ok(job)
}
