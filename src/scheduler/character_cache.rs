use dioxus_logger::tracing;
use tokio_cron_scheduler::Job;

use crate::error::AppError;
use crate::state::AppState;

/// Job rebuilding the character cache of every guild on `cron`.
pub fn job(cron: &str, state: AppState) -> Result<Job, AppError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let state = state.clone();

        Box::pin(async move {
            match state.characters.rebuild_all().await {
                Ok(count) => tracing::info!("Character cache rebuilt with {} threads", count),
                Err(e) => tracing::error!("Error rebuilding character cache: {}", e),
            }
        })
    })?;

    Ok(job)
}
