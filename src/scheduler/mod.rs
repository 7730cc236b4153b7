//! Cron jobs: periodic index sweeps, the daily character cache rebuild, and edit session
//! expiry.

use dioxus_logger::tracing;
use serenity::http::Http;
use std::sync::Arc;
use tokio_cron_scheduler::JobScheduler;

use crate::config::Config;
use crate::error::AppError;
use crate::state::AppState;

pub mod character_cache;
pub mod edit_sessions;
pub mod index_refresh;

/// Starts the scheduler with every job.
///
/// # Arguments
/// - `config` - Cron expressions of the configurable jobs
/// - `state` - Shared services the jobs operate on
/// - `discord_http` - Discord HTTP client for expiry notices
///
/// # Returns
/// - `Ok(JobScheduler)` - Running scheduler; jobs run until the process exits
/// - `Err(AppError)` - A cron expression was rejected or the scheduler failed to start
pub async fn start_scheduler(
    config: &Config,
    state: AppState,
    discord_http: Arc<Http>,
) -> Result<JobScheduler, AppError> {
    let scheduler = JobScheduler::new().await?;

    scheduler
        .add(index_refresh::job(&config.index_refresh_cron, state.clone())?)
        .await?;
    scheduler
        .add(character_cache::job(
            &config.character_cache_cron,
            state.clone(),
        )?)
        .await?;
    scheduler
        .add(edit_sessions::job(state, discord_http)?)
        .await?;

    scheduler.start().await?;

    tracing::info!(
        "Scheduler started (index refresh: {}, character cache: {})",
        config.index_refresh_cron,
        config.character_cache_cron
    );

    Ok(scheduler)
}
