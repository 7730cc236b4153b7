use dioxus_logger::tracing;
use serenity::all::{CreateMessage, Http, UserId};
use std::sync::Arc;
use tokio_cron_scheduler::Job;

use crate::error::AppError;
use crate::service::edit_session::SESSION_TTL_MINUTES;
use crate::state::AppState;

/// Job removing expired edit sessions every minute and telling their users.
pub fn job(state: AppState, discord_http: Arc<Http>) -> Result<Job, AppError> {
    let job = Job::new_async("0 * * * * *", move |_uuid, _lock| {
        let state = state.clone();
        let http = discord_http.clone();

        Box::pin(async move {
            expire_sessions(&state, &http).await;
        })
    })?;

    Ok(job)
}

async fn expire_sessions(state: &AppState, http: &Http) {
    let expired = state.edit_sessions.remove_expired().await;
    if expired.is_empty() {
        return;
    }

    tracing::debug!("Expired {} edit session(s)", expired.len());

    let notice = format!(
        "⌛ Your ✏️ edit session has expired after {} minutes.",
        SESSION_TTL_MINUTES
    );
    for session in expired {
        if let Err(e) = UserId::new(session.user_id)
            .direct_message(http, CreateMessage::new().content(notice.clone()))
            .await
        {
            tracing::warn!(
                "Failed to notify user {} of expired edit session: {}",
                session.user_id,
                e
            );
        }
    }
}
