//! Reconciles the messages of an index thread with freshly rendered chunks.
//!
//! The thread holds `[intro, chunk_0, ..., chunk_n]` as consecutive bot messages. Existing
//! messages are edited in place, missing ones are appended and surplus ones are deleted from
//! the tail, so readers keep the same message links across refreshes.

use dioxus_logger::tracing;

use crate::error::AppError;
use crate::model::state::IndexState;
use crate::service::index::channel::MessageContainer;
use crate::util::{
    retry::{with_backoff, RetryPolicy},
    throttle::Throttle,
};

/// Writes performed by one resync.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResyncReport {
    pub created: usize,
    pub edited: usize,
    pub deleted: usize,
    pub failed: usize,
}

impl ResyncReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }

    /// Adds the counts of another resync.
    pub fn merge(&mut self, other: &ResyncReport) {
        self.created += other.created;
        self.edited += other.edited;
        self.deleted += other.deleted;
        self.failed += other.failed;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResyncOutcome {
    /// Chunks match the last successful resync; nothing was fetched or written.
    Settled,
    /// The thread was reconciled, possibly with failures.
    Synced(ResyncReport),
}

/// Applies rendered chunks to an index thread.
#[derive(Clone, Debug)]
pub struct ResyncEngine {
    retry: RetryPolicy,
    throttle: Throttle,
}

impl ResyncEngine {
    /// Creates a new engine.
    ///
    /// # Arguments
    /// - `retry` - Backoff applied to every single Discord write
    /// - `throttle` - Pause after every write
    pub fn new(retry: RetryPolicy, throttle: Throttle) -> Self {
        Self { retry, throttle }
    }

    /// Brings the thread in line with `[intro, chunks...]`.
    ///
    /// When `chunks` equals the fingerprint in `state`, returns without touching Discord. The
    /// fingerprint is only replaced when every write succeeded, so a partial failure is retried
    /// on the next run.
    ///
    /// # Arguments
    /// - `thread` - Index thread
    /// - `intro` - Content of the first slot
    /// - `chunks` - Rendered index chunks
    /// - `state` - State of the index; `last_chunks` is updated on full success
    ///
    /// # Returns
    /// - `Ok(ResyncOutcome::Settled)` - Nothing to do
    /// - `Ok(ResyncOutcome::Synced(report))` - Writes attempted; check `report.failed`
    /// - `Err(AppError)` - Message history could not be fetched
    pub async fn resync(
        &self,
        thread: &dyn MessageContainer,
        intro: &str,
        chunks: &[String],
        state: &mut IndexState,
    ) -> Result<ResyncOutcome, AppError> {
        if state.last_chunks == chunks {
            tracing::debug!("Index thread {} is up to date", thread.id());
            return Ok(ResyncOutcome::Settled);
        }

        let history = with_backoff(&self.retry, "Fetch index messages", || thread.messages())
            .await?;
        let mut slots: Vec<_> = history.into_iter().filter(|m| m.editable).collect();

        let desired: Vec<&str> = std::iter::once(intro)
            .chain(chunks.iter().map(String::as_str))
            .collect();

        let mut report = ResyncReport::default();

        for (position, content) in desired.iter().enumerate() {
            if let Some(slot) = slots.get(position) {
                if slot.content == *content {
                    continue;
                }

                let message_id = slot.id;
                match with_backoff(&self.retry, "Edit index message", move || {
                    thread.edit(message_id, content)
                })
                .await
                {
                    Ok(()) => report.edited += 1,
                    Err(e) => {
                        tracing::error!(
                            "Failed to edit message {} in index thread {}: {}",
                            message_id,
                            thread.id(),
                            e
                        );
                        report.failed += 1;
                    }
                }
                self.throttle.pause().await;
                continue;
            }

            match with_backoff(&self.retry, "Send index message", move || {
                thread.send(content)
            })
            .await
            {
                Ok(posted) => {
                    slots.push(posted);
                    report.created += 1;
                    self.throttle.pause().await;
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to send chunk {} to index thread {}: {}",
                        position,
                        thread.id(),
                        e
                    );
                    // Remaining chunks would land out of order.
                    report.failed += desired.len() - position;
                    break;
                }
            }
        }

        while slots.len() > desired.len() {
            let Some(surplus) = slots.pop() else {
                break;
            };

            let message_id = surplus.id;
            match with_backoff(&self.retry, "Delete index message", move || {
                thread.delete(message_id)
            })
            .await
            {
                Ok(()) => report.deleted += 1,
                Err(e) => {
                    tracing::error!(
                        "Failed to delete message {} in index thread {}: {}",
                        message_id,
                        thread.id(),
                        e
                    );
                    report.failed += 1;
                }
            }
            self.throttle.pause().await;
        }

        if report.is_clean() {
            state.last_chunks = chunks.to_vec();
        } else {
            tracing::warn!(
                "Index thread {} synced with {} failed writes; will retry next run",
                thread.id(),
                report.failed
            );
        }

        Ok(ResyncOutcome::Synced(report))
    }
}
