//! Forum index manager.
//!
//! One refresh walks the whole pipeline for a single index:
//!
//! 1. Load the definition from the config store and lock the index's state handle.
//! 2. Resolve the forum and make sure the index thread exists (`ensure_index_thread`).
//! 3. Collect active and archived threads (`collector`).
//! 4. Group and order the entries (`grouping`, `taxonomy`).
//! 5. Render markdown and pack it into chunks (`render`).
//! 6. Reconcile the thread's messages with the chunks (`resync`).
//!
//! The state handle is held for the whole refresh, so a manual refresh and the scheduled sweep
//! never write to the same index thread at the same time.

pub mod channel;
pub mod collector;
pub mod discord;
pub mod group;
pub mod grouping;
pub mod render;
pub mod resync;
pub mod taxonomy;

#[cfg(test)]
mod test;

use dioxus_logger::tracing;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::data::config_store::ConfigStore;
use crate::error::AppError;
use crate::model::{
    index::{IndexDefinition, IndexKey},
    state::IndexState,
    thread::Draft,
};
use crate::service::index::{
    channel::{ChannelGateway, Container, MessageContainer, ThreadContainer},
    collector::ThreadListing,
    resync::{ResyncEngine, ResyncOutcome, ResyncReport},
};
use crate::util::{
    retry::{with_backoff, RetryPolicy},
    throttle::Throttle,
};

/// Result of refreshing one index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Rendered chunks matched the last successful resync.
    Unchanged,
    /// Messages were written; the report may contain failures.
    Updated(ResyncReport),
    /// The forum no longer exists or is not visible to the bot.
    ForumUnavailable,
}

/// Totals of a full sweep.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub refreshed: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl SweepReport {
    fn count(&mut self, key: &IndexKey, result: Result<RefreshOutcome, AppError>) {
        match result {
            Ok(RefreshOutcome::Unchanged) => self.unchanged += 1,
            Ok(RefreshOutcome::Updated(resync)) if resync.is_clean() => self.refreshed += 1,
            Ok(RefreshOutcome::Updated(_)) | Ok(RefreshOutcome::ForumUnavailable) => {
                self.failed += 1
            }
            Err(e) => {
                tracing::error!("Failed to refresh index {}: {}", key, e);
                self.failed += 1;
            }
        }
    }
}

/// Outcome of `/index refresh` without a forum: index names per result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GuildRefreshReport {
    pub refreshed: Vec<String>,
    pub failed: Vec<String>,
}

impl GuildRefreshReport {
    fn record(&mut self, name: String, key: &IndexKey, result: Result<RefreshOutcome, AppError>) {
        match result {
            Ok(RefreshOutcome::Unchanged) => self.refreshed.push(name),
            Ok(RefreshOutcome::Updated(resync)) if resync.is_clean() => self.refreshed.push(name),
            Ok(_) => self.failed.push(name),
            Err(e) => {
                tracing::error!("Failed to refresh index {}: {}", key, e);
                self.failed.push(name);
            }
        }
    }
}

type StateHandle = Arc<Mutex<IndexState>>;

/// Builds and maintains forum indexes.
#[derive(Clone)]
pub struct IndexService {
    store: ConfigStore,
    gateway: Arc<dyn ChannelGateway>,
    engine: ResyncEngine,
    retry: RetryPolicy,
    index_delay: Throttle,
    states: Arc<Mutex<HashMap<IndexKey, StateHandle>>>,
    groups: Arc<Mutex<HashMap<IndexKey, group::GroupHandle>>>,
}

impl IndexService {
    /// Creates a new IndexService.
    ///
    /// # Arguments
    /// - `store` - Config store holding the index definitions
    /// - `gateway` - Resolves Discord channels
    /// - `retry` - Backoff applied to single Discord operations
    /// - `write_delay` - Pause between message writes
    /// - `index_delay` - Pause between indexes during a sweep
    pub fn new(
        store: ConfigStore,
        gateway: Arc<dyn ChannelGateway>,
        retry: RetryPolicy,
        write_delay: Throttle,
        index_delay: Throttle,
    ) -> Self {
        Self {
            store,
            gateway,
            engine: ResyncEngine::new(retry, write_delay),
            retry,
            index_delay,
            states: Arc::new(Mutex::new(HashMap::new())),
            groups: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Returns the state handle of an index, seeding it from the persisted fingerprint.
    async fn state_handle(&self, key: IndexKey) -> Result<StateHandle, AppError> {
        let mut states = self.states.lock().await;
        if let Some(handle) = states.get(&key) {
            return Ok(handle.clone());
        }

        let last_chunks = self.store.load_fingerprint(key).await?;
        let handle = Arc::new(Mutex::new(IndexState::from_fingerprint(last_chunks)));
        states.insert(key, handle.clone());

        Ok(handle)
    }

    async fn evict(&self, key: IndexKey) {
        self.states.lock().await.remove(&key);
    }

    /// Refreshes the index of one forum.
    ///
    /// # Arguments
    /// - `guild_id` - Guild of the forum
    /// - `forum_id` - Forum whose index to rebuild
    ///
    /// # Returns
    /// - `Ok(RefreshOutcome)` - Refresh ran
    /// - `Err(AppError::NotFound)` - No index is configured for this forum
    /// - `Err(AppError)` - Config store or Discord failure
    pub async fn refresh(&self, guild_id: u64, forum_id: u64) -> Result<RefreshOutcome, AppError> {
        let key = IndexKey::new(guild_id, forum_id);
        let definition = self
            .store
            .get_index(key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No index configured for <#{}>", forum_id)))?;

        self.refresh_definition(&definition).await
    }

    /// Runs the full pipeline for one definition.
    pub async fn refresh_definition(
        &self,
        definition: &IndexDefinition,
    ) -> Result<RefreshOutcome, AppError> {
        let key = definition.key();
        let handle = self.state_handle(key).await?;
        let mut state = handle.lock().await;

        let forum = match self.gateway.resolve(definition.forum_id).await? {
            Some(Container::Forum(forum)) => forum,
            Some(Container::Messages(_)) => {
                tracing::warn!("Index {} points at a channel that is not a forum", key);
                return Ok(RefreshOutcome::ForumUnavailable);
            }
            None => {
                tracing::warn!("Forum of index {} is unavailable", key);
                return Ok(RefreshOutcome::ForumUnavailable);
            }
        };

        let listing = ThreadListing::gather(forum.as_ref()).await;
        let persisted = state.last_chunks.clone();

        let thread = self
            .ensure_index_thread(definition, forum.as_ref(), &listing, &mut state)
            .await?;

        let entries = listing.entries(state.index_thread_id, &definition.index_thread_name);
        tracing::debug!("Index {} lists {} threads", key, entries.len());

        let groups = grouping::group_entries(definition, forum.snapshot(), entries);
        let priority_emoji = definition
            .priority_tag
            .as_deref()
            .and_then(|tag| forum.snapshot().emoji_for(tag));
        let chunks = render::render_chunks(&groups, priority_emoji);

        let outcome = self
            .engine
            .resync(thread.as_ref(), &definition.intro_text, &chunks, &mut state)
            .await?;

        if state.last_chunks != persisted {
            self.store.save_fingerprint(key, &state.last_chunks).await?;
        }

        Ok(match outcome {
            ResyncOutcome::Settled => RefreshOutcome::Unchanged,
            ResyncOutcome::Synced(report) => {
                tracing::info!(
                    "Refreshed index {} ({}): {} created, {} edited, {} deleted, {} failed",
                    definition.index_name,
                    key,
                    report.created,
                    report.edited,
                    report.deleted,
                    report.failed
                );
                RefreshOutcome::Updated(report)
            }
        })
    }

    /// Finds, reopens or creates the index thread of a definition.
    ///
    /// A newly created thread starts with an empty fingerprint so every chunk gets posted.
    async fn ensure_index_thread(
        &self,
        definition: &IndexDefinition,
        forum: &dyn ThreadContainer,
        listing: &ThreadListing,
        state: &mut IndexState,
    ) -> Result<Arc<dyn MessageContainer>, AppError> {
        if let Some(thread_id) = state.index_thread_id {
            if let Some(thread) = self.resolve_thread(thread_id).await? {
                return Ok(thread);
            }
            tracing::info!("Cached index thread {} is gone", thread_id);
            state.index_thread_id = None;
        }

        if let Some(existing) = listing.find_by_title(&definition.index_thread_name) {
            if let Some(thread) = self.resolve_thread(existing.id).await? {
                state.index_thread_id = Some(existing.id);
                return Ok(thread);
            }
        }

        let name = definition.index_thread_name.as_str();
        let opening =
            Draft::text(&definition.intro_text).thumbnail(definition.thumb_url.as_deref());
        let thread_id = with_backoff(&self.retry, "Create index thread", || {
            forum.create_thread(name, &opening)
        })
        .await?;

        tracing::info!(
            "Created index thread {} for {} in forum {}",
            thread_id,
            definition.index_name,
            definition.forum_id
        );
        state.index_thread_id = Some(thread_id);
        state.last_chunks.clear();

        self.resolve_thread(thread_id).await?.ok_or_else(|| {
            AppError::InternalError(format!("Index thread {} vanished after creation", thread_id))
        })
    }

    /// Resolves a thread and reopens it when archived.
    async fn resolve_thread(
        &self,
        thread_id: u64,
    ) -> Result<Option<Arc<dyn MessageContainer>>, AppError> {
        let Some(thread) = self
            .gateway
            .resolve(thread_id)
            .await?
            .and_then(Container::into_messages)
        else {
            return Ok(None);
        };

        if thread.is_archived() {
            tracing::info!("Reopening archived index thread {}", thread_id);
            with_backoff(&self.retry, "Reopen index thread", || thread.reopen()).await?;
        }

        Ok(Some(thread))
    }

    /// Refreshes every configured index, then every group index, one after another.
    ///
    /// Failures are logged per index and do not stop the sweep.
    pub async fn sweep(&self) -> Result<SweepReport, AppError> {
        let definitions = self.store.get_indexes(None).await?;
        let groups = self.store.get_group_indexes(None).await?;
        let mut report = SweepReport::default();

        tracing::info!(
            "Sweeping {} indexes and {} group indexes",
            definitions.len(),
            groups.len()
        );

        for (position, definition) in definitions.iter().enumerate() {
            if position > 0 {
                self.index_delay.pause().await;
            }

            let result = self.refresh_definition(definition).await;
            report.count(&definition.key(), result);
        }

        for (position, definition) in groups.iter().enumerate() {
            if position > 0 || !definitions.is_empty() {
                self.index_delay.pause().await;
            }

            let result = self.refresh_group_definition(definition).await;
            report.count(&definition.key(), result);
        }

        Ok(report)
    }

    /// Refreshes every index and group index of one guild.
    pub async fn refresh_guild(&self, guild_id: u64) -> Result<GuildRefreshReport, AppError> {
        let definitions = self.store.get_indexes(Some(guild_id)).await?;
        let groups = self.store.get_group_indexes(Some(guild_id)).await?;
        let mut report = GuildRefreshReport::default();

        for (position, definition) in definitions.iter().enumerate() {
            if position > 0 {
                self.index_delay.pause().await;
            }

            let result = self.refresh_definition(definition).await;
            report.record(definition.index_name.clone(), &definition.key(), result);
        }

        for (position, definition) in groups.iter().enumerate() {
            if position > 0 || !definitions.is_empty() {
                self.index_delay.pause().await;
            }

            let result = self.refresh_group_definition(definition).await;
            report.record(
                format!("{} (group)", definition.group_index_name),
                &definition.key(),
                result,
            );
        }

        Ok(report)
    }

    /// Stores a new or edited definition.
    ///
    /// Waits for a refresh in flight, then drops the state handle so the next refresh starts
    /// from the persisted fingerprint. The fingerprint only covers the chunks, so it is cleared
    /// when the intro changes; otherwise the next refresh would settle without rewriting the
    /// first message.
    pub async fn save_definition(&self, definition: IndexDefinition) -> Result<(), AppError> {
        let key = definition.key();

        let handle = self.states.lock().await.get(&key).cloned();
        let _guard = match &handle {
            Some(handle) => Some(handle.lock().await),
            None => None,
        };

        let previous = self.store.get_index(key).await?;
        let intro_changed = previous
            .as_ref()
            .is_some_and(|previous| previous.intro_text != definition.intro_text);

        self.store.upsert_index(definition).await?;
        if intro_changed {
            tracing::debug!("Intro of index {} changed; clearing its fingerprint", key);
            self.store.save_fingerprint(key, &[]).await?;
        }
        self.evict(key).await;

        Ok(())
    }

    /// Deletes an index definition and its fingerprint. The index thread is left in place.
    ///
    /// # Returns
    /// - `Ok(Some(IndexDefinition))` - The removed definition
    /// - `Ok(None)` - No index was configured for this forum
    pub async fn remove(
        &self,
        guild_id: u64,
        forum_id: u64,
    ) -> Result<Option<IndexDefinition>, AppError> {
        let key = IndexKey::new(guild_id, forum_id);

        let handle = self.states.lock().await.get(&key).cloned();
        // Wait for a refresh in flight to finish before dropping its state.
        let _guard = match &handle {
            Some(handle) => Some(handle.lock().await),
            None => None,
        };

        let removed = self.store.remove_index(key).await?;
        self.evict(key).await;

        Ok(removed)
    }

    /// Definitions of one guild.
    pub async fn list(&self, guild_id: u64) -> Result<Vec<IndexDefinition>, AppError> {
        self.store.get_indexes(Some(guild_id)).await
    }
}
