//! Group indexes: one index over the threads of several forums.
//!
//! Entries of every source forum are pooled, grouped with the group index's own settings and
//! rendered with the name of their forum. A text channel target holds `[intro, chunks...]`
//! like an index thread. A forum target gets one thread per group, named
//! `📜 {group index} - {group}`, each holding `[intro, chunks of that group]`.
//!
//! Group state lives in memory only. After a restart the first refresh compares every message
//! and only edits what differs.

use dioxus_logger::tracing;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::model::{
    group::RenderedGroup,
    group_index::{GroupIndexDefinition, ALL_THREADS},
    index::IndexKey,
    state::IndexState,
    thread::{Draft, ForumSnapshot, ThreadEntry},
};
use crate::service::index::{
    channel::{Container, MessageContainer, ThreadContainer},
    collector::{is_reserved_name, ThreadListing},
    grouping::group_with,
    render::render_chunks,
    resync::{ResyncOutcome, ResyncReport},
    IndexService, RefreshOutcome,
};
use crate::util::retry::with_backoff;

/// Runtime state of one group index.
#[derive(Clone, Debug, Default)]
pub struct GroupState {
    /// State of a text channel target.
    pub channel: IndexState,
    /// State per group thread of a forum target, keyed by group label.
    pub threads: HashMap<String, IndexState>,
}

pub(super) type GroupHandle = Arc<Mutex<GroupState>>;

/// Pooled entries of every reachable source forum.
struct SourcePool {
    entries: Vec<ThreadEntry>,
    /// Forum name per thread id.
    origins: HashMap<u64, String>,
    /// Tags of all source forums, first forum first.
    snapshot: ForumSnapshot,
}

impl IndexService {
    async fn group_handle(&self, key: IndexKey) -> GroupHandle {
        self.groups
            .lock()
            .await
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(GroupState::default())))
            .clone()
    }

    /// Refreshes the group index targeting one channel.
    ///
    /// # Returns
    /// - `Ok(RefreshOutcome)` - Refresh ran
    /// - `Err(AppError::NotFound)` - No group index targets this channel
    pub async fn refresh_group(
        &self,
        guild_id: u64,
        target_channel_id: u64,
    ) -> Result<RefreshOutcome, AppError> {
        let definition = self
            .store
            .get_group_index(IndexKey::new(guild_id, target_channel_id))
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No group index configured for <#{}>",
                    target_channel_id
                ))
            })?;

        self.refresh_group_definition(&definition).await
    }

    /// Runs the group pipeline for one definition.
    ///
    /// # Returns
    /// - `Ok(RefreshOutcome::ForumUnavailable)` - Target is gone or no source forum resolves
    /// - `Ok(RefreshOutcome::Unchanged)` - Every message already matched
    /// - `Ok(RefreshOutcome::Updated(report))` - Writes were attempted
    pub async fn refresh_group_definition(
        &self,
        definition: &GroupIndexDefinition,
    ) -> Result<RefreshOutcome, AppError> {
        let key = definition.key();
        let handle = self.group_handle(key).await;
        let mut state = handle.lock().await;

        let Some(target) = self.gateway.resolve(definition.target_channel_id).await? else {
            tracing::warn!("Target channel of group index {} is unavailable", key);
            return Ok(RefreshOutcome::ForumUnavailable);
        };

        let Some(pool) = self.pool_sources(definition).await? else {
            tracing::warn!("No source forum of group index {} is reachable", key);
            return Ok(RefreshOutcome::ForumUnavailable);
        };
        tracing::debug!(
            "Group index {} lists {} threads",
            key,
            pool.entries.len()
        );

        let mut groups = group_with(definition.into(), &key, &pool.snapshot, pool.entries);
        for entry in groups.iter_mut().flat_map(|group| group.entries.iter_mut()) {
            entry.origin = pool.origins.get(&entry.entry.id).cloned();
        }
        let priority_emoji = definition
            .priority_tag
            .as_deref()
            .and_then(|tag| pool.snapshot.emoji_for(tag));

        match target {
            Container::Messages(channel) => {
                let chunks = render_chunks(&groups, priority_emoji);
                let outcome = self
                    .engine
                    .resync(
                        channel.as_ref(),
                        &definition.intro_text,
                        &chunks,
                        &mut state.channel,
                    )
                    .await?;

                Ok(match outcome {
                    ResyncOutcome::Settled => RefreshOutcome::Unchanged,
                    ResyncOutcome::Synced(report) => {
                        tracing::info!(
                            "Refreshed group index {} ({}) with {} failed writes",
                            definition.group_index_name,
                            key,
                            report.failed
                        );
                        RefreshOutcome::Updated(report)
                    }
                })
            }
            Container::Forum(forum) => {
                self.refresh_group_threads(
                    definition,
                    forum.as_ref(),
                    groups,
                    priority_emoji,
                    &mut state,
                )
                .await
            }
        }
    }

    /// Collects the threads of every source forum.
    ///
    /// Reserved names, the source forum's own index thread and threads of this group index
    /// are left out.
    ///
    /// # Returns
    /// - `Ok(None)` - None of the source forums resolved
    async fn pool_sources(
        &self,
        definition: &GroupIndexDefinition,
    ) -> Result<Option<SourcePool>, AppError> {
        let own_prefix = format!("📜 {} - ", definition.group_index_name);
        let mut pool: Option<SourcePool> = None;

        for forum_id in &definition.source_forum_ids {
            let Some(forum) = self
                .gateway
                .resolve(*forum_id)
                .await?
                .and_then(|container| container.as_forum().cloned())
            else {
                tracing::warn!(
                    "Source {} of group index {} is not a reachable forum",
                    forum_id,
                    definition.key()
                );
                continue;
            };

            let snapshot = forum.snapshot();
            let index_thread = self
                .store
                .get_index(IndexKey::new(definition.guild_id, *forum_id))
                .await?
                .map(|index| index.index_thread_name.to_lowercase());
            let listing = ThreadListing::gather(forum.as_ref()).await;

            let gathered = pool.get_or_insert_with(|| SourcePool {
                entries: Vec::new(),
                origins: HashMap::new(),
                snapshot: ForumSnapshot {
                    id: snapshot.id,
                    guild_id: snapshot.guild_id,
                    name: definition.group_index_name.clone(),
                    tags: Vec::new(),
                },
            });
            gathered.snapshot.tags.extend(snapshot.tags.iter().cloned());

            for entry in listing.all() {
                if is_reserved_name(&entry.title)
                    || entry.title.starts_with(&own_prefix)
                    || index_thread.as_deref() == Some(entry.title.to_lowercase().as_str())
                    || gathered.origins.contains_key(&entry.id)
                {
                    continue;
                }
                gathered.origins.insert(entry.id, snapshot.name.clone());
                gathered.entries.push(entry.clone());
            }
        }

        Ok(pool)
    }

    /// Writes one thread per group into a forum target.
    ///
    /// A group whose thread cannot be found or created counts as one failure; the other
    /// groups still refresh. Threads of groups that disappeared are left in place.
    async fn refresh_group_threads(
        &self,
        definition: &GroupIndexDefinition,
        forum: &dyn ThreadContainer,
        groups: Vec<RenderedGroup>,
        priority_emoji: Option<&str>,
        state: &mut GroupState,
    ) -> Result<RefreshOutcome, AppError> {
        let listing = ThreadListing::gather(forum).await;
        let groups = if groups.is_empty() {
            vec![RenderedGroup {
                key: String::new(),
                heading: None,
                entries: Vec::new(),
            }]
        } else {
            groups
        };

        let mut report = ResyncReport::default();
        let mut changed = false;

        for group in groups {
            let label = group
                .heading
                .clone()
                .unwrap_or_else(|| ALL_THREADS.to_string());
            let thread_state = state.threads.entry(label.clone()).or_default();

            let thread = match self
                .ensure_group_thread(definition, forum, &listing, &label, thread_state)
                .await
            {
                Ok(thread) => thread,
                Err(e) => {
                    tracing::error!(
                        "Failed to open thread {} of group index {}: {}",
                        label,
                        definition.key(),
                        e
                    );
                    report.failed += 1;
                    changed = true;
                    continue;
                }
            };

            let body = RenderedGroup {
                heading: None,
                ..group
            };
            let chunks = render_chunks(std::slice::from_ref(&body), priority_emoji);

            match self
                .engine
                .resync(thread.as_ref(), &definition.intro_text, &chunks, thread_state)
                .await
            {
                Ok(ResyncOutcome::Settled) => {}
                Ok(ResyncOutcome::Synced(synced)) => {
                    report.merge(&synced);
                    changed = true;
                }
                Err(e) => {
                    tracing::error!("Failed to refresh group thread {}: {}", label, e);
                    report.failed += 1;
                    changed = true;
                }
            }
        }

        if !changed {
            return Ok(RefreshOutcome::Unchanged);
        }

        tracing::info!(
            "Refreshed group index {} ({}): {} created, {} edited, {} deleted, {} failed",
            definition.group_index_name,
            definition.key(),
            report.created,
            report.edited,
            report.deleted,
            report.failed
        );
        Ok(RefreshOutcome::Updated(report))
    }

    /// Finds, renames or creates the thread of one group.
    ///
    /// Lookup order: the cached id, a thread with the exact name, then a thread of this group
    /// under an older group index name (renamed in place), else a new thread.
    async fn ensure_group_thread(
        &self,
        definition: &GroupIndexDefinition,
        forum: &dyn ThreadContainer,
        listing: &ThreadListing,
        label: &str,
        state: &mut IndexState,
    ) -> Result<Arc<dyn MessageContainer>, AppError> {
        let name = definition.thread_name(label);

        if let Some(thread_id) = state.index_thread_id {
            if let Some(thread) = self.resolve_thread(thread_id).await? {
                if thread.name() != name {
                    with_backoff(&self.retry, "Rename group thread", || thread.rename(&name))
                        .await?;
                }
                return Ok(thread);
            }
            state.index_thread_id = None;
        }

        let suffix = format!(" - {}", label);
        let found = listing.find_by_title(&name).or_else(|| {
            listing
                .all()
                .find(|entry| entry.title.starts_with("📜 ") && entry.title.ends_with(&suffix))
        });

        if let Some(existing) = found {
            if let Some(thread) = self.resolve_thread(existing.id).await? {
                if existing.title != name {
                    tracing::info!("Renaming group thread {} to {}", existing.title, name);
                    with_backoff(&self.retry, "Rename group thread", || thread.rename(&name))
                        .await?;
                }
                state.index_thread_id = Some(existing.id);
                return Ok(thread);
            }
        }

        let opening =
            Draft::text(&definition.intro_text).thumbnail(definition.thumb_url.as_deref());
        let thread_id = with_backoff(&self.retry, "Create group thread", || {
            forum.create_thread(&name, &opening)
        })
        .await?;
        tracing::info!("Created group thread {} in forum {}", name, forum.snapshot().id);

        state.index_thread_id = Some(thread_id);
        state.last_chunks.clear();

        self.resolve_thread(thread_id).await?.ok_or_else(|| {
            AppError::InternalError(format!("Group thread {} vanished after creation", thread_id))
        })
    }

    /// Stores a new or edited group index and drops its runtime state.
    ///
    /// Waits for a refresh in flight first.
    pub async fn save_group(&self, definition: GroupIndexDefinition) -> Result<(), AppError> {
        let key = definition.key();
        let handle = self.groups.lock().await.get(&key).cloned();
        let _guard = match &handle {
            Some(handle) => Some(handle.lock().await),
            None => None,
        };

        self.store.upsert_group_index(definition).await?;
        self.groups.lock().await.remove(&key);

        Ok(())
    }

    /// Deletes a group index. Its messages and threads are left in place.
    pub async fn remove_group(
        &self,
        guild_id: u64,
        target_channel_id: u64,
    ) -> Result<Option<GroupIndexDefinition>, AppError> {
        let key = IndexKey::new(guild_id, target_channel_id);
        let handle = self.groups.lock().await.get(&key).cloned();
        let _guard = match &handle {
            Some(handle) => Some(handle.lock().await),
            None => None,
        };

        let removed = self.store.remove_group_index(key).await?;
        self.groups.lock().await.remove(&key);

        Ok(removed)
    }

    /// Group indexes of one guild.
    pub async fn list_groups(&self, guild_id: u64) -> Result<Vec<GroupIndexDefinition>, AppError> {
        self.store.get_group_indexes(Some(guild_id)).await
    }
}
