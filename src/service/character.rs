//! Character lookup over registered character forums.
//!
//! Threads of every registered forum are cached per guild. The cache is rebuilt daily by the
//! scheduler, whenever the set of forums changes, and lazily on the first lookup of a guild.

use dioxus_logger::tracing;
use nucleo_matcher::{
    pattern::{CaseMatching, Normalization, Pattern},
    Config, Matcher,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::data::config_store::ConfigStore;
use crate::error::AppError;
use crate::model::character::CharacterEntry;
use crate::service::index::{channel::ChannelGateway, collector::ThreadListing};

/// Discord's limit on autocomplete choices.
pub const MAX_SUGGESTIONS: usize = 25;

/// Minimum fuzzy score per query character for a fuzzy hit to count.
const FUZZY_MIN_SCORE_PER_CHAR: u32 = 12;

#[derive(Clone)]
pub struct CharacterService {
    store: ConfigStore,
    gateway: Arc<dyn ChannelGateway>,
    cache: Arc<RwLock<HashMap<u64, Vec<CharacterEntry>>>>,
}

impl CharacterService {
    pub fn new(store: ConfigStore, gateway: Arc<dyn ChannelGateway>) -> Self {
        Self {
            store,
            gateway,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Rebuilds the cache of one guild from its registered forums.
    ///
    /// Forums that no longer resolve are skipped with a warning. Thread titles containing
    /// "index" are left out.
    ///
    /// # Arguments
    /// - `guild_id` - Guild to rebuild
    ///
    /// # Returns
    /// - `Ok(usize)` - Number of cached threads
    /// - `Err(AppError)` - Config store or Discord failure
    pub async fn rebuild(&self, guild_id: u64) -> Result<usize, AppError> {
        let forum_ids = self.store.get_character_forums(guild_id).await?;
        let mut entries = Vec::new();

        for forum_id in &forum_ids {
            let Some(forum) = self
                .gateway
                .resolve(*forum_id)
                .await?
                .and_then(|container| container.as_forum().cloned())
            else {
                tracing::warn!(
                    "Character forum {} of guild {} is not a reachable forum",
                    forum_id,
                    guild_id
                );
                continue;
            };

            let forum_name = forum.snapshot().name.clone();
            let listing = ThreadListing::gather(forum.as_ref()).await;

            entries.extend(
                listing
                    .all()
                    .filter(|thread| !thread.title.to_lowercase().contains("index"))
                    .map(|thread| CharacterEntry {
                        guild_id,
                        thread_id: thread.id,
                        title: thread.title.clone(),
                        forum_name: forum_name.clone(),
                    }),
            );
        }

        let count = entries.len();
        self.cache.write().await.insert(guild_id, entries);

        tracing::info!(
            "Cached {} character threads from {} forum(s) for guild {}",
            count,
            forum_ids.len(),
            guild_id
        );

        Ok(count)
    }

    /// Rebuilds the cache of every guild with registered forums.
    ///
    /// A failing guild is logged and skipped.
    pub async fn rebuild_all(&self) -> Result<usize, AppError> {
        let guilds = self.store.all_character_forums().await?;
        let mut total = 0;

        for guild_id in guilds.keys() {
            match self.rebuild(*guild_id).await {
                Ok(count) => total += count,
                Err(e) => tracing::error!(
                    "Failed to rebuild character cache for guild {}: {}",
                    guild_id,
                    e
                ),
            }
        }

        Ok(total)
    }

    /// Cached entries of a guild, building the cache first when it is empty.
    pub async fn entries(&self, guild_id: u64) -> Result<Vec<CharacterEntry>, AppError> {
        let cached = self.cache.read().await.get(&guild_id).cloned();
        match cached {
            Some(entries) if !entries.is_empty() => Ok(entries),
            _ => {
                self.rebuild(guild_id).await?;
                Ok(self
                    .cache
                    .read()
                    .await
                    .get(&guild_id)
                    .cloned()
                    .unwrap_or_default())
            }
        }
    }

    /// Finds the character closest to `query`.
    ///
    /// # Returns
    /// - `Ok(Some(CharacterEntry))` - Best match
    /// - `Ok(None)` - Nothing close enough
    pub async fn search(
        &self,
        guild_id: u64,
        query: &str,
    ) -> Result<Option<CharacterEntry>, AppError> {
        let entries = self.entries(guild_id).await?;
        Ok(best_match(&entries, query).cloned())
    }

    /// Autocomplete choices for a partially typed name.
    pub async fn autocomplete(&self, guild_id: u64, partial: &str) -> Result<Vec<String>, AppError> {
        let entries = self.entries(guild_id).await?;
        Ok(suggestions(&entries, partial))
    }
}

/// Picks the shortest title containing `query`, else the best fuzzy match above the threshold.
pub fn best_match<'a>(entries: &'a [CharacterEntry], query: &str) -> Option<&'a CharacterEntry> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let substring = entries
        .iter()
        .filter(|entry| entry.title.to_lowercase().contains(&needle))
        .min_by_key(|entry| entry.title.chars().count());
    if substring.is_some() {
        return substring;
    }

    let threshold = FUZZY_MIN_SCORE_PER_CHAR
        * needle.chars().filter(|c| !c.is_whitespace()).count() as u32;
    let pattern = Pattern::parse(&needle, CaseMatching::Ignore, Normalization::Smart);
    let mut matcher = Matcher::new(Config::DEFAULT);

    let (title, score) = pattern
        .match_list(entries.iter().map(|entry| entry.title.as_str()), &mut matcher)
        .into_iter()
        .next()?;

    if score < threshold {
        tracing::debug!(
            "Best fuzzy match '{}' for '{}' scored {} (< {})",
            title,
            query,
            score,
            threshold
        );
        return None;
    }

    entries.iter().find(|entry| entry.title == title)
}

/// Titles containing `partial`, those starting with it first, then by length; at most 25.
///
/// An empty `partial` lists the first titles alphabetically.
pub fn suggestions(entries: &[CharacterEntry], partial: &str) -> Vec<String> {
    let needle = partial.trim().to_lowercase();

    let mut titles: Vec<&str> = entries
        .iter()
        .map(|entry| entry.title.as_str())
        .filter(|title| title.to_lowercase().contains(&needle))
        .collect();

    if needle.is_empty() {
        titles.sort_by_key(|title| title.to_lowercase());
    } else {
        titles.sort_by_key(|title| {
            (
                !title.to_lowercase().starts_with(&needle),
                title.chars().count(),
            )
        });
    }
    titles.dedup();

    titles
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(str::to_string)
        .collect()
}
