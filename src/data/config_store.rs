//! JSON-file persistence for index definitions, group indexes, character forums and index
//! fingerprints.
//!
//! Every mutation goes through `ConfigStore::update`, which holds the file lock across the
//! whole load, mutate and save sequence. Two administrators running commands at the same time
//! therefore cannot overwrite each other's changes.

use dioxus_logger::tracing;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::data::json_file::JsonFile;
use crate::error::AppError;

use crate::model::{
    config_document::ConfigDocument,
    group_index::GroupIndexDefinition,
    index::{IndexDefinition, IndexKey},
    state::PersistedIndexState,
};
use crate::util::parse::parse_u64_from_str;

/// Handle to the config file. Clones share the same lock.
#[derive(Clone)]
pub struct ConfigStore {
    file: JsonFile<ConfigDocument>,
}

impl ConfigStore {
    /// Creates a store for the config file at `path`.
    ///
    /// Nothing is read or written until the first operation.
    ///
    /// # Arguments
    /// - `path` - Location of the JSON config file
    ///
    /// # Returns
    /// - `ConfigStore` - New store handle
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Creates the config file with the default document if it does not exist yet.
    ///
    /// # Returns
    /// - `Ok(())` - File exists or was created
    /// - `Err(AppError::IoErr)` - Directory or file could not be created
    pub async fn ensure_file(&self) -> Result<(), AppError> {
        self.file.ensure().await
    }

    /// Reads the current document.
    ///
    /// A missing file reads as the default document.
    ///
    /// # Returns
    /// - `Ok(ConfigDocument)` - Parsed document
    /// - `Err(AppError::JsonErr)` - File exists but is not a valid config document
    /// - `Err(AppError::IoErr)` - File could not be read
    pub async fn load(&self) -> Result<ConfigDocument, AppError> {
        self.file.load().await
    }

    /// Runs `mutate` against the current document and saves the result.
    ///
    /// The store lock is held for the whole sequence. When `mutate` fails nothing is written.
    ///
    /// # Arguments
    /// - `mutate` - Closure applying the change and producing a value for the caller
    ///
    /// # Returns
    /// - `Ok(T)` - Value produced by `mutate`, after the document was saved
    /// - `Err(AppError)` - Load, mutation or save failed
    pub async fn update<T, F>(&self, mutate: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut ConfigDocument) -> Result<T, AppError>,
    {
        self.file.update(mutate).await
    }

    /// Adds or replaces an index definition.
    pub async fn upsert_index(&self, definition: IndexDefinition) -> Result<(), AppError> {
        self.update(|document| {
            document
                .indexes
                .insert(definition.key().to_string(), definition);
            Ok(())
        })
        .await
    }

    /// Removes an index definition and its persisted fingerprint.
    ///
    /// # Returns
    /// - `Ok(Some(IndexDefinition))` - The removed definition
    /// - `Ok(None)` - No definition existed for the key
    pub async fn remove_index(&self, key: IndexKey) -> Result<Option<IndexDefinition>, AppError> {
        self.update(|document| {
            let key = key.to_string();
            document.index_state.remove(&key);
            Ok(document.indexes.remove(&key))
        })
        .await
    }

    /// Fetches one index definition.
    pub async fn get_index(&self, key: IndexKey) -> Result<Option<IndexDefinition>, AppError> {
        let document = self.load().await?;
        Ok(document.indexes.get(&key.to_string()).cloned())
    }

    /// Lists index definitions, optionally restricted to one guild, ordered by key.
    pub async fn get_indexes(
        &self,
        guild_id: Option<u64>,
    ) -> Result<Vec<IndexDefinition>, AppError> {
        let document = self.load().await?;

        Ok(document
            .indexes
            .into_values()
            .filter(|definition| guild_id.map_or(true, |id| definition.guild_id == id))
            .collect())
    }

    /// Adds or replaces a group index.
    pub async fn upsert_group_index(
        &self,
        definition: GroupIndexDefinition,
    ) -> Result<(), AppError> {
        let value = serde_json::to_value(&definition)?;
        self.update(|document| {
            document
                .group_indexes
                .insert(definition.key().to_string(), value);
            Ok(())
        })
        .await
    }

    /// Removes a group index.
    ///
    /// # Returns
    /// - `Ok(Some(GroupIndexDefinition))` - The removed definition
    /// - `Ok(None)` - No readable group index existed for the key
    pub async fn remove_group_index(
        &self,
        key: IndexKey,
    ) -> Result<Option<GroupIndexDefinition>, AppError> {
        self.update(|document| {
            let key = key.to_string();
            Ok(document
                .group_indexes
                .remove(&key)
                .and_then(|value| parse_group_index(&key, value)))
        })
        .await
    }

    /// Fetches one group index.
    pub async fn get_group_index(
        &self,
        key: IndexKey,
    ) -> Result<Option<GroupIndexDefinition>, AppError> {
        let document = self.load().await?;
        let key = key.to_string();

        Ok(document
            .group_indexes
            .get(&key)
            .cloned()
            .and_then(|value| parse_group_index(&key, value)))
    }

    /// Lists group indexes, optionally restricted to one guild, ordered by key.
    ///
    /// Entries that cannot be read are logged and skipped.
    pub async fn get_group_indexes(
        &self,
        guild_id: Option<u64>,
    ) -> Result<Vec<GroupIndexDefinition>, AppError> {
        let document = self.load().await?;

        let mut entries: Vec<(String, Value)> = document.group_indexes.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(entries
            .into_iter()
            .filter_map(|(key, value)| parse_group_index(&key, value))
            .filter(|definition| guild_id.map_or(true, |id| definition.guild_id == id))
            .collect())
    }

    /// Registers a character forum for a guild.
    ///
    /// # Returns
    /// - `Ok(true)` - Forum added
    /// - `Ok(false)` - Forum was already registered; nothing written
    pub async fn add_character_forum(&self, guild_id: u64, forum_id: u64) -> Result<bool, AppError> {
        self.update(|document| {
            let forums = document
                .character_forums
                .entry(guild_id.to_string())
                .or_default();

            if forums.contains(&forum_id) {
                return Ok(false);
            }
            forums.push(forum_id);
            Ok(true)
        })
        .await
    }

    /// Unregisters a character forum; the guild entry is dropped once its list is empty.
    ///
    /// # Returns
    /// - `Ok(true)` - Forum removed
    /// - `Ok(false)` - Forum was not registered
    pub async fn remove_character_forum(
        &self,
        guild_id: u64,
        forum_id: u64,
    ) -> Result<bool, AppError> {
        self.update(|document| {
            let guild_key = guild_id.to_string();
            let Some(forums) = document.character_forums.get_mut(&guild_key) else {
                return Ok(false);
            };

            let before = forums.len();
            forums.retain(|id| *id != forum_id);
            let removed = forums.len() != before;

            if forums.is_empty() {
                document.character_forums.remove(&guild_key);
            }
            Ok(removed)
        })
        .await
    }

    /// Character forums registered for a guild.
    pub async fn get_character_forums(&self, guild_id: u64) -> Result<Vec<u64>, AppError> {
        let document = self.load().await?;
        Ok(document
            .character_forums
            .get(&guild_id.to_string())
            .cloned()
            .unwrap_or_default())
    }

    /// Character forums of every guild, keyed by guild id.
    ///
    /// Guild keys that are not valid ids are logged and skipped.
    pub async fn all_character_forums(&self) -> Result<BTreeMap<u64, Vec<u64>>, AppError> {
        let document = self.load().await?;
        let mut forums = BTreeMap::new();

        for (guild_key, ids) in document.character_forums {
            match parse_u64_from_str(&guild_key) {
                Ok(guild_id) => {
                    forums.insert(guild_id, ids);
                }
                Err(e) => tracing::warn!("Skipping character forums entry: {}", e),
            }
        }

        Ok(forums)
    }

    /// Persisted fingerprint of an index; empty when none was saved.
    pub async fn load_fingerprint(&self, key: IndexKey) -> Result<Vec<String>, AppError> {
        let document = self.load().await?;
        Ok(document
            .index_state
            .get(&key.to_string())
            .map(|state| state.last_chunks.clone())
            .unwrap_or_default())
    }

    /// Persists the fingerprint of an index.
    ///
    /// Skipped when the index was removed in the meantime, so a late refresh cannot resurrect
    /// state for a deleted definition.
    pub async fn save_fingerprint(&self, key: IndexKey, chunks: &[String]) -> Result<(), AppError> {
        self.update(|document| {
            let key = key.to_string();
            if document.indexes.contains_key(&key) {
                document.index_state.insert(
                    key,
                    PersistedIndexState {
                        last_chunks: chunks.to_vec(),
                    },
                );
            }
            Ok(())
        })
        .await
    }
}

fn parse_group_index(key: &str, value: Value) -> Option<GroupIndexDefinition> {
    match serde_json::from_value(value) {
        Ok(definition) => Some(definition),
        Err(e) => {
            tracing::warn!("Skipping unreadable group index {}: {}", key, e);
            None
        }
    }
}
