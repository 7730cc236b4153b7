//! Group indexes: one index listing the threads of several forums.

use serde::{Deserialize, Serialize};

use crate::error::config::ConfigError;
use crate::model::index::{
    non_blank, resolve_grouping, GroupingFlags, GroupingMode, IndexKey, IndexOptions,
};

/// Label of the single group of an ungrouped group index in a forum target.
pub const ALL_THREADS: &str = "All Threads";

/// Configuration of a group index.
///
/// The target is either a text channel, which receives `[intro, chunks...]` like an index
/// thread, or a forum, which receives one thread per group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredGroupIndex", into = "StoredGroupIndex")]
pub struct GroupIndexDefinition {
    pub guild_id: u64,
    pub target_channel_id: u64,
    pub group_index_name: String,
    /// Forums whose threads are listed, in the order they were given.
    pub source_forum_ids: Vec<u64>,
    pub grouping: GroupingMode,
    pub tag_fallback: bool,
    pub preferred_tags: Vec<String>,
    pub priority_tag: Option<String>,
    pub intro_text: String,
    pub thumb_url: Option<String>,
    /// Ordering of the group threads in a forum target: `creation` or `tag`. Stored only.
    pub thread_sort_by: String,
    pub thread_sort_tag: Option<String>,
}

fn default_intro_text(name: &str) -> String {
    format!("📚 Group Index: {}", name)
}

fn default_thread_sort() -> String {
    "creation".to_string()
}

impl GroupIndexDefinition {
    pub fn new(
        guild_id: u64,
        target_channel_id: u64,
        group_index_name: impl Into<String>,
        source_forum_ids: Vec<u64>,
    ) -> Self {
        let group_index_name = group_index_name.into();
        Self {
            guild_id,
            target_channel_id,
            intro_text: default_intro_text(&group_index_name),
            group_index_name,
            source_forum_ids,
            grouping: GroupingMode::None,
            tag_fallback: false,
            preferred_tags: Vec::new(),
            priority_tag: None,
            thumb_url: None,
            thread_sort_by: default_thread_sort(),
            thread_sort_tag: None,
        }
    }

    /// Keyed by guild and target channel, in the same key space as forum indexes.
    pub fn key(&self) -> IndexKey {
        IndexKey::new(self.guild_id, self.target_channel_id)
    }

    /// Name of the forum thread holding one group.
    pub fn thread_name(&self, label: &str) -> String {
        format!("📜 {} - {}", self.group_index_name, label)
    }

    /// Applies command options. Thread names are ignored; group threads are named after the
    /// group index.
    ///
    /// # Returns
    /// - `Ok(())` - All options applied
    /// - `Err(ConfigError)` - Title pattern missing or invalid; nothing changed
    pub fn apply(&mut self, options: IndexOptions) -> Result<(), ConfigError> {
        let (grouping, tag_fallback) =
            resolve_grouping(&self.grouping, self.tag_fallback, &options)?;

        if let Some(name) = non_blank(options.index_name) {
            self.group_index_name = name;
        }
        self.grouping = grouping;
        self.tag_fallback = tag_fallback;
        if let Some(tags) = options.preferred_tags {
            self.preferred_tags = tags;
        }
        if let Some(intro) = options.intro_text {
            self.intro_text = non_blank(Some(intro))
                .unwrap_or_else(|| default_intro_text(&self.group_index_name));
        }
        if options.thumb_url.is_some() {
            self.thumb_url = non_blank(options.thumb_url);
        }
        if options.priority_tag.is_some() {
            self.priority_tag = non_blank(options.priority_tag);
        }

        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct StoredGroupIndex {
    guild_id: u64,
    target_channel_id: u64,
    #[serde(default)]
    group_index_name: String,
    #[serde(default)]
    source_forum_ids: Vec<u64>,
    #[serde(flatten)]
    flags: GroupingFlags,
    #[serde(default)]
    preferred_tags: Vec<String>,
    intro_text: Option<String>,
    thumb_url: Option<String>,
    priority_tag: Option<String>,
    #[serde(default = "default_thread_sort")]
    thread_sort_by: String,
    thread_sort_tag: Option<String>,
}

impl From<StoredGroupIndex> for GroupIndexDefinition {
    fn from(stored: StoredGroupIndex) -> Self {
        let (grouping, tag_fallback) = stored.flags.decode();

        Self {
            guild_id: stored.guild_id,
            target_channel_id: stored.target_channel_id,
            intro_text: non_blank(stored.intro_text)
                .unwrap_or_else(|| default_intro_text(&stored.group_index_name)),
            group_index_name: stored.group_index_name,
            source_forum_ids: stored.source_forum_ids,
            grouping,
            tag_fallback,
            preferred_tags: stored.preferred_tags,
            priority_tag: non_blank(stored.priority_tag),
            thumb_url: non_blank(stored.thumb_url),
            thread_sort_by: stored.thread_sort_by,
            thread_sort_tag: non_blank(stored.thread_sort_tag),
        }
    }
}

impl From<GroupIndexDefinition> for StoredGroupIndex {
    fn from(definition: GroupIndexDefinition) -> Self {
        Self {
            guild_id: definition.guild_id,
            target_channel_id: definition.target_channel_id,
            group_index_name: definition.group_index_name,
            source_forum_ids: definition.source_forum_ids,
            flags: GroupingFlags::encode(&definition.grouping, definition.tag_fallback),
            preferred_tags: definition.preferred_tags,
            intro_text: Some(definition.intro_text),
            thumb_url: definition.thumb_url,
            priority_tag: definition.priority_tag,
            thread_sort_by: definition.thread_sort_by,
            thread_sort_tag: definition.thread_sort_tag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::index::TitlePattern;
    use serde_json::json;

    /// Tests reading a stored group index.
    ///
    /// Expected: flags decoded, default intro and thread sort filled in
    #[test]
    fn decodes_stored_group_index() {
        let definition: GroupIndexDefinition = serde_json::from_value(json!({
            "guild_id": 1,
            "target_channel_id": 50,
            "group_index_name": "Archive",
            "source_forum_ids": [10, 11],
            "sort_by_tags": true,
            "sort_by_title_pattern": true,
            "title_grouping_pattern": "after-",
            "intro_text": null
        }))
        .unwrap();

        assert_eq!(
            definition.grouping,
            GroupingMode::ByTitlePattern(TitlePattern::AfterDash)
        );
        assert!(definition.tag_fallback);
        assert_eq!(definition.intro_text, "📚 Group Index: Archive");
        assert_eq!(definition.thread_sort_by, "creation");
        assert_eq!(definition.key(), IndexKey::new(1, 50));
    }

    /// Tests writing a group index back to disk.
    ///
    /// Expected: the flag layout with sources and thread sorting kept
    #[test]
    fn encodes_flag_layout() {
        let mut definition = GroupIndexDefinition::new(1, 50, "Archive", vec![10, 11]);
        definition.grouping = GroupingMode::ByTag;
        definition.thread_sort_tag = Some("Pinned".to_string());

        let stored = serde_json::to_value(&definition).unwrap();

        assert_eq!(stored["sort_by_tags"], json!(true));
        assert_eq!(stored["use_character_sorting"], json!(false));
        assert_eq!(stored["source_forum_ids"], json!([10, 11]));
        assert_eq!(stored["thread_sort_tag"], json!("Pinned"));
        assert_eq!(stored["intro_text"], json!("📚 Group Index: Archive"));
    }

    /// Tests renaming through `apply`.
    ///
    /// Expected: thread names follow the new name, a blank intro resets to the new default
    #[test]
    fn apply_renames_and_resets_intro() {
        let mut definition = GroupIndexDefinition::new(1, 50, "Archive", vec![10]);

        definition
            .apply(IndexOptions {
                index_name: Some("Library".to_string()),
                intro_text: Some(" ".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(definition.thread_name("Other"), "📜 Library - Other");
        assert_eq!(definition.intro_text, "📚 Group Index: Library");
    }
}
