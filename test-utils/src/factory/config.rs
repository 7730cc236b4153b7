//! Config factory for creating stored index and group index definitions.
//!
//! Definitions are produced in the flag layout the config file uses on disk
//! (`sort_by_tags`, `use_character_sorting`, `sort_by_title_pattern`, ...).

use serde_json::{json, Value};

/// Factory for creating stored index definitions with customizable fields.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::factory::config::IndexDefinitionFactory;
///
/// let definition = IndexDefinitionFactory::new(1, 2)
///     .name("Characters")
///     .character_sorting()
///     .priority_tag("Pinned")
///     .build();
/// ```
pub struct IndexDefinitionFactory {
    guild_id: u64,
    forum_id: u64,
    index_name: String,
    sort_by_tags: bool,
    preferred_tags: Vec<String>,
    use_character_sorting: bool,
    priority_tag: Option<String>,
    title_grouping_pattern: Option<String>,
    index_thread_name: Option<String>,
    intro_text: Option<String>,
}

impl IndexDefinitionFactory {
    /// Creates a new factory with default values.
    ///
    /// Defaults:
    /// - index_name: `"Index {forum_id}"`
    /// - no grouping, no preferred tags, no priority tag
    /// - thread name and intro left out so the bot fills in its defaults
    ///
    /// # Arguments
    /// - `guild_id` - Discord guild ID
    /// - `forum_id` - Discord forum channel ID
    ///
    /// # Returns
    /// - `IndexDefinitionFactory` - New factory instance with defaults
    pub fn new(guild_id: u64, forum_id: u64) -> Self {
        Self {
            guild_id,
            forum_id,
            index_name: format!("Index {}", forum_id),
            sort_by_tags: false,
            preferred_tags: Vec::new(),
            use_character_sorting: false,
            priority_tag: None,
            title_grouping_pattern: None,
            index_thread_name: None,
            intro_text: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.index_name = name.into();
        self
    }

    /// Enables tag grouping with the given preferred order.
    pub fn sort_by_tags(mut self, preferred: &[&str]) -> Self {
        self.sort_by_tags = true;
        self.preferred_tags = preferred.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn character_sorting(mut self) -> Self {
        self.use_character_sorting = true;
        self
    }

    /// Enables title grouping with a keyword or regex.
    pub fn title_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.title_grouping_pattern = Some(pattern.into());
        self
    }

    pub fn priority_tag(mut self, tag: impl Into<String>) -> Self {
        self.priority_tag = Some(tag.into());
        self
    }

    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.index_thread_name = Some(name.into());
        self
    }

    pub fn intro_text(mut self, intro: impl Into<String>) -> Self {
        self.intro_text = Some(intro.into());
        self
    }

    /// Builds the stored definition.
    ///
    /// # Returns
    /// - `Value` - JSON object as found under `indexes` in the config file
    pub fn build(self) -> Value {
        json!({
            "guild_id": self.guild_id,
            "forum_id": self.forum_id,
            "index_name": self.index_name,
            "sort_by_tags": self.sort_by_tags,
            "preferred_tags": self.preferred_tags,
            "index_thread_name": self.index_thread_name,
            "intro_text": self.intro_text,
            "thumb_url": null,
            "use_character_sorting": self.use_character_sorting,
            "priority_tag": self.priority_tag,
            "sort_by_title_pattern": self.title_grouping_pattern.is_some(),
            "title_grouping_pattern": self.title_grouping_pattern,
        })
    }
}

/// Creates a stored index definition with default values.
///
/// Shorthand for `IndexDefinitionFactory::new(guild_id, forum_id).name(name).build()`.
pub fn index_definition(guild_id: u64, forum_id: u64, name: &str) -> Value {
    IndexDefinitionFactory::new(guild_id, forum_id)
        .name(name)
        .build()
}

/// Creates a stored group index without grouping.
///
/// # Arguments
/// - `guild_id` - Discord guild ID
/// - `target_channel_id` - Text channel or forum receiving the index
/// - `name` - Group index name
/// - `sources` - Forums whose threads are listed
pub fn group_index(guild_id: u64, target_channel_id: u64, name: &str, sources: &[u64]) -> Value {
    json!({
        "guild_id": guild_id,
        "target_channel_id": target_channel_id,
        "group_index_name": name,
        "source_forum_ids": sources,
        "sort_by_tags": false,
        "preferred_tags": [],
        "intro_text": format!("📚 Group Index: {}", name),
        "thumb_url": null,
        "use_character_sorting": false,
        "priority_tag": null,
        "sort_by_title_pattern": false,
        "title_grouping_pattern": null,
        "thread_sort_by": "creation",
        "thread_sort_tag": null,
    })
}
