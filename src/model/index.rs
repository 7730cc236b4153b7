//! Index definitions and their persisted layout.

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::{config::ConfigError, internal::InternalError, AppError};
use crate::util::parse::parse_u64_from_str;

/// Composite key of an index: one definition per `(guild_id, forum_id)`.
///
/// Serialized as `"<guild_id>:<forum_id>"` in the config file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexKey {
    pub guild_id: u64,
    pub forum_id: u64,
}

impl IndexKey {
    pub fn new(guild_id: u64, forum_id: u64) -> Self {
        Self { guild_id, forum_id }
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.guild_id, self.forum_id)
    }
}

impl FromStr for IndexKey {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (guild, forum) = value
            .split_once(':')
            .ok_or_else(|| InternalError::MalformedIndexKey(value.to_string()))?;

        Ok(Self {
            guild_id: parse_u64_from_str(guild)?,
            forum_id: parse_u64_from_str(forum)?,
        })
    }
}

/// How a title is reduced to a group key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TitlePattern {
    /// Text after the last dash (`after-`).
    AfterDash,
    /// Text before the first dash (`before-`).
    BeforeDash,
    /// Full date code such as `SD1-582` (`date-suffix`).
    DateSuffix,
    /// Only the number after the dash of a date code (`date-number`).
    DateNumber,
    /// Case-insensitive user regex; first capture group, else the whole match.
    Custom(String),
}

impl TitlePattern {
    /// Reads a stored or typed pattern without validating custom regexes.
    ///
    /// Keywords are matched case-insensitively. A blank value means "no pattern".
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        Some(match trimmed.to_lowercase().as_str() {
            "after-" => Self::AfterDash,
            "before-" => Self::BeforeDash,
            "date-suffix" => Self::DateSuffix,
            "date-number" => Self::DateNumber,
            _ => Self::Custom(trimmed.to_string()),
        })
    }

    /// Parses a pattern supplied by an administrator and rejects regexes that do not compile.
    ///
    /// # Arguments
    /// - `raw` - Pattern text from the command option
    ///
    /// # Returns
    /// - `Ok(Some(TitlePattern))` - Valid keyword or compilable regex
    /// - `Ok(None)` - Blank input
    /// - `Err(ConfigError::InvalidPattern)` - Custom regex failed to compile
    pub fn validate(raw: &str) -> Result<Option<Self>, ConfigError> {
        let pattern = Self::parse(raw);

        if let Some(Self::Custom(regex)) = &pattern {
            RegexBuilder::new(regex)
                .case_insensitive(true)
                .build()
                .map_err(|e| ConfigError::InvalidPattern {
                    pattern: regex.clone(),
                    reason: e.to_string(),
                })?;
        }

        Ok(pattern)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::AfterDash => "after-",
            Self::BeforeDash => "before-",
            Self::DateSuffix => "date-suffix",
            Self::DateNumber => "date-number",
            Self::Custom(regex) => regex,
        }
    }
}

impl fmt::Display for TitlePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy used to split an index into groups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupingMode {
    /// One implicit group, no headings.
    None,
    /// One group per forum tag.
    ByTag,
    /// One group per key extracted from the title.
    ByTitlePattern(TitlePattern),
    /// Fixed court taxonomy resolved from tags.
    ByFixedTaxonomy,
}

impl GroupingMode {
    /// Short label used by `/index list` and command replies.
    pub fn describe(&self) -> String {
        match self {
            Self::None => "alphabetical".to_string(),
            Self::ByTag => "tag-sorted".to_string(),
            Self::ByTitlePattern(pattern) => format!("title-pattern: {}", pattern),
            Self::ByFixedTaxonomy => "character courts".to_string(),
        }
    }
}

/// Grouping switches in the layout of the config file.
///
/// Several switches can be on at once; court sorting wins over title patterns, which win
/// over tags. Tag sorting left on underneath one of the others is kept as a fallback.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupingFlags {
    #[serde(default)]
    pub sort_by_tags: bool,
    #[serde(default)]
    pub use_character_sorting: bool,
    #[serde(default)]
    pub sort_by_title_pattern: bool,
    #[serde(default)]
    pub title_grouping_pattern: Option<String>,
}

impl GroupingFlags {
    /// Effective grouping and whether tag sorting stays on underneath it.
    ///
    /// Title sorting without a usable pattern is ignored.
    pub fn decode(&self) -> (GroupingMode, bool) {
        let pattern = self
            .title_grouping_pattern
            .as_deref()
            .and_then(TitlePattern::parse);

        let grouping = if self.use_character_sorting {
            GroupingMode::ByFixedTaxonomy
        } else if let (true, Some(pattern)) = (self.sort_by_title_pattern, pattern) {
            GroupingMode::ByTitlePattern(pattern)
        } else if self.sort_by_tags {
            GroupingMode::ByTag
        } else {
            GroupingMode::None
        };
        let tag_fallback = self.sort_by_tags
            && matches!(
                grouping,
                GroupingMode::ByTitlePattern(_) | GroupingMode::ByFixedTaxonomy
            );

        (grouping, tag_fallback)
    }

    pub fn encode(grouping: &GroupingMode, tag_fallback: bool) -> Self {
        let (sort_by_tags, sort_by_title_pattern, use_character_sorting, pattern) = match grouping
        {
            GroupingMode::None => (false, false, false, None),
            GroupingMode::ByTag => (true, false, false, None),
            GroupingMode::ByTitlePattern(p) => (tag_fallback, true, false, Some(p)),
            GroupingMode::ByFixedTaxonomy => (tag_fallback, false, true, None),
        };

        Self {
            sort_by_tags,
            use_character_sorting,
            sort_by_title_pattern,
            title_grouping_pattern: pattern.map(|p| p.as_str().to_string()),
        }
    }
}

/// Combines the current grouping with the switches of a command.
///
/// # Arguments
/// - `current` - Grouping in effect
/// - `tag_fallback` - Whether tag sorting is on underneath `current`
/// - `options` - Switches supplied by the command; `None` keeps the current value
///
/// # Returns
/// - `Ok((GroupingMode, bool))` - Effective grouping and the tag sorting flag to keep
/// - `Err(ConfigError::MissingParameter)` - Title sorting enabled without a pattern
/// - `Err(ConfigError::InvalidPattern)` - Custom title pattern does not compile
pub fn resolve_grouping(
    current: &GroupingMode,
    tag_fallback: bool,
    options: &IndexOptions,
) -> Result<(GroupingMode, bool), ConfigError> {
    let (mut by_tags, mut by_title, mut by_taxonomy, mut pattern) = match current {
        GroupingMode::None => (false, false, false, None),
        GroupingMode::ByTag => (true, false, false, None),
        GroupingMode::ByTitlePattern(p) => (tag_fallback, true, false, Some(p.clone())),
        GroupingMode::ByFixedTaxonomy => (tag_fallback, false, true, None),
    };

    if let Some(value) = options.sort_by_tags {
        by_tags = value;
    }
    if let Some(value) = options.sort_by_title_pattern {
        by_title = value;
    }
    if let Some(value) = options.character_sorting {
        by_taxonomy = value;
    }
    if let Some(raw) = &options.title_grouping_pattern {
        pattern = TitlePattern::validate(raw)?;
    }

    if by_taxonomy {
        return Ok((GroupingMode::ByFixedTaxonomy, by_tags));
    }
    if by_title {
        return pattern
            .map(|pattern| (GroupingMode::ByTitlePattern(pattern), by_tags))
            .ok_or_else(|| ConfigError::MissingParameter("title_grouping_pattern".into()));
    }
    if by_tags {
        return Ok((GroupingMode::ByTag, false));
    }

    Ok((GroupingMode::None, false))
}

/// Configuration of one forum index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredIndexDefinition", into = "StoredIndexDefinition")]
pub struct IndexDefinition {
    pub guild_id: u64,
    pub forum_id: u64,
    pub index_name: String,
    pub grouping: GroupingMode,
    /// Tag sorting stays switched on underneath title-pattern or court grouping, so turning
    /// those off falls back to tag groups.
    pub tag_fallback: bool,
    /// Tag names (or court names) rendered first, in this order.
    pub preferred_tags: Vec<String>,
    /// Entries carrying this tag sort first in their group.
    pub priority_tag: Option<String>,
    pub index_thread_name: String,
    pub intro_text: String,
    pub thumb_url: Option<String>,
}

/// Partial set of index settings, as received from `/index add` or `/index edit`.
///
/// `None` leaves the current value untouched. Blank strings clear optional values and reset
/// the thread name and intro to their defaults.
#[derive(Clone, Debug, Default)]
pub struct IndexOptions {
    pub index_name: Option<String>,
    pub sort_by_tags: Option<bool>,
    pub preferred_tags: Option<Vec<String>>,
    pub index_thread_name: Option<String>,
    pub intro_text: Option<String>,
    pub thumb_url: Option<String>,
    pub priority_tag: Option<String>,
    pub character_sorting: Option<bool>,
    pub sort_by_title_pattern: Option<bool>,
    pub title_grouping_pattern: Option<String>,
}

fn default_thread_name(index_name: &str) -> String {
    format!("📜 {} Index", index_name)
}

fn default_intro_text(index_name: &str) -> String {
    format!("📚 Index of {}", index_name)
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl IndexDefinition {
    /// Creates a definition with default thread name, intro and no grouping.
    pub fn new(guild_id: u64, forum_id: u64, index_name: impl Into<String>) -> Self {
        let index_name = index_name.into();
        Self {
            guild_id,
            forum_id,
            index_thread_name: default_thread_name(&index_name),
            intro_text: default_intro_text(&index_name),
            index_name,
            grouping: GroupingMode::None,
            tag_fallback: false,
            preferred_tags: Vec::new(),
            priority_tag: None,
            thumb_url: None,
        }
    }

    pub fn key(&self) -> IndexKey {
        IndexKey::new(self.guild_id, self.forum_id)
    }

    /// Applies command options to this definition.
    ///
    /// Validation happens before any field is touched, so a rejected edit leaves the
    /// definition unchanged.
    ///
    /// # Arguments
    /// - `options` - Settings to change
    ///
    /// # Returns
    /// - `Ok(())` - All options applied
    /// - `Err(ConfigError::MissingParameter)` - Title sorting enabled without a pattern
    /// - `Err(ConfigError::InvalidPattern)` - Custom title pattern does not compile
    pub fn apply(&mut self, options: IndexOptions) -> Result<(), ConfigError> {
        let (grouping, tag_fallback) =
            resolve_grouping(&self.grouping, self.tag_fallback, &options)?;

        if let Some(name) = non_blank(options.index_name) {
            self.index_name = name;
        }
        self.grouping = grouping;
        self.tag_fallback = tag_fallback;
        if let Some(tags) = options.preferred_tags {
            self.preferred_tags = tags;
        }
        if let Some(thread_name) = options.index_thread_name {
            self.index_thread_name = non_blank(Some(thread_name))
                .unwrap_or_else(|| default_thread_name(&self.index_name));
        }
        if let Some(intro) = options.intro_text {
            self.intro_text =
                non_blank(Some(intro)).unwrap_or_else(|| default_intro_text(&self.index_name));
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

/// On-disk layout of an index definition, using the flag fields of the legacy file format.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct StoredIndexDefinition {
    guild_id: u64,
    forum_id: u64,
    #[serde(default)]
    index_name: String,
    #[serde(flatten)]
    flags: GroupingFlags,
    #[serde(default)]
    preferred_tags: Vec<String>,
    index_thread_name: Option<String>,
    intro_text: Option<String>,
    thumb_url: Option<String>,
    priority_tag: Option<String>,
}

impl From<StoredIndexDefinition> for IndexDefinition {
    fn from(stored: StoredIndexDefinition) -> Self {
        let (grouping, tag_fallback) = stored.flags.decode();

        Self {
            guild_id: stored.guild_id,
            forum_id: stored.forum_id,
            index_thread_name: non_blank(stored.index_thread_name)
                .unwrap_or_else(|| default_thread_name(&stored.index_name)),
            intro_text: non_blank(stored.intro_text)
                .unwrap_or_else(|| default_intro_text(&stored.index_name)),
            index_name: stored.index_name,
            grouping,
            tag_fallback,
            preferred_tags: stored.preferred_tags,
            priority_tag: non_blank(stored.priority_tag),
            thumb_url: non_blank(stored.thumb_url),
        }
    }
}

impl From<IndexDefinition> for StoredIndexDefinition {
    fn from(definition: IndexDefinition) -> Self {
        Self {
            guild_id: definition.guild_id,
            forum_id: definition.forum_id,
            index_name: definition.index_name,
            flags: GroupingFlags::encode(&definition.grouping, definition.tag_fallback),
            preferred_tags: definition.preferred_tags,
            index_thread_name: Some(definition.index_thread_name),
            intro_text: Some(definition.intro_text),
            thumb_url: definition.thumb_url,
            priority_tag: definition.priority_tag,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Tests that a legacy stored definition decodes flags into a grouping mode.
    ///
    /// Expected: Ok with title pattern grouping and defaults for missing names
    #[test]
    fn decodes_legacy_flags() {
        let definition: IndexDefinition = serde_json::from_value(json!({
            "guild_id": 1,
            "forum_id": 2,
            "index_name": "Logs",
            "sort_by_tags": true,
            "sort_by_title_pattern": true,
            "title_grouping_pattern": "Date-Number",
            "priority_tag": ""
        }))
        .unwrap();

        assert_eq!(
            definition.grouping,
            GroupingMode::ByTitlePattern(TitlePattern::DateNumber)
        );
        assert_eq!(definition.index_thread_name, "📜 Logs Index");
        assert_eq!(definition.intro_text, "📚 Index of Logs");
        assert_eq!(definition.priority_tag, None);
    }

    /// Tests that title sorting without a stored pattern falls back to tag sorting.
    ///
    /// Expected: Ok with ByTag grouping
    #[test]
    fn title_flag_without_pattern_falls_back() {
        let definition: IndexDefinition = serde_json::from_value(json!({
            "guild_id": 1,
            "forum_id": 2,
            "index_name": "Logs",
            "sort_by_tags": true,
            "sort_by_title_pattern": true,
            "title_grouping_pattern": null
        }))
        .unwrap();

        assert_eq!(definition.grouping, GroupingMode::ByTag);
    }

    /// Tests that character sorting takes precedence over every other flag.
    ///
    /// Expected: Ok with ByFixedTaxonomy and both flags written back on save
    #[test]
    fn character_sorting_wins_and_round_trips_flags() {
        let definition: IndexDefinition = serde_json::from_value(json!({
            "guild_id": 1,
            "forum_id": 2,
            "index_name": "Characters",
            "sort_by_tags": true,
            "use_character_sorting": true
        }))
        .unwrap();

        assert_eq!(definition.grouping, GroupingMode::ByFixedTaxonomy);

        let stored = serde_json::to_value(&definition).unwrap();
        assert_eq!(stored["use_character_sorting"], json!(true));
        assert_eq!(stored["sort_by_tags"], json!(true));
        assert_eq!(stored["index_thread_name"], json!("📜 Characters Index"));
    }

    /// Tests rejecting a title-sorted definition without a pattern.
    ///
    /// Expected: Err with MissingParameter and the definition unchanged
    #[test]
    fn apply_rejects_title_sorting_without_pattern() {
        let mut definition = IndexDefinition::new(1, 2, "Logs");

        let result = definition.apply(IndexOptions {
            sort_by_title_pattern: Some(true),
            index_name: Some("Renamed".to_string()),
            ..Default::default()
        });

        assert!(matches!(result, Err(ConfigError::MissingParameter(_))));
        assert_eq!(definition.index_name, "Logs");
        assert_eq!(definition.grouping, GroupingMode::None);
    }

    /// Tests rejecting an invalid custom regex at edit time.
    ///
    /// Expected: Err with InvalidPattern
    #[test]
    fn apply_rejects_invalid_regex() {
        let mut definition = IndexDefinition::new(1, 2, "Logs");

        let result = definition.apply(IndexOptions {
            sort_by_title_pattern: Some(true),
            title_grouping_pattern: Some("([A-Z".to_string()),
            ..Default::default()
        });

        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }

    /// Tests that blank strings clear optional values and reset defaults.
    ///
    /// Expected: Ok with cleared priority tag and default intro
    #[test]
    fn apply_blank_values_reset_fields() {
        let mut definition = IndexDefinition::new(1, 2, "Lore");
        definition.priority_tag = Some("Pinned".to_string());
        definition.intro_text = "Custom intro".to_string();

        definition
            .apply(IndexOptions {
                priority_tag: Some("  ".to_string()),
                intro_text: Some(String::new()),
                sort_by_tags: Some(true),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(definition.priority_tag, None);
        assert_eq!(definition.intro_text, "📚 Index of Lore");
        assert_eq!(definition.grouping, GroupingMode::ByTag);
    }

    /// Tests that tag sorting survives underneath title-pattern grouping.
    ///
    /// Expected: both flags saved, and turning title sorting off falls back to tag groups
    #[test]
    fn tag_flag_survives_title_pattern() {
        let mut definition: IndexDefinition = serde_json::from_value(json!({
            "guild_id": 1,
            "forum_id": 2,
            "index_name": "Logs",
            "sort_by_tags": true,
            "sort_by_title_pattern": true,
            "title_grouping_pattern": "after-"
        }))
        .unwrap();

        let stored = serde_json::to_value(&definition).unwrap();
        assert_eq!(stored["sort_by_tags"], json!(true));
        assert_eq!(stored["sort_by_title_pattern"], json!(true));

        definition
            .apply(IndexOptions {
                sort_by_title_pattern: Some(false),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(definition.grouping, GroupingMode::ByTag);
    }

    /// Tests enabling title sorting on a tag-sorted index.
    ///
    /// Expected: title grouping with tag sorting kept underneath
    #[test]
    fn enabling_title_sorting_keeps_tag_flag() {
        let mut definition = IndexDefinition::new(1, 2, "Logs");
        definition.grouping = GroupingMode::ByTag;

        definition
            .apply(IndexOptions {
                sort_by_title_pattern: Some(true),
                title_grouping_pattern: Some("before-".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(
            definition.grouping,
            GroupingMode::ByTitlePattern(TitlePattern::BeforeDash)
        );
        assert!(definition.tag_fallback);
        let stored = serde_json::to_value(&definition).unwrap();
        assert_eq!(stored["sort_by_tags"], json!(true));
    }

    /// Tests parsing index keys.
    ///
    /// Expected: Ok for `guild:forum`, Err for anything else
    #[test]
    fn parses_index_keys() {
        let key: IndexKey = "10:20".parse().unwrap();
        assert_eq!(key, IndexKey::new(10, 20));
        assert_eq!(key.to_string(), "10:20");

        assert!("1020".parse::<IndexKey>().is_err());
        assert!("10:abc".parse::<IndexKey>().is_err());
    }
}
