//! Classifies index entries into groups and orders them.
//!
//! Every entry lands in exactly one group. Within a group, leaders come first, then entries
//! carrying the priority tag, then everything else alphabetically (case-insensitive). The
//! terminal groups "Other" and "Inactive Characters" always come last, in that order.

use dioxus_logger::tracing;
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::fmt;

use crate::error::config::ConfigError;
use crate::model::{
    group::{GroupEntry, RenderedGroup, INACTIVE_GROUP, OTHER_GROUP},
    group_index::GroupIndexDefinition,
    index::{GroupingMode, IndexDefinition, TitlePattern},
    thread::{ForumSnapshot, ThreadEntry},
};
use crate::service::index::taxonomy;

/// Grouping settings shared by forum indexes and group indexes.
#[derive(Clone, Copy, Debug)]
pub struct GroupingSettings<'a> {
    pub grouping: &'a GroupingMode,
    pub preferred_tags: &'a [String],
    pub priority_tag: Option<&'a str>,
}

impl<'a> From<&'a IndexDefinition> for GroupingSettings<'a> {
    fn from(definition: &'a IndexDefinition) -> Self {
        Self {
            grouping: &definition.grouping,
            preferred_tags: &definition.preferred_tags,
            priority_tag: definition.priority_tag.as_deref(),
        }
    }
}

impl<'a> From<&'a GroupIndexDefinition> for GroupingSettings<'a> {
    fn from(definition: &'a GroupIndexDefinition) -> Self {
        Self {
            grouping: &definition.grouping,
            preferred_tags: &definition.preferred_tags,
            priority_tag: definition.priority_tag.as_deref(),
        }
    }
}

/// Groups and orders the entries of one index.
///
/// # Arguments
/// - `definition` - Index settings (grouping mode, preferred tags, priority tag)
/// - `forum` - Forum metadata, used for tag emoji in headings
/// - `entries` - Threads to list, in any order
///
/// # Returns
/// - `Vec<RenderedGroup>` - Ordered groups; empty when there are no entries
pub fn group_entries(
    definition: &IndexDefinition,
    forum: &ForumSnapshot,
    entries: Vec<ThreadEntry>,
) -> Vec<RenderedGroup> {
    group_with(definition.into(), &definition.key(), forum, entries)
}

/// Groups and orders entries with explicit settings.
///
/// # Arguments
/// - `settings` - Grouping mode, preferred tags and priority tag
/// - `label` - Names the index in log lines
/// - `forum` - Forum metadata, used for tag emoji in headings
/// - `entries` - Threads to list, in any order
pub fn group_with(
    settings: GroupingSettings<'_>,
    label: &dyn fmt::Display,
    forum: &ForumSnapshot,
    entries: Vec<ThreadEntry>,
) -> Vec<RenderedGroup> {
    if entries.is_empty() {
        return Vec::new();
    }

    let priority_tag = settings.priority_tag;

    let mut groups = match settings.grouping {
        GroupingMode::None => vec![RenderedGroup {
            key: String::new(),
            heading: None,
            entries: tag_priority(entries, priority_tag),
        }],
        GroupingMode::ByTag => group_by_tag(entries, settings.preferred_tags, priority_tag, forum),
        GroupingMode::ByTitlePattern(pattern) => match TitleGrouper::new(pattern) {
            Ok(grouper) => grouper.group(entries, priority_tag),
            Err(e) => {
                tracing::warn!("Index {} falls back to ungrouped listing: {}", label, e);
                vec![terminal_group(OTHER_GROUP, tag_priority(entries, priority_tag))]
            }
        },
        GroupingMode::ByFixedTaxonomy => {
            taxonomy::group_by_court(entries, settings.preferred_tags, priority_tag)
        }
    };

    for group in &mut groups {
        sort_entries(&mut group.entries);
    }
    move_terminal_groups_last(&mut groups);

    groups
}

/// Orders entries: leaders, then priority entries, then the rest, each alphabetically.
pub fn sort_entries(entries: &mut [GroupEntry]) {
    entries.sort_by(|a, b| {
        (!a.is_leader, !a.is_priority, a.entry.title.to_lowercase()).cmp(&(
            !b.is_leader,
            !b.is_priority,
            b.entry.title.to_lowercase(),
        ))
    });
}

fn tag_priority(entries: Vec<ThreadEntry>, priority_tag: Option<&str>) -> Vec<GroupEntry> {
    entries
        .into_iter()
        .map(|entry| {
            let is_priority = priority_tag.is_some_and(|tag| entry.has_tag(tag));
            GroupEntry::new(entry, is_priority)
        })
        .collect()
}

fn terminal_group(name: &str, entries: Vec<GroupEntry>) -> RenderedGroup {
    RenderedGroup {
        key: name.to_string(),
        heading: Some(name.to_string()),
        entries,
    }
}

/// Stable partition that moves "Other" and then "Inactive Characters" to the end.
fn move_terminal_groups_last(groups: &mut Vec<RenderedGroup>) {
    for name in [OTHER_GROUP, INACTIVE_GROUP] {
        if let Some(position) = groups.iter().position(|g| g.key == name) {
            let group = groups.remove(position);
            groups.push(group);
        }
    }
}

/// Groups by forum tag.
///
/// With preferred tags, an entry goes to the first of its own tags that is preferred, else to
/// "Other". Without preferred tags it goes to its first tag, else to "Other". Preferred groups
/// come first in the configured order, the remaining groups alphabetically.
fn group_by_tag(
    entries: Vec<ThreadEntry>,
    preferred: &[String],
    priority_tag: Option<&str>,
    forum: &ForumSnapshot,
) -> Vec<RenderedGroup> {
    let preferred_lower: Vec<String> = preferred.iter().map(|t| t.to_lowercase()).collect();
    let mut grouped: HashMap<String, Vec<GroupEntry>> = HashMap::new();

    for entry in tag_priority(entries, priority_tag) {
        let key = if preferred_lower.is_empty() {
            entry.entry.tags.first().cloned()
        } else {
            entry
                .entry
                .tags
                .iter()
                .find(|tag| preferred_lower.contains(&tag.to_lowercase()))
                .cloned()
        };
        grouped
            .entry(key.unwrap_or_else(|| OTHER_GROUP.to_string()))
            .or_default()
            .push(entry);
    }

    let mut keys: Vec<String> = grouped.keys().cloned().collect();
    keys.sort_by_key(|key| {
        let rank = preferred_lower
            .iter()
            .position(|p| *p == key.to_lowercase())
            .unwrap_or(usize::MAX);
        (rank, key.to_lowercase())
    });

    keys.into_iter()
        .filter_map(|key| {
            let entries = grouped.remove(&key)?;
            let heading = match forum.emoji_for(&key) {
                Some(emoji) if key != OTHER_GROUP => format!("{} {}", emoji, key),
                _ => key.clone(),
            };
            Some(RenderedGroup {
                key,
                heading: Some(heading),
                entries,
            })
        })
        .collect()
}

/// Sort tier of a title-pattern group; variants sort in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum GroupSortKey {
    /// Date code such as `SD1-582`: letters, then date (after the dash), then day.
    DateCode { prefix: String, date: u64, day: u64 },
    /// Key ending in a number.
    TrailingNumber(u64),
    /// Key containing a number somewhere.
    AnyNumber(u64),
    /// Anything else, case-insensitive.
    Text(String),
}

/// Extracts group keys from titles and orders the resulting groups.
pub struct TitleGrouper {
    pattern: TitlePattern,
    custom: Option<Regex>,
    date_code: Regex,
    date_number: Regex,
    dash_number: Regex,
    date_parts: Regex,
    trailing_number: Regex,
    any_number: Regex,
}

fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })
}

fn parse_number(digits: &str) -> u64 {
    digits.parse().unwrap_or(u64::MAX)
}

impl TitleGrouper {
    /// Compiles the regexes needed for `pattern`.
    ///
    /// # Returns
    /// - `Ok(TitleGrouper)` - Ready to group
    /// - `Err(ConfigError::InvalidPattern)` - Custom pattern does not compile
    pub fn new(pattern: &TitlePattern) -> Result<Self, ConfigError> {
        let custom = match pattern {
            TitlePattern::Custom(raw) => Some(compile(raw)?),
            _ => None,
        };

        Ok(Self {
            pattern: pattern.clone(),
            custom,
            date_code: compile(r"[A-Z]{2,4}\d+-\d+")?,
            date_number: compile(r"[A-Z]{2,4}\d+-(\d+)")?,
            dash_number: compile(r"-(\d+)(?:\s|$)")?,
            date_parts: compile(r"^([A-Z]{2,4})(\d+)-(\d+)")?,
            trailing_number: compile(r"(\d+)$")?,
            any_number: compile(r"\d+")?,
        })
    }

    /// Group key of a title, or `None` when the title does not match.
    ///
    /// An empty extraction counts as no match.
    pub fn extract(&self, title: &str) -> Option<String> {
        let key = match &self.pattern {
            TitlePattern::AfterDash => title
                .rsplit_once('-')
                .map(|(_, after)| after.trim().to_string()),
            TitlePattern::BeforeDash => title
                .split_once('-')
                .map(|(before, _)| before.trim().to_string()),
            TitlePattern::DateSuffix => self.full_code(title),
            TitlePattern::DateNumber => self
                .date_number
                .captures(title)
                .or_else(|| self.dash_number.captures(title))
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string()),
            TitlePattern::Custom(_) => self.custom.as_ref().and_then(|regex| {
                regex
                    .captures(title)
                    .and_then(|caps| caps.get(1).or_else(|| caps.get(0)))
                    .map(|m| m.as_str().to_string())
            }),
        };

        key.filter(|k| !k.is_empty())
    }

    /// First date code in a title, upper-cased.
    fn full_code(&self, title: &str) -> Option<String> {
        self.date_code
            .find(title)
            .map(|m| m.as_str().to_uppercase())
    }

    /// Sort tier of a group key or date code.
    pub fn sort_key(&self, key: &str) -> GroupSortKey {
        if let Some(caps) = self.date_parts.captures(key) {
            return GroupSortKey::DateCode {
                prefix: caps[1].to_uppercase(),
                date: parse_number(&caps[3]),
                day: parse_number(&caps[2]),
            };
        }
        if let Some(caps) = self.trailing_number.captures(key) {
            return GroupSortKey::TrailingNumber(parse_number(&caps[1]));
        }
        if let Some(found) = self.any_number.find(key) {
            return GroupSortKey::AnyNumber(parse_number(found.as_str()));
        }
        GroupSortKey::Text(key.to_lowercase())
    }

    /// Groups entries by extracted key; titles without a key go to "Other".
    ///
    /// In `date-number` mode a group sorts by the smallest full date code among its entries,
    /// so `SD1-9` comes before `SD1-582` numerically.
    pub fn group(
        &self,
        entries: Vec<ThreadEntry>,
        priority_tag: Option<&str>,
    ) -> Vec<RenderedGroup> {
        let mut grouped: HashMap<String, (GroupSortKey, Vec<GroupEntry>)> = HashMap::new();
        let mut other = Vec::new();

        for entry in tag_priority(entries, priority_tag) {
            let Some(key) = self.extract(&entry.entry.title) else {
                other.push(entry);
                continue;
            };

            let sort_key = match self.pattern {
                TitlePattern::DateNumber => self
                    .full_code(&entry.entry.title)
                    .map(|code| self.sort_key(&code))
                    .unwrap_or_else(|| self.sort_key(&key)),
                _ => self.sort_key(&key),
            };

            let slot = grouped
                .entry(key)
                .or_insert_with(|| (sort_key.clone(), Vec::new()));
            if sort_key < slot.0 {
                slot.0 = sort_key;
            }
            slot.1.push(entry);
        }

        let mut ordered: Vec<(String, GroupSortKey, Vec<GroupEntry>)> = grouped
            .into_iter()
            .map(|(key, (sort_key, entries))| (key, sort_key, entries))
            .collect();
        ordered.sort_by(|a, b| {
            a.1.cmp(&b.1)
                .then_with(|| a.0.to_lowercase().cmp(&b.0.to_lowercase()))
        });

        let mut groups: Vec<RenderedGroup> = ordered
            .into_iter()
            .map(|(key, _, entries)| RenderedGroup {
                heading: Some(key.clone()),
                key,
                entries,
            })
            .collect();

        if !other.is_empty() {
            groups.push(terminal_group(OTHER_GROUP, other));
        }

        groups
    }
}
