//! Fixed court taxonomy used by character indexes.
//!
//! Every entry lands in at most one court, decided by its tags after normalization
//! (`"The Night Court"` becomes `"night"`). Inactive characters are pulled out of their court
//! into a terminal group, and members of the high council are marked as leaders.

use std::collections::HashMap;

use crate::model::group::{GroupEntry, RenderedGroup, INACTIVE_GROUP, OTHER_GROUP};
use crate::model::thread::ThreadEntry;

/// Courts in their default order: normalized tag, heading.
const COURTS: [(&str, &str); 7] = [
    ("night", "💫 Night Court"),
    ("day", "☀️ Day Court"),
    ("dawn", "🌄 Dawn Court"),
    ("spring", "🌿 Spring Court"),
    ("summer", "🌊 Summer Court"),
    ("autumn", "🍁 Autumn Court"),
    ("winter", "❄️ Winter Court"),
];

const LEADER_TAG: &str = "high council";
const INACTIVE_TAG: &str = "inactive";

/// Lower-cases a tag and strips a leading `the ` and a trailing ` court`.
pub fn normalize_tag(tag: &str) -> String {
    let tag = tag.trim().to_lowercase();
    let tag = tag.strip_prefix("the ").unwrap_or(&tag);
    let tag = tag.strip_suffix(" court").unwrap_or(tag);
    tag.trim().to_string()
}

/// Court order for an index.
///
/// Without preferred tags the default order applies. Otherwise courts named in `preferred`
/// come first, in that order, and the remaining courts follow alphabetically by name.
///
/// A preferred tag names a court when it contains the court's key, so `"Night Court"` and
/// `"night"` both select the Night Court. Preferred tags naming no court are ignored.
pub fn court_order(preferred: &[String]) -> Vec<(&'static str, &'static str)> {
    if preferred.is_empty() {
        return COURTS.to_vec();
    }

    let mut order: Vec<(&str, &str)> = Vec::with_capacity(COURTS.len());
    for tag in preferred {
        let tag = tag.to_lowercase();
        if let Some(court) = COURTS.iter().find(|(key, _)| tag.contains(key)) {
            if !order.contains(court) {
                order.push(*court);
            }
        }
    }

    let mut rest: Vec<(&str, &str)> = COURTS
        .into_iter()
        .filter(|court| !order.contains(court))
        .collect();
    rest.sort_by_key(|(key, _)| *key);
    order.extend(rest);

    order
}

/// Groups entries by court.
///
/// # Arguments
/// - `entries` - Threads to group
/// - `preferred` - Preferred court order from the index definition
/// - `priority_tag` - Tag that moves entries to the front of their group
///
/// # Returns
/// - `Vec<RenderedGroup>` - Non-empty courts in order, then "Other", then "Inactive Characters"
pub fn group_by_court(
    entries: Vec<ThreadEntry>,
    preferred: &[String],
    priority_tag: Option<&str>,
) -> Vec<RenderedGroup> {
    let order = court_order(preferred);
    let mut courts: HashMap<&str, Vec<GroupEntry>> = HashMap::new();
    let mut other = Vec::new();
    let mut inactive = Vec::new();

    for entry in entries {
        let tags: Vec<String> = entry.tags.iter().map(|t| normalize_tag(t)).collect();
        let is_leader = tags.iter().any(|t| t.contains(LEADER_TAG));
        let is_inactive = tags.iter().any(|t| t.contains(INACTIVE_TAG));
        let court = order
            .iter()
            .find(|(key, _)| tags.iter().any(|t| t == key))
            .map(|(key, _)| *key);

        let is_priority = priority_tag.is_some_and(|tag| entry.has_tag(tag));
        let mut grouped = GroupEntry::new(entry, is_priority);

        match court {
            _ if is_inactive => inactive.push(grouped),
            Some(key) => {
                grouped.is_leader = is_leader;
                courts.entry(key).or_default().push(grouped);
            }
            None => other.push(grouped),
        }
    }

    let mut groups: Vec<RenderedGroup> = order
        .iter()
        .filter_map(|(key, heading)| {
            courts.remove(key).map(|entries| RenderedGroup {
                key: key.to_string(),
                heading: Some(heading.to_string()),
                entries,
            })
        })
        .collect();

    for (name, entries) in [(OTHER_GROUP, other), (INACTIVE_GROUP, inactive)] {
        if !entries.is_empty() {
            groups.push(RenderedGroup {
                key: name.to_string(),
                heading: Some(name.to_string()),
                entries,
            });
        }
    }

    groups
}
