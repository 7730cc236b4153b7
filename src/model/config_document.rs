//! In-memory shape of the JSON config file.
//!
//! ```json
//! {
//!   "indexes": { "<guild_id>:<forum_id>": { ...index definition... } },
//!   "character_forums": { "<guild_id>": [<forum_id>, ...] },
//!   "group_indexes": { "<guild_id>:<target_channel_id>": { ...group index... } },
//!   "index_state": { "<guild_id>:<forum_id>": { "last_chunks": [...] } }
//! }
//! ```
//!
//! Missing keys default to empty containers. Group indexes stay raw JSON and are parsed one
//! entry at a time, so a malformed entry only hides itself. Unknown top-level keys are carried
//! through every save.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::model::{index::IndexDefinition, state::PersistedIndexState};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(default)]
    pub indexes: BTreeMap<String, IndexDefinition>,
    #[serde(default, deserialize_with = "deserialize_character_forums")]
    pub character_forums: BTreeMap<String, Vec<u64>>,
    #[serde(default)]
    pub group_indexes: Map<String, Value>,
    #[serde(default)]
    pub index_state: BTreeMap<String, PersistedIndexState>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Character forum entry as found on disk: older files stored a single forum id per guild.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredForumList {
    Single(u64),
    Many(Vec<u64>),
    Unknown(Value),
}

fn deserialize_character_forums<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, Vec<u64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let stored = BTreeMap::<String, StoredForumList>::deserialize(deserializer)?;

    Ok(stored
        .into_iter()
        .filter_map(|(guild, forums)| {
            let forums = match forums {
                StoredForumList::Single(id) => vec![id],
                StoredForumList::Many(ids) => ids,
                StoredForumList::Unknown(_) => Vec::new(),
            };
            (!forums.is_empty()).then_some((guild, forums))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Tests loading a document where every key is missing.
    ///
    /// Expected: Ok with empty containers
    #[test]
    fn missing_keys_default_to_empty() {
        let document: ConfigDocument = serde_json::from_value(json!({})).unwrap();

        assert_eq!(document, ConfigDocument::default());
    }

    /// Tests reading the legacy single-id character forum format.
    ///
    /// Expected: Ok with the id wrapped in a list and garbage entries dropped
    #[test]
    fn migrates_legacy_character_forum() {
        let document: ConfigDocument = serde_json::from_value(json!({
            "character_forums": { "1": 42, "2": [7, 8], "3": "bogus" }
        }))
        .unwrap();

        assert_eq!(document.character_forums.get("1"), Some(&vec![42]));
        assert_eq!(document.character_forums.get("2"), Some(&vec![7, 8]));
        assert!(!document.character_forums.contains_key("3"));
    }

    /// Tests that unknown keys and group indexes survive a save.
    ///
    /// Expected: Ok with both present in the serialized output
    #[test]
    fn preserves_unknown_keys() {
        let document: ConfigDocument = serde_json::from_value(json!({
            "group_indexes": { "1:5": { "group_index_name": "All" } },
            "schema_note": "kept"
        }))
        .unwrap();

        let saved = serde_json::to_value(&document).unwrap();
        assert_eq!(saved["group_indexes"]["1:5"]["group_index_name"], json!("All"));
        assert_eq!(saved["schema_note"], json!("kept"));
        assert_eq!(saved["indexes"], json!({}));
    }
}
