use serde_json::{json, Map, Value};

use crate::{context::TestContext, error::TestError};

/// Builder for creating test contexts with a seeded config file.
///
/// Provides a fluent interface for describing the config document the test starts from. When
/// nothing is added, `build()` leaves the config file absent so tests can cover the first-run
/// path.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::{builder::TestBuilder, factory};
///
/// let test = TestBuilder::new()
///     .with_index(factory::config::index_definition(1, 2, "Lore"))
///     .with_character_forums(1, &[10, 11])
///     .build()
///     .await?;
/// ```
pub struct TestBuilder {
    /// Top-level document under construction; `None` until something is added.
    document: Option<Map<String, Value>>,
    /// Raw file contents, written instead of `document` when set.
    raw: Option<String>,
}

impl TestBuilder {
    /// Creates a new test builder with no config file.
    ///
    /// # Returns
    /// - New `TestBuilder` instance
    pub fn new() -> Self {
        Self {
            document: None,
            raw: None,
        }
    }

    /// Seeds the config file with a complete document, replacing anything added before.
    ///
    /// # Arguments
    /// - `document` - JSON object to write as the config file
    ///
    /// # Returns
    /// - `Self` - Builder instance for method chaining
    pub fn with_config(mut self, document: Value) -> Self {
        self.document = Some(match document {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        });
        self
    }

    /// Seeds the config file with raw text, used for corrupt or empty files.
    pub fn with_raw_config(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }

    /// Adds an index definition under its `<guild_id>:<forum_id>` key.
    ///
    /// # Arguments
    /// - `definition` - Stored index definition, usually from `factory::config`
    ///
    /// # Returns
    /// - `Self` - Builder instance for method chaining
    pub fn with_index(mut self, definition: Value) -> Self {
        let key = format!(
            "{}:{}",
            definition["guild_id"].as_u64().unwrap_or_default(),
            definition["forum_id"].as_u64().unwrap_or_default()
        );
        self.section("indexes").insert(key, definition);
        self
    }

    /// Adds a group index under its `<guild_id>:<target_channel_id>` key.
    pub fn with_group_index(mut self, definition: Value) -> Self {
        let key = format!(
            "{}:{}",
            definition["guild_id"].as_u64().unwrap_or_default(),
            definition["target_channel_id"].as_u64().unwrap_or_default()
        );
        self.section("group_indexes").insert(key, definition);
        self
    }

    /// Registers character forums for a guild.
    pub fn with_character_forums(mut self, guild_id: u64, forum_ids: &[u64]) -> Self {
        self.section("character_forums")
            .insert(guild_id.to_string(), json!(forum_ids));
        self
    }

    /// Stores a fingerprint under `index_state` for the given index.
    pub fn with_fingerprint(mut self, guild_id: u64, forum_id: u64, chunks: &[&str]) -> Self {
        self.section("index_state").insert(
            format!("{}:{}", guild_id, forum_id),
            json!({ "last_chunks": chunks }),
        );
        self
    }

    /// Builds the test context and writes the config file if anything was seeded.
    ///
    /// # Returns
    /// - `Ok(TestContext)` - Context ready for use
    /// - `Err(TestError)` - Scratch directory or config file could not be written
    pub async fn build(self) -> Result<TestContext, TestError> {
        let context = TestContext::new()?;

        if let Some(raw) = self.raw {
            context.write_raw_config(&raw).await?;
        } else if let Some(document) = self.document {
            context.write_config(&Value::Object(document)).await?;
        }

        Ok(context)
    }

    fn section(&mut self, name: &str) -> &mut Map<String, Value> {
        let document = self.document.get_or_insert_with(Map::new);
        let entry = document
            .entry(name.to_string())
            .or_insert_with(|| Value::Object(Map::new()));

        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        entry
            .as_object_mut()
            .expect("Config section should be an object")
    }
}

impl Default for TestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
