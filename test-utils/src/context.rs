use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::error::TestError;

/// Test context containing a scratch directory and the config file location inside it.
///
/// The directory and everything in it are removed when the context is dropped, so keep the
/// context alive for as long as the test uses the config path.
pub struct TestContext {
    /// Scratch directory owned by this test.
    pub dir: TempDir,

    /// Path of the config file. It only exists on disk when the builder seeded a document.
    pub config_path: PathBuf,
}

impl TestContext {
    /// Creates a new context with an empty scratch directory.
    ///
    /// The config path points to `data/index_config.json` inside the directory, mirroring the
    /// default layout of the bot, and the `data` directory itself is not created.
    ///
    /// # Returns
    /// - `Ok(TestContext)` - New context
    /// - `Err(TestError::Io)` - Scratch directory could not be created
    pub fn new() -> Result<Self, TestError> {
        let dir = tempfile::tempdir()?;
        let config_path = dir.path().join("data").join("index_config.json");

        Ok(Self { dir, config_path })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Location for a second data file next to the config file.
    pub fn data_path(&self, file_name: &str) -> PathBuf {
        self.dir.path().join("data").join(file_name)
    }

    /// Writes `document` as the config file, creating its directory.
    ///
    /// # Arguments
    /// - `document` - JSON value to store
    ///
    /// # Returns
    /// - `Ok(())` - File written
    /// - `Err(TestError)` - Directory or file could not be written
    pub async fn write_config(&self, document: &Value) -> Result<(), TestError> {
        self.write_raw_config(&serde_json::to_string_pretty(document)?)
            .await
    }

    /// Writes `raw` verbatim as the config file, e.g. to test corrupt documents.
    pub async fn write_raw_config(&self, raw: &str) -> Result<(), TestError> {
        if let Some(parent) = self.config_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.config_path, raw).await?;

        Ok(())
    }

    /// Reads the config file back as raw JSON.
    ///
    /// Assertions on the raw document check the on-disk layout independently of the bot's
    /// own deserialization.
    ///
    /// # Returns
    /// - `Ok(Value)` - Parsed document
    /// - `Err(TestError)` - File missing or not valid JSON
    pub async fn read_config(&self) -> Result<Value, TestError> {
        let raw = tokio::fs::read_to_string(&self.config_path).await?;
        Ok(serde_json::from_str(&raw)?)
    }
}
