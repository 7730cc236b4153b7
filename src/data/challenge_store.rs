//! Dice challenge records, keyed by character thread title.

use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::data::json_file::JsonFile;
use crate::error::AppError;
use crate::model::challenge::{ChallengeRecord, GameOutcome, RecordAdjustment};

type Records = BTreeMap<String, ChallengeRecord>;

#[derive(Clone)]
pub struct ChallengeStore {
    file: JsonFile<Records>,
}

impl ChallengeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub async fn ensure_file(&self) -> Result<(), AppError> {
        self.file.ensure().await
    }

    /// Record of one character; all zero when none was stored.
    pub async fn get(&self, character: &str) -> Result<ChallengeRecord, AppError> {
        Ok(self
            .file
            .load()
            .await?
            .remove(character)
            .unwrap_or_default())
    }

    /// Counts one game for both sides in a single write.
    ///
    /// # Returns
    /// - `Ok((winner, loser))` - Both records after the update
    pub async fn record_result(
        &self,
        winner: &str,
        loser: &str,
        at: NaiveDateTime,
    ) -> Result<(ChallengeRecord, ChallengeRecord), AppError> {
        self.file
            .update(|records| {
                let won = records.entry(winner.to_string()).or_default();
                won.record(GameOutcome::Win, loser, at);
                let won = won.clone();

                let lost = records.entry(loser.to_string()).or_default();
                lost.record(GameOutcome::Loss, winner, at);

                Ok((won, lost.clone()))
            })
            .await
    }

    /// Applies an adjustment.
    ///
    /// # Returns
    /// - `Ok((record, changes))` - Record after the update and the changed values
    pub async fn adjust(
        &self,
        character: &str,
        adjustment: RecordAdjustment,
    ) -> Result<(ChallengeRecord, Vec<String>), AppError> {
        self.file
            .update(|records| {
                let record = records.entry(character.to_string()).or_default();
                let changes = record.adjust(adjustment);
                Ok((record.clone(), changes))
            })
            .await
    }

    pub async fn reset(&self, character: &str) -> Result<ChallengeRecord, AppError> {
        self.file
            .update(|records| {
                let record = records.entry(character.to_string()).or_default();
                record.reset();
                Ok(record.clone())
            })
            .await
    }

    /// Remembers the summary message posted for a character.
    pub async fn set_last_message(&self, character: &str, message_id: u64) -> Result<(), AppError> {
        self.file
            .update(|records| {
                records
                    .entry(character.to_string())
                    .or_default()
                    .last_message_id = Some(message_id);
                Ok(())
            })
            .await
    }
}
