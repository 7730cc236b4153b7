//! Dice challenge bookkeeping.
//!
//! Characters are looked up in the character cache, so records are keyed by the exact title
//! of the character's thread. After a game both characters get their summary posted into
//! their thread; the previous summary is edited in place when it still exists.

use chrono::{NaiveDateTime, Utc};
use dioxus_logger::tracing;
use std::sync::Arc;

use crate::data::challenge_store::ChallengeStore;
use crate::error::AppError;
use crate::model::{
    challenge::{ChallengeRecord, RecordAdjustment},
    character::CharacterEntry,
};
use crate::service::{
    character::CharacterService,
    index::channel::{ChannelGateway, Container},
};
use crate::util::retry::{with_backoff, RetryPolicy};

/// Result of `record`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameReport {
    pub winner: CharacterEntry,
    pub loser: CharacterEntry,
    pub winner_record: ChallengeRecord,
    pub loser_record: ChallengeRecord,
    /// Summaries that could not be posted.
    pub unpublished: Vec<String>,
}

#[derive(Clone)]
pub struct ChallengeService {
    store: ChallengeStore,
    characters: CharacterService,
    gateway: Arc<dyn ChannelGateway>,
    retry: RetryPolicy,
}

impl ChallengeService {
    pub fn new(
        store: ChallengeStore,
        characters: CharacterService,
        gateway: Arc<dyn ChannelGateway>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            characters,
            gateway,
            retry,
        }
    }

    /// Resolves a typed name to a character thread.
    ///
    /// # Returns
    /// - `Ok(CharacterEntry)` - Closest character
    /// - `Err(AppError::NotFound)` - No character close enough
    async fn find(&self, guild_id: u64, query: &str) -> Result<CharacterEntry, AppError> {
        self.characters
            .search(guild_id, query)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Could not find character **{}**.", query.trim()))
            })
    }

    pub async fn view(
        &self,
        guild_id: u64,
        query: &str,
    ) -> Result<(CharacterEntry, ChallengeRecord), AppError> {
        let character = self.find(guild_id, query).await?;
        let record = self.store.get(&character.title).await?;
        Ok((character, record))
    }

    pub async fn adjust(
        &self,
        guild_id: u64,
        query: &str,
        adjustment: RecordAdjustment,
    ) -> Result<(CharacterEntry, ChallengeRecord, Vec<String>), AppError> {
        let character = self.find(guild_id, query).await?;
        let (record, changes) = self.store.adjust(&character.title, adjustment).await?;

        tracing::info!(
            "Adjusted challenge record of {} ({} changes)",
            character.title,
            changes.len()
        );
        Ok((character, record, changes))
    }

    pub async fn reset(&self, guild_id: u64, query: &str) -> Result<CharacterEntry, AppError> {
        let character = self.find(guild_id, query).await?;
        self.store.reset(&character.title).await?;

        tracing::info!("Reset challenge record of {}", character.title);
        Ok(character)
    }

    /// Records a finished game now.
    pub async fn record(
        &self,
        guild_id: u64,
        winner: &str,
        loser: &str,
    ) -> Result<GameReport, AppError> {
        self.record_at(guild_id, winner, loser, Utc::now().naive_utc())
            .await
    }

    /// Records a finished game and posts both summaries.
    ///
    /// # Returns
    /// - `Ok(GameReport)` - Records updated; `unpublished` names threads that were not updated
    /// - `Err(AppError::BadRequest)` - Both names resolve to the same character
    /// - `Err(AppError::NotFound)` - A name matches no character
    pub async fn record_at(
        &self,
        guild_id: u64,
        winner: &str,
        loser: &str,
        at: NaiveDateTime,
    ) -> Result<GameReport, AppError> {
        let winner = self.find(guild_id, winner).await?;
        let loser = self.find(guild_id, loser).await?;
        if winner.thread_id == loser.thread_id {
            return Err(AppError::BadRequest(
                "Winner and loser must be different characters.".to_string(),
            ));
        }

        let (winner_record, loser_record) = self
            .store
            .record_result(&winner.title, &loser.title, at)
            .await?;
        tracing::info!("Recorded dice challenge: {} beat {}", winner.title, loser.title);

        let mut unpublished = Vec::new();
        for (character, record) in [(&winner, &winner_record), (&loser, &loser_record)] {
            if let Err(e) = self.publish(character, record).await {
                tracing::warn!(
                    "Failed to post challenge summary for {}: {}",
                    character.title,
                    e
                );
                unpublished.push(character.title.clone());
            }
        }

        Ok(GameReport {
            winner_record: self.store.get(&winner.title).await?,
            loser_record: self.store.get(&loser.title).await?,
            winner,
            loser,
            unpublished,
        })
    }

    /// Writes the summary into the character's thread.
    ///
    /// Edits the previous summary when possible, otherwise deletes what is left of it and
    /// posts a new one.
    async fn publish(
        &self,
        character: &CharacterEntry,
        record: &ChallengeRecord,
    ) -> Result<(), AppError> {
        let thread = self
            .gateway
            .resolve(character.thread_id)
            .await?
            .and_then(Container::into_messages)
            .ok_or_else(|| {
                AppError::NotFound(format!("Thread of {} is unavailable", character.title))
            })?;
        let summary = record.summary();

        if let Some(message_id) = record.last_message_id {
            match thread.edit(message_id, &summary).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::debug!(
                        "Summary {} of {} cannot be edited, reposting: {}",
                        message_id,
                        character.title,
                        e
                    );
                    if let Err(e) = thread.delete(message_id).await {
                        tracing::debug!("Old summary {} not deleted: {}", message_id, e);
                    }
                }
            }
        }

        let posted = with_backoff(&self.retry, "Post challenge summary", || {
            thread.send(&summary)
        })
        .await?;
        self.store
            .set_last_message(&character.title, posted.id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::config_store::ConfigStore;
    use crate::service::fake::{entry, snapshot, FakeGateway, FakeThread};
    use chrono::NaiveDate;
    use test_utils::{builder::TestBuilder, context::TestContext};

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    /// Character forum 10 with threads Ash (2) and Rook (3).
    async fn setup() -> (TestContext, Arc<FakeGateway>, ChallengeService) {
        let test = TestBuilder::new()
            .with_character_forums(1, &[10])
            .build()
            .await
            .unwrap();
        let gateway = FakeGateway::new();
        let forum = gateway.add_forum(snapshot(10, &[]));
        forum.add_active(entry(2, "Ash", &[]));
        forum.add_active(entry(3, "Rook", &[]));
        gateway.add_thread(FakeThread::new(2).named("Ash"));
        gateway.add_thread(FakeThread::new(3).named("Rook"));

        let characters =
            CharacterService::new(ConfigStore::new(test.config_path()), gateway.clone());
        let service = ChallengeService::new(
            ChallengeStore::new(test.data_path("dice_challenges.json")),
            characters,
            gateway.clone(),
            RetryPolicy::immediate(1),
        );

        (test, gateway, service)
    }

    /// Tests recording a game between two characters.
    ///
    /// Expected: both threads get their summary and the message ids are stored
    #[tokio::test]
    async fn record_posts_both_summaries() -> Result<(), AppError> {
        let (_test, gateway, service) = setup().await;

        let report = service.record_at(1, "ash", "Rook", at()).await?;

        assert!(report.unpublished.is_empty());
        let ash = gateway.thread(2).unwrap();
        let rook = gateway.thread(3).unwrap();
        assert_eq!(ash.contents(), vec![report.winner_record.summary()]);
        assert!(rook.contents()[0].contains("**Current Loss Streak:** 1 loss"));
        assert_eq!(report.winner_record.last_message_id, Some(ash.message_ids()[0]));

        Ok(())
    }

    /// Tests a second game between the same characters.
    ///
    /// Expected: the existing summaries are edited, nothing new is posted
    #[tokio::test]
    async fn second_game_edits_summary() -> Result<(), AppError> {
        let (_test, gateway, service) = setup().await;

        service.record_at(1, "Ash", "Rook", at()).await?;
        let report = service.record_at(1, "Ash", "Rook", at()).await?;

        let ash = gateway.thread(2).unwrap();
        assert_eq!(ash.contents().len(), 1);
        assert!(ash.contents()[0].contains("**Current Win Streak:** 2 wins"));
        assert_eq!(report.loser_record.current_loss_streak, 2);

        Ok(())
    }

    /// Tests a summary that can no longer be edited.
    ///
    /// Expected: the summary is posted again and its new id stored
    #[tokio::test]
    async fn failed_edit_reposts_summary() -> Result<(), AppError> {
        let (_test, gateway, service) = setup().await;
        service.record_at(1, "Ash", "Rook", at()).await?;
        let ash = gateway.thread(2).unwrap();
        let first = ash.message_ids()[0];

        ash.fail_next_edits(1);
        let report = service.record_at(1, "Ash", "Rook", at()).await?;

        assert_eq!(ash.contents().len(), 1);
        assert_ne!(report.winner_record.last_message_id, Some(first));
        assert_eq!(report.winner_record.last_message_id, Some(ash.message_ids()[0]));

        Ok(())
    }

    /// Tests recording a game against oneself.
    ///
    /// Expected: Err with BadRequest, nothing recorded
    #[tokio::test]
    async fn same_character_is_rejected() -> Result<(), AppError> {
        let (_test, _gateway, service) = setup().await;

        let result = service.record_at(1, "Ash", "ash", at()).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert_eq!(service.view(1, "Ash").await?.1.total_games, 0);

        Ok(())
    }

    /// Tests a name that matches no character.
    ///
    /// Expected: Err with NotFound
    #[tokio::test]
    async fn unknown_character_is_not_found() {
        let (_test, _gateway, service) = setup().await;

        let result = service.reset(1, "Zzzzzz").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    /// Tests a character whose thread is gone.
    ///
    /// Expected: the game still counts, the missing thread is reported
    #[tokio::test]
    async fn missing_thread_is_reported() -> Result<(), AppError> {
        let (_test, gateway, service) = setup().await;
        gateway.remove_thread(3);

        let report = service.record_at(1, "Ash", "Rook", at()).await?;

        assert_eq!(report.unpublished, vec!["Rook".to_string()]);
        assert_eq!(report.loser_record.losses, 1);

        Ok(())
    }
}
