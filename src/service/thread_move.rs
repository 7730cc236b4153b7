//! Copies a thread into another forum or text channel.
//!
//! Discord cannot move a thread between channels, so a move re-posts the history of the source
//! thread at the destination and optionally archives and locks the source afterwards.

use dioxus_logger::tracing;
use std::sync::Arc;

use crate::error::AppError;
use crate::model::thread::{jump_url, Draft, PostedMessage};
use crate::service::index::{
    channel::{ChannelGateway, Container, MessageContainer, ThreadContainer},
    collector::ThreadListing,
};
use crate::util::{
    retry::{with_backoff, RetryPolicy},
    throttle::Throttle,
};

/// Longest message Discord accepts.
pub const MESSAGE_LIMIT: usize = 2000;
/// Size of the pieces an over-long message is cut into.
const PIECE_SIZE: usize = 1900;

pub const NOT_IN_THREAD: &str = "❌ This command must be used inside a thread.";

/// Forums that `/move character` can send a character thread to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CharacterForums {
    pub characters: Option<u64>,
    pub npc: Option<u64>,
    pub graveyard: Option<u64>,
}

/// Where `/move character` sends a thread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CharacterDestination {
    Characters,
    Npc,
    /// Replaces the opening post with the player and the cause of death.
    Graveyard {
        played_by: String,
        cause_of_death: String,
    },
}

/// A `/move thread` invocation.
#[derive(Clone, Debug)]
pub struct MoveRequest {
    pub guild_id: u64,
    pub source_id: u64,
    pub destination_id: u64,
    /// New thread name; blank keeps the source name.
    pub rename: Option<String>,
    pub archive_original: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveReport {
    /// Jump URL of the destination thread or channel.
    pub destination_url: String,
    /// Source messages copied.
    pub copied: usize,
    /// Pieces that could not be posted.
    pub failed: usize,
    pub archived: bool,
}

#[derive(Clone)]
pub struct ThreadMover {
    gateway: Arc<dyn ChannelGateway>,
    retry: RetryPolicy,
    throttle: Throttle,
    character_forums: CharacterForums,
}

impl ThreadMover {
    pub fn new(
        gateway: Arc<dyn ChannelGateway>,
        retry: RetryPolicy,
        throttle: Throttle,
        character_forums: CharacterForums,
    ) -> Self {
        Self {
            gateway,
            retry,
            throttle,
            character_forums,
        }
    }

    /// Copies a thread with its attachments to a forum or text channel.
    ///
    /// In a forum, an existing thread with the same name (ignoring case) receives the whole
    /// history; otherwise a new post is opened with the first message. In a text channel a
    /// header naming the thread is posted before the history.
    ///
    /// # Arguments
    /// - `request` - Source, destination and options of the move
    ///
    /// # Returns
    /// - `Ok(MoveReport)` - Where the history went and how much of it was copied
    /// - `Err(AppError::BadRequest)` - Source is not a thread or has nothing to copy
    /// - `Err(AppError::NotFound)` - Destination channel is gone
    pub async fn move_thread(&self, request: &MoveRequest) -> Result<MoveReport, AppError> {
        let source = self.source(request.source_id).await?;
        let history = movable(source.messages().await?);
        if history.is_empty() {
            return Err(AppError::BadRequest("No messages to move.".to_string()));
        }

        let name = request
            .rename
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(source.name())
            .to_string();
        let drafts: Vec<Draft> = history.iter().flat_map(|m| drafts_for(m, true)).collect();

        let mut report = MoveReport {
            copied: history.len(),
            ..Default::default()
        };

        match self.destination(request.destination_id).await? {
            Container::Forum(forum) => {
                let (thread, remaining) =
                    self.open_in_forum(forum.as_ref(), &name, &drafts).await?;
                report.failed = self.copy(thread.as_ref(), remaining).await;
                report.destination_url = jump_url(request.guild_id, thread.id());
            }
            Container::Messages(channel) => {
                let header = Draft::text(format!("**Moved Thread:** {}", name));
                self.post(channel.as_ref(), &header).await?;
                report.failed = self.copy(channel.as_ref(), &drafts).await;
                report.destination_url = jump_url(request.guild_id, channel.id());
            }
        }

        if request.archive_original {
            report.archived = self.archive(source.as_ref()).await;
        }

        tracing::info!(
            "Moved thread {} ({}) to {}: {} messages, {} failed pieces",
            name,
            request.source_id,
            report.destination_url,
            report.copied,
            report.failed
        );

        Ok(report)
    }

    /// Copies a character thread into one of the character forums.
    ///
    /// Only the opening post keeps its files; later messages are copied as text and empty ones
    /// are skipped. The source thread is left as it is.
    pub async fn move_character(
        &self,
        guild_id: u64,
        source_id: u64,
        destination: &CharacterDestination,
    ) -> Result<MoveReport, AppError> {
        let forum_id = match destination {
            CharacterDestination::Characters => self.character_forums.characters,
            CharacterDestination::Npc => self.character_forums.npc,
            CharacterDestination::Graveyard { .. } => self.character_forums.graveyard,
        }
        .ok_or_else(|| AppError::NotFound("Destination forum not found.".to_string()))?;

        let Some(Container::Forum(forum)) = self.gateway.resolve(forum_id).await? else {
            return Err(AppError::NotFound("Destination forum not found.".to_string()));
        };

        let source = self.source(source_id).await?;
        let history = movable(source.messages().await?);
        let Some((first, rest)) = history.split_first() else {
            return Err(AppError::BadRequest("No messages to move.".to_string()));
        };

        let opening = match destination {
            CharacterDestination::Graveyard {
                played_by,
                cause_of_death,
            } => Draft {
                content: format!(
                    "**Played by:** {}\n**Cause of death:** {}",
                    played_by, cause_of_death
                ),
                attachments: first.attachments.clone(),
                thumb_url: None,
            },
            _ => Draft {
                content: truncate(&first.content),
                attachments: first.attachments.clone(),
                thumb_url: None,
            },
        };

        let name = source.name().to_string();
        let thread_id = with_backoff(&self.retry, "Create moved thread", || {
            forum.create_thread(&name, &opening)
        })
        .await?;
        let thread = self.resolve_thread(thread_id).await?;

        let drafts: Vec<Draft> = rest
            .iter()
            .filter(|m| !m.content.trim().is_empty())
            .flat_map(|m| drafts_for(m, false))
            .collect();
        let failed = self.copy(thread.as_ref(), &drafts).await;

        tracing::info!("Moved character thread {} to forum {}", name, forum_id);

        Ok(MoveReport {
            destination_url: jump_url(guild_id, thread_id),
            copied: history.len(),
            failed,
            archived: false,
        })
    }

    async fn source(&self, source_id: u64) -> Result<Arc<dyn MessageContainer>, AppError> {
        self.gateway
            .resolve(source_id)
            .await?
            .and_then(Container::into_messages)
            .ok_or_else(|| AppError::BadRequest(NOT_IN_THREAD.to_string()))
    }

    async fn destination(&self, destination_id: u64) -> Result<Container, AppError> {
        self.gateway
            .resolve(destination_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Destination channel not found.".to_string()))
    }

    async fn resolve_thread(&self, thread_id: u64) -> Result<Arc<dyn MessageContainer>, AppError> {
        self.gateway
            .resolve(thread_id)
            .await?
            .and_then(Container::into_messages)
            .ok_or_else(|| AppError::InternalError(format!("Thread {} vanished", thread_id)))
    }

    /// Finds or creates the destination thread.
    ///
    /// # Returns
    /// - `Ok((thread, remaining))` - The thread and the drafts still to post in it
    async fn open_in_forum<'a>(
        &self,
        forum: &dyn ThreadContainer,
        name: &str,
        drafts: &'a [Draft],
    ) -> Result<(Arc<dyn MessageContainer>, &'a [Draft]), AppError> {
        let listing = ThreadListing::gather(forum).await;

        if let Some(existing) = listing.find_by_name(name) {
            let thread = self.resolve_thread(existing.id).await?;
            if thread.is_archived() {
                with_backoff(&self.retry, "Reopen destination thread", || thread.reopen())
                    .await?;
            }
            tracing::debug!("Appending to existing thread {} in forum {}", name, forum.snapshot().id);
            return Ok((thread, drafts));
        }

        let Some((opening, rest)) = drafts.split_first() else {
            return Err(AppError::BadRequest("No messages to move.".to_string()));
        };
        let thread_id = with_backoff(&self.retry, "Create moved thread", || {
            forum.create_thread(name, opening)
        })
        .await?;

        Ok((self.resolve_thread(thread_id).await?, rest))
    }

    async fn post(&self, target: &dyn MessageContainer, draft: &Draft) -> Result<(), AppError> {
        with_backoff(&self.retry, "Copy message", || target.post(draft)).await?;
        Ok(())
    }

    /// Posts every draft in order. A failed piece is logged and skipped.
    ///
    /// # Returns
    /// - `usize` - Number of pieces that failed
    async fn copy(&self, target: &dyn MessageContainer, drafts: &[Draft]) -> usize {
        let mut failed = 0;

        for (position, draft) in drafts.iter().enumerate() {
            if position > 0 {
                self.throttle.pause().await;
            }
            if let Err(e) = self.post(target, draft).await {
                tracing::error!("Failed to copy a message into {}: {}", target.id(), e);
                failed += 1;
            }
        }

        failed
    }

    async fn archive(&self, source: &dyn MessageContainer) -> bool {
        match with_backoff(&self.retry, "Archive moved thread", || source.archive()).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Could not archive thread {}: {}", source.id(), e);
                false
            }
        }
    }
}

/// Messages worth copying: user messages with text or files.
fn movable(history: Vec<PostedMessage>) -> Vec<PostedMessage> {
    history
        .into_iter()
        .filter(|m| m.user_content && (!m.content.trim().is_empty() || !m.attachments.is_empty()))
        .collect()
}

/// Cuts a message into pieces Discord accepts. Files ride on the last piece.
fn drafts_for(message: &PostedMessage, with_files: bool) -> Vec<Draft> {
    let mut drafts: Vec<Draft> = split_content(&message.content)
        .into_iter()
        .map(Draft::text)
        .collect();

    if with_files {
        if let Some(last) = drafts.last_mut() {
            last.attachments = message.attachments.clone();
        }
    }

    drafts
}

/// Splits text longer than `MESSAGE_LIMIT` characters into `PIECE_SIZE` pieces.
pub fn split_content(content: &str) -> Vec<String> {
    if content.chars().count() <= MESSAGE_LIMIT {
        return vec![content.to_string()];
    }

    content
        .chars()
        .collect::<Vec<_>>()
        .chunks(PIECE_SIZE)
        .map(|piece| piece.iter().collect())
        .collect()
}

fn truncate(content: &str) -> String {
    content.chars().take(MESSAGE_LIMIT).collect()
}
