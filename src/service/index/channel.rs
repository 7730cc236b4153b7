//! Capability interfaces over Discord channels.
//!
//! Services never touch serenity directly. A channel id is resolved once into a
//! `Container`, which is either a forum that holds threads or something that holds messages
//! (a thread or a text channel). The production implementation lives in `discord.rs`; tests
//! provide in-memory fakes.

use serenity::async_trait;
use std::sync::Arc;

use crate::error::AppError;
use crate::model::thread::{Draft, ForumSnapshot, PostedMessage, ThreadEntry};

/// A channel whose children are threads: a forum or media channel.
#[async_trait]
pub trait ThreadContainer: Send + Sync {
    /// Forum metadata captured when the container was resolved.
    fn snapshot(&self) -> &ForumSnapshot;

    /// Threads that are currently active.
    async fn active_threads(&self) -> Result<Vec<ThreadEntry>, AppError>;

    /// Every archived public thread, across all pages.
    async fn archived_threads(&self) -> Result<Vec<ThreadEntry>, AppError>;

    /// Creates a post whose starter message is `opening`.
    ///
    /// # Returns
    /// - `Ok(u64)` - Id of the new thread
    async fn create_thread(&self, name: &str, opening: &Draft) -> Result<u64, AppError>;
}

/// A channel holding a flat list of messages: a thread or a text channel.
#[async_trait]
pub trait MessageContainer: Send + Sync {
    fn id(&self) -> u64;

    /// Channel or thread name at the time it was resolved.
    fn name(&self) -> &str;

    /// Whether the container is an archived thread. Archived threads reject message edits.
    fn is_archived(&self) -> bool {
        false
    }

    /// Unarchives the container.
    async fn reopen(&self) -> Result<(), AppError> {
        Ok(())
    }

    /// Full message history, oldest first.
    async fn messages(&self) -> Result<Vec<PostedMessage>, AppError>;

    async fn send(&self, content: &str) -> Result<PostedMessage, AppError>;

    /// Sends a message with attachments. Files that cannot be fetched are left out.
    async fn post(&self, draft: &Draft) -> Result<PostedMessage, AppError>;

    async fn edit(&self, message_id: u64, content: &str) -> Result<(), AppError>;

    async fn delete(&self, message_id: u64) -> Result<(), AppError>;

    async fn rename(&self, name: &str) -> Result<(), AppError>;

    /// Archives and locks the thread.
    async fn archive(&self) -> Result<(), AppError>;
}

/// A resolved channel, tagged by capability.
#[derive(Clone)]
pub enum Container {
    Forum(Arc<dyn ThreadContainer>),
    Messages(Arc<dyn MessageContainer>),
}

impl Container {
    pub fn as_forum(&self) -> Option<&Arc<dyn ThreadContainer>> {
        match self {
            Container::Forum(forum) => Some(forum),
            Container::Messages(_) => None,
        }
    }

    pub fn into_messages(self) -> Option<Arc<dyn MessageContainer>> {
        match self {
            Container::Messages(messages) => Some(messages),
            Container::Forum(_) => None,
        }
    }
}

/// Resolves channel ids into containers.
#[async_trait]
pub trait ChannelGateway: Send + Sync {
    /// Looks up a channel.
    ///
    /// # Returns
    /// - `Ok(Some(Container))` - Channel exists and has a supported type
    /// - `Ok(None)` - Channel is gone, not visible to the bot, or of an unsupported type
    /// - `Err(AppError)` - Lookup failed for another reason
    async fn resolve(&self, channel_id: u64) -> Result<Option<Container>, AppError>;
}
