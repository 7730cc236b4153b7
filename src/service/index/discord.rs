//! Serenity implementation of the channel capabilities.

use dioxus_logger::tracing;
use serenity::all::{
    Channel, ChannelId, ChannelType, CreateAttachment, CreateEmbed, CreateForumPost,
    CreateMessage, EditMessage, EditThread, ForumEmoji, GetMessages, GuildChannel, GuildId, Http,
    Message, MessageId, MessageType, UserId,
};
use serenity::async_trait;
use std::sync::Arc;

use crate::error::AppError;
use crate::model::thread::{
    jump_url, AttachmentRef, Draft, ForumSnapshot, ForumTagInfo, PostedMessage, ThreadEntry,
};
use crate::service::index::channel::{
    ChannelGateway, Container, MessageContainer, ThreadContainer,
};

/// Page size used for message history and archived thread listings.
const PAGE_SIZE: u8 = 100;

/// Resolves channel ids through the Discord HTTP API.
#[derive(Clone)]
pub struct DiscordGateway {
    http: Arc<Http>,
    bot_user_id: UserId,
}

impl DiscordGateway {
    /// Creates a new gateway.
    ///
    /// # Arguments
    /// - `http` - Shared serenity HTTP client
    /// - `bot_user_id` - Id of the bot account; only its messages are treated as index slots
    pub fn new(http: Arc<Http>, bot_user_id: UserId) -> Self {
        Self { http, bot_user_id }
    }
}

#[async_trait]
impl ChannelGateway for DiscordGateway {
    async fn resolve(&self, channel_id: u64) -> Result<Option<Container>, AppError> {
        let channel = match ChannelId::new(channel_id).to_channel(&self.http).await {
            Ok(channel) => channel,
            Err(e) => {
                let err = AppError::from(e);
                if matches!(err.discord_status(), Some(403) | Some(404)) {
                    tracing::debug!("Channel {} is not reachable: {}", channel_id, err);
                    return Ok(None);
                }
                return Err(err);
            }
        };

        let Channel::Guild(channel) = channel else {
            return Ok(None);
        };

        Ok(match channel.kind {
            ChannelType::Forum => Some(Container::Forum(Arc::new(DiscordForum {
                http: self.http.clone(),
                id: channel.id,
                snapshot: forum_snapshot(&channel),
            }))),
            ChannelType::PublicThread
            | ChannelType::PrivateThread
            | ChannelType::NewsThread
            | ChannelType::Text
            | ChannelType::News => Some(Container::Messages(Arc::new(DiscordMessages {
                http: self.http.clone(),
                id: channel.id,
                name: channel.name.clone(),
                bot_user_id: self.bot_user_id,
                archived: channel
                    .thread_metadata
                    .as_ref()
                    .is_some_and(|metadata| metadata.archived),
            }))),
            _ => None,
        })
    }
}

/// A forum channel.
struct DiscordForum {
    http: Arc<Http>,
    id: ChannelId,
    snapshot: ForumSnapshot,
}

#[async_trait]
impl ThreadContainer for DiscordForum {
    fn snapshot(&self) -> &ForumSnapshot {
        &self.snapshot
    }

    async fn active_threads(&self) -> Result<Vec<ThreadEntry>, AppError> {
        let guild_id = GuildId::new(self.snapshot.guild_id);
        let data = guild_id.get_active_threads(&self.http).await?;

        Ok(data
            .threads
            .iter()
            .filter(|thread| thread.parent_id == Some(self.id))
            .map(|thread| thread_entry(thread, &self.snapshot))
            .collect())
    }

    async fn archived_threads(&self) -> Result<Vec<ThreadEntry>, AppError> {
        let mut entries = Vec::new();
        let mut before: Option<u64> = None;

        loop {
            let page = self
                .id
                .get_archived_public_threads(&self.http, before, Some(PAGE_SIZE as u64))
                .await?;

            entries.extend(
                page.threads
                    .iter()
                    .map(|thread| thread_entry(thread, &self.snapshot)),
            );

            if !page.has_more {
                break;
            }

            let next = page
                .threads
                .last()
                .and_then(|thread| thread.thread_metadata.as_ref())
                .and_then(|metadata| metadata.archive_timestamp)
                .map(|timestamp| timestamp.unix_timestamp().max(0) as u64);

            match next {
                Some(cursor) if Some(cursor) != before => before = Some(cursor),
                _ => break,
            }
        }

        Ok(entries)
    }

    async fn create_thread(&self, name: &str, opening: &Draft) -> Result<u64, AppError> {
        let message = build_message(&self.http, opening).await;

        let thread = self
            .id
            .create_forum_post(&self.http, CreateForumPost::new(name, message))
            .await?;

        Ok(thread.id.get())
    }
}

/// A thread or text channel.
struct DiscordMessages {
    http: Arc<Http>,
    id: ChannelId,
    name: String,
    bot_user_id: UserId,
    archived: bool,
}

#[async_trait]
impl MessageContainer for DiscordMessages {
    fn id(&self) -> u64 {
        self.id.get()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_archived(&self) -> bool {
        self.archived
    }

    async fn reopen(&self) -> Result<(), AppError> {
        self.id
            .edit_thread(&self.http, EditThread::new().archived(false).locked(false))
            .await?;
        Ok(())
    }

    async fn messages(&self) -> Result<Vec<PostedMessage>, AppError> {
        let mut history: Vec<Message> = Vec::new();
        let mut before: Option<MessageId> = None;

        loop {
            let mut request = GetMessages::new().limit(PAGE_SIZE);
            if let Some(id) = before {
                request = request.before(id);
            }

            let page = self.id.messages(&self.http, request).await?;
            let page_len = page.len();
            before = page.last().map(|message| message.id);
            history.extend(page);

            if page_len < PAGE_SIZE as usize || before.is_none() {
                break;
            }
        }

        // Discord returns newest first.
        history.reverse();

        Ok(history
            .iter()
            .map(|message| posted_message(message, self.bot_user_id))
            .collect())
    }

    async fn send(&self, content: &str) -> Result<PostedMessage, AppError> {
        let message = self
            .id
            .send_message(&self.http, CreateMessage::new().content(content))
            .await?;

        Ok(posted_message(&message, self.bot_user_id))
    }

    async fn post(&self, draft: &Draft) -> Result<PostedMessage, AppError> {
        let message = build_message(&self.http, draft).await;
        let message = self.id.send_message(&self.http, message).await?;

        Ok(posted_message(&message, self.bot_user_id))
    }

    async fn edit(&self, message_id: u64, content: &str) -> Result<(), AppError> {
        self.http
            .edit_message(
                self.id,
                MessageId::new(message_id),
                &EditMessage::new().content(content),
                vec![],
            )
            .await?;
        Ok(())
    }

    async fn delete(&self, message_id: u64) -> Result<(), AppError> {
        self.http
            .delete_message(self.id, MessageId::new(message_id), None)
            .await?;
        Ok(())
    }

    async fn rename(&self, name: &str) -> Result<(), AppError> {
        self.id
            .edit_thread(&self.http, EditThread::new().name(name))
            .await?;
        Ok(())
    }

    async fn archive(&self) -> Result<(), AppError> {
        self.id
            .edit_thread(&self.http, EditThread::new().archived(true).locked(true))
            .await?;
        Ok(())
    }
}

/// Builds a message from a draft, downloading its attachments.
///
/// Discord rejects messages without content, files or embeds, so an empty draft is sent as a
/// single space.
async fn build_message(http: &Arc<Http>, draft: &Draft) -> CreateMessage {
    let mut message = CreateMessage::new();

    for attachment in &draft.attachments {
        match CreateAttachment::url(http, &attachment.url).await {
            Ok(mut file) => {
                file.filename = attachment.filename.clone();
                message = message.add_file(file);
            }
            Err(e) => tracing::warn!(
                "Skipping attachment {} that could not be downloaded: {}",
                attachment.filename,
                e
            ),
        }
    }

    if let Some(url) = &draft.thumb_url {
        message = message.embed(CreateEmbed::new().thumbnail(url));
    }

    let blank = draft.content.trim().is_empty();
    if !blank || (draft.attachments.is_empty() && draft.thumb_url.is_none()) {
        message = message.content(if blank { " " } else { draft.content.as_str() });
    }

    message
}

/// Captures the metadata of a forum channel.
///
/// Custom emoji are rendered as `<:tag:id>` markup since the tag only carries the emoji id.
pub fn forum_snapshot(channel: &GuildChannel) -> ForumSnapshot {
    ForumSnapshot {
        id: channel.id.get(),
        guild_id: channel.guild_id.get(),
        name: channel.name.clone(),
        tags: channel
            .available_tags
            .iter()
            .map(|tag| ForumTagInfo {
                id: tag.id.get(),
                name: tag.name.clone(),
                emoji: tag.emoji.as_ref().and_then(|emoji| match emoji {
                    ForumEmoji::Name(name) => Some(name.clone()),
                    ForumEmoji::Id(id) => Some(format!("<:tag:{}>", id)),
                    _ => None,
                }),
            })
            .collect(),
    }
}

/// Converts a thread into an index entry, resolving applied tag ids against the forum.
///
/// Tags that were removed from the forum after being applied are dropped.
pub fn thread_entry(thread: &GuildChannel, forum: &ForumSnapshot) -> ThreadEntry {
    ThreadEntry {
        id: thread.id.get(),
        title: thread.name.clone(),
        tags: thread
            .applied_tags
            .iter()
            .filter_map(|tag_id| forum.tag_name(tag_id.get()).map(str::to_string))
            .collect(),
        jump_url: jump_url(thread.guild_id.get(), thread.id.get()),
        archived: thread
            .thread_metadata
            .as_ref()
            .is_some_and(|metadata| metadata.archived),
    }
}

/// Converts a message into a resync slot candidate.
///
/// Only regular and slash-command messages written by the bot itself can be edited.
pub fn posted_message(message: &Message, bot_user_id: UserId) -> PostedMessage {
    PostedMessage {
        id: message.id.get(),
        content: message.content.clone(),
        editable: message.author.id == bot_user_id
            && matches!(
                message.kind,
                MessageType::Regular | MessageType::ChatInputCommand
            ),
        user_content: matches!(
            message.kind,
            MessageType::Regular | MessageType::InlineReply | MessageType::ChatInputCommand
        ),
        attachments: message
            .attachments
            .iter()
            .map(|attachment| AttachmentRef {
                filename: attachment.filename.clone(),
                url: attachment.url.clone(),
            })
            .collect(),
    }
}
