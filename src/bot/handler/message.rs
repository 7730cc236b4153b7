//! Message events: DM replies that complete an edit session, and ✏️ posts re-sent as the bot.

use dioxus_logger::tracing;
use serenity::all::{
    ChannelId, Context, CreateAttachment, CreateMessage, EditMessage, Message, MessageId,
};
use std::time::Duration;

use crate::service::edit_session::{SessionClaim, SESSION_TTL_MINUTES};
use crate::state::AppState;
use crate::util::permission::{is_owner, member_is_admin};

const PENCIL: char = '✏';
const NOTICE_LIFETIME: Duration = Duration::from_secs(5);

/// Whether `text` is the ✏️ emoji, with or without the variation selector.
pub fn is_pencil(text: &str) -> bool {
    text.trim_end_matches('\u{fe0f}') == PENCIL.to_string()
}

/// Strips a leading ✏️ from a message, returning the rest untrimmed.
pub fn strip_pencil(content: &str) -> Option<&str> {
    content
        .strip_prefix(PENCIL)
        .map(|rest| rest.trim_start_matches('\u{fe0f}'))
}

/// Handle a message in a guild channel or a DM
pub async fn handle_message(state: &AppState, ctx: Context, message: Message) {
    if message.author.bot {
        return;
    }

    if message.guild_id.is_none() {
        apply_session_edit(state, &ctx, &message).await;
    } else if strip_pencil(&message.content).is_some() {
        post_as_bot(state, &ctx, &message).await;
    }
}

/// Applies a DM reply to the message of the author's edit session, if they have one.
async fn apply_session_edit(state: &AppState, ctx: &Context, message: &Message) {
    let user_id = message.author.id.get();

    let session = match state.edit_sessions.claim(user_id).await {
        SessionClaim::Missing => return,
        SessionClaim::Expired(_) => {
            dm_reply(
                ctx,
                message,
                &format!(
                    "⌛ This edit session has expired after {} minutes. React again with ✏️ if you still need to edit.",
                    SESSION_TTL_MINUTES
                ),
            )
            .await;
            return;
        }
        SessionClaim::Active(session) => session,
    };

    let content = message.content.trim();
    if content.is_empty() {
        dm_reply(ctx, message, "❌ Edit canceled, message cannot be empty.").await;
        return;
    }

    let result = ChannelId::new(session.channel_id)
        .edit_message(
            &ctx.http,
            MessageId::new(session.message_id),
            EditMessage::new().content(content),
        )
        .await;

    match result {
        Ok(_) => {
            tracing::info!(
                "User {} edited message {} in channel {}",
                user_id,
                session.message_id,
                session.channel_id
            );
            dm_reply(ctx, message, "✅ Your edit has been applied successfully!").await;
        }
        Err(e) => {
            tracing::error!(
                "Failed to apply edit of message {} by user {}: {}",
                session.message_id,
                user_id,
                e
            );
            dm_reply(
                ctx,
                message,
                "❌ Failed to edit the message. It may have been deleted.",
            )
            .await;
        }
    }
}

/// Re-sends a ✏️-prefixed message as the bot and deletes the original.
async fn post_as_bot(state: &AppState, ctx: &Context, message: &Message) {
    let Some(guild_id) = message.guild_id else {
        return;
    };
    let Some(text) = strip_pencil(&message.content).map(str::trim) else {
        return;
    };

    let allowed = is_owner(state.owner_id, message.author.id.get())
        || match member_is_admin(&ctx.http, guild_id, message.author.id).await {
            Ok(is_admin) => is_admin,
            Err(e) => {
                tracing::warn!(
                    "Failed to check permissions of user {}: {}",
                    message.author.id,
                    e
                );
                false
            }
        };

    if !allowed {
        transient_notice(
            ctx,
            message.channel_id,
            "❌ Only administrators can post as the bot.",
        )
        .await;
        return;
    }

    if text.is_empty() && message.attachments.is_empty() {
        transient_notice(
            ctx,
            message.channel_id,
            "✏️ Please include text or an attachment to post.",
        )
        .await;
        return;
    }

    let mut post = CreateMessage::new();
    if !text.is_empty() {
        post = post.content(text);
    }
    for attachment in &message.attachments {
        match attachment.download().await {
            Ok(bytes) => {
                post = post.add_file(CreateAttachment::bytes(bytes, attachment.filename.clone()))
            }
            Err(e) => tracing::warn!(
                "Failed to download attachment {}: {}",
                attachment.filename,
                e
            ),
        }
    }

    if let Err(e) = message.channel_id.send_message(&ctx.http, post).await {
        tracing::error!(
            "Failed to post as bot in channel {}: {}",
            message.channel_id,
            e
        );
        return;
    }

    if let Err(e) = message.delete(&ctx.http).await {
        tracing::warn!(
            "Failed to delete original message {} in channel {}: {}",
            message.id,
            message.channel_id,
            e
        );
    }
}

async fn dm_reply(ctx: &Context, message: &Message, content: &str) {
    if let Err(e) = message.channel_id.say(&ctx.http, content).await {
        tracing::warn!("Failed to reply to DM of user {}: {}", message.author.id, e);
    }
}

/// Sends a notice that deletes itself after a few seconds.
async fn transient_notice(ctx: &Context, channel_id: ChannelId, content: &str) {
    let notice = match channel_id.say(&ctx.http, content).await {
        Ok(notice) => notice,
        Err(e) => {
            tracing::warn!("Failed to send notice in channel {}: {}", channel_id, e);
            return;
        }
    };

    let http = ctx.http.clone();
    tokio::spawn(async move {
        tokio::time::sleep(NOTICE_LIFETIME).await;
        if let Err(e) = notice.delete(&http).await {
            tracing::debug!("Failed to delete notice {}: {}", notice.id, e);
        }
    });
}
