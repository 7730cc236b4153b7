//! ✏️ reactions on bot messages, which open a DM edit session.

use dioxus_logger::tracing;
use serenity::all::{Channel, ChannelType, Context, CreateMessage, Reaction, ReactionType};

use crate::bot::handler::message::is_pencil;
use crate::service::edit_session::SESSION_TTL_MINUTES;
use crate::state::AppState;
use crate::util::permission::{is_owner, member_is_admin};

const PREVIEW_CHARS: usize = 1000;

/// DM sent when an edit session opens.
pub fn session_prompt(channel_name: &str, original: &str) -> String {
    let preview: String = original.chars().take(PREVIEW_CHARS).collect();
    let preview = if preview.trim().is_empty() {
        "(no text)".to_string()
    } else {
        preview
    };

    format!(
        "✏️ You reacted to a message in **{}**.\nOriginal message:\n```\n{}\n```\nReply here with your **new message content**.\nYou have **{} minutes** before this edit session expires.",
        channel_name, preview, SESSION_TTL_MINUTES
    )
}

/// Handle a reaction being added to a message
pub async fn handle_reaction_add(state: &AppState, ctx: Context, reaction: Reaction) {
    if !matches!(&reaction.emoji, ReactionType::Unicode(emoji) if is_pencil(emoji)) {
        return;
    }
    let (Some(user_id), Some(guild_id)) = (reaction.user_id, reaction.guild_id) else {
        return;
    };
    if user_id == state.bot_user_id || reaction.member.as_ref().is_some_and(|m| m.user.bot) {
        return;
    }

    let message = match reaction.message(&ctx.http).await {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!("Failed to fetch reacted message {}: {}", reaction.message_id, e);
            return;
        }
    };
    if message.author.id != state.bot_user_id {
        return;
    }

    let thread = match reaction.channel_id.to_channel(&ctx.http).await {
        Ok(Channel::Guild(channel))
            if matches!(
                channel.kind,
                ChannelType::PublicThread | ChannelType::PrivateThread | ChannelType::NewsThread
            ) =>
        {
            channel
        }
        Ok(_) => return,
        Err(e) => {
            tracing::warn!("Failed to fetch channel {}: {}", reaction.channel_id, e);
            return;
        }
    };

    let allowed = is_owner(state.owner_id, user_id.get())
        || match member_is_admin(&ctx.http, guild_id, user_id).await {
            Ok(is_admin) => is_admin,
            Err(e) => {
                tracing::warn!("Failed to check permissions of user {}: {}", user_id, e);
                false
            }
        };
    if !allowed {
        return;
    }

    state
        .edit_sessions
        .open(
            user_id.get(),
            Some(guild_id.get()),
            reaction.channel_id.get(),
            message.id.get(),
        )
        .await;
    tracing::info!(
        "Opened edit session for user {} on message {}",
        user_id,
        message.id
    );

    let prompt = session_prompt(&thread.name, &message.content);
    if let Err(e) = user_id
        .direct_message(&ctx.http, CreateMessage::new().content(prompt))
        .await
    {
        tracing::warn!("Failed to DM user {}: {}", user_id, e);
        let notice = format!(
            "<@{}> I couldn't send you a DM. Please allow direct messages from server members to edit bot messages.",
            user_id
        );
        if let Err(e) = reaction.channel_id.say(&ctx.http, notice).await {
            tracing::warn!("Failed to send DM notice in {}: {}", reaction.channel_id, e);
        }
    }

    if let Err(e) = reaction.delete(&ctx.http).await {
        tracing::debug!("Failed to remove ✏️ reaction of user {}: {}", user_id, e);
    }
}
