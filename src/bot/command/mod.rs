//! Slash commands.
//!
//! Each command module provides `register()` returning its definition and `run()` handling an
//! invocation. Administrative commands are hidden from non-administrators through default
//! member permissions and checked again on invocation, since server admins can override the
//! defaults.

use serenity::all::{
    CommandInteraction, Context, CreateCommand, CreateInteractionResponse,
    CreateInteractionResponseMessage, EditInteractionResponse,
};

use crate::error::AppError;
use crate::state::AppState;
use crate::util::permission::is_owner_or_admin;

pub mod challenge;
pub mod character;
pub mod index;
pub mod move_thread;
pub mod options;

pub const NOT_ADMIN: &str = "❌ This command requires administrator permissions.";
pub const GUILD_ONLY: &str = "❌ This command can only be used in a server.";

/// Definitions of every command, for registration.
pub fn all() -> Vec<CreateCommand> {
    vec![
        index::register(),
        character::register(),
        move_thread::register(),
        challenge::register(),
    ]
}

/// Whether the invoking user is the owner or a guild administrator.
pub fn invoked_by_admin(state: &AppState, command: &CommandInteraction) -> bool {
    let permissions = command.member.as_ref().and_then(|member| member.permissions);
    is_owner_or_admin(state.owner_id, command.user.id.get(), permissions)
}

/// Answers immediately with an ephemeral message.
pub async fn respond_ephemeral(
    ctx: &Context,
    command: &CommandInteraction,
    content: impl Into<String>,
) -> Result<(), AppError> {
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await?;
    Ok(())
}

/// Acknowledges the command so slower work can follow.
pub async fn defer(
    ctx: &Context,
    command: &CommandInteraction,
    ephemeral: bool,
) -> Result<(), AppError> {
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Defer(
                CreateInteractionResponseMessage::new().ephemeral(ephemeral),
            ),
        )
        .await?;
    Ok(())
}

/// Replaces the deferred response with `content`.
pub async fn reply(
    ctx: &Context,
    command: &CommandInteraction,
    content: impl Into<String>,
) -> Result<(), AppError> {
    command
        .edit_response(&ctx.http, EditInteractionResponse::new().content(content))
        .await?;
    Ok(())
}

/// Text shown for a failed command.
///
/// Errors the administrator can act on are shown as is; anything else is logged and replaced
/// with a generic message.
pub fn failure_message(command_name: &str, err: &AppError) -> String {
    if !matches!(
        err,
        AppError::ConfigErr(_) | AppError::NotFound(_) | AppError::BadRequest(_)
    ) {
        dioxus_logger::tracing::error!("/{} failed: {}", command_name, err);
    }
    format!("❌ {}", err.user_message())
}
