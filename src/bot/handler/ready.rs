//! Ready event handler.
//!
//! Registers the slash commands on every connection. On the first connection of the process it
//! also starts the initial index sweep and fills the character cache, in a separate task so
//! the gateway is not held up.

use dioxus_logger::tracing;
use serenity::all::{ActivityData, Command, Context, GuildId, Ready};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::bot::command;
use crate::state::AppState;

/// Handles the ready event when the bot connects to Discord.
///
/// # Arguments
/// - `state` - Shared services
/// - `initial_sweep` - Flag marking whether startup work already ran
/// - `ctx` - Discord context for setting activity status and registering commands
/// - `ready` - Ready event data containing bot user information
pub async fn handle_ready(
    state: &AppState,
    initial_sweep: &AtomicBool,
    ctx: Context,
    ready: Ready,
) {
    tracing::info!(
        "{} is connected to Discord ({} guilds)",
        ready.user.name,
        ready.guilds.len()
    );

    ctx.set_activity(Some(ActivityData::watching("the archives")));

    register_commands(state, &ctx).await;

    if initial_sweep.swap(true, Ordering::SeqCst) {
        return;
    }

    let state = state.clone();
    tokio::spawn(async move {
        match state.indexes.sweep().await {
            Ok(report) => tracing::info!(
                "Initial index sweep: {} refreshed, {} unchanged, {} failed",
                report.refreshed,
                report.unchanged,
                report.failed
            ),
            Err(e) => tracing::error!("Initial index sweep failed: {}", e),
        }

        match state.characters.rebuild_all().await {
            Ok(count) => tracing::info!("Character cache ready with {} threads", count),
            Err(e) => tracing::error!("Failed to build character cache: {}", e),
        }
    });
}

/// Registers commands for the configured guild, or globally when none is set.
async fn register_commands(state: &AppState, ctx: &Context) {
    let commands = command::all();

    let result = match state.command_guild_id {
        Some(guild_id) => GuildId::new(guild_id)
            .set_commands(&ctx.http, commands)
            .await
            .map(|registered| registered.len()),
        None => Command::set_global_commands(&ctx.http, commands)
            .await
            .map(|registered| registered.len()),
    };

    match result {
        Ok(count) => tracing::info!("Registered {} slash commands", count),
        Err(e) => tracing::error!("Failed to register slash commands: {}", e),
    }
}
