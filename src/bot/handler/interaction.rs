use dioxus_logger::tracing;
use serenity::all::{Context, Interaction};

use crate::bot::command;
use crate::state::AppState;

/// Dispatches slash commands and autocomplete requests to their command module.
pub async fn handle_interaction(state: &AppState, ctx: Context, interaction: Interaction) {
    match interaction {
        Interaction::Command(cmd) => {
            let result = match cmd.data.name.as_str() {
                "index" => command::index::run(state, &ctx, &cmd).await,
                "character" => command::character::run(state, &ctx, &cmd).await,
                "challenge" => command::challenge::run(state, &ctx, &cmd).await,
                "move" => command::move_thread::run(state, &ctx, &cmd).await,
                other => {
                    tracing::warn!("Received unknown command /{}", other);
                    Ok(())
                }
            };

            if let Err(e) = result {
                tracing::error!("Failed to handle /{}: {}", cmd.data.name, e);
            }
        }
        Interaction::Autocomplete(cmd) => {
            // Both commands complete character names.
            if !matches!(cmd.data.name.as_str(), "character" | "challenge") {
                return;
            }
            if let Err(e) = command::character::autocomplete(state, &ctx, &cmd).await {
                tracing::debug!("Failed to answer character autocomplete: {}", e);
            }
        }
        _ => {}
    }
}
