use dioxus_logger::tracing;
use serenity::all::{Client, GatewayIntents, Http, UserId};
use std::sync::Arc;

use crate::bot::handler::Handler;
use crate::config::Config;
use crate::error::AppError;
use crate::state::AppState;

/// Creates the HTTP client used by services and looks up the bot's own user id.
///
/// Services need the HTTP client before the gateway client exists, so it is built separately
/// and handed to both.
///
/// # Returns
/// - `Ok((Arc<Http>, UserId))` - HTTP client and bot user id
/// - `Err(AppError)` - Token rejected or Discord unreachable
pub async fn init_http(config: &Config) -> Result<(Arc<Http>, UserId), AppError> {
    let http = Arc::new(Http::new(&config.discord_token));
    let user = http.get_current_user().await?;

    tracing::info!("Authenticated as {} ({})", user.name, user.id);

    Ok((http, user.id))
}

/// Builds the Discord gateway client.
///
/// `MESSAGE_CONTENT` and `GUILD_MEMBERS` are privileged intents and must be enabled in the
/// Discord Developer Portal.
///
/// # Arguments
/// - `config` - Application configuration
/// - `state` - Shared services for the event handler
///
/// # Returns
/// - `Ok(Client)` - Client ready to be started
/// - `Err(AppError)` - Client construction failed
pub async fn init_bot(config: &Config, state: AppState) -> Result<Client, AppError> {
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MEMBERS;

    let client = Client::builder(&config.discord_token, intents)
        .event_handler(Handler::new(state))
        .await?;

    Ok(client)
}

/// Runs the gateway client until it shuts down.
pub async fn start_bot(mut client: Client) -> Result<(), AppError> {
    tracing::info!("Starting Discord bot...");

    client.start().await?;

    Ok(())
}
