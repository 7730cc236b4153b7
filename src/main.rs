mod bot;
mod config;
mod data;
mod error;
mod model;
mod scheduler;
mod service;
mod state;
mod util;

use dioxus_logger::tracing::{self, Level};
use std::sync::Arc;

use crate::{
    bot::start::{init_bot, init_http, start_bot},
    config::Config,
    data::{challenge_store::ChallengeStore, config_store::ConfigStore},
    error::AppError,
    service::{
        challenge::ChallengeService,
        character::CharacterService,
        edit_session::EditSessionService,
        index::{discord::DiscordGateway, IndexService},
        thread_move::ThreadMover,
    },
    state::AppState,
    util::{retry::RetryPolicy, throttle::Throttle},
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dioxus_logger::init(Level::INFO)
        .map_err(|e| AppError::InternalError(format!("Failed to initialise logger: {}", e)))?;

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let store = ConfigStore::new(&config.index_config_file);
    store.ensure_file().await?;
    tracing::info!("Using index config at {}", store.path().display());

    let challenge_store = ChallengeStore::new(&config.challenge_data_file);
    challenge_store.ensure_file().await?;

    let (discord_http, bot_user_id) = init_http(&config).await?;
    let gateway = Arc::new(DiscordGateway::new(discord_http.clone(), bot_user_id));

    let indexes = IndexService::new(
        store.clone(),
        gateway.clone(),
        RetryPolicy::default(),
        Throttle::new(config.index_write_delay),
        Throttle::new(config.index_delay),
    );
    let characters = CharacterService::new(store, gateway.clone());
    let mover = ThreadMover::new(
        gateway.clone(),
        RetryPolicy::default(),
        Throttle::new(config.index_write_delay),
        config.character_forums,
    );
    let challenges = ChallengeService::new(
        challenge_store,
        characters.clone(),
        gateway,
        RetryPolicy::default(),
    );

    let state = AppState::new(
        indexes,
        characters,
        EditSessionService::default(),
        mover,
        challenges,
        bot_user_id,
        config.owner_id,
        config.guild_id,
    );

    let _scheduler = scheduler::start_scheduler(&config, state.clone(), discord_http).await?;

    let client = init_bot(&config, state).await?;
    start_bot(client).await
}
