use std::time::Duration;

use crate::error::{config::ConfigError, AppError};
use crate::service::thread_move::CharacterForums;

const DEFAULT_CONFIG_FILE: &str = "data/index_config.json";
const DEFAULT_CHALLENGE_DATA_FILE: &str = "data/dice_challenges.json";
const DEFAULT_INDEX_REFRESH_CRON: &str = "0 0 */6 * * *";
const DEFAULT_CHARACTER_CACHE_CRON: &str = "0 0 4 * * *";
const DEFAULT_INDEX_DELAY_SECONDS: f64 = 2.0;
const DEFAULT_INDEX_WRITE_DELAY_MS: u64 = 1500;

pub struct Config {
    pub discord_token: String,
    /// Guild for guild-scoped command registration; commands are global when unset.
    pub guild_id: Option<u64>,
    /// User allowed to run administrative actions regardless of guild permissions.
    pub owner_id: Option<u64>,

    pub index_config_file: String,
    pub challenge_data_file: String,
    pub index_refresh_cron: String,
    pub character_cache_cron: String,

    /// Pause between indexes during a sweep.
    pub index_delay: Duration,
    /// Pause between message writes within one index.
    pub index_write_delay: Duration,

    /// Destinations of `/move character`.
    pub character_forums: CharacterForums,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let discord_token = var("DISCORD_TOKEN")
            .ok_or_else(|| ConfigError::MissingEnvVar("DISCORD_TOKEN".to_string()))?;

        let index_delay_seconds = match var("INDEX_DELAY_SECONDS") {
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|seconds| seconds.is_finite() && *seconds >= 0.0)
                .ok_or_else(|| invalid("INDEX_DELAY_SECONDS", &raw))?,
            None => DEFAULT_INDEX_DELAY_SECONDS,
        };

        Ok(Self {
            discord_token,
            guild_id: parse_id(var("GUILD_ID"), "GUILD_ID")?,
            owner_id: parse_id(var("OWNER_ID"), "OWNER_ID")?,
            index_config_file: var("INDEX_CONFIG_FILE")
                .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string()),
            challenge_data_file: var("CHALLENGE_DATA_FILE")
                .unwrap_or_else(|| DEFAULT_CHALLENGE_DATA_FILE.to_string()),
            index_refresh_cron: var("INDEX_REFRESH_CRON")
                .unwrap_or_else(|| DEFAULT_INDEX_REFRESH_CRON.to_string()),
            character_cache_cron: var("CHARACTER_CACHE_CRON")
                .unwrap_or_else(|| DEFAULT_CHARACTER_CACHE_CRON.to_string()),
            index_delay: Duration::from_secs_f64(index_delay_seconds),
            index_write_delay: Duration::from_millis(
                parse_id(var("INDEX_WRITE_DELAY_MS"), "INDEX_WRITE_DELAY_MS")?
                    .unwrap_or(DEFAULT_INDEX_WRITE_DELAY_MS),
            ),
            character_forums: CharacterForums {
                characters: parse_id(
                    var("CHARACTER_BACKSTORIES_CHANNEL_ID"),
                    "CHARACTER_BACKSTORIES_CHANNEL_ID",
                )?,
                npc: parse_id(
                    var("NPC_BACKSTORIES_CHANNEL_ID"),
                    "NPC_BACKSTORIES_CHANNEL_ID",
                )?,
                graveyard: parse_id(
                    var("CHARACTER_GRAVEYARD_CHANNEL_ID"),
                    "CHARACTER_GRAVEYARD_CHANNEL_ID",
                )?,
            },
        })
    }
}

fn invalid(name: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnvVar {
        name: name.to_string(),
        value: value.to_string(),
    }
}

fn parse_id(value: Option<String>, name: &str) -> Result<Option<u64>, ConfigError> {
    value
        .map(|raw| raw.trim().parse::<u64>().map_err(|_| invalid(name, &raw)))
        .transpose()
}
