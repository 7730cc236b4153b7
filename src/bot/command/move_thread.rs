//! `/move thread|character`.

use serenity::all::{
    ChannelType, CommandInteraction, CommandOptionType, Context, CreateCommand,
    CreateCommandOption, Permissions,
};

use crate::bot::command::{
    defer, failure_message, invoked_by_admin, options::subcommand, options::Args, reply,
    respond_ephemeral, GUILD_ONLY, NOT_ADMIN,
};
use crate::error::AppError;
use crate::service::thread_move::{CharacterDestination, MoveRequest, NOT_IN_THREAD};
use crate::state::AppState;

pub fn register() -> CreateCommand {
    CreateCommand::new("move")
        .description("Move threads between forums and channels")
        .default_member_permissions(Permissions::ADMINISTRATOR)
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "thread",
                "Move the current thread to any target forum or text channel.",
            )
            .add_sub_option(
                CreateCommandOption::new(
                    CommandOptionType::Channel,
                    "destination",
                    "Tag or select the destination forum or text channel.",
                )
                .channel_types(vec![ChannelType::Forum, ChannelType::Text])
                .required(true),
            )
            .add_sub_option(CreateCommandOption::new(
                CommandOptionType::String,
                "rename",
                "Optionally rename the thread when moving.",
            ))
            .add_sub_option(CreateCommandOption::new(
                CommandOptionType::Boolean,
                "archive_original",
                "Archive and lock the original thread after moving (default: True).",
            )),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "character",
                "Move the current thread to another forum (npc, graveyard, characters).",
            )
            .add_sub_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "destination",
                    "Where the character sheet goes",
                )
                .add_string_choice("npc", "npc")
                .add_string_choice("graveyard", "graveyard")
                .add_string_choice("characters", "characters")
                .required(true),
            )
            .add_sub_option(CreateCommandOption::new(
                CommandOptionType::String,
                "played_by",
                "Who played this character (graveyard only)",
            ))
            .add_sub_option(CreateCommandOption::new(
                CommandOptionType::String,
                "cause_of_death",
                "Cause of death (graveyard only)",
            )),
        )
}

/// Handles a `/move` invocation.
pub async fn run(
    state: &AppState,
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<(), AppError> {
    if !invoked_by_admin(state, command) {
        return respond_ephemeral(ctx, command, NOT_ADMIN).await;
    }
    let Some(guild_id) = command.guild_id.map(|id| id.get()) else {
        return respond_ephemeral(ctx, command, GUILD_ONLY).await;
    };
    let in_thread = command.channel.as_ref().map_or(true, |channel| {
        matches!(
            channel.kind,
            ChannelType::PublicThread | ChannelType::PrivateThread | ChannelType::NewsThread
        )
    });
    if !in_thread {
        return respond_ephemeral(ctx, command, NOT_IN_THREAD).await;
    }

    let options = command.data.options();
    let Some((name, args)) = subcommand(&options) else {
        return respond_ephemeral(ctx, command, "❌ Unknown subcommand.").await;
    };

    defer(ctx, command, true).await?;

    let source_id = command.channel_id.get();
    let result = match name {
        "thread" => thread(state, guild_id, source_id, &args).await,
        "character" => character(state, guild_id, source_id, &args).await,
        other => Err(AppError::BadRequest(format!("Unknown subcommand `{}`.", other))),
    };

    let content = result.unwrap_or_else(|e| failure_message("move", &e));
    reply(ctx, command, content).await
}

async fn thread(
    state: &AppState,
    guild_id: u64,
    source_id: u64,
    args: &Args,
) -> Result<String, AppError> {
    let (destination_id, _) = args.channel("destination").ok_or_else(|| {
        AppError::BadRequest("Destination must be a forum or text channel.".to_string())
    })?;

    let report = state
        .mover
        .move_thread(&MoveRequest {
            guild_id,
            source_id,
            destination_id,
            rename: args.text("rename"),
            archive_original: args.flag("archive_original").unwrap_or(true),
        })
        .await?;

    Ok(with_failures(
        format!(
            "✅ Thread moved to <#{}> → {}",
            destination_id, report.destination_url
        ),
        report.failed,
    ))
}

async fn character(
    state: &AppState,
    guild_id: u64,
    source_id: u64,
    args: &Args,
) -> Result<String, AppError> {
    let destination = character_destination(args)?;
    let report = state
        .mover
        .move_character(guild_id, source_id, &destination)
        .await?;

    Ok(with_failures(
        format!("✅ Thread moved: {}", report.destination_url),
        report.failed,
    ))
}

/// Reads the destination of `/move character`.
fn character_destination(args: &Args) -> Result<CharacterDestination, AppError> {
    let destination = args.text("destination").unwrap_or_default();

    match destination.trim().to_lowercase().as_str() {
        "npc" => Ok(CharacterDestination::Npc),
        "characters" => Ok(CharacterDestination::Characters),
        "graveyard" => {
            let played_by = args.text("played_by").filter(|v| !v.trim().is_empty());
            let cause_of_death = args.text("cause_of_death").filter(|v| !v.trim().is_empty());
            match (played_by, cause_of_death) {
                (Some(played_by), Some(cause_of_death)) => Ok(CharacterDestination::Graveyard {
                    played_by,
                    cause_of_death,
                }),
                _ => Err(AppError::BadRequest(
                    "Graveyard moves require `played_by` and `cause_of_death`.".to_string(),
                )),
            }
        }
        _ => Err(AppError::BadRequest("Invalid destination.".to_string())),
    }
}

fn with_failures(message: String, failed: usize) -> String {
    if failed == 0 {
        return message;
    }
    format!("{}\n⚠️ {} message(s) could not be copied.", message, failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::command::options::ArgValue;

    fn args(values: &[(&str, &str)]) -> Args {
        Args::from_pairs(
            values
                .iter()
                .map(|(name, value)| (name.to_string(), ArgValue::Text(value.to_string())))
                .collect(),
        )
    }

    /// Tests reading character destinations.
    ///
    /// Expected: graveyard needs both details, unknown names are rejected
    #[test]
    fn reads_character_destination() {
        assert_eq!(
            character_destination(&args(&[("destination", "NPC")])).unwrap(),
            CharacterDestination::Npc
        );
        assert_eq!(
            character_destination(&args(&[
                ("destination", "graveyard"),
                ("played_by", "Ash"),
                ("cause_of_death", "Frost"),
            ]))
            .unwrap(),
            CharacterDestination::Graveyard {
                played_by: "Ash".to_string(),
                cause_of_death: "Frost".to_string(),
            }
        );
        assert!(matches!(
            character_destination(&args(&[("destination", "graveyard"), ("played_by", "Ash")])),
            Err(AppError::BadRequest(_))
        ));
        assert!(character_destination(&args(&[("destination", "tavern")])).is_err());
    }
}
