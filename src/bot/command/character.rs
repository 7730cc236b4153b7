//! `/character search|add|remove|list` and name autocomplete.

use dioxus_logger::tracing;
use serenity::all::{
    ChannelType, CommandData, CommandInteraction, CommandOptionType, Context,
    CreateAutocompleteResponse, CreateCommand, CreateCommandOption, CreateInteractionResponse,
};

use crate::bot::command::{
    defer, failure_message, invoked_by_admin, options::subcommand, options::Args, reply,
    respond_ephemeral, GUILD_ONLY, NOT_ADMIN,
};
use crate::error::AppError;
use crate::state::AppState;

const NO_FORUMS: &str =
    "❌ No character forums configured for this server. Use `/character add` to add forums.";

pub fn register() -> CreateCommand {
    let forum = |description: &str| {
        CreateCommandOption::new(CommandOptionType::Channel, "forum", description)
            .channel_types(vec![ChannelType::Forum])
            .required(true)
    };

    CreateCommand::new("character")
        .description("Look up characters")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "search",
                "Find a character thread by name",
            )
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::String, "name", "Character name")
                    .required(true)
                    .set_autocomplete(true),
            ),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "add",
                "Add a forum to character search (admin)",
            )
            .add_sub_option(forum("Forum containing character threads")),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "remove",
                "Remove a forum from character search (admin)",
            )
            .add_sub_option(forum("Forum to remove")),
        )
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "list",
            "List forums used for character search",
        ))
}

/// Handles a `/character` invocation.
pub async fn run(
    state: &AppState,
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<(), AppError> {
    let Some(guild_id) = command.guild_id.map(|id| id.get()) else {
        return respond_ephemeral(ctx, command, GUILD_ONLY).await;
    };

    let options = command.data.options();
    let Some((name, args)) = subcommand(&options) else {
        return respond_ephemeral(ctx, command, "❌ Unknown subcommand.").await;
    };

    if name != "search" && !invoked_by_admin(state, command) {
        return respond_ephemeral(ctx, command, NOT_ADMIN).await;
    }

    // Search results are shared with the channel; forum management is private.
    defer(ctx, command, name != "search").await?;

    let result = match name {
        "search" => search(state, guild_id, &args).await,
        "add" => add(state, guild_id, &args).await,
        "remove" => remove(state, guild_id, &args).await,
        "list" => list(state, guild_id).await,
        other => Err(AppError::BadRequest(format!("Unknown subcommand `{}`.", other))),
    };

    let content = result.unwrap_or_else(|e| failure_message("character", &e));
    reply(ctx, command, content).await
}

/// Answers character name autocomplete for `/character search` and `/challenge`.
pub async fn autocomplete(
    state: &AppState,
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<(), AppError> {
    let Some(guild_id) = command.guild_id.map(|id| id.get()) else {
        return Ok(());
    };
    let partial = partial_input(&command.data);

    let names = state.characters.autocomplete(guild_id, &partial).await?;
    let response = names
        .into_iter()
        .fold(CreateAutocompleteResponse::new(), |response, name| {
            response.add_string_choice(name.clone(), name)
        });

    command
        .create_response(&ctx.http, CreateInteractionResponse::Autocomplete(response))
        .await?;
    Ok(())
}

/// Text typed so far into the focused option; empty when nothing is focused.
pub fn partial_input(data: &CommandData) -> String {
    data.autocomplete()
        .map(|option| option.value.to_string())
        .unwrap_or_default()
}

fn required_forum(args: &Args) -> Result<(u64, String), AppError> {
    args.channel("forum")
        .ok_or_else(|| AppError::BadRequest("Please provide a forum.".to_string()))
}

async fn search(state: &AppState, guild_id: u64, args: &Args) -> Result<String, AppError> {
    let query = args.text("name").unwrap_or_default();

    if state
        .characters
        .store()
        .get_character_forums(guild_id)
        .await?
        .is_empty()
    {
        return Ok(NO_FORUMS.to_string());
    }

    Ok(match state.characters.search(guild_id, &query).await? {
        Some(entry) => format!(
            "🔎 Closest match in **{}**: **{}**\n{}",
            entry.forum_name,
            entry.title,
            entry.jump_url()
        ),
        None => format!("❌ Couldn't find a close match for **{}**.", query.trim()),
    })
}

async fn add(state: &AppState, guild_id: u64, args: &Args) -> Result<String, AppError> {
    let (forum_id, forum_name) = required_forum(args)?;

    if !state
        .characters
        .store()
        .add_character_forum(guild_id, forum_id)
        .await?
    {
        return Ok(format!(
            "⚠️ **{}** is already a character forum.",
            forum_name
        ));
    }

    let count = state.characters.rebuild(guild_id).await?;
    let forums = state.characters.store().get_character_forums(guild_id).await?;
    tracing::info!("Added character forum {} in guild {}", forum_id, guild_id);

    Ok(format!(
        "✅ Added **{}** to character forums. Now caching {} forum(s) with {} thread(s).",
        forum_name,
        forums.len(),
        count
    ))
}

async fn remove(state: &AppState, guild_id: u64, args: &Args) -> Result<String, AppError> {
    let (forum_id, forum_name) = required_forum(args)?;

    if !state
        .characters
        .store()
        .remove_character_forum(guild_id, forum_id)
        .await?
    {
        return Err(AppError::NotFound(format!(
            "**{}** is not a character forum.",
            forum_name
        )));
    }

    let count = state.characters.rebuild(guild_id).await?;
    tracing::info!("Removed character forum {} in guild {}", forum_id, guild_id);

    Ok(format!(
        "✅ Removed **{}** from character forums. {} thread(s) remain cached.",
        forum_name, count
    ))
}

async fn list(state: &AppState, guild_id: u64) -> Result<String, AppError> {
    let forums = state.characters.store().get_character_forums(guild_id).await?;
    if forums.is_empty() {
        return Ok(NO_FORUMS.to_string());
    }

    let lines: Vec<String> = forums.iter().map(|id| format!("• <#{}>", id)).collect();
    Ok(format!("**Character Forums:**\n{}", lines.join("\n")))
}
