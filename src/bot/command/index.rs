//! `/index add|edit|refresh|list|remove|group-create|group-edit`.

use dioxus_logger::tracing;
use serenity::all::{
    ChannelType, CommandInteraction, CommandOptionType, Context, CreateCommand,
    CreateCommandOption, Permissions,
};

use crate::bot::command::{
    defer, failure_message, invoked_by_admin, options::subcommand, options::Args, reply,
    respond_ephemeral, GUILD_ONLY, NOT_ADMIN,
};
use crate::error::AppError;
use crate::model::{
    group_index::GroupIndexDefinition,
    index::{IndexDefinition, IndexKey},
};
use crate::service::index::RefreshOutcome;
use crate::state::AppState;
use crate::util::parse::parse_channel_list;

pub fn register() -> CreateCommand {
    CreateCommand::new("index")
        .description("Manage forum indexes")
        .default_member_permissions(Permissions::ADMINISTRATOR)
        .add_option(settings_options(
            CreateCommandOption::new(CommandOptionType::SubCommand, "add", "Add a forum to index")
                .add_sub_option(forum_option("The forum channel to index", true))
                .add_sub_option(
                    CreateCommandOption::new(
                        CommandOptionType::String,
                        "name",
                        "Name for this index (e.g. 'Characters', 'Resources')",
                    )
                    .required(true),
                ),
            true,
        ))
        .add_option(settings_options(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "edit",
                "Edit an existing index configuration",
            )
            .add_sub_option(forum_option("The indexed forum", true))
            .add_sub_option(CreateCommandOption::new(
                CommandOptionType::String,
                "name",
                "New name for this index",
            )),
            true,
        ))
        .add_option(settings_options(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "group-create",
                "Create one index over several forums",
            )
            .add_sub_option(target_option("Text channel or forum receiving the index", true))
            .add_sub_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "name",
                    "Name for this group index",
                )
                .required(true),
            )
            .add_sub_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "sources",
                    "Source forums, as mentions or ids (e.g. '#lore #history')",
                )
                .required(true),
            ),
            false,
        ))
        .add_option(settings_options(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "group-edit",
                "Edit an existing group index",
            )
            .add_sub_option(target_option("Target channel of the group index", true))
            .add_sub_option(CreateCommandOption::new(
                CommandOptionType::String,
                "name",
                "New name for this group index",
            ))
            .add_sub_option(CreateCommandOption::new(
                CommandOptionType::String,
                "sources",
                "Replacement list of source forums",
            )),
            false,
        ))
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "refresh",
                "Refresh one or all indexes",
            )
            .add_sub_option(target_option(
                "Indexed forum or group index target to refresh",
                false,
            )),
        )
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "list",
            "List all configured indexes",
        ))
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "remove",
                "Remove an index configuration",
            )
            .add_sub_option(target_option(
                "Indexed forum or group index target to remove",
                true,
            )),
        )
}

fn forum_option(description: &str, required: bool) -> CreateCommandOption {
    CreateCommandOption::new(CommandOptionType::Channel, "forum", description)
        .channel_types(vec![ChannelType::Forum])
        .required(required)
}

fn target_option(description: &str, required: bool) -> CreateCommandOption {
    CreateCommandOption::new(CommandOptionType::Channel, "channel", description)
        .channel_types(vec![ChannelType::Forum, ChannelType::Text])
        .required(required)
}

/// Optional settings shared by the create and edit subcommands. Group indexes name their
/// threads themselves, so they get no `index_thread_name`.
fn settings_options(subcommand: CreateCommandOption, thread_name: bool) -> CreateCommandOption {
    let text = |name: &str, description: &str| {
        CreateCommandOption::new(CommandOptionType::String, name, description)
    };
    let flag = |name: &str, description: &str| {
        CreateCommandOption::new(CommandOptionType::Boolean, name, description)
    };

    let subcommand = subcommand
        .add_sub_option(flag("sort_by_tags", "Group entries by forum tag"))
        .add_sub_option(text(
            "preferred_tags",
            "Comma-separated tags listed first, in this order",
        ));
    let subcommand = if thread_name {
        subcommand.add_sub_option(text(
            "index_thread_name",
            "Name of the index thread (defaults to '📜 {name} Index')",
        ))
    } else {
        subcommand
    };

    subcommand
        .add_sub_option(text("intro_text", "First message of the index thread"))
        .add_sub_option(text("thumb_url", "Thumbnail URL for the index thread"))
        .add_sub_option(text(
            "priority_tag",
            "Tag whose entries are listed first in their group, marked with its emoji",
        ))
        .add_sub_option(flag(
            "character_sorting",
            "Group entries by court (character forums)",
        ))
        .add_sub_option(flag(
            "sort_by_title_pattern",
            "Group entries by a pattern in their titles",
        ))
        .add_sub_option(text(
            "title_grouping_pattern",
            "'date-number', 'date-suffix', 'after-', 'before-', or a regex",
        ))
}

/// Handles an `/index` invocation.
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

    let options = command.data.options();
    let Some((name, args)) = subcommand(&options) else {
        return respond_ephemeral(ctx, command, "❌ Unknown subcommand.").await;
    };

    defer(ctx, command, true).await?;

    let result = match name {
        "add" => add(state, guild_id, &args).await,
        "edit" => edit(state, guild_id, &args).await,
        "refresh" => refresh(state, guild_id, &args).await,
        "list" => list(state, guild_id).await,
        "remove" => remove(state, guild_id, &args).await,
        "group-create" => group_create(state, guild_id, &args).await,
        "group-edit" => group_edit(state, guild_id, &args).await,
        other => Err(AppError::BadRequest(format!("Unknown subcommand `{}`.", other))),
    };

    let content = result.unwrap_or_else(|e| failure_message("index", &e));
    reply(ctx, command, content).await
}

fn required_forum(args: &Args) -> Result<(u64, String), AppError> {
    args.channel("forum")
        .ok_or_else(|| AppError::BadRequest("Please provide a forum.".to_string()))
}

async fn add(state: &AppState, guild_id: u64, args: &Args) -> Result<String, AppError> {
    let (forum_id, forum_name) = required_forum(args)?;
    let options = args.index_options();

    let index_name = options
        .index_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| forum_name.clone());
    let mut definition = IndexDefinition::new(guild_id, forum_id, index_name);
    definition.apply(options)?;

    state.indexes.save_definition(definition.clone()).await?;
    tracing::info!(
        "Added index {} ({}) in guild {}",
        definition.index_name,
        definition.key(),
        guild_id
    );

    let outcome = state.indexes.refresh_definition(&definition).await;

    Ok(format!(
        "✅ Added index for **{}** ({}, {}){}\n{}",
        forum_name,
        definition.index_name,
        definition.grouping.describe(),
        priority_info(&definition),
        describe_refresh(&outcome)
    ))
}

async fn edit(state: &AppState, guild_id: u64, args: &Args) -> Result<String, AppError> {
    let (forum_id, forum_name) = required_forum(args)?;

    let mut definition = state
        .indexes
        .store()
        .get_index(IndexKey::new(guild_id, forum_id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No index configured for **{}**", forum_name)))?;
    definition.apply(args.index_options())?;

    state.indexes.save_definition(definition.clone()).await?;
    let outcome = state.indexes.refresh_definition(&definition).await;

    Ok(format!(
        "✅ Updated index **{}** ({}){}\n{}",
        definition.index_name,
        definition.grouping.describe(),
        priority_info(&definition),
        describe_refresh(&outcome)
    ))
}

async fn refresh(state: &AppState, guild_id: u64, args: &Args) -> Result<String, AppError> {
    if let Some((channel_id, channel_name)) = args.channel("channel") {
        let outcome = match state.indexes.refresh(guild_id, channel_id).await {
            Err(AppError::NotFound(_)) => state.indexes.refresh_group(guild_id, channel_id).await,
            outcome => outcome,
        };
        if let Err(AppError::NotFound(_)) = outcome {
            return Err(AppError::NotFound(format!(
                "No index configured for **{}**",
                channel_name
            )));
        }
        return Ok(format!(
            "Index for **{}**: {}",
            channel_name,
            describe_refresh(&outcome)
        ));
    }

    let report = state.indexes.refresh_guild(guild_id).await?;
    if report.refreshed.is_empty() && report.failed.is_empty() {
        return Err(AppError::NotFound(
            "No indexes configured for this guild".to_string(),
        ));
    }

    let mut lines = Vec::new();
    if !report.refreshed.is_empty() {
        lines.push(format!("✅ Refreshed: {}", report.refreshed.join(", ")));
    }
    if !report.failed.is_empty() {
        lines.push(format!("❌ Failed: {}", report.failed.join(", ")));
    }
    Ok(lines.join("\n"))
}

async fn list(state: &AppState, guild_id: u64) -> Result<String, AppError> {
    let definitions = state.indexes.list(guild_id).await?;
    let groups = state.indexes.list_groups(guild_id).await?;
    if definitions.is_empty() && groups.is_empty() {
        return Ok("No indexes configured for this guild.".to_string());
    }

    let mut lines: Vec<String> = definitions
        .iter()
        .map(|definition| {
            format!(
                "• **{}** in <#{}> ({}){}",
                definition.index_name,
                definition.forum_id,
                definition.grouping.describe(),
                priority_info(definition)
            )
        })
        .collect();
    lines.extend(groups.iter().map(|group| {
        format!(
            "• **{}** (group) — <#{}> ({} source forums)",
            group.group_index_name,
            group.target_channel_id,
            group.source_forum_ids.len()
        )
    }));

    Ok(format!("**Configured Indexes:**\n{}", lines.join("\n")))
}

async fn remove(state: &AppState, guild_id: u64, args: &Args) -> Result<String, AppError> {
    let (channel_id, channel_name) = required_channel(args)?;

    if let Some(definition) = state.indexes.remove(guild_id, channel_id).await? {
        tracing::info!("Removed index {} ({})", definition.index_name, definition.key());
        return Ok(format!(
            "✅ Removed index configuration for **{}**",
            channel_name
        ));
    }

    match state.indexes.remove_group(guild_id, channel_id).await? {
        Some(group) => {
            tracing::info!(
                "Removed group index {} ({})",
                group.group_index_name,
                group.key()
            );
            Ok(format!(
                "✅ Removed group index **{}**",
                group.group_index_name
            ))
        }
        None => Err(AppError::NotFound(format!(
            "No index configured for **{}**",
            channel_name
        ))),
    }
}

fn required_channel(args: &Args) -> Result<(u64, String), AppError> {
    args.channel("channel")
        .ok_or_else(|| AppError::BadRequest("Please provide a channel.".to_string()))
}

/// Reads `sources`, rejecting an empty list.
fn source_forums(value: &str) -> Result<Vec<u64>, AppError> {
    let sources = parse_channel_list(value)?;
    if sources.is_empty() {
        return Err(AppError::BadRequest(
            "Please provide at least one source forum.".to_string(),
        ));
    }
    Ok(sources)
}

async fn group_create(state: &AppState, guild_id: u64, args: &Args) -> Result<String, AppError> {
    let (target_id, target_name) = required_channel(args)?;
    let sources = source_forums(&args.text("sources").unwrap_or_default())?;
    if sources.contains(&target_id) {
        return Err(AppError::BadRequest(
            "The target channel cannot be one of its sources.".to_string(),
        ));
    }
    if state
        .indexes
        .store()
        .get_index(IndexKey::new(guild_id, target_id))
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest(format!(
            "**{}** already has a forum index.",
            target_name
        )));
    }

    let options = args.index_options();
    let name = options
        .index_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| target_name.clone());
    let mut definition = GroupIndexDefinition::new(guild_id, target_id, name, sources);
    definition.apply(options)?;

    state.indexes.save_group(definition.clone()).await?;
    tracing::info!(
        "Created group index {} ({}) over {} forums",
        definition.group_index_name,
        definition.key(),
        definition.source_forum_ids.len()
    );

    let outcome = state.indexes.refresh_group_definition(&definition).await;

    Ok(format!(
        "✅ Created group index **{}** in **{}** ({} source forums, {})\n{}",
        definition.group_index_name,
        target_name,
        definition.source_forum_ids.len(),
        definition.grouping.describe(),
        describe_refresh(&outcome)
    ))
}

async fn group_edit(state: &AppState, guild_id: u64, args: &Args) -> Result<String, AppError> {
    let (target_id, target_name) = required_channel(args)?;

    let mut definition = state
        .indexes
        .store()
        .get_group_index(IndexKey::new(guild_id, target_id))
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No group index configured for **{}**", target_name))
        })?;
    if let Some(sources) = args.text("sources") {
        definition.source_forum_ids = source_forums(&sources)?;
    }
    definition.apply(args.index_options())?;

    state.indexes.save_group(definition.clone()).await?;
    let outcome = state.indexes.refresh_group_definition(&definition).await;

    Ok(format!(
        "✅ Updated group index **{}** ({} source forums, {})\n{}",
        definition.group_index_name,
        definition.source_forum_ids.len(),
        definition.grouping.describe(),
        describe_refresh(&outcome)
    ))
}

fn priority_info(definition: &IndexDefinition) -> String {
    definition
        .priority_tag
        .as_ref()
        .map(|tag| format!(" (priority tag: {})", tag))
        .unwrap_or_default()
}

/// One-line summary of a refresh for a command reply.
pub fn describe_refresh(outcome: &Result<RefreshOutcome, AppError>) -> String {
    match outcome {
        Ok(RefreshOutcome::Unchanged) => "Index is already up to date.".to_string(),
        Ok(RefreshOutcome::Updated(report)) if report.is_clean() => format!(
            "Index refreshed ({} posted, {} edited, {} removed).",
            report.created, report.edited, report.deleted
        ),
        Ok(RefreshOutcome::Updated(report)) => format!(
            "⚠️ Index refreshed with {} failed write(s); they will be retried on the next run.",
            report.failed
        ),
        Ok(RefreshOutcome::ForumUnavailable) => {
            "⚠️ The forum could not be reached.".to_string()
        }
        Err(e) => {
            tracing::error!("Index refresh failed: {}", e);
            format!("⚠️ Refresh failed: {}", e.user_message())
        }
    }
}
