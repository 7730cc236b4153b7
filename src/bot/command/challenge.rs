//! `/challenge record|view|adjust|reset`.

use serenity::all::{
    CommandInteraction, CommandOptionType, Context, CreateCommand, CreateCommandOption,
};

use crate::bot::command::{
    defer, failure_message, invoked_by_admin, options::subcommand, options::Args, reply,
    respond_ephemeral, GUILD_ONLY, NOT_ADMIN,
};
use crate::error::AppError;
use crate::model::challenge::RecordAdjustment;
use crate::state::AppState;

pub fn register() -> CreateCommand {
    let character = |name: &str, description: &str| {
        CreateCommandOption::new(CommandOptionType::String, name, description)
            .required(true)
            .set_autocomplete(true)
    };
    let count = |name: &str, description: &str| {
        CreateCommandOption::new(CommandOptionType::Integer, name, description).min_int_value(0)
    };

    CreateCommand::new("challenge")
        .description("Dice challenge management commands")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "record",
                "Record a finished dice challenge",
            )
            .add_sub_option(character("winner", "Character who won"))
            .add_sub_option(character("loser", "Character who lost")),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "view",
                "View a character's challenge record",
            )
            .add_sub_option(character("character", "Character name to view")),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "adjust",
                "Manually adjust a character's challenge record",
            )
            .add_sub_option(character("character", "Character name to adjust"))
            .add_sub_option(count("wins", "Total wins"))
            .add_sub_option(count("losses", "Total losses"))
            .add_sub_option(count("win_streak", "Current win streak"))
            .add_sub_option(count("loss_streak", "Current loss streak"))
            .add_sub_option(count("total_games", "Total games")),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "reset",
                "Reset a character's challenge record to zero",
            )
            .add_sub_option(character("character", "Character name to reset")),
        )
}

/// Handles a `/challenge` invocation.
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

    if name != "view" && !invoked_by_admin(state, command) {
        return respond_ephemeral(ctx, command, NOT_ADMIN).await;
    }

    defer(ctx, command, true).await?;

    let result = match name {
        "record" => record(state, guild_id, &args).await,
        "view" => view(state, guild_id, &args).await,
        "adjust" => adjust(state, guild_id, &args).await,
        "reset" => reset(state, guild_id, &args).await,
        other => Err(AppError::BadRequest(format!("Unknown subcommand `{}`.", other))),
    };

    let content = result.unwrap_or_else(|e| failure_message("challenge", &e));
    reply(ctx, command, content).await
}

async fn record(state: &AppState, guild_id: u64, args: &Args) -> Result<String, AppError> {
    let winner = args.text("winner").unwrap_or_default();
    let loser = args.text("loser").unwrap_or_default();

    let report = state.challenges.record(guild_id, &winner, &loser).await?;

    let mut message = format!(
        "✅ Recorded: **{}** beat **{}**\n{}: {} win streak\n{}: {} loss streak",
        report.winner.title,
        report.loser.title,
        report.winner.title,
        report.winner_record.current_win_streak,
        report.loser.title,
        report.loser_record.current_loss_streak
    );
    if let Some(warning) = report.loser_record.streak_warning() {
        message.push_str(&format!("\n{}", warning));
    }
    if !report.unpublished.is_empty() {
        message.push_str(&format!(
            "\n⚠️ Could not update the thread of {}.",
            report.unpublished.join(", ")
        ));
    }
    Ok(message)
}

async fn view(state: &AppState, guild_id: u64, args: &Args) -> Result<String, AppError> {
    let query = args.text("character").unwrap_or_default();
    let (character, record) = state.challenges.view(guild_id, &query).await?;
    Ok(record.describe(&character.title))
}

async fn adjust(state: &AppState, guild_id: u64, args: &Args) -> Result<String, AppError> {
    let query = args.text("character").unwrap_or_default();
    let (character, record, changes) = state
        .challenges
        .adjust(guild_id, &query, adjustment(args))
        .await?;

    if changes.is_empty() {
        return Ok(format!(
            "ℹ️ No changes made to **{}**'s record.\n\n{}",
            character.title,
            record.stats()
        ));
    }
    Ok(format!(
        "✅ Updated **{}**'s record:\n\n{}\n\n{}",
        character.title,
        changes.join("\n"),
        record.stats()
    ))
}

async fn reset(state: &AppState, guild_id: u64, args: &Args) -> Result<String, AppError> {
    let query = args.text("character").unwrap_or_default();
    let character = state.challenges.reset(guild_id, &query).await?;
    Ok(format!(
        "✅ Reset **{}**'s challenge record to zero.",
        character.title
    ))
}

/// Reads the values given to `/challenge adjust`. Negative values count as zero.
fn adjustment(args: &Args) -> RecordAdjustment {
    let count = |name: &str| {
        args.integer(name)
            .map(|value| u32::try_from(value.max(0)).unwrap_or(u32::MAX))
    };

    RecordAdjustment {
        wins: count("wins"),
        losses: count("losses"),
        current_win_streak: count("win_streak"),
        current_loss_streak: count("loss_streak"),
        total_games: count("total_games"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::command::options::ArgValue;

    /// Tests reading adjustment values.
    ///
    /// Expected: given values set, negatives clamped, missing values left unchanged
    #[test]
    fn reads_adjustment() {
        let args = Args::from_pairs(vec![
            ("character".to_string(), ArgValue::Text("Ash".to_string())),
            ("wins".to_string(), ArgValue::Integer(4)),
            ("loss_streak".to_string(), ArgValue::Integer(-2)),
        ]);

        assert_eq!(
            adjustment(&args),
            RecordAdjustment {
                wins: Some(4),
                current_loss_streak: Some(0),
                ..Default::default()
            }
        );
    }
}
