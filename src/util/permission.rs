use serenity::all::{GuildId, Http, Permissions, UserId};

use crate::error::AppError;

/// Whether `user_id` is the configured bot owner.
pub fn is_owner(owner_id: Option<u64>, user_id: u64) -> bool {
    owner_id == Some(user_id)
}

/// Whether a user may run administrative actions.
///
/// The owner passes regardless of guild permissions.
///
/// # Arguments
/// - `owner_id` - Configured bot owner, if any
/// - `user_id` - User attempting the action
/// - `permissions` - Guild permissions of the user, when known (e.g. from an interaction)
pub fn is_owner_or_admin(
    owner_id: Option<u64>,
    user_id: u64,
    permissions: Option<Permissions>,
) -> bool {
    is_owner(owner_id, user_id) || permissions.is_some_and(|p| p.administrator())
}

/// Looks up whether a guild member has the administrator permission.
///
/// Used by gateway events that, unlike interactions, do not carry resolved permissions.
///
/// # Returns
/// - `Ok(bool)` - Whether the member is an administrator
/// - `Err(AppError)` - Member or guild could not be fetched
pub async fn member_is_admin(
    http: &Http,
    guild_id: GuildId,
    user_id: UserId,
) -> Result<bool, AppError> {
    let member = guild_id.member(http, user_id).await?;
    let guild = guild_id.to_partial_guild(http).await?;

    Ok(guild.member_permissions(&member).administrator())
}
