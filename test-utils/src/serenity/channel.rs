//! Test factory for creating Serenity GuildChannel objects.
//!
//! Forum channels (type 15) and public threads (type 11) are both `GuildChannel`s in Serenity;
//! threads carry `thread_metadata` and the ids of their applied tags.

use serenity::all::GuildChannel;

/// Creates a test forum channel with the given available tags.
///
/// # Arguments
/// - `channel_id` - Discord channel ID (snowflake)
/// - `guild_id` - Discord guild ID the forum belongs to
/// - `name` - Forum name
/// - `tags` - Available tags as `(tag_id, name, unicode_emoji)`
///
/// # Returns
/// - `GuildChannel` - A valid Serenity forum channel for testing
///
/// # Panics
/// - If the JSON cannot be deserialized into a GuildChannel (indicates invalid test data)
///
/// # Examples
///
/// ```rust,ignore
/// let forum = create_test_forum(10, 1, "Characters", &[(100, "Night Court", Some("💫"))]);
/// assert_eq!(forum.available_tags.len(), 1);
/// ```
pub fn create_test_forum(
    channel_id: u64,
    guild_id: u64,
    name: &str,
    tags: &[(u64, &str, Option<&str>)],
) -> GuildChannel {
    let available_tags: Vec<_> = tags
        .iter()
        .map(|(id, tag_name, emoji)| {
            serde_json::json!({
                "id": id.to_string(),
                "name": tag_name,
                "moderated": false,
                "emoji_id": null,
                "emoji_name": emoji,
            })
        })
        .collect();

    serde_json::from_value(serde_json::json!({
        "id": channel_id.to_string(),
        "guild_id": guild_id.to_string(),
        "type": 15,
        "name": name,
        "position": 0,
        "permission_overwrites": [],
        "nsfw": false,
        "parent_id": null,
        "topic": null,
        "flags": 0,
        "available_tags": available_tags,
        "applied_tags": [],
    }))
    .expect("Failed to create test forum - invalid JSON structure")
}

/// Creates a test public thread inside a forum.
///
/// # Arguments
/// - `thread_id` - Discord thread ID (snowflake)
/// - `guild_id` - Discord guild ID
/// - `parent_id` - Forum channel the thread belongs to
/// - `name` - Thread title
/// - `applied_tags` - Ids of the forum tags applied to the thread
/// - `archived` - Whether the thread is archived
///
/// # Returns
/// - `GuildChannel` - A valid Serenity thread channel for testing
///
/// # Panics
/// - If the JSON cannot be deserialized into a GuildChannel (indicates invalid test data)
pub fn create_test_thread(
    thread_id: u64,
    guild_id: u64,
    parent_id: u64,
    name: &str,
    applied_tags: &[u64],
    archived: bool,
) -> GuildChannel {
    let applied_tags: Vec<String> = applied_tags.iter().map(|id| id.to_string()).collect();

    serde_json::from_value(serde_json::json!({
        "id": thread_id.to_string(),
        "guild_id": guild_id.to_string(),
        "type": 11,
        "name": name,
        "parent_id": parent_id.to_string(),
        "owner_id": "1",
        "position": 0,
        "permission_overwrites": [],
        "nsfw": false,
        "flags": 0,
        "message_count": 1,
        "member_count": 1,
        "thread_metadata": {
            "archived": archived,
            "auto_archive_duration": 10080,
            "archive_timestamp": "2024-01-01T00:00:00.000000+00:00",
            "locked": false,
            "invitable": false,
        },
        "applied_tags": applied_tags,
    }))
    .expect("Failed to create test thread - invalid JSON structure")
}
