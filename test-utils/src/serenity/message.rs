//! Test factory for creating Serenity Message objects.

use serenity::all::Message;

/// Creates a test message with customizable author and type.
///
/// # Arguments
/// - `message_id` - Discord message ID (snowflake)
/// - `channel_id` - Channel or thread the message was posted in
/// - `author_id` - User ID of the author
/// - `content` - Message text
/// - `kind` - Raw Discord message type (0 regular, 18 thread created, 20 slash command)
///
/// # Returns
/// - `Message` - A valid Serenity Message struct for testing
///
/// # Panics
/// - If the JSON cannot be deserialized into a Message (indicates invalid test data)
///
/// # Examples
///
/// ```rust,ignore
/// let message = create_test_message(5, 10, 42, "📚 Index of Lore", 0);
/// assert_eq!(message.author.id.get(), 42);
/// ```
pub fn create_test_message(
    message_id: u64,
    channel_id: u64,
    author_id: u64,
    content: &str,
    kind: u8,
) -> Message {
    serde_json::from_value(serde_json::json!({
        "id": message_id.to_string(),
        "channel_id": channel_id.to_string(),
        "author": {
            "id": author_id.to_string(),
            "username": format!("user{}", author_id),
            "discriminator": "0",
            "global_name": null,
            "avatar": null,
            "bot": false,
        },
        "content": content,
        "timestamp": "2024-01-01T00:00:00.000000+00:00",
        "edited_timestamp": null,
        "tts": false,
        "mention_everyone": false,
        "mentions": [],
        "mention_roles": [],
        "attachments": [],
        "embeds": [],
        "pinned": false,
        "type": kind,
    }))
    .expect("Failed to create test message - invalid JSON structure")
}
