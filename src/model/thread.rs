//! Ephemeral views of forum threads and messages, rebuilt whenever they are needed.

/// Builds the Discord jump URL of a channel or thread.
pub fn jump_url(guild_id: u64, channel_id: u64) -> String {
    format!("https://discord.com/channels/{}/{}", guild_id, channel_id)
}

/// A forum thread listed in an index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThreadEntry {
    pub id: u64,
    pub title: String,
    /// Applied tag names, in the order Discord reports them.
    pub tags: Vec<String>,
    pub jump_url: String,
    pub archived: bool,
}

impl ThreadEntry {
    /// Whether the thread carries `tag`, compared case-insensitively.
    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = tag.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase() == wanted)
    }
}

/// A tag available in a forum.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForumTagInfo {
    pub id: u64,
    pub name: String,
    /// Unicode emoji, or `<:tag:id>` markup for a custom emoji.
    pub emoji: Option<String>,
}

/// Forum metadata needed to render an index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ForumSnapshot {
    pub id: u64,
    pub guild_id: u64,
    pub name: String,
    pub tags: Vec<ForumTagInfo>,
}

impl ForumSnapshot {
    /// Emoji of the forum tag named `tag`, compared case-insensitively.
    pub fn emoji_for(&self, tag: &str) -> Option<&str> {
        let wanted = tag.to_lowercase();
        self.tags
            .iter()
            .find(|t| t.name.to_lowercase() == wanted)
            .and_then(|t| t.emoji.as_deref())
    }

    /// Name of the tag with the given id, if the forum still offers it.
    pub fn tag_name(&self, tag_id: u64) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.id == tag_id)
            .map(|t| t.name.as_str())
    }
}

/// A file attached to a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachmentRef {
    pub filename: String,
    pub url: String,
}

/// A message already posted in a thread or channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostedMessage {
    pub id: u64,
    pub content: String,
    /// Authored by the bot with a regular or slash-command message type.
    pub editable: bool,
    /// Regular or reply message, as opposed to a system notice.
    pub user_content: bool,
    pub attachments: Vec<AttachmentRef>,
}

/// A message about to be posted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Draft {
    pub content: String,
    /// Files re-uploaded from their URL.
    pub attachments: Vec<AttachmentRef>,
    /// Rendered as an embed thumbnail.
    pub thumb_url: Option<String>,
}

impl Draft {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn thumbnail(mut self, url: Option<&str>) -> Self {
        self.thumb_url = url.map(str::to_string);
        self
    }
}
