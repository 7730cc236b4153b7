use crate::model::thread::jump_url;

/// A cached thread of a character forum.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharacterEntry {
    pub guild_id: u64,
    pub thread_id: u64,
    pub title: String,
    pub forum_name: String,
}

impl CharacterEntry {
    pub fn jump_url(&self) -> String {
        jump_url(self.guild_id, self.thread_id)
    }
}
