//! State shared by the event handler and the scheduled jobs.

use serenity::all::UserId;

use crate::service::{
    challenge::ChallengeService, character::CharacterService, edit_session::EditSessionService,
    index::IndexService, thread_move::ThreadMover,
};

/// Shared services of the bot.
///
/// Every field is cheap to clone; clones share the same underlying state.
#[derive(Clone)]
pub struct AppState {
    pub indexes: IndexService,
    pub characters: CharacterService,
    pub edit_sessions: EditSessionService,
    pub mover: ThreadMover,
    pub challenges: ChallengeService,

    /// Account the bot runs as, used to recognise its own messages.
    pub bot_user_id: UserId,
    /// Configured bot owner.
    pub owner_id: Option<u64>,
    /// Guild for guild-scoped command registration.
    pub command_guild_id: Option<u64>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        indexes: IndexService,
        characters: CharacterService,
        edit_sessions: EditSessionService,
        mover: ThreadMover,
        challenges: ChallengeService,
        bot_user_id: UserId,
        owner_id: Option<u64>,
        command_guild_id: Option<u64>,
    ) -> Self {
        Self {
            indexes,
            characters,
            edit_sessions,
            mover,
            challenges,
            bot_user_id,
            owner_id,
            command_guild_id,
        }
    }
}
