//! Discord gateway integration.
//!
//! The bot answers the `/index` and `/character` slash commands, opens edit sessions when an
//! administrator reacts with ✏️ on one of its messages, and re-posts ✏️-prefixed messages of
//! administrators as its own.
//!
//! # Gateway Intents
//!
//! - `GUILDS` - Guild and channel availability
//! - `GUILD_MESSAGES` / `DIRECT_MESSAGES` - Post-as-bot messages and edit session replies
//! - `GUILD_MESSAGE_REACTIONS` - ✏️ reactions
//! - `MESSAGE_CONTENT` - Reading message text (privileged intent)
//! - `GUILD_MEMBERS` - Resolving member permissions (privileged intent)

pub mod command;
pub mod handler;
pub mod start;
