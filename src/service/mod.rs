//! Service layer of the bot.
//!
//! Services sit between the Discord event handlers and the config store. They hold the
//! in-memory state of the bot (index state handles, the character cache, pending edit
//! sessions) and are cheap to clone, so handlers and scheduled jobs share one instance of
//! each through `AppState`.

pub mod challenge;
pub mod character;
pub mod edit_session;
#[cfg(test)]
pub mod fake;
pub mod index;
pub mod thread_move;
