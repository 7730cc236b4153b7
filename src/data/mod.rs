//! Persistence layer for the bot.
//!
//! State that survives a restart lives in two JSON documents. `ConfigStore` holds index
//! definitions, registered character forums, group indexes and the fingerprint of the last
//! successful resync of every index. `ChallengeStore` holds dice challenge records.

pub mod challenge_store;
pub mod config_store;
pub mod json_file;

#[cfg(test)]
mod test;
