//! Domain models shared by the data, service and bot layers.
//!
//! Persisted shapes (`IndexDefinition`, `GroupIndexDefinition`, `ConfigDocument`,
//! `ChallengeRecord`) keep the JSON layout their files have always used; everything else is
//! rebuilt from Discord on every refresh.

pub mod challenge;
pub mod character;
pub mod config_document;
pub mod group;
pub mod group_index;
pub mod index;
pub mod state;
pub mod thread;
