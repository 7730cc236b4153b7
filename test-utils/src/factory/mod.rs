//! Factory methods for creating test data.
//!
//! Factories produce config documents as raw JSON so tests exercise the same deserialization
//! path as a config file written by an older version of the bot.
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::factory;
//!
//! // Create with defaults
//! let definition = factory::config::index_definition(1, 2, "Lore");
//!
//! // Using the builder for customization
//! let definition = factory::config::IndexDefinitionFactory::new(1, 2)
//!     .name("Logs")
//!     .title_pattern("date-number")
//!     .build();
//! ```
//!
//! # Available Factories
//!
//! - `config` - Stored index definitions and group indexes

pub mod config;

pub use config::{group_index, index_definition, IndexDefinitionFactory};
