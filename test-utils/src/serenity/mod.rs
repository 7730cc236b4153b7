//! Test factories for creating Serenity API objects.
//!
//! This module provides factory functions for creating mock Serenity structs (forum channels,
//! threads, messages) for testing purposes. These factories create valid Serenity objects by
//! deserializing JSON, simulating what Discord's API would return.
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::serenity::{channel::create_test_forum, message::create_test_message};
//!
//! #[test]
//! fn converts_forum() {
//!     let forum = create_test_forum(10, 1, "Lore", &[(100, "Night", Some("🌙"))]);
//!     let message = create_test_message(5, 10, 42, "hello", 0);
//!
//!     // Use in your tests...
//! }
//! ```
//!
//! # Available Factories
//!
//! - `channel::create_test_forum` - Create forum channels with available tags
//! - `channel::create_test_thread` - Create forum threads with applied tags
//! - `message::create_test_message` - Create messages with a given author and type

pub mod channel;
pub mod message;

// Re-export commonly used functions for convenience
pub use channel::{create_test_forum, create_test_thread};
pub use message::create_test_message;
