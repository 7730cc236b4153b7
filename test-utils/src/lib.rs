//! Lorekeeper Test Utils
//!
//! Provides shared testing utilities for the lorekeeper bot. This crate offers a builder for
//! test contexts backed by a scratch directory with a seeded config file, plus factories for
//! config documents and Serenity objects.
//!
//! # Overview
//!
//! The test utilities consist of three main components:
//! - **TestBuilder**: Fluent builder for configuring test environments
//! - **TestContext**: Test environment holding the scratch directory and config path
//! - **TestError**: Error types that can occur during test setup
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::{builder::TestBuilder, factory};
//!
//! #[tokio::test]
//! async fn test_store_operations() -> Result<(), TestError> {
//!     let test = TestBuilder::new()
//!         .with_index(factory::config::index_definition(1, 2, "Lore"))
//!         .build()
//!         .await?;
//!
//!     let store = ConfigStore::new(test.config_path());
//!     // Perform store operations...
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod factory;
pub mod serenity;
