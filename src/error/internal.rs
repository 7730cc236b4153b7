use std::num::ParseIntError;
use thiserror::Error;

/// Internal issues with the codebase indicating unexpected behavior & possible bugs
#[derive(Error, Debug)]
pub enum InternalError {
    /// Failure to parse id from String
    ///
    /// Occurs when a snowflake stored as a string in the config file (index keys, character
    /// forum guild keys) is not a valid `u64`.
    #[error("Failed to parse ID from String '{value}': {source}")]
    ParseStringId {
        /// The string value that failed to parse
        value: String,
        /// The underlying parse error
        #[source]
        source: ParseIntError,
    },

    /// Index key is not in the `<guild_id>:<forum_id>` format.
    #[error("Malformed index key '{0}'")]
    MalformedIndexKey(String),
}
