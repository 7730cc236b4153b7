//! Error types shared by every layer of the bot.
//!
//! `AppError` is the top-level error type. It wraps domain-specific errors from the config
//! and internal modules and the third-party errors surfaced by serenity, serde_json, the
//! filesystem, and the cron scheduler. Event handlers and scheduled jobs never propagate an
//! `AppError` further; they log it and move on to the next item.

pub mod config;
pub mod internal;

use thiserror::Error;

use crate::error::{config::ConfigError, internal::InternalError};

/// Top-level application error type.
///
/// Most variants use `#[from]` for automatic conversion with `?`. The Discord error is boxed
/// because `serenity::Error` is large and would inflate every other variant.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error from the environment or from an administrative command.
    ///
    /// Shown to the invoking administrator as a rejection; no state is mutated.
    #[error(transparent)]
    ConfigErr(#[from] ConfigError),

    /// Unexpected internal failure, usually a malformed identifier.
    #[error(transparent)]
    InternalErr(#[from] InternalError),

    /// Discord API error from Serenity.
    ///
    /// Boxed due to large size. Use `is_transient` to decide whether a retry makes sense.
    #[error(transparent)]
    DiscordErr(#[from] Box<serenity::Error>),

    /// Filesystem error while reading or writing the config file.
    #[error(transparent)]
    IoErr(#[from] std::io::Error),

    /// Malformed JSON in the config file.
    #[error(transparent)]
    JsonErr(#[from] serde_json::Error),

    /// Cron scheduler error.
    #[error(transparent)]
    SchedulerErr(#[from] tokio_cron_scheduler::JobSchedulerError),

    /// Resource not found error.
    ///
    /// # Fields
    /// - Message describing what resource was not found
    #[error("{0}")]
    NotFound(String),

    /// Invalid request from a command invocation.
    ///
    /// # Fields
    /// - Message describing what was invalid about the request
    #[error("{0}")]
    BadRequest(String),

    /// Internal error with custom message.
    #[error("{0}")]
    InternalError(String),
}

/// Manual conversion from serenity::Error to AppError.
///
/// Boxes the error to reduce the size of the AppError enum, as serenity::Error
/// is very large and would make all AppError variants larger if not boxed.
impl From<serenity::Error> for AppError {
    fn from(err: serenity::Error) -> Self {
        AppError::DiscordErr(Box::new(err))
    }
}

impl AppError {
    /// Returns the HTTP status code of a failed Discord request, if this error carries one.
    pub fn discord_status(&self) -> Option<u16> {
        match self {
            AppError::DiscordErr(err) => match err.as_ref() {
                serenity::Error::Http(http_err) => {
                    http_err.status_code().map(|status| status.as_u16())
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// Whether retrying the failed operation may succeed.
    ///
    /// Rate limiting (429) and server-side failures (5xx) are transient. Everything else,
    /// including missing channels, forbidden actions and config problems, is permanent and
    /// is skipped by the caller.
    ///
    /// # Returns
    /// - `true` - The operation should be retried with backoff
    /// - `false` - The operation should be logged and skipped
    pub fn is_transient(&self) -> bool {
        match self.discord_status() {
            Some(429) => true,
            Some(status) => (500..600).contains(&status),
            None => matches!(
                self,
                AppError::DiscordErr(err) if matches!(err.as_ref(), serenity::Error::Io(_))
            ),
        }
    }

    /// Message safe to show to the administrator who triggered a command.
    pub fn user_message(&self) -> String {
        match self {
            AppError::ConfigErr(err) => err.to_string(),
            AppError::NotFound(msg) | AppError::BadRequest(msg) => msg.clone(),
            _ => "Something went wrong, check the bot logs for details.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that configuration errors are never retried.
    ///
    /// Expected: Ok with `is_transient` false and the error text exposed to the user
    #[test]
    fn config_errors_are_permanent() {
        let err = AppError::from(ConfigError::MissingParameter("title_grouping_pattern".into()));

        assert!(!err.is_transient());
        assert!(err.user_message().contains("title_grouping_pattern"));
    }

    /// Tests that generic failures hide their details from the command reply.
    ///
    /// Expected: Ok with a generic message
    #[test]
    fn internal_errors_use_generic_message() {
        let err = AppError::InternalError("lock poisoned".to_string());

        assert!(!err.is_transient());
        assert!(!err.user_message().contains("lock poisoned"));
    }
}
