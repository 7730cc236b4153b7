use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required environment variable is not set.
    ///
    /// The bot requires this environment variable to be defined. Check the README for the
    /// list of configuration variables.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Environment variable is set but cannot be parsed.
    #[error("Invalid value '{value}' for environment variable {name}")]
    InvalidEnvVar {
        /// Name of the environment variable
        name: String,
        /// The raw value that failed to parse
        value: String,
    },

    /// Title grouping pattern is not a valid regular expression.
    ///
    /// Rejected when an index definition is created or edited so that invalid patterns never
    /// reach the config file.
    #[error("Invalid title grouping pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern as supplied by the administrator
        pattern: String,
        /// Compiler message from the regex engine
        reason: String,
    },

    /// A parameter required by another option is missing.
    #[error("`{0}` is required for this configuration")]
    MissingParameter(String),
}
