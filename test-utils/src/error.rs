use thiserror::Error;

/// Errors that can occur while setting up a test context.
#[derive(Error, Debug)]
pub enum TestError {
    /// Scratch directory or config file could not be created or read.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Seeded or stored config document is not valid JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
