//! Error types for `Centertech` core library.

use thiserror::Error;

/// Result type alias using `Centertech` Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for `Centertech` operations.
///
/// The session and user stores never return these; storage problems there
/// are logged and degrade to defaults.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Countdown target could not be parsed
    #[error("Invalid countdown target: {0}")]
    InvalidTarget(String),
}
