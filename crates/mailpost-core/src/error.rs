//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
///
/// Parsing mail arguments never fails; these cover configuration and setup.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file could not be parsed.
    #[error("Settings error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Site URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// API client could not be built.
    #[error("API error: {0}")]
    Api(#[from] mailpost_api::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
