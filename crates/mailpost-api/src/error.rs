//! Error types for API operations.

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// API client error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The API answered with a non-success status document.
    #[error("API error ({status}): {code} - {message}")]
    Api {
        /// Response status (e.g. `error`, `parameter-error`).
        status: String,
        /// Error code (e.g. `ValidationError`).
        code: String,
        /// Human-readable description.
        message: String,
    },

    /// Response could not be understood.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Creates an API error from a status, code and description.
    #[must_use]
    pub fn api_error(
        status: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Api {
            status: status.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}
