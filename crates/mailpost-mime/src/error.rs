//! Error types for MIME helpers.

/// Result type alias for MIME operations.
pub type Result<T> = std::result::Result<T, Error>;

/// MIME error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid line width for wrapped output.
    #[error("Invalid line width: {0}")]
    InvalidLineWidth(usize),
}
