//! Error types for the development tools.

use thiserror::Error;

use polity_core::error::PolityError;

/// Result type alias using [`ToolError`].
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors raised by the tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// A file could not be read.
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// Path that failed.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The engine rejected the input.
    #[error(transparent)]
    Engine(#[from] PolityError),

    /// Output could not be rendered as JSON.
    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// One or more catalog files in a directory failed validation.
    #[error("{failed} of {checked} catalog files failed validation")]
    ValidationFailed {
        /// Files checked.
        checked: usize,
        /// Files that failed.
        failed: usize,
    },
}
