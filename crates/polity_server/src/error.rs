//! Error types for the serving edge.

use thiserror::Error;

use polity_core::error::PolityError;

/// Result type alias using [`ServerError`].
pub type Result<T> = std::result::Result<T, ServerError>;

/// Errors raised by a [`SelectionStore`](crate::store::SelectionStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem access failed.
    #[error("Store IO error at '{path}': {source}")]
    Io {
        /// Path being accessed.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A record could not be encoded or decoded.
    #[error(transparent)]
    Encoding(#[from] PolityError),
}

/// Top-level error type for the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The engine rejected a request.
    #[error(transparent)]
    Engine(#[from] PolityError),

    /// Persistence failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A request line was not a valid request.
    #[error("Invalid request: {0}")]
    Protocol(String),

    /// A response could not be encoded.
    #[error("Failed to encode response: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading requests or writing responses failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Server configuration is invalid.
    #[error("Invalid server configuration: {0}")]
    Config(String),
}
