//! Error types for the effectiveness engine.

use thiserror::Error;

use crate::domain::{ComponentId, Domain};

/// Result type alias using [`PolityError`].
pub type Result<T> = std::result::Result<T, PolityError>;

/// Top-level error type for all engine errors.
///
/// Request-time errors (`UnknownComponent`) leave all state untouched.
/// Catalog errors are only produced while building a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolityError {
    /// A submitted component is not in the registry for the stated domain.
    #[error("Unknown {domain} component: {id}")]
    UnknownComponent {
        /// Domain the component was submitted for.
        domain: Domain,
        /// The unrecognized identifier.
        id: ComponentId,
    },

    /// A pair is declared both as a synergy and as a conflict.
    #[error("Pair ({0}, {1}) is registered as both synergy and conflict")]
    DuplicateInteractionRule(ComponentId, ComponentId),

    /// Catalog data failed referential integrity checks.
    #[error("Malformed rule data: {errors:?}")]
    MalformedRuleData {
        /// Every problem found during validation.
        errors: Vec<String>,
    },

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path (or source label) of the data that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Engine configuration is invalid.
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    /// A persisted record could not be encoded or decoded.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A domain name did not match any known domain.
    #[error("Unknown domain: {0}")]
    UnknownDomain(String),
}
