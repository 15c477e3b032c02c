//! # Polity Development Tools
//!
//! Command-line tools for catalog authors:
//! - Catalog validator
//! - Component listing
//! - Offline evaluation of a selection

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod evaluate;
pub mod listing;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

use polity_core::registry::ComponentRegistry;

use crate::error::{Result, ToolError};

/// Load a registry from a catalog file, or the built-in one when no path
/// is given.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the catalog is invalid.
pub fn load_registry(path: Option<&Path>) -> Result<Arc<ComponentRegistry>> {
    match path {
        Some(path) => {
            let contents = read_file(path)?;
            let registry = ComponentRegistry::from_ron_str(&contents, &path.display().to_string())?;
            Ok(Arc::new(registry))
        }
        None => Ok(ComponentRegistry::builtin()?),
    }
}

/// Read a text file, naming the path on failure.
///
/// # Errors
///
/// Returns [`ToolError::Io`] if the file cannot be read.
pub fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| ToolError::Io {
        path: path.display().to_string(),
        source,
    })
}
