//! Catalog validation.

use std::path::Path;

use serde::Serialize;

use polity_core::domain::Domain;
use polity_core::registry::ComponentRegistry;

use crate::error::{Result, ToolError};
use crate::read_file;

/// What a valid catalog contains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    /// Component count per domain, canonical domain order.
    pub components: Vec<(Domain, usize)>,
    /// Number of authored interaction rules.
    pub rules: usize,
}

impl CatalogSummary {
    /// Summarize a loaded registry.
    #[must_use]
    pub fn of(registry: &ComponentRegistry) -> Self {
        Self {
            components: Domain::ALL
                .into_iter()
                .map(|domain| (domain, registry.all(domain).count()))
                .collect(),
            rules: registry.rule_count(),
        }
    }
}

/// Validate one RON catalog file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, does not parse, or fails
/// catalog validation.
pub fn validate_catalog_file(path: &Path) -> Result<CatalogSummary> {
    let contents = read_file(path)?;
    let registry = ComponentRegistry::from_ron_str(&contents, &path.display().to_string())?;
    Ok(CatalogSummary::of(&registry))
}

/// Validate every `.ron` catalog in a directory, or a single file.
///
/// Each failure is logged; the call fails if any file fails.
///
/// # Errors
///
/// Returns [`ToolError::ValidationFailed`] if any catalog is invalid, or
/// an IO error if the directory cannot be listed.
pub fn validate_data_directory(path: &Path) -> Result<usize> {
    if path.is_file() {
        validate_catalog_file(path)?;
        return Ok(1);
    }

    let entries = std::fs::read_dir(path).map_err(|source| ToolError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let mut files: Vec<_> = entries
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    files.sort();

    let mut failed = 0;
    for file in &files {
        match validate_catalog_file(file) {
            Ok(summary) => tracing::info!(
                file = %file.display(),
                rules = summary.rules,
                "Catalog valid"
            ),
            Err(e) => {
                failed += 1;
                tracing::error!(file = %file.display(), "{e}");
            }
        }
    }

    if failed > 0 {
        return Err(ToolError::ValidationFailed {
            checked: files.len(),
            failed,
        });
    }
    Ok(files.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polity_test_utils::fixtures::TINY_CATALOG;

    #[test]
    fn test_valid_file_is_summarized() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("tiny.ron");
        std::fs::write(&file, TINY_CATALOG).unwrap();

        let summary = validate_catalog_file(&file).unwrap();
        assert_eq!(
            summary.components,
            vec![(Domain::Government, 3), (Domain::Economy, 1), (Domain::Tax, 1)]
        );
        assert_eq!(summary.rules, 2);
    }

    #[test]
    fn test_directory_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.ron"), TINY_CATALOG).unwrap();
        std::fs::write(dir.path().join("bad.ron"), "CatalogData(").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let err = validate_data_directory(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            ToolError::ValidationFailed {
                checked: 2,
                failed: 1
            }
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = validate_catalog_file(Path::new("/definitely/not/here.ron")).unwrap_err();
        assert!(matches!(err, ToolError::Io { .. }));
    }
}
