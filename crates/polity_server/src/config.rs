//! Server configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ServerError};

/// On-disk encoding of persisted countries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordFormat {
    /// Compact binary records.
    #[default]
    Bincode,
    /// Human-readable RON records.
    Ron,
}

impl RecordFormat {
    /// File extension used for this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Bincode => "bin",
            Self::Ron => "ron",
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Catalog file; the built-in catalog when `None`.
    pub catalog_path: Option<PathBuf>,
    /// Engine tuning file; defaults when `None`.
    pub engine_config_path: Option<PathBuf>,
    /// Directory for persisted countries; in-memory only when `None`.
    pub data_dir: Option<PathBuf>,
    /// Encoding of persisted countries.
    pub record_format: RecordFormat,
    /// Seconds between stats log lines (0 disables).
    pub stats_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            engine_config_path: None,
            data_dir: None,
            record_format: RecordFormat::Bincode,
            stats_interval_secs: 60,
        }
    }
}

impl ServerConfig {
    /// Parse a configuration from RON, filling missing fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] if the text does not parse.
    pub fn from_ron_str(contents: &str) -> Result<Self> {
        ron::from_str(contents).map_err(|e| ServerError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = ServerConfig::from_ron_str("(data_dir: Some(\"/var/polity\"), record_format: Ron)")
            .unwrap();
        assert_eq!(config.data_dir, Some(PathBuf::from("/var/polity")));
        assert_eq!(config.record_format, RecordFormat::Ron);
        assert_eq!(config.stats_interval_secs, 60);
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn test_bad_config_is_rejected() {
        assert!(matches!(
            ServerConfig::from_ron_str("(stats_interval_secs: \"soon\")"),
            Err(ServerError::Config(_))
        ));
    }
}
