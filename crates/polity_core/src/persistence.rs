//! Persisted country records.
//!
//! The engine never writes anywhere itself. It hands callers a
//! [`PersistedCountry`] and accepts one back; where the bytes live is the
//! caller's business. Two encodings are offered: compact bincode for
//! storage and RON for inspection and hand edits.

use serde::{Deserialize, Serialize};

use crate::context::CountryContext;
use crate::domain::CountryId;
use crate::error::{PolityError, Result};
use crate::selection::Selections;
use crate::state::UnifiedState;

/// Everything needed to bring a country back after a restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedCountry {
    /// Country the record belongs to.
    pub country: CountryId,
    /// Selections per domain.
    pub selections: Selections,
    /// Scoring context.
    pub context: CountryContext,
    /// Last computed aggregate, including its revision.
    pub state: UnifiedState,
}

impl PersistedCountry {
    /// Encode as bincode.
    ///
    /// # Errors
    ///
    /// Returns [`PolityError::Encoding`] if serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| PolityError::Encoding(e.to_string()))
    }

    /// Decode from bincode.
    ///
    /// # Errors
    ///
    /// Returns [`PolityError::Encoding`] if the bytes are not a valid record.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| PolityError::Encoding(e.to_string()))
    }

    /// Encode as pretty-printed RON.
    ///
    /// # Errors
    ///
    /// Returns [`PolityError::Encoding`] if serialization fails.
    pub fn to_ron(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| PolityError::Encoding(e.to_string()))
    }

    /// Decode from RON text.
    ///
    /// # Errors
    ///
    /// Returns [`PolityError::Encoding`] if the text is not a valid record.
    pub fn from_ron(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| PolityError::Encoding(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ComponentId, Domain};
    use crate::manager::UnifiedStateManager;

    fn sample() -> PersistedCountry {
        let manager = UnifiedStateManager::with_builtin().unwrap();
        let country = CountryId::from("atlantis");
        manager
            .set_selection(
                &country,
                Domain::Government,
                ["rule_of_law", "independent_judiciary"].map(ComponentId::from),
            )
            .unwrap();
        manager
            .set_selection(
                &country,
                Domain::Economy,
                ["free_market_system"].map(ComponentId::from),
            )
            .unwrap();
        manager.snapshot(&country).unwrap()
    }

    #[test]
    fn test_bincode_preserves_record() {
        let record = sample();
        let bytes = record.to_bytes().unwrap();
        assert_eq!(PersistedCountry::from_bytes(&bytes).unwrap(), record);
    }

    #[test]
    fn test_ron_preserves_record() {
        let record = sample();
        let text = record.to_ron().unwrap();
        assert!(text.contains("atlantis"));
        assert_eq!(PersistedCountry::from_ron(&text).unwrap(), record);
    }

    #[test]
    fn test_garbage_is_an_encoding_error() {
        assert!(matches!(
            PersistedCountry::from_bytes(&[0xff, 0x01]),
            Err(PolityError::Encoding(_))
        ));
        assert!(matches!(
            PersistedCountry::from_ron("not a record"),
            Err(PolityError::Encoding(_))
        ));
    }
}
