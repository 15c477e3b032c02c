//! Domain and identifier types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PolityError;

/// One of the three independently edited selection spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Domain {
    /// Structures of power, administration and legitimacy.
    Government,
    /// Market structure, ownership and production.
    Economy,
    /// Revenue collection instruments.
    Tax,
}

impl Domain {
    /// All domains in canonical order.
    pub const ALL: [Self; 3] = [Self::Government, Self::Economy, Self::Tax];

    /// Get the display name for this domain.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Government => "Government",
            Self::Economy => "Economy",
            Self::Tax => "Tax",
        }
    }

    /// Get the lowercase key used in requests and data files.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Government => "government",
            Self::Economy => "economy",
            Self::Tax => "tax",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Domain {
    type Err = PolityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "government" | "gov" => Ok(Self::Government),
            "economy" | "economic" | "eco" => Ok(Self::Economy),
            "tax" | "taxation" => Ok(Self::Tax),
            _ => Err(PolityError::UnknownDomain(s.to_string())),
        }
    }
}

/// Stable identifier of a catalog component.
///
/// Ordered so that every derived list can be produced deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    /// Create a new component identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ComponentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::borrow::Borrow<str> for ComponentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Identifier of the country whose selections are being edited.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryId(String);

impl CountryId {
    /// Create a new country identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CountryId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_parse() {
        assert_eq!("government".parse::<Domain>().unwrap(), Domain::Government);
        assert_eq!(" Economy ".parse::<Domain>().unwrap(), Domain::Economy);
        assert_eq!("TAX".parse::<Domain>().unwrap(), Domain::Tax);
        assert!(matches!(
            "military".parse::<Domain>(),
            Err(PolityError::UnknownDomain(_))
        ));
    }

    #[test]
    fn test_component_ids_order_lexicographically() {
        let mut ids = vec![ComponentId::from("rule_of_law"), ComponentId::from("free_market")];
        ids.sort();
        assert_eq!(ids[0].as_str(), "free_market");
    }
}
