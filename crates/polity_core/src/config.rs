//! Engine configuration.
//!
//! Every tunable constant of the scoring model lives here. The defaults
//! reproduce the reference model exactly; a RON file may override any
//! subset of fields.
//!
//! # Example RON
//!
//! ```ron
//! EngineConfig(
//!     weights: (government: 30, economy: 40, tax: 20, unified_bonus: 10),
//!     synergy_points: 10,
//!     conflict_points: 15,
//!     capacity_limit: 100,
//! )
//! ```

use serde::{Deserialize, Serialize};

use crate::data::MAX_MAGNITUDE;
use crate::domain::Domain;
use crate::error::{PolityError, Result};

/// Largest accepted weight, in percent.
pub const MAX_WEIGHT: u32 = 100;

/// Weights (in percent) used to combine domain scores into the unified score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainWeights {
    /// Weight of the government final score.
    pub government: u32,
    /// Weight of the economy final score.
    pub economy: u32,
    /// Weight of the tax final score.
    pub tax: u32,
    /// Weight of the cross-domain unified bonus.
    pub unified_bonus: u32,
}

impl Default for DomainWeights {
    fn default() -> Self {
        Self {
            government: 30,
            economy: 40,
            tax: 20,
            unified_bonus: 10,
        }
    }
}

impl DomainWeights {
    /// Weight for a single domain.
    #[must_use]
    pub const fn for_domain(&self, domain: Domain) -> u32 {
        match domain {
            Domain::Government => self.government,
            Domain::Economy => self.economy,
            Domain::Tax => self.tax,
        }
    }
}

/// Tunable constants of the scoring model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Unified score weights.
    pub weights: DomainWeights,

    /// Magnitude of a declared synergy with no authored rule. Used as
    /// score points and as a percent bonus fraction.
    pub synergy_points: u32,

    /// Magnitude of a declared conflict with no authored rule. Used as
    /// score points and as a percent penalty fraction.
    pub conflict_points: u32,

    /// Stability points for a declared synergy with no authored rule.
    pub default_synergy_stability: i32,

    /// Stability points for a declared conflict with no authored rule.
    pub default_conflict_stability: i32,

    /// Summed `required_capacity` a domain may use before a warning.
    pub capacity_limit: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: DomainWeights::default(),
            synergy_points: 10,
            conflict_points: 15,
            default_synergy_stability: 1,
            default_conflict_stability: -2,
            capacity_limit: 100,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from RON, filling missing fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PolityError::DataParseError`] for unparseable input and
    /// [`PolityError::InvalidConfig`] if the result fails [`Self::validate`].
    pub fn from_ron_str(contents: &str, source: &str) -> Result<Self> {
        let config: Self = ron::from_str(contents).map_err(|e| PolityError::DataParseError {
            path: source.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can produce meaningful scores.
    ///
    /// # Errors
    ///
    /// Returns [`PolityError::InvalidConfig`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        let w = &self.weights;
        for (name, weight) in [
            ("government", w.government),
            ("economy", w.economy),
            ("tax", w.tax),
            ("unified_bonus", w.unified_bonus),
        ] {
            if weight > MAX_WEIGHT {
                return Err(PolityError::InvalidConfig(format!(
                    "{name} weight {weight}% is above {MAX_WEIGHT}%"
                )));
            }
        }
        if w.government == 0 && w.economy == 0 && w.tax == 0 {
            return Err(PolityError::InvalidConfig(
                "at least one domain weight must be non-zero".to_string(),
            ));
        }
        if self.conflict_points > MAX_MAGNITUDE {
            return Err(PolityError::InvalidConfig(format!(
                "conflict magnitude {}% would invert multipliers",
                self.conflict_points
            )));
        }
        if self.synergy_points > MAX_MAGNITUDE {
            return Err(PolityError::InvalidConfig(format!(
                "synergy magnitude {}% is above {MAX_MAGNITUDE}%",
                self.synergy_points
            )));
        }
        if self.capacity_limit == 0 {
            return Err(PolityError::InvalidConfig(
                "capacity limit must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
