//! Country context brackets.
//!
//! Each bracket contributes one independent factor to the context
//! multiplier; an unspecified bracket contributes `1.0`.

use serde::{Deserialize, Serialize};

use crate::math::{percent, Fixed};

/// Population size bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PopulationBracket {
    /// Under ~5 million. Small states are easier to administer.
    Small,
    /// ~5 to 50 million.
    Medium,
    /// ~50 to 200 million.
    Large,
    /// Over ~200 million.
    Massive,
}

impl PopulationBracket {
    /// Multiplier in percent.
    #[must_use]
    pub const fn factor_percent(&self) -> i32 {
        match self {
            Self::Small => 105,
            Self::Medium => 100,
            Self::Large => 95,
            Self::Massive => 90,
        }
    }
}

/// Economic development bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DevelopmentLevel {
    /// Low income, weak institutions.
    Developing,
    /// Middle income, industrializing.
    Emerging,
    /// High income.
    Developed,
    /// Frontier economies.
    Advanced,
}

impl DevelopmentLevel {
    /// Multiplier in percent.
    #[must_use]
    pub const fn factor_percent(&self) -> i32 {
        match self {
            Self::Developing => 90,
            Self::Emerging => 95,
            Self::Developed => 105,
            Self::Advanced => 110,
        }
    }
}

/// Political tradition bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoliticalTradition {
    /// Long-standing, stable institutions.
    Established,
    /// Institutions under active reform.
    Reforming,
    /// Recent regime change.
    Revolutionary,
    /// Contested or collapsing institutions.
    Fragile,
}

impl PoliticalTradition {
    /// Multiplier in percent.
    #[must_use]
    pub const fn factor_percent(&self) -> i32 {
        match self {
            Self::Established => 105,
            Self::Reforming => 100,
            Self::Revolutionary => 90,
            Self::Fragile => 85,
        }
    }
}

/// Country-level inputs to scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CountryContext {
    /// Population bracket, if known.
    #[serde(default)]
    pub population: Option<PopulationBracket>,
    /// Development bracket, if known.
    #[serde(default)]
    pub development: Option<DevelopmentLevel>,
    /// Political tradition bracket, if known.
    #[serde(default)]
    pub tradition: Option<PoliticalTradition>,
    /// Ceiling on summed maintenance cost across all domains.
    #[serde(default)]
    pub maintenance_budget: Option<u32>,
}

impl CountryContext {
    /// Product of the three bracket factors.
    #[must_use]
    pub fn multiplier(&self) -> Fixed {
        let population = self.population.map_or(100, |p| p.factor_percent());
        let development = self.development.map_or(100, |d| d.factor_percent());
        let tradition = self.tradition.map_or(100, |t| t.factor_percent());

        percent(population) * percent(development) * percent(tradition)
    }
}
