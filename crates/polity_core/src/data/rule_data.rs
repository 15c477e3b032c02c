//! Interaction rule data structures.
//!
//! Partner lists on components say *which* pairs interact; rules carry the
//! details for a pair (magnitude, description, advisory rate).

use serde::{Deserialize, Serialize};

/// Largest magnitude a rule or an unruled default may carry, in percent.
pub const MAX_MAGNITUDE: u32 = 100;

/// Whether a pair helps or hurts when selected together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InteractionKind {
    /// Both components reinforce each other.
    Synergy,
    /// The components undermine each other.
    Conflict,
}

impl InteractionKind {
    /// Sign applied to the magnitude when accumulating bonuses.
    #[must_use]
    pub const fn sign(&self) -> i32 {
        match self {
            Self::Synergy => 1,
            Self::Conflict => -1,
        }
    }
}

/// Advisory rate range attached to a cross-domain rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptimalRateData {
    /// Name of the rate being advised (e.g., "corporate_tax").
    pub rate: String,

    /// Lower bound of the advised range, in percent.
    pub min_percent: u32,

    /// Upper bound of the advised range, in percent.
    pub max_percent: u32,

    /// Why this range suits the pairing.
    #[serde(default)]
    pub reason: String,
}

/// Details for one declared interaction pair.
///
/// # Example RON
///
/// ```ron
/// InteractionRuleData(
///     between: ("free_market_system", "flat_tax"),
///     kind: Synergy,
///     magnitude: 8,
///     description: "Simple rates reward market participation",
///     optimal_rate: Some((rate: "income_tax", min_percent: 15, max_percent: 22)),
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionRuleData {
    /// The two component IDs, in any order.
    pub between: (String, String),

    /// Synergy or conflict. Must match the partner declaration.
    pub kind: InteractionKind,

    /// Magnitude in percent (bonus fraction for synergies, penalty fraction for conflicts).
    pub magnitude: u32,

    /// Stability points applied while the pair is active. Defaults by kind when absent.
    #[serde(default)]
    pub stability: Option<i32>,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,

    /// Advisory rate range, for cross-domain pairs.
    #[serde(default)]
    pub optimal_rate: Option<OptimalRateData>,
}
