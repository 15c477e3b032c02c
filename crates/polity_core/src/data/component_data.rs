//! Component data structures for data-driven catalog definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::Domain;

/// Modifiers a single component contributes to external calculations.
///
/// Multiplicative factors are authored as percents (`100` is neutral),
/// additive deltas as whole points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainImpactData {
    /// Economic growth factor in percent (e.g., 120 for x1.20).
    pub economic: i32,

    /// Tax collection factor in percent.
    pub tax: i32,

    /// Stability points added (or removed) while selected.
    pub stability: i32,

    /// Legitimacy points added (or removed) while selected.
    pub legitimacy: i32,

    /// Sector-specific factors in percent, keyed by sector name.
    pub sectors: BTreeMap<String, i32>,
}

impl Default for DomainImpactData {
    fn default() -> Self {
        Self {
            economic: 100,
            tax: 100,
            stability: 0,
            legitimacy: 0,
            sectors: BTreeMap::new(),
        }
    }
}

/// Data-driven component definition.
///
/// # Example RON
///
/// ```ron
/// ComponentData(
///     id: "rule_of_law",
///     name: "Rule of Law",
///     domain: Government,
///     category: "Legal Framework",
///     base_effectiveness: 92,
///     implementation_cost: 120,
///     maintenance_cost: 35,
///     required_capacity: 20,
///     synergies: ["professional_bureaucracy"],
///     conflicts: ["autocratic_process"],
///     impact: (economic: 115, tax: 110, stability: 6, legitimacy: 8),
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentData {
    /// Unique string identifier for this component.
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Domain this component is selectable in.
    pub domain: Domain,

    /// Sub-grouping within the domain (e.g., "Power Distribution").
    pub category: String,

    /// Short description for UI tooltips.
    #[serde(default)]
    pub description: String,

    /// Baseline effectiveness score (0-100).
    pub base_effectiveness: u32,

    /// One-time cost to adopt.
    #[serde(default)]
    pub implementation_cost: u32,

    /// Recurring cost while selected.
    #[serde(default)]
    pub maintenance_cost: u32,

    /// Share of the domain's capacity budget consumed (0-100).
    #[serde(default)]
    pub required_capacity: u32,

    /// Component IDs this component forms a synergy with.
    #[serde(default)]
    pub synergies: Vec<String>,

    /// Component IDs this component conflicts with.
    #[serde(default)]
    pub conflicts: Vec<String>,

    /// Modifiers contributed while selected.
    #[serde(default)]
    pub impact: DomainImpactData,
}
