//! Domain impact translation.
//!
//! Turns a domain's selection into the modifiers consumed by economic and
//! fiscal calculations outside the engine. Multiplicative factors compound
//! (each component's factor, then `1 + fraction` per same-domain synergy
//! and `1 - fraction` per same-domain conflict). Nothing here is clamped;
//! consumers bound the values for their own purposes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::InteractionKind;
use crate::domain::Domain;
use crate::interactions::InteractionSet;
use crate::math::{fixed_map_serde, fixed_serde, percent, Fixed};
use crate::registry::ComponentRegistry;
use crate::selection::Selections;

/// Modifiers produced by one domain (or a combination of domains).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainImpact {
    /// Multiplier on economic growth.
    #[serde(with = "fixed_serde")]
    pub economic_growth_multiplier: Fixed,
    /// Multiplier on tax collection.
    #[serde(with = "fixed_serde")]
    pub tax_collection_multiplier: Fixed,
    /// Additive stability points.
    pub stability_delta: i32,
    /// Additive legitimacy points.
    pub legitimacy_delta: i32,
    /// Sector multipliers. Only sectors some selected component declares
    /// are present; absent sectors are neutral.
    #[serde(with = "fixed_map_serde")]
    pub sector_multipliers: BTreeMap<String, Fixed>,
}

impl Default for DomainImpact {
    fn default() -> Self {
        Self::neutral()
    }
}

impl DomainImpact {
    /// Impact of an empty selection: every multiplier `1.0`, every delta `0`.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            economic_growth_multiplier: Fixed::ONE,
            tax_collection_multiplier: Fixed::ONE,
            stability_delta: 0,
            legitimacy_delta: 0,
            sector_multipliers: BTreeMap::new(),
        }
    }

    /// Multiplier for a sector, `1.0` when no component declares it.
    #[must_use]
    pub fn sector_multiplier(&self, sector: &str) -> Fixed {
        self.sector_multipliers
            .get(sector)
            .copied()
            .unwrap_or(Fixed::ONE)
    }

    /// Compose several impacts into one.
    ///
    /// Multipliers multiply, deltas add, sector maps merge multiplicatively.
    #[must_use]
    pub fn combine<'a>(impacts: impl IntoIterator<Item = &'a DomainImpact>) -> Self {
        let mut combined = Self::neutral();
        for impact in impacts {
            combined.economic_growth_multiplier = combined
                .economic_growth_multiplier
                .saturating_mul(impact.economic_growth_multiplier);
            combined.tax_collection_multiplier = combined
                .tax_collection_multiplier
                .saturating_mul(impact.tax_collection_multiplier);
            combined.stability_delta = combined.stability_delta.saturating_add(impact.stability_delta);
            combined.legitimacy_delta = combined.legitimacy_delta.saturating_add(impact.legitimacy_delta);
            for (sector, factor) in &impact.sector_multipliers {
                let entry = combined
                    .sector_multipliers
                    .entry(sector.clone())
                    .or_insert(Fixed::ONE);
                *entry = entry.saturating_mul(*factor);
            }
        }
        combined
    }
}

/// Translate one domain's selection into impact modifiers.
///
/// Interaction stability deltas are applied to `stability_delta`;
/// `legitimacy_delta` is the plain sum of component contributions.
#[must_use]
pub fn translate_impact(
    domain: Domain,
    registry: &ComponentRegistry,
    selections: &Selections,
    interactions: &InteractionSet,
) -> DomainImpact {
    let mut impact = DomainImpact::neutral();

    for component in selections
        .get(domain)
        .iter()
        .filter_map(|id| registry.get(domain, id.as_str()))
    {
        let data = &component.impact;
        impact.economic_growth_multiplier = impact
            .economic_growth_multiplier
            .saturating_mul(percent(data.economic));
        impact.tax_collection_multiplier = impact
            .tax_collection_multiplier
            .saturating_mul(percent(data.tax));
        impact.stability_delta = impact.stability_delta.saturating_add(data.stability);
        impact.legitimacy_delta = impact.legitimacy_delta.saturating_add(data.legitimacy);

        for (sector, factor) in &data.sectors {
            let entry = impact
                .sector_multipliers
                .entry(sector.clone())
                .or_insert(Fixed::ONE);
            *entry = entry.saturating_mul(percent(*factor));
        }
    }

    for interaction in interactions.within(domain) {
        let factor = match interaction.kind {
            InteractionKind::Synergy => Fixed::ONE.saturating_add(interaction.fraction()),
            InteractionKind::Conflict => Fixed::ONE.saturating_sub(interaction.fraction()),
        };
        impact.economic_growth_multiplier = impact.economic_growth_multiplier.saturating_mul(factor);
        impact.tax_collection_multiplier = impact.tax_collection_multiplier.saturating_mul(factor);
        impact.stability_delta = impact.stability_delta.saturating_add(interaction.stability);
    }

    impact
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::domain::ComponentId;
    use crate::interactions::detect_interactions;

    fn translate(domain: Domain, ids: &[&str]) -> DomainImpact {
        let registry = ComponentRegistry::builtin().unwrap();
        let mut selections = Selections::new();
        selections
            .replace(&registry, domain, ids.iter().map(|s| ComponentId::from(*s)))
            .unwrap();
        let interactions = detect_interactions(&registry, &selections, &EngineConfig::default());
        translate_impact(domain, &registry, &selections, &interactions)
    }

    fn approx(value: Fixed, expected: f64) -> bool {
        (value.to_num::<f64>() - expected).abs() < 1e-6
    }

    #[test]
    fn test_empty_selection_is_neutral() {
        let impact = translate(Domain::Economy, &[]);
        assert_eq!(impact, DomainImpact::neutral());
        assert_eq!(impact.sector_multiplier("technology"), Fixed::ONE);
    }

    #[test]
    fn test_synergy_compounds_multiplicatively() {
        // 1.20 * 1.15 * (1 + 0.10)
        let impact = translate(
            Domain::Government,
            &["professional_bureaucracy", "rule_of_law"],
        );
        assert!(approx(impact.economic_growth_multiplier, 1.20 * 1.15 * 1.10));
        assert!(approx(impact.tax_collection_multiplier, 1.15 * 1.10 * 1.10));
        // 4 + 6 component stability, +3 from the rule
        assert_eq!(impact.stability_delta, 13);
        assert_eq!(impact.legitimacy_delta, 11);
    }

    #[test]
    fn test_conflict_reduces_multipliers() {
        // 1.06 * 0.96 * (1 - 0.20)
        let impact = translate(
            Domain::Government,
            &["democratic_process", "autocratic_process"],
        );
        assert!(approx(impact.economic_growth_multiplier, 1.06 * 0.96 * 0.80));
        assert_eq!(impact.stability_delta, 2 + 6 - 8);
    }

    #[test]
    fn test_sector_map_is_sparse() {
        let impact = translate(Domain::Government, &["rule_of_law", "independent_judiciary"]);
        assert_eq!(impact.sector_multipliers.len(), 1);
        assert!(approx(impact.sector_multiplier("finance"), 1.10 * 1.08));
        assert_eq!(impact.sector_multiplier("mining"), Fixed::ONE);
    }

    #[test]
    fn test_combine_multiplies_and_adds() {
        let gov = translate(Domain::Government, &["rule_of_law"]);
        let eco = translate(Domain::Economy, &["free_market_system"]);
        let combined = DomainImpact::combine([&gov, &eco]);

        assert!(approx(combined.economic_growth_multiplier, 1.15 * 1.18));
        assert_eq!(combined.stability_delta, 6 - 2);
        assert!(approx(combined.sector_multiplier("finance"), 1.10 * 1.12));
        assert!(approx(combined.sector_multiplier("services"), 1.10));
    }
}
