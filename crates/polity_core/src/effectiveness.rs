//! Per-domain effectiveness calculation.
//!
//! `final = clamp((mean(base) + synergies - conflicts) * context, 0, 100)`
//!
//! Each same-domain synergy adds its magnitude in points and each
//! same-domain conflict removes its magnitude; pairs without an authored
//! rule use the configured defaults (10 and 15).
//!
//! Only interactions whose two members both belong to the domain count
//! here. Cross-domain interactions feed the unified bonus instead.

use serde::{Deserialize, Serialize};

use crate::context::CountryContext;
use crate::domain::Domain;
use crate::interactions::{Interaction, InteractionSet};
use crate::math::{clamp_score, fixed_serde, mean, Fixed};
use crate::registry::ComponentRegistry;
use crate::selection::Selections;

/// Effectiveness breakdown for one domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainEffectiveness {
    /// Domain scored.
    pub domain: Domain,
    /// Number of selected components.
    pub component_count: usize,
    /// Mean base effectiveness of the selection (0 when empty).
    #[serde(with = "fixed_serde")]
    pub base: Fixed,
    /// Points added by same-domain synergies.
    #[serde(with = "fixed_serde")]
    pub synergy_bonus: Fixed,
    /// Points removed by same-domain conflicts.
    #[serde(with = "fixed_serde")]
    pub conflict_penalty: Fixed,
    /// `base + synergy_bonus - conflict_penalty`, unclamped.
    #[serde(with = "fixed_serde")]
    pub raw: Fixed,
    /// Country context multiplier applied to `raw`.
    #[serde(with = "fixed_serde")]
    pub context_multiplier: Fixed,
    /// Final score, always within `[0, 100]`.
    #[serde(with = "fixed_serde")]
    pub final_score: Fixed,
    /// Same-domain synergies counted in `synergy_bonus`.
    pub synergies: Vec<Interaction>,
    /// Same-domain conflicts counted in `conflict_penalty`.
    pub conflicts: Vec<Interaction>,
}

impl DomainEffectiveness {
    /// Zeroed breakdown for a domain with nothing selected.
    #[must_use]
    pub fn empty(domain: Domain) -> Self {
        Self {
            domain,
            component_count: 0,
            base: Fixed::ZERO,
            synergy_bonus: Fixed::ZERO,
            conflict_penalty: Fixed::ZERO,
            raw: Fixed::ZERO,
            context_multiplier: Fixed::ONE,
            final_score: Fixed::ZERO,
            synergies: Vec::new(),
            conflicts: Vec::new(),
        }
    }
}

/// Sum of interaction magnitudes as score points.
fn total_points(interactions: &[Interaction]) -> Fixed {
    interactions
        .iter()
        .map(Interaction::points)
        .fold(Fixed::ZERO, |acc, p| acc.saturating_add(p))
}

/// Score one domain of a selection.
#[must_use]
pub fn calculate_effectiveness(
    domain: Domain,
    registry: &ComponentRegistry,
    selections: &Selections,
    interactions: &InteractionSet,
    context: &CountryContext,
) -> DomainEffectiveness {
    let selected = selections.get(domain);
    let context_multiplier = context.multiplier();

    if selected.is_empty() {
        return DomainEffectiveness {
            context_multiplier,
            ..DomainEffectiveness::empty(domain)
        };
    }

    let base = mean(
        selected
            .iter()
            .filter_map(|id| registry.get(domain, id.as_str()))
            .map(|c| c.base_effectiveness),
    );

    let synergies: Vec<Interaction> = interactions
        .synergies
        .iter()
        .filter(|i| i.is_within(domain))
        .cloned()
        .collect();
    let conflicts: Vec<Interaction> = interactions
        .conflicts
        .iter()
        .filter(|i| i.is_within(domain))
        .cloned()
        .collect();

    let synergy_bonus = total_points(&synergies);
    let conflict_penalty = total_points(&conflicts);
    let raw = base
        .saturating_add(synergy_bonus)
        .saturating_sub(conflict_penalty);
    let final_score = clamp_score(raw.saturating_mul(context_multiplier));

    DomainEffectiveness {
        domain,
        component_count: selected.len(),
        base,
        synergy_bonus,
        conflict_penalty,
        raw,
        context_multiplier,
        final_score,
        synergies,
        conflicts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::context::{DevelopmentLevel, PoliticalTradition, PopulationBracket};
    use crate::data::InteractionKind;
    use crate::domain::ComponentId;
    use crate::interactions::detect_interactions;

    fn score(domain: Domain, ids: &[&str], context: CountryContext) -> DomainEffectiveness {
        let registry = ComponentRegistry::builtin().unwrap();
        let config = EngineConfig::default();
        let mut selections = Selections::new();
        selections
            .replace(&registry, domain, ids.iter().map(|s| ComponentId::from(*s)))
            .unwrap();
        let interactions = detect_interactions(&registry, &selections, &config);
        calculate_effectiveness(domain, &registry, &selections, &interactions, &context)
    }

    #[test]
    fn test_synergy_pair_scores_98_5() {
        let result = score(
            Domain::Government,
            &["professional_bureaucracy", "rule_of_law"],
            CountryContext::default(),
        );
        assert_eq!(result.base, Fixed::from_num(88.5));
        assert_eq!(result.synergy_bonus, Fixed::from_num(10));
        assert_eq!(result.conflict_penalty, Fixed::ZERO);
        assert_eq!(result.final_score, Fixed::from_num(98.5));
    }

    #[test]
    fn test_conflict_pair_scores_61_5() {
        let result = score(
            Domain::Government,
            &["democratic_process", "autocratic_process"],
            CountryContext::default(),
        );
        assert_eq!(result.base, Fixed::from_num(81.5));
        assert_eq!(result.conflicts.len(), 1);
        assert_eq!(result.conflict_penalty, Fixed::from_num(20));
        assert_eq!(result.final_score, Fixed::from_num(61.5));
    }

    #[test]
    fn test_unruled_pair_uses_default_points() {
        let result = score(
            Domain::Government,
            &["democratic_process", "electoral_legitimacy"],
            CountryContext::default(),
        );
        assert_eq!(result.synergy_bonus, Fixed::from_num(10));
        assert_eq!(result.final_score, Fixed::from_num(87.5));
    }

    #[test]
    fn test_empty_selection_is_zero_regardless_of_context() {
        let context = CountryContext {
            population: Some(PopulationBracket::Small),
            development: Some(DevelopmentLevel::Advanced),
            tradition: Some(PoliticalTradition::Established),
            maintenance_budget: None,
        };
        let result = score(Domain::Economy, &[], context);
        assert_eq!(result.base, Fixed::ZERO);
        assert_eq!(result.final_score, Fixed::ZERO);
        assert!(result.synergies.is_empty() && result.conflicts.is_empty());
    }

    #[test]
    fn test_single_component_applies_context() {
        let context = CountryContext {
            development: Some(DevelopmentLevel::Developing),
            ..CountryContext::default()
        };
        let result = score(Domain::Tax, &["digital_collection"], context);
        let expected = 86.0 * 0.90;
        let actual: f64 = result.final_score.to_num();
        assert!((actual - expected).abs() < 1e-6, "got {actual}");
    }

    #[test]
    fn test_final_is_clamped_to_100() {
        let context = CountryContext {
            population: Some(PopulationBracket::Small),
            development: Some(DevelopmentLevel::Advanced),
            tradition: Some(PoliticalTradition::Established),
            maintenance_budget: None,
        };
        let result = score(
            Domain::Government,
            &["professional_bureaucracy", "rule_of_law"],
            context,
        );
        assert_eq!(result.final_score, Fixed::from_num(100));
        assert!(result.raw < Fixed::from_num(100));
    }

    #[test]
    fn test_cross_domain_synergy_not_counted() {
        let registry = ComponentRegistry::builtin().unwrap();
        let config = EngineConfig::default();
        let mut selections = Selections::new();
        selections
            .replace(
                &registry,
                Domain::Economy,
                [ComponentId::from("free_market_system")],
            )
            .unwrap();
        selections
            .replace(&registry, Domain::Tax, [ComponentId::from("flat_tax")])
            .unwrap();
        let interactions = detect_interactions(&registry, &selections, &config);
        assert_eq!(interactions.synergies.len(), 1);

        let context = CountryContext::default();
        let economy = calculate_effectiveness(
            Domain::Economy,
            &registry,
            &selections,
            &interactions,
            &context,
        );
        assert_eq!(economy.synergy_bonus, Fixed::ZERO);
        assert_eq!(economy.final_score, Fixed::from_num(80));
    }

    #[test]
    fn test_oversized_magnitudes_saturate() {
        let registry = ComponentRegistry::builtin().unwrap();
        let config = EngineConfig::default();
        let mut selections = Selections::new();
        selections
            .replace(
                &registry,
                Domain::Government,
                ["professional_bureaucracy", "rule_of_law"].map(ComponentId::from),
            )
            .unwrap();

        let mut interactions = detect_interactions(&registry, &selections, &config);
        let template = interactions.synergies[0].clone();
        interactions.synergies = vec![
            Interaction {
                magnitude: u32::MAX,
                ..template.clone()
            },
            Interaction {
                magnitude: 3_000_000_000,
                ..template
            },
        ];

        let context = CountryContext::default();
        let boosted =
            calculate_effectiveness(Domain::Government, &registry, &selections, &interactions, &context);
        assert!(boosted.synergy_bonus > Fixed::ZERO);
        assert_eq!(boosted.raw, Fixed::MAX);
        assert_eq!(boosted.final_score, Fixed::from_num(100));

        interactions.conflicts = std::mem::take(&mut interactions.synergies)
            .into_iter()
            .map(|i| Interaction {
                kind: InteractionKind::Conflict,
                ..i
            })
            .collect();
        let crushed =
            calculate_effectiveness(Domain::Government, &registry, &selections, &interactions, &context);
        assert_eq!(crushed.final_score, Fixed::ZERO);
    }
}
