//! The unified aggregate and the pipeline that produces it.
//!
//! One run of the pipeline goes leaf to root: detect interactions, score
//! each domain, translate each domain's impact, resolve cross-domain
//! effects, then weight everything into a single unified score. The run
//! is a pure function of the registry, the configuration, the selections
//! and the country context.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::config::{DomainWeights, EngineConfig};
use crate::context::CountryContext;
use crate::cross_domain::{resolve_cross_domain, CrossDomainEffects, OptimalRateRecommendation};
use crate::domain::Domain;
use crate::effectiveness::{calculate_effectiveness, DomainEffectiveness};
use crate::impact::{translate_impact, DomainImpact};
use crate::interactions::{detect_interactions, Interaction};
use crate::math::{clamp_score, fixed_serde, Fixed};
use crate::registry::ComponentRegistry;
use crate::selection::Selections;
use crate::warnings::{check_limits, domain_costs, DomainCosts, SelectionWarning};

/// Full computed state of one country.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnifiedState {
    /// Mutation counter. Starts at 0 and increases by one per accepted change.
    pub revision: u64,
    /// Selections the state was computed from.
    pub selections: Selections,
    /// Country context the state was computed with.
    pub context: CountryContext,
    /// Effectiveness breakdown per domain.
    pub domains: BTreeMap<Domain, DomainEffectiveness>,
    /// Impact modifiers per domain.
    pub impacts: BTreeMap<Domain, DomainImpact>,
    /// The three domain impacts composed into one.
    pub combined_impact: DomainImpact,
    /// Cross-domain interactions, bonus and advice.
    pub cross_domain: CrossDomainEffects,
    /// Cost footprint per domain.
    pub costs: BTreeMap<Domain, DomainCosts>,
    /// Non-fatal capacity and budget problems.
    pub warnings: Vec<SelectionWarning>,
    /// Weighted unified score, within `[0, 100]`.
    #[serde(with = "fixed_serde")]
    pub unified_effectiveness: Fixed,
}

impl UnifiedState {
    /// Final score of one domain.
    #[must_use]
    pub fn final_score(&self, domain: Domain) -> Fixed {
        self.domains
            .get(&domain)
            .map_or(Fixed::ZERO, |d| d.final_score)
    }

    /// Breakdown of one domain.
    #[must_use]
    pub fn domain(&self, domain: Domain) -> Option<&DomainEffectiveness> {
        self.domains.get(&domain)
    }

    /// Compute a deterministic hash of the state.
    ///
    /// Two states with the same hash were produced from the same inputs.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Build the interaction explanation for this state.
    #[must_use]
    pub fn interaction_report(&self) -> InteractionReport {
        InteractionReport {
            synergies: self
                .domains
                .values()
                .flat_map(|d| d.synergies.iter().cloned())
                .collect(),
            conflicts: self
                .domains
                .values()
                .flat_map(|d| d.conflicts.iter().cloned())
                .collect(),
            cross_domain: self.cross_domain.iter().cloned().collect(),
            recommendations: self.cross_domain.recommendations.clone(),
        }
    }
}

/// Every active interaction of a country, split for presentation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionReport {
    /// Same-domain synergies, domains in canonical order.
    pub synergies: Vec<Interaction>,
    /// Same-domain conflicts, domains in canonical order.
    pub conflicts: Vec<Interaction>,
    /// Cross-domain interactions, synergies first.
    pub cross_domain: Vec<Interaction>,
    /// Advisory rate ranges from cross-domain rules.
    pub recommendations: Vec<OptimalRateRecommendation>,
}

/// Weight domain finals and the cross-domain bonus into the unified score.
///
/// Weights are percents, so the sum is divided by 100 before clamping.
#[must_use]
pub fn unified_score(
    weights: &DomainWeights,
    finals: &BTreeMap<Domain, Fixed>,
    unified_bonus: Fixed,
) -> Fixed {
    let weighted = Domain::ALL
        .into_iter()
        .map(|domain| {
            let score = finals.get(&domain).copied().unwrap_or(Fixed::ZERO);
            score.saturating_mul(Fixed::saturating_from_num(weights.for_domain(domain)))
        })
        .fold(Fixed::ZERO, Fixed::saturating_add)
        .saturating_add(unified_bonus.saturating_mul(Fixed::saturating_from_num(weights.unified_bonus)));

    clamp_score(weighted / Fixed::from_num(100))
}

/// Run the full pipeline for one country.
///
/// The returned state has `revision` 0; the manager stamps the real
/// counter.
#[must_use]
pub fn compute_unified_state(
    registry: &ComponentRegistry,
    config: &EngineConfig,
    selections: &Selections,
    context: &CountryContext,
) -> UnifiedState {
    let interactions = detect_interactions(registry, selections, config);

    let domains: BTreeMap<Domain, DomainEffectiveness> = Domain::ALL
        .into_iter()
        .map(|domain| {
            let scored =
                calculate_effectiveness(domain, registry, selections, &interactions, context);
            (domain, scored)
        })
        .collect();

    let impacts: BTreeMap<Domain, DomainImpact> = Domain::ALL
        .into_iter()
        .map(|domain| {
            (
                domain,
                translate_impact(domain, registry, selections, &interactions),
            )
        })
        .collect();
    let combined_impact = DomainImpact::combine(impacts.values());

    let cross_domain = resolve_cross_domain(&interactions);

    let costs = domain_costs(registry, selections);
    let warnings = check_limits(&costs, config.capacity_limit, context.maintenance_budget);

    let finals: BTreeMap<Domain, Fixed> = domains
        .iter()
        .map(|(domain, scored)| (*domain, scored.final_score))
        .collect();
    let unified_effectiveness =
        unified_score(&config.weights, &finals, cross_domain.unified_bonus);

    UnifiedState {
        revision: 0,
        selections: selections.clone(),
        context: *context,
        domains,
        impacts,
        combined_impact,
        cross_domain,
        costs,
        warnings,
        unified_effectiveness,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ComponentId;

    fn state_for(picks: Vec<(Domain, Vec<&str>)>) -> UnifiedState {
        let registry = ComponentRegistry::builtin().unwrap();
        let mut selections = Selections::new();
        for (domain, ids) in picks {
            selections
                .replace(&registry, domain, ids.into_iter().map(ComponentId::from))
                .unwrap();
        }
        compute_unified_state(
            &registry,
            &EngineConfig::default(),
            &selections,
            &CountryContext::default(),
        )
    }

    #[test]
    fn test_unified_score_weights() {
        let finals = BTreeMap::from([
            (Domain::Government, Fixed::from_num(90)),
            (Domain::Economy, Fixed::from_num(80)),
            (Domain::Tax, Fixed::from_num(70)),
        ]);
        let score = unified_score(&DomainWeights::default(), &finals, Fixed::from_num(5));
        assert_eq!(score, Fixed::from_num(73.5));
    }

    #[test]
    fn test_unified_score_saturates_oversized_weights() {
        let weights = DomainWeights {
            government: u32::MAX,
            economy: u32::MAX,
            tax: u32::MAX,
            unified_bonus: u32::MAX,
        };
        let finals = BTreeMap::from([(Domain::Government, Fixed::from_num(100))]);
        let score = unified_score(&weights, &finals, Fixed::from_num(100));
        assert_eq!(score, Fixed::from_num(100));
    }

    #[test]
    fn test_unified_score_clamps_negative_bonus() {
        let finals = BTreeMap::new();
        let score = unified_score(&DomainWeights::default(), &finals, Fixed::from_num(-40));
        assert_eq!(score, Fixed::ZERO);
    }

    #[test]
    fn test_empty_state_is_zeroed() {
        let state = state_for(vec![]);
        assert_eq!(state.unified_effectiveness, Fixed::ZERO);
        for domain in Domain::ALL {
            assert_eq!(state.final_score(domain), Fixed::ZERO);
            assert_eq!(state.impacts[&domain], DomainImpact::neutral());
        }
        assert!(state.warnings.is_empty());
        assert!(state.interaction_report().synergies.is_empty());
    }

    #[test]
    fn test_pipeline_combines_domains() {
        let state = state_for(vec![
            (Domain::Government, vec!["professional_bureaucracy", "rule_of_law"]),
            (Domain::Economy, vec!["free_market_system"]),
            (Domain::Tax, vec!["flat_tax"]),
        ]);

        assert_eq!(state.final_score(Domain::Government), Fixed::from_num(98.5));
        assert_eq!(state.final_score(Domain::Economy), Fixed::from_num(80));
        assert_eq!(state.cross_domain.unified_bonus, Fixed::from_num(8));

        let report = state.interaction_report();
        assert_eq!(report.synergies.len(), 1);
        assert!(report.conflicts.is_empty());
        assert_eq!(report.cross_domain.len(), 1);
        assert_eq!(report.recommendations.len(), 1);
    }

    #[test]
    fn test_state_hash_is_stable() {
        let picks = || {
            vec![
                (Domain::Government, vec!["democratic_process", "autocratic_process"]),
                (Domain::Tax, vec!["wealth_tax"]),
            ]
        };
        assert_eq!(state_for(picks()).state_hash(), state_for(picks()).state_hash());
        assert_ne!(state_for(picks()).state_hash(), state_for(vec![]).state_hash());
    }
}
