//! Interaction detection.
//!
//! Pairs every selected component with every other selected component
//! (across all three domains) and records the synergies and conflicts
//! declared for those pairs. Interactions are derived fresh on every
//! recompute and never stored on their own.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::data::{InteractionKind, OptimalRateData};
use crate::domain::{ComponentId, Domain};
use crate::math::Fixed;
use crate::registry::{Component, ComponentRegistry};
use crate::selection::Selections;

/// An active synergy or conflict between two selected components.
///
/// `first` always sorts before `second`, so one unordered pair has
/// exactly one representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interaction {
    /// Synergy or conflict.
    pub kind: InteractionKind,
    /// Lower-sorting member of the pair.
    pub first: ComponentId,
    /// Domain of `first`.
    pub first_domain: Domain,
    /// Higher-sorting member of the pair.
    pub second: ComponentId,
    /// Domain of `second`.
    pub second_domain: Domain,
    /// Magnitude from the pair's rule or the kind's default. Read as score
    /// points by the effectiveness calculator and as a percent by the
    /// impact translator.
    pub magnitude: u32,
    /// Stability points while the pair is active.
    pub stability: i32,
    /// Human-readable description.
    pub description: String,
    /// Whether the pair carries an authored rule.
    pub has_rule: bool,
    /// Advisory rate range from the rule, if any.
    pub optimal_rate: Option<OptimalRateData>,
}

impl Interaction {
    /// Check whether the two members belong to different domains.
    #[must_use]
    pub fn is_cross_domain(&self) -> bool {
        self.first_domain != self.second_domain
    }

    /// Check whether both members belong to `domain`.
    #[must_use]
    pub fn is_within(&self, domain: Domain) -> bool {
        self.first_domain == domain && self.second_domain == domain
    }

    /// Check whether a component is one of the pair.
    #[must_use]
    pub fn involves(&self, id: &str) -> bool {
        self.first.as_str() == id || self.second.as_str() == id
    }

    /// Magnitude as score points.
    #[must_use]
    pub fn points(&self) -> Fixed {
        Fixed::saturating_from_num(self.magnitude)
    }

    /// Magnitude as a fraction (e.g. `0.10` for 10%).
    #[must_use]
    pub fn fraction(&self) -> Fixed {
        self.points() / Fixed::from_num(100)
    }

    /// Magnitude signed by kind: positive for synergies, negative for conflicts.
    #[must_use]
    pub fn signed_magnitude(&self) -> i32 {
        self.kind.sign() * i32::try_from(self.magnitude).unwrap_or(i32::MAX)
    }
}

/// All interactions active for one set of selections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InteractionSet {
    /// Active synergies, ordered by pair.
    pub synergies: Vec<Interaction>,
    /// Active conflicts, ordered by pair.
    pub conflicts: Vec<Interaction>,
}

impl InteractionSet {
    /// Every interaction, synergies first.
    pub fn iter(&self) -> impl Iterator<Item = &Interaction> {
        self.synergies.iter().chain(self.conflicts.iter())
    }

    /// Interactions whose members both belong to `domain`.
    pub fn within(&self, domain: Domain) -> impl Iterator<Item = &Interaction> {
        self.iter().filter(move |i| i.is_within(domain))
    }

    /// Interactions spanning two domains.
    pub fn cross_domain(&self) -> impl Iterator<Item = &Interaction> {
        self.iter().filter(|i| i.is_cross_domain())
    }

    /// Total number of active interactions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.synergies.len() + self.conflicts.len()
    }

    /// Check if no interactions are active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the interaction record for a declared pair.
fn build_interaction(
    registry: &ComponentRegistry,
    config: &EngineConfig,
    kind: InteractionKind,
    a: &Component,
    b: &Component,
) -> Interaction {
    let (first, second) = if a.id <= b.id { (a, b) } else { (b, a) };
    let rule = registry.rule_for(&first.id, &second.id);

    let (default_magnitude, default_stability, verb) = match kind {
        InteractionKind::Synergy => (
            config.synergy_points,
            config.default_synergy_stability,
            "reinforces",
        ),
        InteractionKind::Conflict => (
            config.conflict_points,
            config.default_conflict_stability,
            "undermines",
        ),
    };

    let description = rule
        .map(|r| r.description.clone())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| format!("{} {verb} {}", first.name, second.name));

    Interaction {
        kind,
        first: first.id.clone(),
        first_domain: first.domain,
        second: second.id.clone(),
        second_domain: second.domain,
        magnitude: rule.map_or(default_magnitude, |r| r.magnitude),
        stability: rule
            .and_then(|r| r.stability)
            .unwrap_or(default_stability),
        description,
        has_rule: rule.is_some(),
        optimal_rate: rule.and_then(|r| r.optimal_rate.clone()),
    }
}

/// Detect every active synergy and conflict among the selected components.
///
/// All three domains are flattened into one set for pairing, since rules
/// may span domains. Components are visited in ID order, so the output
/// order is a pure function of the selections.
#[must_use]
pub fn detect_interactions(
    registry: &ComponentRegistry,
    selections: &Selections,
    config: &EngineConfig,
) -> InteractionSet {
    let mut selected: Vec<&Component> = selections
        .iter()
        .filter_map(|(domain, id)| registry.get(domain, id.as_str()))
        .collect();
    selected.sort_by(|a, b| a.id.cmp(&b.id));
    selected.dedup_by(|a, b| a.id == b.id);

    let mut set = InteractionSet::default();

    for (index, a) in selected.iter().enumerate() {
        for b in &selected[index + 1..] {
            match registry.interaction_kind(a, b) {
                Some(kind @ InteractionKind::Synergy) => set
                    .synergies
                    .push(build_interaction(registry, config, kind, a, b)),
                Some(kind @ InteractionKind::Conflict) => set
                    .conflicts
                    .push(build_interaction(registry, config, kind, a, b)),
                None => {}
            }
        }
    }

    tracing::trace!(
        selected = selected.len(),
        synergies = set.synergies.len(),
        conflicts = set.conflicts.len(),
        "Detected interactions"
    );

    set
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn select(registry: &ComponentRegistry, picks: Vec<(Domain, Vec<&str>)>) -> Selections {
        let mut selections = Selections::new();
        for (domain, ids) in picks {
            selections
                .replace(registry, domain, ids.into_iter().map(ComponentId::from))
                .unwrap();
        }
        selections
    }

    #[test]
    fn test_detects_same_domain_synergy_with_rule() {
        let registry = ComponentRegistry::builtin().unwrap();
        let selections = select(
            &registry,
            vec![(Domain::Government, vec!["professional_bureaucracy", "rule_of_law"])],
        );

        let set = detect_interactions(&registry, &selections, &EngineConfig::default());
        assert_eq!(set.synergies.len(), 1);
        assert!(set.conflicts.is_empty());

        let synergy = &set.synergies[0];
        assert_eq!(synergy.first.as_str(), "professional_bureaucracy");
        assert_eq!(synergy.second.as_str(), "rule_of_law");
        assert_eq!(synergy.magnitude, 10);
        assert!(synergy.has_rule);
        assert!(!synergy.is_cross_domain());
    }

    #[test]
    fn test_detects_conflict() {
        let registry = ComponentRegistry::builtin().unwrap();
        let selections = select(
            &registry,
            vec![(Domain::Government, vec!["democratic_process", "autocratic_process"])],
        );

        let set = detect_interactions(&registry, &selections, &EngineConfig::default());
        assert!(set.synergies.is_empty());
        assert_eq!(set.conflicts.len(), 1);
        assert_eq!(set.conflicts[0].signed_magnitude(), -20);
    }

    #[test]
    fn test_unruled_pair_uses_defaults() {
        let registry = ComponentRegistry::builtin().unwrap();
        let selections = select(
            &registry,
            vec![(Domain::Government, vec!["democratic_process", "electoral_legitimacy"])],
        );

        let config = EngineConfig::default();
        let set = detect_interactions(&registry, &selections, &config);
        let synergy = &set.synergies[0];
        assert!(!synergy.has_rule);
        assert_eq!(synergy.magnitude, config.synergy_points);
        assert_eq!(synergy.stability, config.default_synergy_stability);
        assert!(synergy.description.contains("reinforces"));
    }

    #[test]
    fn test_cross_domain_pairs_detected() {
        let registry = ComponentRegistry::builtin().unwrap();
        let selections = select(
            &registry,
            vec![
                (Domain::Economy, vec!["free_market_system"]),
                (Domain::Tax, vec!["flat_tax"]),
            ],
        );

        let set = detect_interactions(&registry, &selections, &EngineConfig::default());
        assert_eq!(set.synergies.len(), 1);
        assert!(set.synergies[0].is_cross_domain());
        assert_eq!(set.cross_domain().count(), 1);
        assert!(set.synergies[0].optimal_rate.is_some());
    }

    #[test]
    fn test_no_duplicate_pairs() {
        let registry = ComponentRegistry::builtin().unwrap();
        let all: Vec<&str> = registry
            .all(Domain::Economy)
            .map(|c| c.id.as_str())
            .collect();
        let selections = select(&registry, vec![(Domain::Economy, all)]);

        let set = detect_interactions(&registry, &selections, &EngineConfig::default());
        let pairs: BTreeSet<_> = set
            .iter()
            .map(|i| (i.first.clone(), i.second.clone()))
            .collect();
        assert_eq!(pairs.len(), set.len());
        assert!(set.iter().all(|i| i.first < i.second));
    }

    #[test]
    fn test_empty_selection_has_no_interactions() {
        let registry = ComponentRegistry::builtin().unwrap();
        let set = detect_interactions(&registry, &Selections::new(), &EngineConfig::default());
        assert!(set.is_empty());
    }
}
