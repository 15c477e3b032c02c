//! Catalog data structure combining all components and rules.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::component_data::ComponentData;
use super::rule_data::{InteractionKind, InteractionRuleData, MAX_MAGNITUDE};

/// Complete component catalog.
///
/// Loaded from a RON file (or the embedded built-in catalog) once at
/// startup and validated before any registry is built from it.
///
/// # Example RON
///
/// ```ron
/// CatalogData(
///     components: [...],
///     rules: [...],
/// )
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogData {
    /// Every selectable component across all domains.
    pub components: Vec<ComponentData>,

    /// Per-pair interaction details.
    #[serde(default)]
    pub rules: Vec<InteractionRuleData>,
}

/// Order a pair so the same unordered pair always yields the same key.
fn pair_key<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl CatalogData {
    /// Find a component by its ID.
    #[must_use]
    pub fn get_component(&self, id: &str) -> Option<&ComponentData> {
        self.components.iter().find(|c| c.id == id)
    }

    /// Every declared pair with its kind, keyed by ordered pair.
    ///
    /// A pair declared from both sides appears once per kind.
    #[must_use]
    pub fn declared_pairs(&self) -> BTreeMap<(&str, &str), BTreeSet<InteractionKind>> {
        let mut pairs: BTreeMap<(&str, &str), BTreeSet<InteractionKind>> = BTreeMap::new();

        for component in &self.components {
            for partner in &component.synergies {
                pairs
                    .entry(pair_key(&component.id, partner))
                    .or_default()
                    .insert(InteractionKind::Synergy);
            }
            for partner in &component.conflicts {
                pairs
                    .entry(pair_key(&component.id, partner))
                    .or_default()
                    .insert(InteractionKind::Conflict);
            }
        }

        pairs
    }

    /// Pairs declared both as a synergy and as a conflict, in sorted order.
    #[must_use]
    pub fn contradictory_pairs(&self) -> Vec<(String, String)> {
        self.declared_pairs()
            .into_iter()
            .filter(|(_, kinds)| kinds.len() > 1)
            .map(|((a, b), _)| (a.to_string(), b.to_string()))
            .collect()
    }

    /// Validate internal consistency of catalog data.
    ///
    /// Checks for:
    /// - Duplicate component IDs
    /// - Out-of-range effectiveness and capacity values
    /// - Partner references to unknown or self IDs
    /// - Pairs declared both as synergy and conflict
    /// - Rules for unknown, undeclared or mismatched pairs
    /// - Duplicate rules for the same pair
    /// - Magnitudes above [`MAX_MAGNITUDE`]
    ///
    /// Returns a list of validation errors.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        // Check component identity and ranges
        let mut seen = BTreeSet::new();
        for component in &self.components {
            if !seen.insert(component.id.as_str()) {
                errors.push(format!("Duplicate component id '{}'", component.id));
            }
            if component.base_effectiveness > 100 {
                errors.push(format!(
                    "Component '{}' has base effectiveness {} outside 0-100",
                    component.id, component.base_effectiveness
                ));
            }
            if component.required_capacity > 100 {
                errors.push(format!(
                    "Component '{}' requires capacity {} outside 0-100",
                    component.id, component.required_capacity
                ));
            }
        }

        // Check partner references
        for component in &self.components {
            let partners = component
                .synergies
                .iter()
                .map(|p| ("synergy", p))
                .chain(component.conflicts.iter().map(|p| ("conflict", p)));

            for (kind, partner) in partners {
                if partner == &component.id {
                    errors.push(format!(
                        "Component '{}' lists itself as a {kind} partner",
                        component.id
                    ));
                } else if self.get_component(partner).is_none() {
                    errors.push(format!(
                        "Component '{}' has unknown {kind} partner '{}'",
                        component.id, partner
                    ));
                }
            }
        }

        // Check contradictory declarations
        for (a, b) in self.contradictory_pairs() {
            errors.push(format!(
                "Pair ('{a}', '{b}') is declared both as synergy and conflict"
            ));
        }

        // Check rules
        let declared = self.declared_pairs();
        let mut ruled = BTreeSet::new();
        for rule in &self.rules {
            let (a, b) = (rule.between.0.as_str(), rule.between.1.as_str());

            for id in [a, b] {
                if self.get_component(id).is_none() {
                    errors.push(format!("Rule references unknown component '{id}'"));
                }
            }

            let key = pair_key(a, b);
            if !ruled.insert(key) {
                errors.push(format!("Duplicate rule for pair ('{}', '{}')", key.0, key.1));
            }

            match declared.get(&key) {
                None => errors.push(format!(
                    "Rule for pair ('{}', '{}') has no partner declaration",
                    key.0, key.1
                )),
                Some(kinds) if !kinds.contains(&rule.kind) => errors.push(format!(
                    "Rule for pair ('{}', '{}') is a {:?} but the pair is declared otherwise",
                    key.0, key.1, rule.kind
                )),
                Some(_) => {}
            }

            if rule.magnitude > MAX_MAGNITUDE {
                errors.push(format!(
                    "{:?} rule for pair ('{}', '{}') has magnitude {} above {MAX_MAGNITUDE}",
                    rule.kind, key.0, key.1, rule.magnitude
                ));
            }

            if let Some(rate) = &rule.optimal_rate {
                if rate.min_percent > rate.max_percent {
                    errors.push(format!(
                        "Rule for pair ('{}', '{}') advises an empty '{}' range",
                        key.0, key.1, rate.rate
                    ));
                }
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DomainImpactData;
    use crate::domain::Domain;

    fn component(id: &str, domain: Domain) -> ComponentData {
        ComponentData {
            id: id.to_string(),
            name: id.to_string(),
            domain,
            category: "Test".to_string(),
            description: String::new(),
            base_effectiveness: 50,
            implementation_cost: 10,
            maintenance_cost: 5,
            required_capacity: 10,
            synergies: vec![],
            conflicts: vec![],
            impact: DomainImpactData::default(),
        }
    }

    fn create_test_catalog() -> CatalogData {
        let mut a = component("a", Domain::Government);
        a.synergies.push("b".to_string());
        let b = component("b", Domain::Government);
        let mut c = component("c", Domain::Economy);
        c.conflicts.push("a".to_string());

        CatalogData {
            components: vec![a, b, c],
            rules: vec![InteractionRuleData {
                between: ("b".to_string(), "a".to_string()),
                kind: InteractionKind::Synergy,
                magnitude: 12,
                stability: None,
                description: "a and b".to_string(),
                optimal_rate: None,
            }],
        }
    }

    #[test]
    fn test_validate_valid_data() {
        let catalog = create_test_catalog();
        let errors = catalog.validate();
        assert!(errors.is_empty(), "Errors: {:?}", errors);
    }

    #[test]
    fn test_validate_unknown_partner() {
        let mut catalog = create_test_catalog();
        catalog.components[1].synergies.push("ghost".to_string());

        let errors = catalog.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("unknown synergy partner 'ghost'"));
    }

    #[test]
    fn test_validate_contradictory_pair() {
        let mut catalog = create_test_catalog();
        catalog.components[1].conflicts.push("a".to_string());

        assert_eq!(
            catalog.contradictory_pairs(),
            vec![("a".to_string(), "b".to_string())]
        );
        assert!(catalog
            .validate()
            .iter()
            .any(|e| e.contains("both as synergy and conflict")));
    }

    #[test]
    fn test_validate_rule_kind_mismatch() {
        let mut catalog = create_test_catalog();
        catalog.rules[0].kind = InteractionKind::Conflict;

        let errors = catalog.validate();
        assert!(errors.iter().any(|e| e.contains("declared otherwise")));
    }

    #[test]
    fn test_validate_duplicate_rule_and_component() {
        let mut catalog = create_test_catalog();
        let duplicate_rule = catalog.rules[0].clone();
        catalog.rules.push(duplicate_rule);
        catalog.components.push(component("c", Domain::Tax));

        let errors = catalog.validate();
        assert!(errors.iter().any(|e| e.contains("Duplicate rule")));
        assert!(errors.iter().any(|e| e.contains("Duplicate component id 'c'")));
    }

    #[test]
    fn test_declared_pairs_merge_both_sides() {
        let mut catalog = create_test_catalog();
        catalog.components[1].synergies.push("a".to_string());

        let pairs = catalog.declared_pairs();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[&("a", "b")].len(), 1);
    }
}
