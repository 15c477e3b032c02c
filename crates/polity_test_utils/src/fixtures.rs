//! Test fixtures and helpers.
//!
//! Ready-made registries, selections and managers for consistent
//! testing. Everything here panics on failure; it is only meant for test
//! code.

use std::sync::Arc;

use fixed::types::I32F32;
use polity_core::config::EngineConfig;
use polity_core::context::CountryContext;
use polity_core::domain::{ComponentId, CountryId, Domain};
use polity_core::manager::UnifiedStateManager;
use polity_core::registry::ComponentRegistry;
use polity_core::selection::Selections;
use polity_core::state::{compute_unified_state, UnifiedState};

/// A small, valid catalog with one pair of each interaction kind.
///
/// `alpha`/`beta` are a ruled government synergy, `alpha`/`gamma` an
/// unruled government conflict, `market`/`levy` a ruled cross-domain
/// synergy with rate advice.
pub const TINY_CATALOG: &str = r#"
CatalogData(
    components: [
        (id: "alpha", name: "Alpha", domain: Government, category: "Structure",
         base_effectiveness: 60, implementation_cost: 10, maintenance_cost: 5,
         required_capacity: 40, synergies: ["beta"], conflicts: ["gamma"]),
        (id: "beta", name: "Beta", domain: Government, category: "Structure",
         base_effectiveness: 80, implementation_cost: 10, maintenance_cost: 5,
         required_capacity: 40),
        (id: "gamma", name: "Gamma", domain: Government, category: "Process",
         base_effectiveness: 70, implementation_cost: 10, maintenance_cost: 5,
         required_capacity: 40),
        (id: "market", name: "Market", domain: Economy, category: "System",
         base_effectiveness: 75, implementation_cost: 20, maintenance_cost: 8,
         required_capacity: 20, synergies: ["levy"],
         impact: (economic: 110, sectors: {"services": 105})),
        (id: "levy", name: "Levy", domain: Tax, category: "Structure",
         base_effectiveness: 65, implementation_cost: 5, maintenance_cost: 2,
         required_capacity: 10, impact: (tax: 120)),
    ],
    rules: [
        (between: ("alpha", "beta"), kind: Synergy, magnitude: 12),
        (between: ("market", "levy"), kind: Synergy, magnitude: 6,
         optimal_rate: Some((rate: "levy_rate", min_percent: 10, max_percent: 20))),
    ],
)
"#;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real scoring code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// The process-wide built-in registry.
///
/// # Panics
///
/// Panics if the built-in catalog fails validation.
#[must_use]
pub fn builtin_registry() -> Arc<ComponentRegistry> {
    ComponentRegistry::builtin().expect("built-in catalog must load")
}

/// A registry built from [`TINY_CATALOG`].
///
/// # Panics
///
/// Panics if the tiny catalog fails validation.
#[must_use]
pub fn tiny_registry() -> Arc<ComponentRegistry> {
    Arc::new(
        ComponentRegistry::from_ron_str(TINY_CATALOG, "<tiny catalog>")
            .expect("tiny catalog must load"),
    )
}

/// A manager over the built-in catalog with default tuning.
///
/// # Panics
///
/// Panics if the built-in catalog fails validation.
#[must_use]
pub fn builtin_manager() -> UnifiedStateManager {
    UnifiedStateManager::new(builtin_registry(), EngineConfig::default())
        .expect("default config must validate")
}

/// Convert string literals into component IDs.
#[must_use]
pub fn ids(list: &[&str]) -> Vec<ComponentId> {
    list.iter().map(|s| ComponentId::from(*s)).collect()
}

/// Build selections from `(domain, ids)` picks.
///
/// # Panics
///
/// Panics if any ID is unknown for its domain.
#[must_use]
pub fn selections(registry: &ComponentRegistry, picks: Vec<(Domain, Vec<&str>)>) -> Selections {
    let mut selections = Selections::new();
    for (domain, list) in picks {
        selections
            .replace(registry, domain, ids(&list))
            .unwrap_or_else(|e| panic!("fixture selection rejected: {e}"));
    }
    selections
}

/// Compute a state from picks against the built-in registry.
#[must_use]
pub fn evaluate(picks: Vec<(Domain, Vec<&str>)>, context: CountryContext) -> UnifiedState {
    let registry = builtin_registry();
    let selections = selections(&registry, picks);
    compute_unified_state(&registry, &EngineConfig::default(), &selections, &context)
}

/// Apply picks to a country through the manager.
///
/// # Panics
///
/// Panics if any pick is rejected.
pub fn apply(
    manager: &UnifiedStateManager,
    country: &CountryId,
    picks: Vec<(Domain, Vec<&str>)>,
) -> UnifiedState {
    let mut last = manager.get_state(country);
    for (domain, list) in picks {
        last = manager
            .set_selection(country, domain, ids(&list))
            .unwrap_or_else(|e| panic!("fixture selection rejected: {e}"));
    }
    last
}

/// A balanced three-domain selection with intra- and cross-domain synergies.
#[must_use]
pub fn reference_picks() -> Vec<(Domain, Vec<&'static str>)> {
    vec![
        (
            Domain::Government,
            vec!["professional_bureaucracy", "rule_of_law", "democratic_process"],
        ),
        (Domain::Economy, vec!["free_market_system", "innovation_economy"]),
        (
            Domain::Tax,
            vec!["flat_tax", "corporate_tax", "research_tax_credits"],
        ),
    ]
}
