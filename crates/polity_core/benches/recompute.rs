//! Recompute benchmarks for polity_core.
//!
//! Run with: `cargo bench -p polity_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use polity_core::prelude::*;
use polity_core::interactions::detect_interactions;
use polity_test_utils::fixtures::{builtin_manager, builtin_registry, ids, reference_picks, selections};

/// Every component of every domain selected at once.
fn everything(registry: &ComponentRegistry) -> Selections {
    let mut all = Selections::new();
    for domain in Domain::ALL {
        let list: Vec<ComponentId> = registry.all(domain).map(|c| c.id.clone()).collect();
        let _ = all.replace(registry, domain, list);
    }
    all
}

/// Runs recompute benchmarks for the polity_core crate.
pub fn recompute_benchmark(c: &mut Criterion) {
    let registry = builtin_registry();
    let config = EngineConfig::default();
    let context = CountryContext::default();
    let reference = selections(&registry, reference_picks());
    let full = everything(&registry);

    c.bench_function("detect_interactions/full_catalog", |b| {
        b.iter(|| detect_interactions(black_box(&registry), black_box(&full), &config));
    });

    c.bench_function("compute_unified_state/reference", |b| {
        b.iter(|| compute_unified_state(&registry, &config, black_box(&reference), &context));
    });

    c.bench_function("compute_unified_state/full_catalog", |b| {
        b.iter(|| compute_unified_state(&registry, &config, black_box(&full), &context));
    });

    let manager = builtin_manager();
    let country = CountryId::from("bench");
    let toggles = [
        ids(&["free_market_system", "innovation_economy"]),
        ids(&["mixed_economy", "social_safety_net"]),
    ];
    let mut flip = 0usize;
    c.bench_function("manager/set_selection", |b| {
        b.iter(|| {
            flip ^= 1;
            manager
                .set_selection(&country, Domain::Economy, toggles[flip].iter().cloned())
                .map(|state| black_box(state.unified_effectiveness))
        });
    });
}

criterion_group!(benches, recompute_benchmark);
criterion_main!(benches);
