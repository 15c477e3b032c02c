//! End-to-end scoring scenarios through the state manager.

use polity_core::prelude::*;
use polity_test_utils::fixtures::{apply, builtin_manager, fixed, fixed_f, ids};

#[test]
fn synergy_pair_scores_above_either_member() {
    let manager = builtin_manager();
    let country = CountryId::from("alpha");
    let state = apply(
        &manager,
        &country,
        vec![(
            Domain::Government,
            vec!["professional_bureaucracy", "rule_of_law"],
        )],
    );

    let gov = state.domain(Domain::Government).unwrap();
    assert_eq!(gov.base, fixed_f(88.5));
    assert_eq!(gov.synergy_bonus, fixed(10));
    assert_eq!(gov.raw, fixed_f(98.5));
    assert_eq!(gov.final_score, fixed_f(98.5));
    assert_eq!(gov.synergies.len(), 1);
}

#[test]
fn conflicting_pair_uses_rule_penalty() {
    let manager = builtin_manager();
    let country = CountryId::from("beta");
    let state = apply(
        &manager,
        &country,
        vec![(
            Domain::Government,
            vec!["democratic_process", "autocratic_process"],
        )],
    );

    let gov = state.domain(Domain::Government).unwrap();
    assert_eq!(gov.base, fixed_f(81.5));
    assert_eq!(gov.conflict_penalty, fixed(20));
    assert_eq!(gov.final_score, fixed_f(61.5));
}

#[test]
fn empty_domain_is_zero_with_neutral_impact() {
    let manager = builtin_manager();
    let country = CountryId::from("gamma");
    let state = apply(
        &manager,
        &country,
        vec![(Domain::Government, vec!["rule_of_law"]), (Domain::Economy, vec![])],
    );

    let eco = state.domain(Domain::Economy).unwrap();
    assert_eq!(eco.final_score, Fixed::ZERO);
    assert_eq!(eco.component_count, 0);
    assert!(eco.synergies.is_empty() && eco.conflicts.is_empty());
    assert_eq!(state.impacts[&Domain::Economy], DomainImpact::neutral());
}

#[test]
fn unknown_component_is_rejected_without_change() {
    let manager = builtin_manager();
    let country = CountryId::from("delta");
    apply(
        &manager,
        &country,
        vec![(Domain::Tax, vec!["progressive_tax", "value_added_tax"])],
    );
    let before = manager.get_state(&country);

    let result = manager.set_selection(
        &country,
        Domain::Tax,
        ids(&["flat_tax", "Imaginary Component"]),
    );

    assert!(matches!(
        result,
        Err(PolityError::UnknownComponent { domain: Domain::Tax, ref id })
            if id.as_str() == "Imaginary Component"
    ));
    assert_eq!(manager.get_state(&country), before);
    assert_eq!(manager.selections(&country), before.selections);
}

#[test]
fn component_from_wrong_domain_is_unknown() {
    let manager = builtin_manager();
    let result = manager.set_selection(
        &CountryId::from("epsilon"),
        Domain::Economy,
        ids(&["rule_of_law"]),
    );
    assert!(matches!(result, Err(PolityError::UnknownComponent { .. })));
}

#[test]
fn unified_score_weights_domains_and_bonus() {
    let finals = [
        (Domain::Government, fixed(90)),
        (Domain::Economy, fixed(80)),
        (Domain::Tax, fixed(70)),
    ]
    .into_iter()
    .collect();

    let score = polity_core::state::unified_score(&DomainWeights::default(), &finals, fixed(5));
    assert_eq!(score, fixed_f(73.5));
}

#[test]
fn cross_domain_rule_reaches_unified_score_only() {
    let manager = builtin_manager();
    let country = CountryId::from("zeta");
    let alone = apply(
        &manager,
        &country,
        vec![(Domain::Economy, vec!["free_market_system"])],
    );
    let paired = apply(&manager, &country, vec![(Domain::Tax, vec!["flat_tax"])]);

    assert_eq!(
        alone.final_score(Domain::Economy),
        paired.final_score(Domain::Economy)
    );
    assert_eq!(paired.cross_domain.unified_bonus, fixed(8));
    assert_eq!(paired.cross_domain.recommendations[0].rate, "income_tax");

    // 80 * 0.40 + flat tax final * 0.20 + 8 * 0.10
    let expected = (fixed(80) * fixed(40)
        + paired.final_score(Domain::Tax) * fixed(20)
        + fixed(8) * fixed(10))
        / fixed(100);
    assert_eq!(paired.unified_effectiveness, expected);
}

#[test]
fn explain_lists_every_active_interaction() {
    let manager = builtin_manager();
    let country = CountryId::from("eta");
    apply(
        &manager,
        &country,
        vec![
            (
                Domain::Government,
                vec!["professional_bureaucracy", "rule_of_law", "democratic_process", "autocratic_process"],
            ),
            (Domain::Economy, vec!["free_market_system"]),
            (Domain::Tax, vec!["flat_tax", "wealth_tax"]),
        ],
    );

    let report = manager.explain_interactions(&country);
    assert!(report
        .synergies
        .iter()
        .any(|i| i.involves("professional_bureaucracy") && i.involves("rule_of_law")));
    assert!(report
        .conflicts
        .iter()
        .any(|i| i.involves("democratic_process") && i.involves("autocratic_process")));
    assert!(report.cross_domain.iter().all(Interaction::is_cross_domain));
    assert!(report
        .cross_domain
        .iter()
        .any(|i| i.involves("free_market_system") && i.involves("wealth_tax")));
}

#[test]
fn capacity_overcommit_is_a_warning_not_an_error() {
    let manager = builtin_manager();
    let state = manager
        .set_selection(
            &CountryId::from("theta"),
            Domain::Economy,
            ids(&[
                "planned_economy",
                "state_ownership",
                "innovation_economy",
                "social_safety_net",
            ]),
        )
        .unwrap();

    assert!(state.warnings.iter().any(|w| matches!(
        w,
        SelectionWarning::CapacityExceeded {
            domain: Domain::Economy,
            ..
        }
    )));
}
