//! Cross-domain synergy resolution.
//!
//! Interactions whose members sit in different domains never touch a
//! single domain's score. Pairs with an authored rule feed a separate
//! unified bonus and may carry advisory rate ranges.

use serde::{Deserialize, Serialize};

use crate::domain::ComponentId;
use crate::interactions::{Interaction, InteractionSet};
use crate::math::{fixed_serde, points, Fixed};

/// Advisory rate range for a cross-domain pairing.
///
/// Advice only. It never changes a selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptimalRateRecommendation {
    /// Rate being advised (e.g., "corporate_tax").
    pub rate: String,
    /// Lower bound in percent.
    pub min_percent: u32,
    /// Upper bound in percent.
    pub max_percent: u32,
    /// Why the range suits the pairing.
    pub reason: String,
    /// The pair that produced the advice.
    pub source: (ComponentId, ComponentId),
}

/// Cross-domain effects of one set of selections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CrossDomainEffects {
    /// Cross-domain synergies (ruled or not).
    pub synergies: Vec<Interaction>,
    /// Cross-domain conflicts (ruled or not).
    pub conflicts: Vec<Interaction>,
    /// Sum of signed magnitudes of ruled cross-domain pairs.
    #[serde(with = "fixed_serde")]
    pub unified_bonus: Fixed,
    /// Advisory rate ranges from ruled pairs.
    pub recommendations: Vec<OptimalRateRecommendation>,
}

impl CrossDomainEffects {
    /// Every cross-domain interaction, synergies first.
    pub fn iter(&self) -> impl Iterator<Item = &Interaction> {
        self.synergies.iter().chain(self.conflicts.iter())
    }
}

/// Resolve cross-domain effects from the full interaction set.
///
/// Pairs without an authored rule are listed but contribute nothing to
/// the bonus.
#[must_use]
pub fn resolve_cross_domain(interactions: &InteractionSet) -> CrossDomainEffects {
    let mut effects = CrossDomainEffects {
        synergies: interactions
            .synergies
            .iter()
            .filter(|i| i.is_cross_domain())
            .cloned()
            .collect(),
        conflicts: interactions
            .conflicts
            .iter()
            .filter(|i| i.is_cross_domain())
            .cloned()
            .collect(),
        ..CrossDomainEffects::default()
    };

    let mut bonus: i32 = 0;
    for interaction in interactions.cross_domain().filter(|i| i.has_rule) {
        bonus = bonus.saturating_add(interaction.signed_magnitude());

        if let Some(rate) = &interaction.optimal_rate {
            effects.recommendations.push(OptimalRateRecommendation {
                rate: rate.rate.clone(),
                min_percent: rate.min_percent,
                max_percent: rate.max_percent,
                reason: rate.reason.clone(),
                source: (interaction.first.clone(), interaction.second.clone()),
            });
        }
    }
    effects.unified_bonus = points(bonus);

    effects
}
