//! Per-country component selections.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::{ComponentId, Domain};
use crate::error::{PolityError, Result};
use crate::registry::ComponentRegistry;

/// The components chosen for each domain of one country.
///
/// Sets are ordered so that iteration, hashing and serialization are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selections {
    /// Selected government components.
    pub government: BTreeSet<ComponentId>,
    /// Selected economy components.
    pub economy: BTreeSet<ComponentId>,
    /// Selected tax components.
    pub tax: BTreeSet<ComponentId>,
}

impl Selections {
    /// Create empty selections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected components of one domain.
    #[must_use]
    pub fn get(&self, domain: Domain) -> &BTreeSet<ComponentId> {
        match domain {
            Domain::Government => &self.government,
            Domain::Economy => &self.economy,
            Domain::Tax => &self.tax,
        }
    }

    fn get_mut(&mut self, domain: Domain) -> &mut BTreeSet<ComponentId> {
        match domain {
            Domain::Government => &mut self.government,
            Domain::Economy => &mut self.economy,
            Domain::Tax => &mut self.tax,
        }
    }

    /// Replace one domain's selection after validating every ID.
    ///
    /// Validation happens before any mutation, so on error the selection
    /// is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`PolityError::UnknownComponent`] for the first ID (in
    /// submission order) that is not registered for `domain`.
    pub fn replace(
        &mut self,
        registry: &ComponentRegistry,
        domain: Domain,
        ids: impl IntoIterator<Item = ComponentId>,
    ) -> Result<()> {
        let validated = validate_ids(registry, domain, ids)?;
        *self.get_mut(domain) = validated;
        Ok(())
    }

    /// Every selected component with its domain, domains in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Domain, &ComponentId)> {
        Domain::ALL
            .into_iter()
            .flat_map(move |domain| self.get(domain).iter().map(move |id| (domain, id)))
    }

    /// Total number of selected components across all domains.
    #[must_use]
    pub fn len(&self) -> usize {
        self.government.len() + self.economy.len() + self.tax.len()
    }

    /// Check if nothing is selected in any domain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Check that every ID exists in the registry for `domain`.
///
/// # Errors
///
/// Returns [`PolityError::UnknownComponent`] for the first unknown ID.
pub fn validate_ids(
    registry: &ComponentRegistry,
    domain: Domain,
    ids: impl IntoIterator<Item = ComponentId>,
) -> Result<BTreeSet<ComponentId>> {
    let mut validated = BTreeSet::new();
    for id in ids {
        if registry.get(domain, id.as_str()).is_none() {
            return Err(PolityError::UnknownComponent { domain, id });
        }
        validated.insert(id);
    }
    Ok(validated)
}
