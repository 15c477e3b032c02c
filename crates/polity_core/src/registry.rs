//! Component registry.
//!
//! A validated, read-only lookup structure built once from
//! [`CatalogData`]. Every partner reference and rule in a registry is
//! known to resolve, so downstream stages never check for existence.
//!
//! The built-in catalog is embedded in the binary and shared
//! process-wide through [`ComponentRegistry::builtin`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::data::{CatalogData, DomainImpactData, InteractionKind, InteractionRuleData};
use crate::domain::{ComponentId, Domain};
use crate::error::{PolityError, Result};

/// Source of the built-in catalog.
const BUILTIN_CATALOG: &str = include_str!("../assets/catalog.ron");

/// Process-wide built-in registry, initialized on first use.
static BUILTIN: OnceLock<Arc<ComponentRegistry>> = OnceLock::new();

/// Immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Unique, stable key.
    pub id: ComponentId,
    /// Human-readable name.
    pub name: String,
    /// Domain this component is selectable in.
    pub domain: Domain,
    /// Sub-grouping within the domain.
    pub category: String,
    /// Short description.
    pub description: String,
    /// Baseline effectiveness (0-100).
    pub base_effectiveness: u32,
    /// One-time adoption cost.
    pub implementation_cost: u32,
    /// Recurring cost.
    pub maintenance_cost: u32,
    /// Draw against the domain's shared capacity budget (0-100).
    pub required_capacity: u32,
    /// Synergy partners as authored on this component.
    pub synergy_partners: BTreeSet<ComponentId>,
    /// Conflict partners as authored on this component.
    pub conflict_partners: BTreeSet<ComponentId>,
    /// Modifiers contributed while selected.
    pub impact: DomainImpactData,
}

/// Order a pair so the same unordered pair always yields the same key.
#[must_use]
pub fn pair_key(a: &ComponentId, b: &ComponentId) -> (ComponentId, ComponentId) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

/// Validated registry of all components and interaction rules.
#[derive(Debug, Clone)]
pub struct ComponentRegistry {
    /// All components indexed by ID.
    components: BTreeMap<ComponentId, Component>,
    /// Component IDs per domain, in catalog order.
    by_domain: BTreeMap<Domain, Vec<ComponentId>>,
    /// Rule details indexed by ordered pair.
    rules: BTreeMap<(ComponentId, ComponentId), InteractionRuleData>,
}

impl ComponentRegistry {
    /// Build a registry from catalog data, validating it eagerly.
    ///
    /// # Errors
    ///
    /// Returns [`PolityError::DuplicateInteractionRule`] if any pair is
    /// declared both as synergy and conflict, or
    /// [`PolityError::MalformedRuleData`] listing every other problem.
    pub fn from_catalog(catalog: CatalogData) -> Result<Self> {
        if let Some((a, b)) = catalog.contradictory_pairs().into_iter().next() {
            return Err(PolityError::DuplicateInteractionRule(
                ComponentId::new(a),
                ComponentId::new(b),
            ));
        }

        let errors = catalog.validate();
        if !errors.is_empty() {
            return Err(PolityError::MalformedRuleData { errors });
        }

        let mut components = BTreeMap::new();
        let mut by_domain: BTreeMap<Domain, Vec<ComponentId>> = BTreeMap::new();

        for data in catalog.components {
            let id = ComponentId::new(data.id);
            by_domain.entry(data.domain).or_default().push(id.clone());
            components.insert(
                id.clone(),
                Component {
                    id,
                    name: data.name,
                    domain: data.domain,
                    category: data.category,
                    description: data.description,
                    base_effectiveness: data.base_effectiveness,
                    implementation_cost: data.implementation_cost,
                    maintenance_cost: data.maintenance_cost,
                    required_capacity: data.required_capacity,
                    synergy_partners: data.synergies.into_iter().map(ComponentId::new).collect(),
                    conflict_partners: data.conflicts.into_iter().map(ComponentId::new).collect(),
                    impact: data.impact,
                },
            );
        }

        let rules = catalog
            .rules
            .into_iter()
            .map(|rule| {
                let key = pair_key(
                    &ComponentId::new(rule.between.0.as_str()),
                    &ComponentId::new(rule.between.1.as_str()),
                );
                (key, rule)
            })
            .collect::<BTreeMap<_, _>>();

        tracing::info!(
            "Loaded component registry with {} government, {} economy, {} tax components and {} rules",
            by_domain.get(&Domain::Government).map_or(0, Vec::len),
            by_domain.get(&Domain::Economy).map_or(0, Vec::len),
            by_domain.get(&Domain::Tax).map_or(0, Vec::len),
            rules.len()
        );

        Ok(Self {
            components,
            by_domain,
            rules,
        })
    }

    /// Parse and validate a RON catalog.
    ///
    /// `source` labels the data in error messages (usually a file path).
    ///
    /// # Errors
    ///
    /// Returns [`PolityError::DataParseError`] if the text is not a valid
    /// catalog, or any error from [`Self::from_catalog`].
    pub fn from_ron_str(contents: &str, source: &str) -> Result<Self> {
        let catalog: CatalogData =
            ron::from_str(contents).map_err(|e| PolityError::DataParseError {
                path: source.to_string(),
                message: e.to_string(),
            })?;
        Self::from_catalog(catalog)
    }

    /// Get the process-wide built-in registry.
    ///
    /// Parsed and validated on first call; every later call shares the
    /// same instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded catalog is malformed. Callers
    /// treat this as a fatal startup error.
    pub fn builtin() -> Result<Arc<Self>> {
        if let Some(registry) = BUILTIN.get() {
            return Ok(Arc::clone(registry));
        }

        let registry = Arc::new(Self::from_ron_str(BUILTIN_CATALOG, "<builtin catalog>")?);
        Ok(Arc::clone(BUILTIN.get_or_init(|| registry)))
    }

    /// Get a component by domain and ID.
    ///
    /// Returns `None` if the ID is unknown or belongs to another domain.
    #[must_use]
    pub fn get(&self, domain: Domain, id: &str) -> Option<&Component> {
        self.components.get(id).filter(|c| c.domain == domain)
    }

    /// All components of a domain, in catalog order.
    pub fn all(&self, domain: Domain) -> impl Iterator<Item = &Component> {
        self.by_domain
            .get(&domain)
            .into_iter()
            .flatten()
            .filter_map(|id| self.components.get(id))
    }

    /// Components of a domain within one category, in catalog order.
    pub fn list_by_category<'a, 'b>(
        &'a self,
        domain: Domain,
        category: &'b str,
    ) -> impl Iterator<Item = &'a Component> + 'b
    where
        'a: 'b,
    {
        self.all(domain).filter(move |c| c.category == category)
    }

    /// Distinct categories of a domain, sorted.
    #[must_use]
    pub fn categories(&self, domain: Domain) -> Vec<&str> {
        self.all(domain)
            .map(|c| c.category.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Kind of interaction declared for a pair, from either side.
    #[must_use]
    pub fn interaction_kind(&self, a: &Component, b: &Component) -> Option<InteractionKind> {
        if a.synergy_partners.contains(&b.id) || b.synergy_partners.contains(&a.id) {
            Some(InteractionKind::Synergy)
        } else if a.conflict_partners.contains(&b.id) || b.conflict_partners.contains(&a.id) {
            Some(InteractionKind::Conflict)
        } else {
            None
        }
    }

    /// Rule details for an unordered pair, if authored.
    #[must_use]
    pub fn rule_for(&self, a: &ComponentId, b: &ComponentId) -> Option<&InteractionRuleData> {
        self.rules.get(&pair_key(a, b))
    }

    /// Total number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Number of authored rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}
