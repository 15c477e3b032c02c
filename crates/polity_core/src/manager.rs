//! Unified state manager.
//!
//! Owns the selections and computed state of every tracked country. Each
//! country sits behind its own mutex, held across mutate and recompute,
//! so writes to one country are serialized while unrelated countries
//! proceed in parallel. The outer map lock is only taken to find or
//! insert a country.
//!
//! Every accepted mutation recomputes synchronously before returning. A
//! rejected mutation changes nothing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::config::EngineConfig;
use crate::context::CountryContext;
use crate::domain::{ComponentId, CountryId, Domain};
use crate::error::{PolityError, Result};
use crate::persistence::PersistedCountry;
use crate::registry::{Component, ComponentRegistry};
use crate::selection::{validate_ids, Selections};
use crate::state::{compute_unified_state, InteractionReport, UnifiedState};

/// Whether a country's cached state matches its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Inputs changed, state not yet recomputed.
    Dirty,
    /// State reflects the current inputs.
    Clean,
}

/// Mutable record of one country.
#[derive(Debug)]
struct CountryRecord {
    selections: Selections,
    context: CountryContext,
    state: UnifiedState,
    phase: Phase,
}

impl CountryRecord {
    fn recompute(
        &mut self,
        country: &CountryId,
        registry: &ComponentRegistry,
        config: &EngineConfig,
        revision: u64,
    ) {
        self.phase = Phase::Dirty;
        let mut state = compute_unified_state(registry, config, &self.selections, &self.context);
        state.revision = revision;
        self.state = state;
        self.phase = Phase::Clean;

        tracing::debug!(
            country = %country,
            revision,
            unified = self.state.unified_effectiveness.to_num::<f64>(),
            components = self.selections.len(),
            "Recomputed unified state"
        );
        for warning in &self.state.warnings {
            tracing::warn!(country = %country, "{warning}");
        }
    }
}

type SharedRecord = Arc<Mutex<CountryRecord>>;

/// Thread-safe owner of all per-country state.
#[derive(Debug)]
pub struct UnifiedStateManager {
    registry: Arc<ComponentRegistry>,
    config: EngineConfig,
    countries: RwLock<HashMap<CountryId, SharedRecord>>,
    /// State returned for countries that have never been written.
    empty: UnifiedState,
}

impl UnifiedStateManager {
    /// Create a manager over a shared registry.
    ///
    /// # Errors
    ///
    /// Returns [`PolityError::InvalidConfig`] if `config` fails validation.
    pub fn new(registry: Arc<ComponentRegistry>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let empty = compute_unified_state(
            &registry,
            &config,
            &Selections::new(),
            &CountryContext::default(),
        );
        Ok(Self {
            registry,
            config,
            countries: RwLock::new(HashMap::new()),
            empty,
        })
    }

    /// Create a manager over the built-in catalog with default tuning.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in catalog fails to load.
    pub fn with_builtin() -> Result<Self> {
        Self::new(ComponentRegistry::builtin()?, EngineConfig::default())
    }

    /// The registry this manager validates against.
    #[must_use]
    pub fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.registry
    }

    /// Active scoring configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn existing(&self, country: &CountryId) -> Option<SharedRecord> {
        self.countries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(country)
            .cloned()
    }

    fn record(&self, country: &CountryId) -> SharedRecord {
        if let Some(record) = self.existing(country) {
            return record;
        }

        let mut countries = self
            .countries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(countries.entry(country.clone()).or_insert_with(|| {
            tracing::debug!(country = %country, "Tracking new country");
            Arc::new(Mutex::new(CountryRecord {
                selections: Selections::new(),
                context: CountryContext::default(),
                state: self.empty.clone(),
                phase: Phase::Clean,
            }))
        }))
    }

    /// Apply a validated change to one country and recompute.
    ///
    /// `change` runs under the country's lock; if it fails the record is
    /// left untouched.
    fn mutate<F>(&self, country: &CountryId, change: F) -> Result<UnifiedState>
    where
        F: FnOnce(&ComponentRegistry, &mut Selections, &mut CountryContext) -> Result<()>,
    {
        let record = self.record(country);
        let mut guard = record.lock().unwrap_or_else(PoisonError::into_inner);

        let mut selections = guard.selections.clone();
        let mut context = guard.context;
        change(&self.registry, &mut selections, &mut context)?;

        guard.selections = selections;
        guard.context = context;
        let revision = guard.state.revision + 1;
        guard.recompute(country, &self.registry, &self.config, revision);
        Ok(guard.state.clone())
    }

    /// Replace one domain's selection for a country.
    ///
    /// # Errors
    ///
    /// Returns [`PolityError::UnknownComponent`] if any ID is not registered
    /// for `domain`. The country's state is unchanged in that case.
    pub fn set_selection(
        &self,
        country: &CountryId,
        domain: Domain,
        ids: impl IntoIterator<Item = ComponentId>,
    ) -> Result<UnifiedState> {
        let validated = validate_ids(&self.registry, domain, ids).map_err(|e| {
            tracing::debug!(country = %country, "Rejected selection: {e}");
            e
        })?;

        self.mutate(country, |registry, selections, _| {
            selections.replace(registry, domain, validated)
        })
    }

    /// Add one component to a country's selection.
    ///
    /// Adding an already selected component still counts as a mutation.
    ///
    /// # Errors
    ///
    /// Returns [`PolityError::UnknownComponent`] if `id` is not registered
    /// for `domain`.
    pub fn add_component(
        &self,
        country: &CountryId,
        domain: Domain,
        id: ComponentId,
    ) -> Result<UnifiedState> {
        self.ensure_known(domain, &id)?;
        self.mutate(country, |registry, selections, _| {
            let ids = selections.get(domain).iter().cloned().chain([id]).collect::<Vec<_>>();
            selections.replace(registry, domain, ids)
        })
    }

    /// Remove one component from a country's selection.
    ///
    /// # Errors
    ///
    /// Returns [`PolityError::UnknownComponent`] if `id` is not registered
    /// for `domain`. Removing a registered but unselected component is
    /// accepted.
    pub fn remove_component(
        &self,
        country: &CountryId,
        domain: Domain,
        id: &ComponentId,
    ) -> Result<UnifiedState> {
        self.ensure_known(domain, id)?;
        self.mutate(country, |registry, selections, _| {
            let ids = selections
                .get(domain)
                .iter()
                .filter(|selected| *selected != id)
                .cloned()
                .collect::<Vec<_>>();
            selections.replace(registry, domain, ids)
        })
    }

    /// Replace a country's scoring context and recompute.
    ///
    /// # Errors
    ///
    /// Never fails today; returns `Result` to match the other mutations.
    pub fn set_context(&self, country: &CountryId, context: CountryContext) -> Result<UnifiedState> {
        self.mutate(country, |_, _, current| {
            *current = context;
            Ok(())
        })
    }

    fn ensure_known(&self, domain: Domain, id: &ComponentId) -> Result<()> {
        if self.registry.get(domain, id.as_str()).is_some() {
            Ok(())
        } else {
            Err(PolityError::UnknownComponent {
                domain,
                id: id.clone(),
            })
        }
    }

    /// Current state of a country, or the zeroed state if it is untracked.
    #[must_use]
    pub fn get_state(&self, country: &CountryId) -> UnifiedState {
        match self.existing(country) {
            Some(record) => {
                let guard = record.lock().unwrap_or_else(PoisonError::into_inner);
                debug_assert_eq!(guard.phase, Phase::Clean);
                guard.state.clone()
            }
            None => self.empty.clone(),
        }
    }

    /// Current selections of a country (empty if untracked).
    #[must_use]
    pub fn selections(&self, country: &CountryId) -> Selections {
        self.existing(country).map_or_else(Selections::new, |record| {
            record
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .selections
                .clone()
        })
    }

    /// Components selectable in a domain, optionally narrowed to a category.
    #[must_use]
    pub fn list_available_components(
        &self,
        domain: Domain,
        category: Option<&str>,
    ) -> Vec<&Component> {
        match category {
            Some(category) => self.registry.list_by_category(domain, category).collect(),
            None => self.registry.all(domain).collect(),
        }
    }

    /// Every active interaction of a country.
    #[must_use]
    pub fn explain_interactions(&self, country: &CountryId) -> InteractionReport {
        self.get_state(country).interaction_report()
    }

    /// Stop tracking a country. Returns whether it was tracked.
    pub fn remove_country(&self, country: &CountryId) -> bool {
        let removed = self
            .countries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(country)
            .is_some();
        if removed {
            tracing::debug!(country = %country, "Stopped tracking country");
        }
        removed
    }

    /// Every tracked country, sorted.
    #[must_use]
    pub fn countries(&self) -> Vec<CountryId> {
        let mut ids: Vec<CountryId> = self
            .countries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    /// Capture a country for persistence.
    #[must_use]
    pub fn snapshot(&self, country: &CountryId) -> Option<PersistedCountry> {
        let record = self.existing(country)?;
        let guard = record.lock().unwrap_or_else(PoisonError::into_inner);
        Some(PersistedCountry {
            country: country.clone(),
            selections: guard.selections.clone(),
            context: guard.context,
            state: guard.state.clone(),
        })
    }

    /// Load a persisted country, replacing any tracked state.
    ///
    /// The stored aggregate is not trusted: every ID is re-validated and
    /// the state recomputed against the current registry. The persisted
    /// revision is kept.
    ///
    /// # Errors
    ///
    /// Returns [`PolityError::UnknownComponent`] if the record references
    /// a component the registry no longer has.
    pub fn restore(&self, persisted: PersistedCountry) -> Result<UnifiedState> {
        let mut selections = Selections::new();
        for domain in Domain::ALL {
            let ids = persisted.selections.get(domain).iter().cloned();
            selections.replace(&self.registry, domain, ids)?;
        }

        let record = self.record(&persisted.country);
        let mut guard = record.lock().unwrap_or_else(PoisonError::into_inner);
        guard.selections = selections;
        guard.context = persisted.context;
        guard.recompute(
            &persisted.country,
            &self.registry,
            &self.config,
            persisted.state.revision,
        );

        if guard.state != persisted.state {
            tracing::info!(
                country = %persisted.country,
                "Restored state differs from the stored aggregate"
            );
        }
        Ok(guard.state.clone())
    }
}
