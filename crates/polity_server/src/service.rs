//! Request handling over a shared state manager.
//!
//! Every mutation is applied and recomputed synchronously; persisting the
//! result is queued to a background worker and never awaited by the
//! request. A failed write is logged and counted but never rolls back the
//! in-memory state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};

use polity_core::domain::{ComponentId, CountryId, Domain};
use polity_core::manager::UnifiedStateManager;

use crate::error::Result;
use crate::persist::PersistQueue;
use crate::protocol::{Request, Response, StateResponse};
use crate::store::SelectionStore;

/// Request and persistence counters.
#[derive(Debug, Default)]
pub struct ServiceStats {
    requests: AtomicU64,
    rejected: AtomicU64,
    persisted: AtomicU64,
    persist_failures: AtomicU64,
}

/// Point-in-time copy of [`ServiceStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Requests handled.
    pub requests: u64,
    /// Requests answered with an error.
    pub rejected: u64,
    /// Records written successfully.
    pub persisted: u64,
    /// Record writes that failed.
    pub persist_failures: u64,
}

impl ServiceStats {
    pub(crate) fn record_persisted(&self) {
        self.persisted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_persist_failure(&self) {
        self.persist_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Read every counter.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            persisted: self.persisted.load(Ordering::Relaxed),
            persist_failures: self.persist_failures.load(Ordering::Relaxed),
        }
    }
}

/// The serving edge: decodes requests, drives the manager, persists.
#[derive(Clone)]
pub struct PolityService {
    manager: Arc<UnifiedStateManager>,
    store: Arc<dyn SelectionStore>,
    stats: Arc<ServiceStats>,
    persist: PersistQueue,
}

impl std::fmt::Debug for PolityService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolityService")
            .field("countries", &self.manager.countries().len())
            .field("stats", &self.stats.snapshot())
            .finish_non_exhaustive()
    }
}

fn parse_domain(key: &str) -> Result<Domain> {
    Ok(key.parse::<Domain>()?)
}

impl PolityService {
    /// Create a service over a manager and a store, starting its
    /// persistence worker.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn new(manager: Arc<UnifiedStateManager>, store: Arc<dyn SelectionStore>) -> Self {
        let stats = Arc::new(ServiceStats::default());
        let persist = PersistQueue::spawn(
            Arc::clone(&manager),
            Arc::clone(&store),
            Arc::clone(&stats),
        );
        Self {
            manager,
            store,
            stats,
            persist,
        }
    }

    /// The underlying manager.
    #[must_use]
    pub fn manager(&self) -> &Arc<UnifiedStateManager> {
        &self.manager
    }

    /// Shared counters.
    #[must_use]
    pub fn stats(&self) -> &Arc<ServiceStats> {
        &self.stats
    }

    /// Wait for every write queued so far to reach the store.
    pub async fn flush(&self) {
        self.persist.flush().await;
    }

    /// Load every stored record into the manager.
    ///
    /// Records the current catalog no longer accepts are skipped with a
    /// warning. Returns the number restored.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Store`](crate::error::ServerError::Store) if the store cannot be read.
    pub async fn restore_all(&self) -> Result<usize> {
        let records = self.store.load_all().await?;
        let mut restored = 0;
        for record in records {
            let country = record.country.clone();
            match self.manager.restore(record) {
                Ok(_) => restored += 1,
                Err(e) => tracing::warn!(country = %country, "Skipping stored record: {e}"),
            }
        }
        tracing::info!(restored, "Restored countries from store");
        Ok(restored)
    }

    /// Decode, handle and encode one request line.
    pub async fn handle_line(&self, line: &str) -> String {
        let response = match Request::parse(line) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                self.stats.requests.fetch_add(1, Ordering::Relaxed);
                self.stats.rejected.fetch_add(1, Ordering::Relaxed);
                Response::Error(e.to_string())
            }
        };
        response.to_line()
    }

    /// Handle one decoded request.
    pub async fn handle(&self, request: Request) -> Response {
        self.stats.requests.fetch_add(1, Ordering::Relaxed);

        let mutation = request.is_mutation();
        let result = self.dispatch(request);
        if result.is_err() {
            self.stats.rejected.fetch_add(1, Ordering::Relaxed);
        }

        if let (true, Ok((Some(country), _))) = (mutation, &result) {
            self.persist.mark_dirty(country.clone());
        }

        Response::from(result.map(|(_, value)| value))
    }

    /// Apply a request. Returns the touched country for mutations.
    fn dispatch(&self, request: Request) -> Result<(Option<CountryId>, Value)> {
        match request {
            Request::SetSelection {
                country,
                domain,
                components,
            } => {
                let country = CountryId::new(country);
                let domain = parse_domain(&domain)?;
                let state = self.manager.set_selection(
                    &country,
                    domain,
                    components.into_iter().map(ComponentId::new),
                )?;
                Ok((Some(country), serde_json::to_value(StateResponse::new(&state))?))
            }
            Request::AddComponent {
                country,
                domain,
                component,
            } => {
                let country = CountryId::new(country);
                let domain = parse_domain(&domain)?;
                let state =
                    self.manager
                        .add_component(&country, domain, ComponentId::new(component))?;
                Ok((Some(country), serde_json::to_value(StateResponse::new(&state))?))
            }
            Request::RemoveComponent {
                country,
                domain,
                component,
            } => {
                let country = CountryId::new(country);
                let domain = parse_domain(&domain)?;
                let state = self.manager.remove_component(
                    &country,
                    domain,
                    &ComponentId::new(component),
                )?;
                Ok((Some(country), serde_json::to_value(StateResponse::new(&state))?))
            }
            Request::SetContext { country, context } => {
                let country = CountryId::new(country);
                let state = self.manager.set_context(&country, context)?;
                Ok((Some(country), serde_json::to_value(StateResponse::new(&state))?))
            }
            Request::GetState { country } => {
                let state = self.manager.get_state(&CountryId::new(country));
                Ok((None, serde_json::to_value(StateResponse::new(&state))?))
            }
            Request::ListComponents { domain, category } => {
                let domain = parse_domain(&domain)?;
                let components = self
                    .manager
                    .list_available_components(domain, category.as_deref());
                Ok((None, serde_json::to_value(components)?))
            }
            Request::Explain { country } => {
                let report = self.manager.explain_interactions(&CountryId::new(country));
                Ok((None, serde_json::to_value(report)?))
            }
            Request::RemoveCountry { country } => {
                let country = CountryId::new(country);
                let removed = self.manager.remove_country(&country);
                Ok((Some(country), json!({ "removed": removed })))
            }
        }
    }
}
