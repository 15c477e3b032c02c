//! # Polity Core
//!
//! Deterministic effectiveness engine for composed governments,
//! economies and tax regimes.
//!
//! This crate contains **only** deterministic logic:
//! - No IO (catalogs arrive as strings, records leave as bytes)
//! - No system randomness
//! - No floating-point math in scoring (uses fixed-point)
//!
//! This separation enables:
//! - Byte-identical aggregates for identical selections
//! - An async serving edge that owns persistence
//! - Offline evaluation from the command line
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`registry`] - Validated component catalog and interaction rules
//! - [`interactions`] - Pairwise synergy and conflict detection
//! - [`effectiveness`] - Per-domain scoring
//! - [`impact`] - Growth, revenue, stability and sector modifiers
//! - [`cross_domain`] - Unified bonus and optimal-rate advice
//! - [`state`] - The unified aggregate and the pipeline producing it
//! - [`manager`] - Per-country state with concurrent access
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod context;
pub mod cross_domain;
pub mod data;
pub mod domain;
pub mod effectiveness;
pub mod error;
pub mod impact;
pub mod interactions;
pub mod manager;
pub mod math;
pub mod persistence;
pub mod registry;
pub mod selection;
pub mod state;
pub mod warnings;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{DomainWeights, EngineConfig};
    pub use crate::context::{
        CountryContext, DevelopmentLevel, PoliticalTradition, PopulationBracket,
    };
    pub use crate::cross_domain::{CrossDomainEffects, OptimalRateRecommendation};
    pub use crate::data::{InteractionKind, MAX_MAGNITUDE};
    pub use crate::domain::{ComponentId, CountryId, Domain};
    pub use crate::effectiveness::DomainEffectiveness;
    pub use crate::error::{PolityError, Result};
    pub use crate::impact::DomainImpact;
    pub use crate::interactions::{Interaction, InteractionSet};
    pub use crate::manager::UnifiedStateManager;
    pub use crate::math::Fixed;
    pub use crate::persistence::PersistedCountry;
    pub use crate::registry::{Component, ComponentRegistry};
    pub use crate::selection::Selections;
    pub use crate::state::{compute_unified_state, InteractionReport, UnifiedState};
    pub use crate::warnings::{DomainCosts, SelectionWarning};
}
