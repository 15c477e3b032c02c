//! Data structures for catalog configuration.
//!
//! This module contains pure data structures that define components and
//! their interaction rules. All structs are designed to be deserialized
//! from RON files.
//!
//! **Note:** This module contains no IO - it only defines data types.
//! Turning catalog data into a validated lookup structure is handled by
//! [`crate::registry`].

mod catalog_data;
mod component_data;
mod rule_data;

pub use catalog_data::CatalogData;
pub use component_data::{ComponentData, DomainImpactData};
pub use rule_data::{InteractionKind, InteractionRuleData, OptimalRateData, MAX_MAGNITUDE};
