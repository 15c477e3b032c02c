//! Component listing.

use serde::Serialize;

use polity_core::domain::Domain;
use polity_core::registry::{Component, ComponentRegistry};

/// One row of the component listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentRow {
    /// Component ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Owning domain.
    pub domain: Domain,
    /// Category within the domain.
    pub category: String,
    /// Baseline effectiveness.
    pub base_effectiveness: u32,
    /// Recurring cost.
    pub maintenance_cost: u32,
    /// Capacity draw.
    pub required_capacity: u32,
}

impl From<&Component> for ComponentRow {
    fn from(c: &Component) -> Self {
        Self {
            id: c.id.to_string(),
            name: c.name.clone(),
            domain: c.domain,
            category: c.category.clone(),
            base_effectiveness: c.base_effectiveness,
            maintenance_cost: c.maintenance_cost,
            required_capacity: c.required_capacity,
        }
    }
}

/// List components, optionally narrowed to a domain and category.
///
/// Without a domain every domain is listed in canonical order.
#[must_use]
pub fn list_components(
    registry: &ComponentRegistry,
    domain: Option<Domain>,
    category: Option<&str>,
) -> Vec<ComponentRow> {
    let domains: Vec<Domain> = domain.map_or_else(|| Domain::ALL.to_vec(), |d| vec![d]);

    domains
        .into_iter()
        .flat_map(|d| registry.all(d))
        .filter(|c| category.map_or(true, |wanted| c.category == wanted))
        .map(ComponentRow::from)
        .collect()
}

/// Render rows as an aligned text table.
#[must_use]
pub fn render_table(rows: &[ComponentRow]) -> String {
    let mut out = String::new();
    for row in rows {
        out.push_str(&format!(
            "{:<10} {:<28} {:<24} base {:>3}  upkeep {:>3}  cap {:>3}\n",
            row.domain.key(),
            row.id,
            row.category,
            row.base_effectiveness,
            row.maintenance_cost,
            row.required_capacity
        ));
    }
    out
}
