//! Cost footprints and non-fatal selection warnings.
//!
//! Over-committing capacity or budget is allowed; the consequence is
//! reported alongside the aggregate rather than rejected.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::Domain;
use crate::registry::ComponentRegistry;
use crate::selection::Selections;

/// Summed cost footprint of one domain's selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DomainCosts {
    /// Sum of one-time implementation costs.
    pub implementation: u32,
    /// Sum of recurring maintenance costs.
    pub maintenance: u32,
    /// Sum of required capacity.
    pub capacity: u32,
}

/// A non-fatal problem with the current selections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionWarning {
    /// A domain's summed required capacity exceeds the limit.
    CapacityExceeded {
        /// Over-committed domain.
        domain: Domain,
        /// Summed capacity of the selection.
        required: u32,
        /// Configured limit.
        limit: u32,
    },
    /// Summed maintenance across all domains exceeds the country's budget.
    BudgetExceeded {
        /// Summed maintenance cost.
        total: u32,
        /// Budget ceiling from the country context.
        ceiling: u32,
    },
}

impl std::fmt::Display for SelectionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CapacityExceeded {
                domain,
                required,
                limit,
            } => write!(
                f,
                "{} selection needs {required} capacity, limit is {limit}",
                domain.display_name()
            ),
            Self::BudgetExceeded { total, ceiling } => write!(
                f,
                "Maintenance cost {total} exceeds budget of {ceiling}"
            ),
        }
    }
}

/// Sum the cost footprint of each domain.
#[must_use]
pub fn domain_costs(
    registry: &ComponentRegistry,
    selections: &Selections,
) -> BTreeMap<Domain, DomainCosts> {
    Domain::ALL
        .into_iter()
        .map(|domain| {
            let costs = selections
                .get(domain)
                .iter()
                .filter_map(|id| registry.get(domain, id.as_str()))
                .fold(DomainCosts::default(), |acc, c| DomainCosts {
                    implementation: acc.implementation.saturating_add(c.implementation_cost),
                    maintenance: acc.maintenance.saturating_add(c.maintenance_cost),
                    capacity: acc.capacity.saturating_add(c.required_capacity),
                });
            (domain, costs)
        })
        .collect()
}

/// Check costs against the capacity limit and the optional budget.
#[must_use]
pub fn check_limits(
    costs: &BTreeMap<Domain, DomainCosts>,
    capacity_limit: u32,
    maintenance_budget: Option<u32>,
) -> Vec<SelectionWarning> {
    let mut warnings: Vec<SelectionWarning> = costs
        .iter()
        .filter(|(_, c)| c.capacity > capacity_limit)
        .map(|(domain, c)| SelectionWarning::CapacityExceeded {
            domain: *domain,
            required: c.capacity,
            limit: capacity_limit,
        })
        .collect();

    if let Some(ceiling) = maintenance_budget {
        let total = costs
            .values()
            .fold(0u32, |acc, c| acc.saturating_add(c.maintenance));
        if total > ceiling {
            warnings.push(SelectionWarning::BudgetExceeded { total, ceiling });
        }
    }

    for warning in &warnings {
        tracing::debug!("Selection warning: {warning}");
    }

    warnings
}
