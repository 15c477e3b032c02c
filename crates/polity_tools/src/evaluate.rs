//! Offline evaluation of a selection file.
//!
//! A request names components per domain plus an optional context and
//! prints the full unified state as JSON.
//!
//! # Example RON
//!
//! ```ron
//! EvaluationRequest(
//!     government: ["rule_of_law", "professional_bureaucracy"],
//!     economy: ["free_market_system"],
//!     tax: ["flat_tax"],
//!     context: (development: Some(Developed)),
//! )
//! ```

use serde::{Deserialize, Serialize};

use polity_core::config::EngineConfig;
use polity_core::context::CountryContext;
use polity_core::domain::{ComponentId, Domain};
use polity_core::error::PolityError;
use polity_core::registry::ComponentRegistry;
use polity_core::selection::Selections;
use polity_core::state::{compute_unified_state, UnifiedState};

use crate::error::Result;

/// Selection and context to evaluate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationRequest {
    /// Government component IDs.
    pub government: Vec<String>,
    /// Economy component IDs.
    pub economy: Vec<String>,
    /// Tax component IDs.
    pub tax: Vec<String>,
    /// Scoring context.
    pub context: CountryContext,
}

impl EvaluationRequest {
    /// Parse a request from RON text.
    ///
    /// # Errors
    ///
    /// Returns a parse error naming `source` if the text is invalid.
    pub fn from_ron_str(contents: &str, source: &str) -> Result<Self> {
        ron::from_str(contents).map_err(|e| {
            PolityError::DataParseError {
                path: source.to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    fn ids(&self, domain: Domain) -> impl Iterator<Item = ComponentId> + '_ {
        let list = match domain {
            Domain::Government => &self.government,
            Domain::Economy => &self.economy,
            Domain::Tax => &self.tax,
        };
        list.iter().map(|s| ComponentId::new(s.as_str()))
    }
}

/// Validate a request against a registry and compute its state.
///
/// # Errors
///
/// Returns [`PolityError::UnknownComponent`] for the first unknown ID.
pub fn evaluate(
    registry: &ComponentRegistry,
    config: &EngineConfig,
    request: &EvaluationRequest,
) -> Result<UnifiedState> {
    let mut selections = Selections::new();
    for domain in Domain::ALL {
        selections.replace(registry, domain, request.ids(domain))?;
    }
    Ok(compute_unified_state(
        registry,
        config,
        &selections,
        &request.context,
    ))
}

/// Human-facing summary of a state, with scores as decimals.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    /// Final score per domain, by domain key.
    pub domains: Vec<(String, f64)>,
    /// Cross-domain bonus.
    pub unified_bonus: f64,
    /// Unified score.
    pub unified_effectiveness: f64,
    /// Warnings as text.
    pub warnings: Vec<String>,
    /// Rate advice as text.
    pub recommendations: Vec<String>,
}

impl From<&UnifiedState> for EvaluationReport {
    fn from(state: &UnifiedState) -> Self {
        use polity_core::math::to_display;

        Self {
            domains: Domain::ALL
                .into_iter()
                .map(|d| (d.key().to_string(), to_display(state.final_score(d))))
                .collect(),
            unified_bonus: to_display(state.cross_domain.unified_bonus),
            unified_effectiveness: to_display(state.unified_effectiveness),
            warnings: state.warnings.iter().map(ToString::to_string).collect(),
            recommendations: state
                .cross_domain
                .recommendations
                .iter()
                .map(|r| format!("{} {}-{}%: {}", r.rate, r.min_percent, r.max_percent, r.reason))
                .collect(),
        }
    }
}

/// Render a state as pretty JSON; `full` includes every breakdown.
///
/// # Errors
///
/// Returns a JSON error if rendering fails.
pub fn render_json(state: &UnifiedState, full: bool) -> Result<String> {
    let text = if full {
        serde_json::to_string_pretty(state)?
    } else {
        serde_json::to_string_pretty(&EvaluationReport::from(state))?
    };
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use polity_test_utils::fixtures::builtin_registry;

    const REQUEST: &str = r#"
EvaluationRequest(
    government: ["rule_of_law", "professional_bureaucracy"],
    economy: ["free_market_system"],
    tax: ["flat_tax"],
)
"#;

    #[test]
    fn test_evaluate_request() {
        let request = EvaluationRequest::from_ron_str(REQUEST, "request.ron").unwrap();
        let state = evaluate(&builtin_registry(), &EngineConfig::default(), &request).unwrap();

        let report = EvaluationReport::from(&state);
        assert_eq!(report.domains[0], ("government".to_string(), 98.5));
        assert!((report.unified_bonus - 8.0).abs() < f64::EPSILON);
        assert_eq!(report.recommendations.len(), 1);
        assert!(render_json(&state, false).unwrap().contains("unified_effectiveness"));
    }

    #[test]
    fn test_unknown_component_is_reported() {
        let request = EvaluationRequest {
            tax: vec!["poll_tax_of_doom".to_string()],
            ..EvaluationRequest::default()
        };
        let err = evaluate(&builtin_registry(), &EngineConfig::default(), &request).unwrap_err();
        assert!(matches!(
            err,
            ToolError::Engine(PolityError::UnknownComponent { domain: Domain::Tax, .. })
        ));
    }

    #[test]
    fn test_full_json_includes_breakdown() {
        let request = EvaluationRequest::from_ron_str(REQUEST, "request.ron").unwrap();
        let state = evaluate(&builtin_registry(), &EngineConfig::default(), &request).unwrap();
        let json = render_json(&state, true).unwrap();
        assert!(json.contains("synergy_bonus"));
        assert!(json.contains("combined_impact"));
    }
}
