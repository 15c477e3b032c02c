//! JSON-lines request protocol.
//!
//! One request object per line, one response object per line:
//!
//! ```text
//! {"op":"set_selection","country":"atlantis","domain":"government","components":["rule_of_law"]}
//! {"ok":{"scores":{...},"state":{...}}}
//! {"op":"get_state","country":"nowhere"}
//! {"error":"Unknown government component: ..."}
//! ```

use serde::{Deserialize, Serialize};

use polity_core::context::CountryContext;
use polity_core::domain::Domain;
use polity_core::math::to_display;
use polity_core::state::UnifiedState;

use crate::error::{Result, ServerError};

/// A decoded request line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    /// Replace one domain's selection.
    SetSelection {
        /// Country to edit.
        country: String,
        /// Domain key (`government`, `economy`, `tax`).
        domain: String,
        /// Component IDs.
        components: Vec<String>,
    },
    /// Add one component.
    AddComponent {
        /// Country to edit.
        country: String,
        /// Domain key.
        domain: String,
        /// Component ID.
        component: String,
    },
    /// Remove one component.
    RemoveComponent {
        /// Country to edit.
        country: String,
        /// Domain key.
        domain: String,
        /// Component ID.
        component: String,
    },
    /// Replace the scoring context.
    SetContext {
        /// Country to edit.
        country: String,
        /// New context.
        context: CountryContext,
    },
    /// Read a country's state.
    GetState {
        /// Country to read.
        country: String,
    },
    /// List selectable components.
    ListComponents {
        /// Domain key.
        domain: String,
        /// Optional category filter.
        #[serde(default)]
        category: Option<String>,
    },
    /// Explain a country's active interactions.
    Explain {
        /// Country to read.
        country: String,
    },
    /// Forget a country.
    RemoveCountry {
        /// Country to remove.
        country: String,
    },
}

impl Request {
    /// Decode one request line.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Protocol`] if the line is not a valid request.
    pub fn parse(line: &str) -> Result<Self> {
        serde_json::from_str(line).map_err(|e| ServerError::Protocol(e.to_string()))
    }

    /// Whether the request changes state (and so must be persisted).
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::SetSelection { .. }
                | Self::AddComponent { .. }
                | Self::RemoveComponent { .. }
                | Self::SetContext { .. }
                | Self::RemoveCountry { .. }
        )
    }
}

/// One response line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    /// Request succeeded.
    Ok(serde_json::Value),
    /// Request failed; state is unchanged.
    Error(String),
}

impl Response {
    /// Encode as a single line without the trailing newline.
    #[must_use]
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"error":"failed to encode response: {e}"}}"#)
        })
    }
}

impl From<Result<serde_json::Value>> for Response {
    fn from(result: Result<serde_json::Value>) -> Self {
        match result {
            Ok(value) => Self::Ok(value),
            Err(e) => Self::Error(e.to_string()),
        }
    }
}

/// Scores as decimals, for clients that do not read raw fixed-point bits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// Mutation counter.
    pub revision: u64,
    /// Government final score.
    pub government: f64,
    /// Economy final score.
    pub economy: f64,
    /// Tax final score.
    pub tax: f64,
    /// Cross-domain bonus.
    pub unified_bonus: f64,
    /// Unified score.
    pub unified: f64,
    /// Warnings as text.
    pub warnings: Vec<String>,
}

impl From<&UnifiedState> for ScoreSummary {
    fn from(state: &UnifiedState) -> Self {
        Self {
            revision: state.revision,
            government: to_display(state.final_score(Domain::Government)),
            economy: to_display(state.final_score(Domain::Economy)),
            tax: to_display(state.final_score(Domain::Tax)),
            unified_bonus: to_display(state.cross_domain.unified_bonus),
            unified: to_display(state.unified_effectiveness),
            warnings: state.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Payload returned by every request that yields a state.
#[derive(Debug, Clone, Serialize)]
pub struct StateResponse<'a> {
    /// Decimal scores.
    pub scores: ScoreSummary,
    /// Full aggregate.
    pub state: &'a UnifiedState,
}

impl<'a> StateResponse<'a> {
    /// Wrap a state.
    #[must_use]
    pub fn new(state: &'a UnifiedState) -> Self {
        Self {
            scores: ScoreSummary::from(state),
            state,
        }
    }
}
