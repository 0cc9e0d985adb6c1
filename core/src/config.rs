//! Config types for loading rule lists.
//!
//! A rules document is a list of `{ selector, data }` entries:
//!
//! ```json
//! { "rules": [
//!     { "selector": "#nav a.active", "data": "highlight" },
//!     { "selector": ".menu > li" }
//! ] }
//! ```
//!
//! `selector` is kept as a raw JSON value. Entries whose selector is not a
//! string are skipped when the list is loaded, so a malformed entry never
//! poisons the rest of the document.

use crate::{RuleId, SelectorError, SelectorSet};
use serde::Deserialize;
use tracing::debug;

/// A list of rules, in insertion order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(bound(deserialize = "D: Deserialize<'de> + Default"))]
pub struct RuleSetConfig<D> {
    /// Rules to add, first to last.
    #[serde(default)]
    pub rules: Vec<RuleConfig<D>>,
}

/// One rule entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(bound(deserialize = "D: Deserialize<'de> + Default"))]
pub struct RuleConfig<D> {
    /// The selector. Anything but a JSON string is ignored on load.
    #[serde(default)]
    pub selector: serde_json::Value,

    /// Payload stored with the rule; `D::default()` when omitted.
    #[serde(default)]
    pub data: D,
}

impl<D> RuleSetConfig<D>
where
    D: for<'de> Deserialize<'de> + Default,
{
    /// Parse a JSON rules document.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::InvalidConfig`] if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, SelectorError> {
        serde_json::from_str(json).map_err(|e| SelectorError::InvalidConfig {
            source: e.to_string(),
        })
    }

    /// Build from an already-parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError::InvalidConfig`] if the value has the wrong shape.
    pub fn from_value(value: serde_json::Value) -> Result<Self, SelectorError> {
        serde_json::from_value(value).map_err(|e| SelectorError::InvalidConfig {
            source: e.to_string(),
        })
    }
}

impl<Ctx, D> SelectorSet<Ctx, D> {
    /// Add every string-selector rule from `config`, in order.
    ///
    /// Returns the ids of the rules that were added. Entries with a non-string
    /// selector are skipped without error.
    pub fn extend_from_config(&mut self, config: RuleSetConfig<D>) -> Vec<RuleId> {
        let mut ids = Vec::with_capacity(config.rules.len());
        for (position, rule) in config.rules.into_iter().enumerate() {
            match rule.selector {
                serde_json::Value::String(selector) => ids.push(self.add(selector, rule.data)),
                other => debug!(position, selector = %other, "skipping non-string selector"),
            }
        }
        ids
    }
}
