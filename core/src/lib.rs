//! selset - an indexed set of selector rules
//!
//! A [`SelectorSet`] holds many selector rules (e.g. `"#nav a.active, .menu > li"`)
//! and answers "which rules may apply to this element?" without testing every rule.
//!
//! # Architecture
//!
//! - [`split_groups`] / [`tokens`] — Bounded scanner over the selector text
//! - [`Classifier`] — Pluggable key extraction (id, class, tag, universal fallback)
//! - [`SelectorSet`] — Rule store with one posting index per classifier
//! - [`SelectorEngine<Ctx>`] — The host's real selector semantics (injected)
//! - [`Element`] — What the index reads off a query element
//!
//! # Key Design Insights
//!
//! 1. **Index on the last compound only**: each comma group is classified by its
//!    rightmost simple selector. That key is coarse. It narrows the candidate
//!    list but never decides a match.
//!
//! 2. **The engine always has the last word**: every candidate is re-checked with
//!    [`SelectorEngine::matches`] using the full original selector.
//!
//! 3. **Output is ordered by [`RuleId`]**: ids only grow, so id order is insertion
//!    order. Nothing depends on hash-map iteration order.
//!
//! # Example
//!
//! ```
//! use selset::prelude::*;
//!
//! #[derive(Debug, Clone)]
//! struct Node { id: Option<String>, classes: Vec<String>, tag: String }
//!
//! impl Element for Node {
//!     fn id(&self) -> Option<&str> { self.id.as_deref() }
//!     fn class_names(&self) -> Vec<&str> { self.classes.iter().map(String::as_str).collect() }
//!     fn tag_name(&self) -> &str { &self.tag }
//! }
//!
//! // A toy engine that understands bare `#id` selectors only.
//! let engine = FnEngine::new(
//!     |node: &Node, selector: &str| Ok(node.id.as_deref() == selector.strip_prefix('#')),
//!     |_root: &Node, _selector: &str| Ok(Vec::new()),
//! );
//!
//! let mut set: SelectorSet<Node, &str> = SelectorSet::new(engine);
//! set.add("#foo", "first");
//! set.add("#bar", "second");
//!
//! let node = Node { id: Some("foo".into()), classes: vec![], tag: "div".into() };
//! let matched = set.matches(&node).unwrap();
//! assert_eq!(matched.len(), 1);
//! assert_eq!(*matched[0].data(), "first");
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod classifier;
mod element;
mod engine;
mod group;
mod index;
mod rule;
mod set;
mod trace;

#[cfg(feature = "config")]
mod config;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Core types
pub use classifier::{
    default_classifiers, ClassClassifier, Classifier, IdClassifier, TagClassifier,
    UniversalClassifier, UNIVERSAL_KEY,
};
pub use element::Element;
pub use engine::{FnEngine, SelectorEngine};
pub use group::{
    bare_token, is_self_contained, last_simple_token, split_groups, tokens, Group,
};
pub use index::IndexStats;
pub use rule::{Classification, QueryMatch, Rule, RuleId};
pub use set::SelectorSet;

// Config (feature-gated)
#[cfg(feature = "config")]
pub use config::{RuleConfig, RuleSetConfig};

// Trace types
pub use trace::{CandidateTrace, IndexLookup, MatchTrace};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use selset::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Traits
        Classifier,
        Element,
        // Core types
        FnEngine,
        // Trace types
        MatchTrace,
        QueryMatch,
        Rule,
        RuleId,
        SelectorEngine,
        // Errors
        SelectorError,
        SelectorSet,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors surfaced by a [`SelectorSet`].
///
/// The set itself never fails: bad input and missing rules are no-ops. Every
/// variant here originates in the injected [`SelectorEngine`] or in config
/// deserialization, and is handed back to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// The engine could not parse or does not support a selector.
    InvalidSelector {
        /// The selector text handed to the engine.
        selector: String,
        /// The underlying error message.
        source: String,
    },
    /// Any other failure inside the engine.
    Engine {
        /// The underlying error message.
        source: String,
    },
    /// A rules document could not be deserialized.
    InvalidConfig {
        /// The underlying error message.
        source: String,
    },
}

impl std::fmt::Display for SelectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSelector { selector, source } => {
                write!(f, "invalid selector \"{selector}\": {source}")
            }
            Self::Engine { source } => write!(f, "selector engine failed: {source}"),
            Self::InvalidConfig { source } => write!(f, "invalid config: {source}"),
        }
    }
}

impl std::error::Error for SelectorError {}
