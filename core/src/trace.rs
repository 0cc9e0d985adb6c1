//! Match trace types for debugging index behavior.
//!
//! Use [`SelectorSet::matches_with_trace`](crate::SelectorSet::matches_with_trace)
//! to see which posting lists an element touched, how each candidate was
//! reached, and what the engine decided.
//!
//! # Example
//!
//! ```ignore
//! let trace = set.matches_with_trace(&element)?;
//! for lookup in &trace.lookups {
//!     println!("{}[{}]: {} hits", lookup.index, lookup.key, lookup.hits);
//! }
//! for candidate in &trace.candidates {
//!     println!("  #{} {:?} via {:?}: {}", candidate.id, candidate.selector, candidate.via, candidate.accepted);
//! }
//! ```

use crate::RuleId;

/// Trace of one [`SelectorSet::matches`](crate::SelectorSet::matches) call.
///
/// # INV: accepted ids == `matches()` ids
///
/// [`accepted`](Self::accepted) yields exactly the ids `matches()` returns for
/// the same element, in the same (ascending) order.
#[derive(Debug, Clone, Default)]
pub struct MatchTrace {
    /// Every posting-list lookup, in classifier order.
    pub lookups: Vec<IndexLookup>,
    /// Every unique candidate, ascending by id.
    pub candidates: Vec<CandidateTrace>,
}

impl MatchTrace {
    /// Ids of the candidates the engine accepted.
    pub fn accepted(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.candidates
            .iter()
            .filter(|c| c.accepted)
            .map(|c| c.id)
    }

    /// Candidates the engine rejected: index hits that did not match.
    #[must_use]
    pub fn rejected(&self) -> usize {
        self.candidates.iter().filter(|c| !c.accepted).count()
    }
}

/// One posting-list lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexLookup {
    /// Classifier name.
    pub index: &'static str,
    /// Key derived from the element.
    pub key: String,
    /// Length of the posting list found (0 on a miss).
    pub hits: usize,
}

/// One unique candidate rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateTrace {
    /// The rule's id.
    pub id: RuleId,
    /// The full selector handed to the engine.
    pub selector: String,
    /// Indexes that led to this rule, in lookup order, without repeats.
    pub via: Vec<&'static str>,
    /// The engine's verdict.
    pub accepted: bool,
}
