//! Rule records and the values returned by lookups.

use std::fmt;

/// Identifier of a rule within one [`SelectorSet`](crate::SelectorSet).
///
/// Ids are handed out in strictly increasing order and never reused, so
/// ordering by id is ordering by insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct RuleId(u64);

impl RuleId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered selector and its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Rule<D> {
    id: RuleId,
    selector: String,
    data: D,
}

impl<D> Rule<D> {
    pub(crate) fn new(id: RuleId, selector: String, data: D) -> Self {
        Self { id, selector, data }
    }

    /// The rule's id.
    #[must_use]
    pub fn id(&self) -> RuleId {
        self.id
    }

    /// The selector exactly as it was added.
    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// The caller's payload.
    #[must_use]
    pub fn data(&self) -> &D {
        &self.data
    }

    /// Take the payload back out.
    #[must_use]
    pub fn into_data(self) -> D {
        self.data
    }
}

/// One rule and every element under a root that it matched.
#[derive(Debug, Clone)]
pub struct QueryMatch<'s, Ctx, D> {
    /// The matched rule.
    pub rule: &'s Rule<D>,
    /// Matched elements, in document order, without duplicates.
    pub elements: Vec<Ctx>,
}

/// Where one comma group of a selector lands in the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// The group's text.
    pub group: String,
    /// Name of the classifier that claimed the group.
    pub index: &'static str,
    /// The posting-list key.
    pub key: String,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}[{}]", self.group, self.index, self.key)
    }
}
