//! Posting index — one `key → [RuleId]` map per classifier.
//!
//! The exact-match half of a matcher tree: extract a key, look it up in a
//! hash map. Here each slot holds a posting list instead of a single action,
//! because many rules can share a key.

use crate::{Classifier, RuleId};
use std::collections::HashMap;
use std::fmt;

/// One classifier and the posting lists it feeds.
pub(crate) struct Index {
    classifier: Box<dyn Classifier>,
    postings: HashMap<String, Vec<RuleId>>,
}

impl Index {
    pub(crate) fn new(classifier: Box<dyn Classifier>) -> Self {
        Self {
            classifier,
            postings: HashMap::new(),
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        self.classifier.name()
    }

    pub(crate) fn classifier(&self) -> &dyn Classifier {
        &*self.classifier
    }

    /// Append `id` to the posting list for `key`.
    pub(crate) fn insert(&mut self, key: String, id: RuleId) {
        self.postings.entry(key).or_default().push(id);
    }

    /// Remove one occurrence of `id` from the posting list for `key`.
    ///
    /// Drops the list once it is empty. Returns `false` if `id` was not there.
    pub(crate) fn remove(&mut self, key: &str, id: RuleId) -> bool {
        let Some(list) = self.postings.get_mut(key) else {
            return false;
        };
        let Some(pos) = list.iter().position(|&x| x == id) else {
            return false;
        };
        list.remove(pos);
        if list.is_empty() {
            self.postings.remove(key);
        }
        true
    }

    /// The posting list for `key`, in insertion order.
    pub(crate) fn get(&self, key: &str) -> &[RuleId] {
        self.postings
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn stats(&self) -> IndexStats {
        IndexStats {
            name: self.name(),
            keys: self.postings.len(),
            entries: self.postings.values().map(Vec::len).sum(),
        }
    }
}

impl fmt::Debug for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Index")
            .field("classifier", &self.classifier)
            .field("keys", &self.postings.len())
            .finish()
    }
}

/// Size of one posting index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexStats {
    /// The classifier's name.
    pub name: &'static str,
    /// Number of distinct keys with a non-empty posting list.
    pub keys: usize,
    /// Total posting entries (one per indexed comma group).
    pub entries: usize,
}
