//! `SelectorSet` — Rule store, match engine and query engine
//!
//! Rules live in an id-keyed arena. Each classifier owns a posting index, and
//! each rule remembers exactly where its comma groups were placed, so removal
//! never has to re-parse the selector.

use crate::classifier::{default_classifiers, Classifier, UniversalClassifier};
use crate::group::{bare_token, is_self_contained, split_groups};
use crate::index::{Index, IndexStats};
use crate::trace::{CandidateTrace, IndexLookup, MatchTrace};
use crate::{Classification, Element, QueryMatch, Rule, RuleId, SelectorEngine, SelectorError};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use tracing::{debug, trace};

/// An indexed collection of selector rules.
///
/// # Type Parameters
///
/// - `Ctx`: The element type rules are matched against
/// - `D`: The payload stored with each rule (`()` when there is none)
///
/// # INV: Output is ordered by id
///
/// [`matches`](Self::matches) and [`query_all`](Self::query_all) return rules
/// in ascending [`RuleId`] order, i.e. insertion order, each rule at most once.
///
/// # Concurrency
///
/// Mutation takes `&mut self`, lookups take `&self`. Share a set across
/// threads behind a `RwLock`.
///
/// # Example
///
/// ```ignore
/// let mut set = SelectorSet::new(engine);
/// set.add(".foo, .bar", "styles");
/// set.add("#foo", "script");
///
/// for rule in set.matches(&element)? {
///     println!("{} -> {:?}", rule.selector(), rule.data());
/// }
/// ```
pub struct SelectorSet<Ctx, D = ()> {
    engine: Box<dyn SelectorEngine<Ctx>>,
    indexes: Vec<Index>,
    rules: BTreeMap<RuleId, Entry<D>>,
    next_id: u64,
}

struct Entry<D> {
    rule: Rule<D>,
    placements: Vec<Placement>,
}

/// How `query_all` asks the engine for descendants.
#[derive(Debug, Default)]
struct QueryPlan<'a> {
    /// Queried together as one `", "`-joined list.
    joined: Vec<&'a str>,
    /// Queried one call each: an open span or escape at the end.
    isolated: Vec<&'a str>,
}

/// One comma group's slot: which index, under which key.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Placement {
    index: usize,
    key: String,
}

impl<Ctx, D> SelectorSet<Ctx, D> {
    /// Create an empty set using the built-in classifiers.
    pub fn new(engine: impl SelectorEngine<Ctx> + 'static) -> Self {
        Self::with_classifiers(engine, default_classifiers())
    }

    /// Create an empty set with a custom classifier order.
    ///
    /// The universal fallback is appended automatically and must not be
    /// included in `classifiers`.
    pub fn with_classifiers(
        engine: impl SelectorEngine<Ctx> + 'static,
        classifiers: Vec<Box<dyn Classifier>>,
    ) -> Self {
        let indexes = classifiers
            .into_iter()
            .chain(std::iter::once(
                Box::new(UniversalClassifier) as Box<dyn Classifier>
            ))
            .map(Index::new)
            .collect();

        Self {
            engine: Box::new(engine),
            indexes,
            rules: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Number of live rules. A rule counts once however many groups it has.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no rules are registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Live rules in id order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule<D>> + '_ {
        self.rules.values().map(|entry| &entry.rule)
    }

    /// Look up a live rule by id.
    pub fn get(&self, id: RuleId) -> Option<&Rule<D>> {
        self.rules.get(&id).map(|entry| &entry.rule)
    }

    /// Per-classifier index sizes, in classifier order.
    pub fn index_stats(&self) -> Vec<IndexStats> {
        self.indexes.iter().map(Index::stats).collect()
    }

    /// Register a selector, returning its new id.
    ///
    /// Each comma group is classified by its last simple selector and its id
    /// pushed onto one posting list. Adding the same selector twice creates
    /// two independent rules.
    ///
    /// An empty selector is stored and counted but has no groups, so it is
    /// never returned by a lookup.
    pub fn add(&mut self, selector: impl Into<String>, data: D) -> RuleId {
        let selector = selector.into();
        let id = RuleId::new(self.next_id);
        self.next_id += 1;

        let placements: Vec<Placement> = self
            .place(&selector)
            .into_iter()
            .map(|(_, placement)| placement)
            .collect();
        for placement in &placements {
            self.indexes[placement.index].insert(placement.key.clone(), id);
        }

        debug!(%id, selector = %selector, groups = placements.len(), "rule added");
        self.rules.insert(
            id,
            Entry {
                rule: Rule::new(id, selector, data),
                placements,
            },
        );
        id
    }

    /// Remove the most recently added rule with this selector.
    ///
    /// Returns the removed rule, or `None` (changing nothing) if no rule has
    /// this exact selector text.
    pub fn remove(&mut self, selector: &str) -> Option<Rule<D>> {
        self.remove_where(selector, |_| true)
    }

    /// Remove the most recently added rule with this selector and payload.
    ///
    /// Rules whose payload differs are skipped even if their selector matches.
    pub fn remove_with_data(&mut self, selector: &str, data: &D) -> Option<Rule<D>>
    where
        D: PartialEq,
    {
        self.remove_where(selector, |candidate| candidate == data)
    }

    fn remove_where(&mut self, selector: &str, eligible: impl Fn(&D) -> bool) -> Option<Rule<D>> {
        let id = self
            .rules
            .values()
            .rev()
            .find(|entry| entry.rule.selector() == selector && eligible(entry.rule.data()))
            .map(|entry| entry.rule.id())?;

        let entry = self.rules.remove(&id)?;
        for placement in &entry.placements {
            self.indexes[placement.index].remove(&placement.key, id);
        }

        debug!(%id, selector, "rule removed");
        Some(entry.rule)
    }

    /// Report where each group of `selector` would be indexed, without adding it.
    pub fn classify(&self, selector: &str) -> Vec<Classification> {
        self.place(selector)
            .into_iter()
            .map(|(group, placement)| Classification {
                group: group.to_owned(),
                index: self.indexes[placement.index].name(),
                key: placement.key,
            })
            .collect()
    }

    /// Classify every comma group of `selector`.
    fn place<'a>(&self, selector: &'a str) -> Vec<(&'a str, Placement)> {
        let universal = self.indexes.len() - 1;

        split_groups(selector)
            .into_iter()
            .filter_map(|group| {
                let token = bare_token(group.last_token()?);
                let placement = self.indexes.iter().enumerate().find_map(|(index, idx)| {
                    idx.classifier()
                        .selector_key(&token)
                        .map(|key| Placement { index, key })
                })?;

                if placement.index == universal {
                    debug!(selector, group = group.text, "group indexed under universal fallback");
                }
                Some((group.text, placement))
            })
            .collect()
    }

    /// Unique candidate ids for `element`, ascending.
    fn candidates(&self, element: &dyn Element) -> Vec<RuleId> {
        let mut ids = Vec::new();
        for index in &self.indexes {
            for key in index.classifier().element_keys(element) {
                ids.extend_from_slice(index.get(&key));
            }
        }
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Distinct indexed selectors in id order, split into those that can share
    /// one selector list and those that would swallow whatever follows them.
    fn query_plan(&self) -> QueryPlan<'_> {
        let mut seen = HashSet::new();
        let mut plan = QueryPlan::default();

        for entry in self.rules.values().filter(|entry| !entry.placements.is_empty()) {
            let selector = entry.rule.selector();
            if !seen.insert(selector) {
                continue;
            }
            if is_self_contained(selector) {
                plan.joined.push(selector);
            } else {
                plan.isolated.push(selector);
            }
        }
        plan
    }
}

impl<Ctx: Element, D> SelectorSet<Ctx, D> {
    /// Rules whose selector matches `element`, ascending by id.
    ///
    /// Only rules reachable through the element's id, classes, tag or the
    /// universal list are tested, and each is tested once with its full
    /// selector. `None` yields an empty result.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by the engine.
    pub fn matches<'e>(
        &self,
        element: impl Into<Option<&'e Ctx>>,
    ) -> Result<Vec<&Rule<D>>, SelectorError>
    where
        Ctx: 'e,
    {
        let Some(element) = element.into() else {
            return Ok(Vec::new());
        };

        let candidates = self.candidates(element);
        let mut matched = Vec::new();
        for id in &candidates {
            let Some(entry) = self.rules.get(id) else {
                continue;
            };
            if self.engine.matches(element, entry.rule.selector())? {
                matched.push(&entry.rule);
            }
        }

        trace!(
            candidates = candidates.len(),
            matched = matched.len(),
            "matched element"
        );
        Ok(matched)
    }

    /// Like [`matches`](Self::matches), recording every lookup and verdict.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by the engine.
    pub fn matches_with_trace(&self, element: &Ctx) -> Result<MatchTrace, SelectorError> {
        let mut lookups = Vec::new();
        let mut via: BTreeMap<RuleId, Vec<&'static str>> = BTreeMap::new();

        for index in &self.indexes {
            for key in index.classifier().element_keys(element) {
                let hits = index.get(&key);
                for id in hits {
                    let paths = via.entry(*id).or_default();
                    if !paths.contains(&index.name()) {
                        paths.push(index.name());
                    }
                }
                lookups.push(IndexLookup {
                    index: index.name(),
                    key: key.into_owned(),
                    hits: hits.len(),
                });
            }
        }

        let mut candidates = Vec::with_capacity(via.len());
        for (id, via) in via {
            let Some(entry) = self.rules.get(&id) else {
                continue;
            };
            let accepted = self.engine.matches(element, entry.rule.selector())?;
            candidates.push(CandidateTrace {
                id,
                selector: entry.rule.selector().to_owned(),
                via,
                accepted,
            });
        }

        Ok(MatchTrace {
            lookups,
            candidates,
        })
    }

    /// Every rule matching at least one descendant of `root`, ascending by id,
    /// each with its matched elements in document order.
    ///
    /// Descendants are enumerated once, against the list of all distinct
    /// selectors, and each is then run through [`matches`](Self::matches).
    /// A selector that ends inside a quote, bracket, parenthesis or escape
    /// would swallow the rest of that list, so it is queried on its own and
    /// its rules take the engine's result directly. An empty set or a `None`
    /// root returns an empty result without consulting the engine.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by the engine.
    pub fn query_all<'e>(
        &self,
        root: impl Into<Option<&'e Ctx>>,
    ) -> Result<Vec<QueryMatch<'_, Ctx, D>>, SelectorError>
    where
        Ctx: Clone + 'e,
    {
        let Some(root) = root.into() else {
            return Ok(Vec::new());
        };
        let plan = self.query_plan();
        let mut found: BTreeMap<RuleId, QueryMatch<'_, Ctx, D>> = BTreeMap::new();
        let mut scanned = 0;

        if !plan.joined.is_empty() {
            let elements = self.engine.query_all(root, &plan.joined.join(", "))?;
            scanned += elements.len();

            for element in &elements {
                for rule in self.matches(element)? {
                    if plan.isolated.contains(&rule.selector()) {
                        continue;
                    }
                    found
                        .entry(rule.id())
                        .or_insert_with(|| QueryMatch {
                            rule,
                            elements: Vec::new(),
                        })
                        .elements
                        .push(element.clone());
                }
            }
        }

        for selector in &plan.isolated {
            debug!(selector, "selector queried on its own");
            let elements = self.engine.query_all(root, selector)?;
            scanned += elements.len();
            if elements.is_empty() {
                continue;
            }

            for entry in self.rules.values() {
                if !entry.placements.is_empty() && entry.rule.selector() == *selector {
                    found.insert(
                        entry.rule.id(),
                        QueryMatch {
                            rule: &entry.rule,
                            elements: elements.clone(),
                        },
                    );
                }
            }
        }

        trace!(
            elements = scanned,
            rules = found.len(),
            isolated = plan.isolated.len(),
            "queried root"
        );
        Ok(found.into_values().collect())
    }
}

impl<Ctx, D> fmt::Debug for SelectorSet<Ctx, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectorSet")
            .field("rules", &self.rules.len())
            .field("next_id", &self.next_id)
            .field("indexes", &self.indexes)
            .finish_non_exhaustive()
    }
}
