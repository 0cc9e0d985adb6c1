//! `SelectorEngine` — The host's real selector semantics
//!
//! The set only narrows candidates. Deciding whether a selector truly matches,
//! and enumerating the descendants of a root, is delegated to the engine
//! injected at construction.

use crate::SelectorError;
use std::sync::Arc;

/// Full selector evaluation, supplied by the embedding application.
///
/// # Contract
///
/// - [`matches`](Self::matches) implements the complete selector language:
///   combinators, attribute tests, pseudo-classes. The set passes the full
///   original selector, never a fragment.
/// - [`query_all`](Self::query_all) returns descendants of `root` matching
///   `selector` as a snapshot, duplicate-free, in document order.
///
/// Errors are not interpreted by the set; they propagate to the caller.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a set can be shared behind a lock.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `SelectorEngine<{Ctx}>`",
    label = "this type cannot evaluate selectors against `{Ctx}`",
    note = "implement SelectorEngine<{Ctx}>, or build one from two closures with FnEngine::new"
)]
pub trait SelectorEngine<Ctx>: Send + Sync {
    /// Whether `element` matches `selector`.
    ///
    /// # Errors
    ///
    /// Whatever the engine reports, typically [`SelectorError::InvalidSelector`].
    fn matches(&self, element: &Ctx, selector: &str) -> Result<bool, SelectorError>;

    /// All descendants of `root` matching `selector`, in document order.
    ///
    /// # Errors
    ///
    /// Whatever the engine reports, typically [`SelectorError::InvalidSelector`].
    fn query_all(&self, root: &Ctx, selector: &str) -> Result<Vec<Ctx>, SelectorError>;
}

#[diagnostic::do_not_recommend]
impl<Ctx> SelectorEngine<Ctx> for Box<dyn SelectorEngine<Ctx>> {
    fn matches(&self, element: &Ctx, selector: &str) -> Result<bool, SelectorError> {
        (**self).matches(element, selector)
    }

    fn query_all(&self, root: &Ctx, selector: &str) -> Result<Vec<Ctx>, SelectorError> {
        (**self).query_all(root, selector)
    }
}

impl<Ctx, E: SelectorEngine<Ctx> + ?Sized> SelectorEngine<Ctx> for Arc<E> {
    fn matches(&self, element: &Ctx, selector: &str) -> Result<bool, SelectorError> {
        (**self).matches(element, selector)
    }

    fn query_all(&self, root: &Ctx, selector: &str) -> Result<Vec<Ctx>, SelectorError> {
        (**self).query_all(root, selector)
    }
}

/// A [`SelectorEngine`] assembled from two closures.
///
/// # Example
///
/// ```
/// use selset::{FnEngine, SelectorEngine};
///
/// let engine = FnEngine::new(
///     |tag: &String, selector: &str| Ok(tag.eq_ignore_ascii_case(selector)),
///     |_root: &String, _selector: &str| Ok(Vec::new()),
/// );
/// assert!(engine.matches(&"DIV".to_string(), "div").unwrap());
/// ```
pub struct FnEngine<M, Q> {
    matches: M,
    query_all: Q,
}

impl<M, Q> FnEngine<M, Q> {
    /// Create an engine from a match predicate and a descendant query.
    pub fn new<Ctx>(matches: M, query_all: Q) -> Self
    where
        M: Fn(&Ctx, &str) -> Result<bool, SelectorError> + Send + Sync,
        Q: Fn(&Ctx, &str) -> Result<Vec<Ctx>, SelectorError> + Send + Sync,
    {
        Self { matches, query_all }
    }
}

impl<Ctx, M, Q> SelectorEngine<Ctx> for FnEngine<M, Q>
where
    M: Fn(&Ctx, &str) -> Result<bool, SelectorError> + Send + Sync,
    Q: Fn(&Ctx, &str) -> Result<Vec<Ctx>, SelectorError> + Send + Sync,
{
    fn matches(&self, element: &Ctx, selector: &str) -> Result<bool, SelectorError> {
        (self.matches)(element, selector)
    }

    fn query_all(&self, root: &Ctx, selector: &str) -> Result<Vec<Ctx>, SelectorError> {
        (self.query_all)(root, selector)
    }
}

impl<M, Q> std::fmt::Debug for FnEngine<M, Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnEngine").finish_non_exhaustive()
    }
}
