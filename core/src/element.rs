//! `Element` — What the index reads off a query element
//!
//! The set never looks at attributes, ancestors or siblings; those belong to
//! the [`SelectorEngine`](crate::SelectorEngine). It only needs the three
//! coarse facets the built-in classifiers key on.

use std::rc::Rc;
use std::sync::Arc;

/// The facets of a query element used for index lookups.
///
/// Implemented by the host's element handle (a DOM node, a widget, a test
/// tree node). Cheap to call: it runs once per classifier per lookup.
///
/// # Example
///
/// ```
/// use selset::Element;
///
/// struct Widget { name: String, styles: String, kind: &'static str }
///
/// impl Element for Widget {
///     fn id(&self) -> Option<&str> {
///         Some(&self.name)
///     }
///
///     fn class_names(&self) -> Vec<&str> {
///         self.styles.split_whitespace().collect()
///     }
///
///     fn tag_name(&self) -> &str {
///         self.kind
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Element`",
    label = "this type cannot be looked up in a SelectorSet",
    note = "Element exposes the id, class names and tag name the index keys on"
)]
pub trait Element {
    /// The element's identifier, if it has one.
    fn id(&self) -> Option<&str>;

    /// Every class name the element carries, in any order.
    fn class_names(&self) -> Vec<&str>;

    /// The element's tag name. Case does not matter; the tag index
    /// normalizes both sides to upper case.
    fn tag_name(&self) -> &str;
}

impl<E: Element + ?Sized> Element for &E {
    fn id(&self) -> Option<&str> {
        (**self).id()
    }

    fn class_names(&self) -> Vec<&str> {
        (**self).class_names()
    }

    fn tag_name(&self) -> &str {
        (**self).tag_name()
    }
}

impl<E: Element + ?Sized> Element for Rc<E> {
    fn id(&self) -> Option<&str> {
        (**self).id()
    }

    fn class_names(&self) -> Vec<&str> {
        (**self).class_names()
    }

    fn tag_name(&self) -> &str {
        (**self).tag_name()
    }
}

impl<E: Element + ?Sized> Element for Arc<E> {
    fn id(&self) -> Option<&str> {
        (**self).id()
    }

    fn class_names(&self) -> Vec<&str> {
        (**self).class_names()
    }

    fn tag_name(&self) -> &str {
        (**self).tag_name()
    }
}
