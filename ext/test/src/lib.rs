//! selset-test: Test domain for conformance testing
//!
//! Provides an in-memory element tree, a small selector engine over it, and a
//! linear exemplar set to cross-check the indexed one. This is the reference
//! host that demonstrates how to plug an element type into selset.
//!
//! # Example
//!
//! ```
//! use selset_test::prelude::*;
//!
//! let root = Document::build(
//!     NodeSpec::new("body")
//!         .child(NodeSpec::new("div").id("foo").class("bar"))
//!         .child(NodeSpec::new("p").class("bar")),
//! );
//!
//! let mut set: SelectorSet<TestElement, &str> = SelectorSet::new(TestEngine);
//! set.add(".bar", "bar");
//! set.add("div#foo", "foo");
//!
//! let div = root.find("div").unwrap();
//! let matched = set.matches(&div).unwrap();
//! assert_eq!(matched.len(), 2);
//! ```

use selset::Element;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;



pub use engine::TestEngine;
pub use linear::LinearSelectorSet;

/// Declarative description of an element subtree.
///
/// Deserializes (feature `serde`) from YAML like:
///
/// ```yaml
/// tag: ul
/// class: menu
/// children:
///   - { tag: li, id: first }
///   - { tag: li, attrs: { role: tab } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct NodeSpec {
    /// Tag name, kept in the case it was written.
    pub tag: String,
    /// The `id` attribute.
    pub id: Option<String>,
    /// The `class` attribute: space-separated class names.
    pub class: Option<String>,
    /// Any other attributes.
    pub attrs: BTreeMap<String, String>,
    /// Child elements, in document order.
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    /// A node with this tag and nothing else.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Set the `id` attribute (builder pattern).
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Append a class name (builder pattern).
    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        self.class = Some(match self.class.take() {
            Some(existing) => format!("{existing} {class}"),
            None => class.to_owned(),
        });
        self
    }

    /// Set an attribute (builder pattern).
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Append a child (builder pattern).
    #[must_use]
    pub fn child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug)]
struct Node {
    tag: String,
    attrs: BTreeMap<String, String>,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// An immutable element tree stored as a preorder arena.
///
/// Node `0` is the root; arena order is document order.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Build a document and return a handle to its root element.
    #[must_use]
    pub fn build(root: NodeSpec) -> TestElement {
        let mut doc = Document { nodes: Vec::new() };
        doc.push(root, None);
        TestElement {
            doc: Arc::new(doc),
            index: 0,
        }
    }

    fn push(&mut self, node: NodeSpec, parent: Option<usize>) -> usize {
        let index = self.nodes.len();
        let mut attrs = node.attrs;
        if let Some(id) = node.id {
            attrs.insert("id".into(), id);
        }
        if let Some(class) = node.class {
            attrs.insert("class".into(), class);
        }

        self.nodes.push(Node {
            tag: node.tag,
            attrs,
            parent,
            children: Vec::new(),
        });

        for child in node.children {
            let child = self.push(child, Some(index));
            self.nodes[index].children.push(child);
        }
        index
    }

    /// Number of elements, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a document has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A cheap, clonable handle to one element of a [`Document`].
///
/// Two handles are equal when they point at the same node of the same
/// document.
#[derive(Clone)]
pub struct TestElement {
    doc: Arc<Document>,
    index: usize,
}

impl TestElement {
    fn node(&self) -> &Node {
        &self.doc.nodes[self.index]
    }

    fn at(&self, index: usize) -> Self {
        Self {
            doc: Arc::clone(&self.doc),
            index,
        }
    }

    /// The document this element belongs to.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Value of an attribute, `id` and `class` included.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.node().attrs.get(name).map(String::as_str)
    }

    /// The parent element, or `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.node().parent.map(|p| self.at(p))
    }

    /// Child elements in document order.
    #[must_use]
    pub fn children(&self) -> Vec<Self> {
        self.node().children.iter().map(|&c| self.at(c)).collect()
    }

    /// Siblings before this element, nearest first.
    #[must_use]
    pub fn preceding_siblings(&self) -> Vec<Self> {
        let Some(parent) = self.node().parent else {
            return Vec::new();
        };
        let siblings = &self.doc.nodes[parent].children;
        let position = siblings
            .iter()
            .position(|&s| s == self.index)
            .unwrap_or_default();
        siblings[..position]
            .iter()
            .rev()
            .map(|&s| self.at(s))
            .collect()
    }

    /// Every descendant in document order, excluding `self`.
    #[must_use]
    pub fn descendants(&self) -> Vec<Self> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.node().children.iter().rev().copied().collect();
        while let Some(index) = stack.pop() {
            stack.extend(self.doc.nodes[index].children.iter().rev());
            out.push(self.at(index));
        }
        out
    }

    /// The first element, `self` or a descendant, matching `selector`.
    ///
    /// Uses [`TestEngine`]; returns `None` for a selector it rejects.
    #[must_use]
    pub fn find(&self, selector: &str) -> Option<Self> {
        use selset::SelectorEngine;

        std::iter::once(self.clone())
            .chain(self.descendants())
            .find(|el| TestEngine.matches(el, selector).unwrap_or(false))
    }

    /// Short form like `div#foo.bar.baz`, used in fixtures and messages.
    #[must_use]
    pub fn describe(&self) -> String {
        let mut out = self.node().tag.clone();
        if let Some(id) = self.attr("id") {
            out.push('#');
            out.push_str(id);
        }
        for class in self.class_names() {
            out.push('.');
            out.push_str(class);
        }
        out
    }
}

impl PartialEq for TestElement {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.doc, &other.doc) && self.index == other.index
    }
}

impl Eq for TestElement {}

impl fmt::Debug for TestElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.describe())
    }
}

impl Element for TestElement {
    fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    fn class_names(&self) -> Vec<&str> {
        self.attr("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    fn tag_name(&self) -> &str {
        &self.node().tag
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{Document, LinearSelectorSet, NodeSpec, TestElement, TestEngine};
    pub use selset::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> TestElement {
        Document::build(
            NodeSpec::new("body")
                .child(
                    NodeSpec::new("ul")
                        .class("menu")
                        .child(NodeSpec::new("li").id("a"))
                        .child(NodeSpec::new("li").id("b").class("x").class("y")),
                )
                .child(NodeSpec::new("p").attr("lang", "en")),
        )
    }

    #[test]
    fn descendants_in_document_order() {
        let root = tree();
        let order: Vec<String> = root.descendants().iter().map(TestElement::describe).collect();
        assert_eq!(order, vec!["ul.menu", "li#a", "li#b.x.y", "p"]);
        assert_eq!(root.document().len(), 5);
    }

    #[test]
    fn element_facets() {
        let root = tree();
        let b = &root.descendants()[2];
        assert_eq!(b.id(), Some("b"));
        assert_eq!(b.class_names(), vec!["x", "y"]);
        assert_eq!(b.tag_name(), "li");
        assert_eq!(root.id(), None);
        assert!(root.class_names().is_empty());
    }

    #[test]
    fn navigation() {
        let root = tree();
        let all = root.descendants();
        let (ul, a, b) = (&all[0], &all[1], &all[2]);

        assert_eq!(b.parent().as_ref(), Some(ul));
        assert_eq!(b.preceding_siblings(), vec![a.clone()]);
        assert!(a.preceding_siblings().is_empty());
        assert!(root.parent().is_none());
        assert_eq!(ul.children(), vec![a.clone(), b.clone()]);
    }

    #[test]
    fn equality_is_identity() {
        let one = Document::build(NodeSpec::new("div"));
        let two = Document::build(NodeSpec::new("div"));
        assert_eq!(one, one.clone());
        assert_ne!(one, two);
    }

    #[test]
    fn find_includes_self() {
        let root = tree();
        assert_eq!(root.find("body"), Some(root.clone()));
        assert_eq!(root.find("#b").map(|e| e.describe()), Some("li#b.x.y".into()));
        assert_eq!(root.find("[lang=en]").map(|e| e.describe()), Some("p".into()));
        assert!(root.find("table").is_none());
    }
}
