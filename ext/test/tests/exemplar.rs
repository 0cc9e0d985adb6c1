//! The indexed set must agree with the linear exemplar on every element.

use selset_test::prelude::*;

const RULES: &[&str] = &[
    "*",
    "div",
    "DIV",
    "#main",
    ".item",
    ".item.active",
    "li.item",
    "ul > li",
    "ul li.active",
    "li + li",
    "li ~ li.last",
    "#main .item, #side .item",
    "a[href]",
    "[data-role=tab]",
    r#"a[title="x, y"]"#,
    "section#main > ul#list",
    "nav a",
    "p, span",
    "",
    "   ",
    "body *",
    ".item",
];

fn page() -> TestElement {
    Document::build(
        NodeSpec::new("body")
            .child(
                NodeSpec::new("nav")
                    .child(NodeSpec::new("a").attr("href", "/").attr("title", "x, y"))
                    .child(NodeSpec::new("a").class("item")),
            )
            .child(
                NodeSpec::new("section").id("main").child(
                    NodeSpec::new("ul")
                        .id("list")
                        .child(NodeSpec::new("li").class("item"))
                        .child(NodeSpec::new("li").class("item").class("active"))
                        .child(NodeSpec::new("li").class("last").attr("data-role", "tab")),
                ),
            )
            .child(
                NodeSpec::new("div")
                    .id("side")
                    .child(NodeSpec::new("span").class("item"))
                    .child(NodeSpec::new("p")),
            ),
    )
}

fn build() -> (SelectorSet<TestElement, usize>, LinearSelectorSet<TestElement, usize>) {
    let mut indexed = SelectorSet::new(TestEngine);
    let mut linear = LinearSelectorSet::new(TestEngine);
    for (i, selector) in RULES.iter().enumerate() {
        indexed.add(*selector, i);
        linear.add(*selector, i);
    }
    (indexed, linear)
}

fn assert_agree(
    indexed: &SelectorSet<TestElement, usize>,
    linear: &LinearSelectorSet<TestElement, usize>,
    root: &TestElement,
) {
    assert_eq!(indexed.len(), linear.len());

    for element in std::iter::once(root.clone()).chain(root.descendants()) {
        let fast: Vec<usize> = indexed
            .matches(&element)
            .unwrap()
            .iter()
            .map(|r| *r.data())
            .collect();
        let slow: Vec<usize> = linear
            .matches(&element)
            .unwrap()
            .iter()
            .map(|(_, d)| **d)
            .collect();
        assert_eq!(fast, slow, "disagreement on {element:?}");
    }

    let fast: Vec<(usize, Vec<TestElement>)> = indexed
        .query_all(root)
        .unwrap()
        .into_iter()
        .map(|m| (*m.rule.data(), m.elements))
        .collect();
    let slow: Vec<(usize, Vec<TestElement>)> = linear
        .query_all(root)
        .unwrap()
        .into_iter()
        .map(|(_, d, elements)| (*d, elements))
        .collect();
    assert_eq!(fast, slow);
}

#[test]
fn indexed_matches_linear() {
    let (indexed, linear) = build();
    assert_agree(&indexed, &linear, &page());
}

#[test]
fn agreement_survives_removals() {
    let (mut indexed, mut linear) = build();
    let root = page();

    for selector in [".item", "#main", "ul > li", "", "nope", ".item"] {
        assert_eq!(
            indexed.remove(selector).is_some(),
            linear.remove(selector),
            "remove({selector:?})"
        );
        assert_agree(&indexed, &linear, &root);
    }

    assert_eq!(
        indexed.remove_with_data("div", &1).is_some(),
        linear.remove_with_data("div", &1)
    );
    assert_eq!(
        indexed.remove_with_data("DIV", &0).is_some(),
        linear.remove_with_data("DIV", &0)
    );
    assert_agree(&indexed, &linear, &root);
}

#[test]
fn every_indexed_rule_is_reachable() {
    let (indexed, _) = build();
    let root = page();

    let mut reached = std::collections::BTreeSet::new();
    for element in std::iter::once(root.clone()).chain(root.descendants()) {
        for rule in indexed.matches(&element).unwrap() {
            reached.insert(rule.id());
        }
    }

    // Every rule with at least one group matches something in the page.
    let expected: std::collections::BTreeSet<RuleId> = indexed
        .rules()
        .filter(|r| !r.selector().trim().is_empty())
        .map(Rule::id)
        .collect();
    assert_eq!(reached, expected);
}
