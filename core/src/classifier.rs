//! `Classifier` — Pluggable index key extraction
//!
//! A classifier maps the last token of a selector group to an index key, and
//! an element to the keys it should be looked up under. The two sides must
//! agree: a rule indexed under key `k` is only found by elements yielding `k`.
//!
//! # Built-in order
//!
//! 1. [`IdClassifier`] — `#name` → `name`
//! 2. [`ClassClassifier`] — first `.name` → `name`
//! 3. [`TagClassifier`] — leading `name` → `NAME`
//! 4. [`UniversalClassifier`] — anything → [`UNIVERSAL_KEY`] (always last)

use crate::Element;
use regex::Regex;
use std::borrow::Cow;
use std::fmt::Debug;
use std::sync::LazyLock;

/// Key of the single posting list behind [`UniversalClassifier`].
pub const UNIVERSAL_KEY: &str = "*";

// A name is word characters, U+00C0..U+FFFF, hyphens, or CSS escapes. Hex
// escapes are tried first so they can absorb their terminating whitespace.
static ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"#((?:[\w\x{00C0}-\x{FFFF}-]|\\[0-9a-fA-F]{1,6}[ \t\r\n\x0C]?|\\.)+)")
});
static CLASS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\.((?:[\w\x{00C0}-\x{FFFF}-]|\\[0-9a-fA-F]{1,6}[ \t\r\n\x0C]?|\\.)+)")
});
static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^((?:[\w\x{00C0}-\x{FFFF}-]|\\[0-9a-fA-F]{1,6}[ \t\r\n\x0C]?|\\.)+)")
});

fn compile(pattern: &str) -> Regex {
    // Constant patterns; exercised by every test in this module.
    Regex::new(pattern).expect("built-in classifier pattern is valid")
}

/// Extracts index keys from selector tokens and from elements.
///
/// Implementations must be cheap and deterministic. A classifier that
/// returns `Some` from [`selector_key`](Self::selector_key) claims the group;
/// later classifiers are not consulted.
///
/// # Example
///
/// ```
/// use selset::{Classifier, Element};
/// use std::borrow::Cow;
///
/// /// Index `[data-role=...]`-style tokens written as `@role`.
/// #[derive(Debug)]
/// struct RoleClassifier;
///
/// impl Classifier for RoleClassifier {
///     fn name(&self) -> &'static str {
///         "role"
///     }
///
///     fn selector_key(&self, token: &str) -> Option<String> {
///         token.strip_prefix('@').map(str::to_owned)
///     }
///
///     fn element_keys<'e>(&self, element: &'e dyn Element) -> Vec<Cow<'e, str>> {
///         element.class_names().into_iter().map(Cow::Borrowed).collect()
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Classifier`",
    label = "this type cannot produce index keys",
    note = "a Classifier needs a name, a selector-side key and element-side keys"
)]
pub trait Classifier: Send + Sync + Debug {
    /// Stable name of the index this classifier feeds (used in traces and logs).
    fn name(&self) -> &'static str;

    /// The key for a bare selector token, or `None` to pass the token on.
    ///
    /// The token has already had its bracketed, parenthesized and quoted spans
    /// removed (see [`bare_token`](crate::bare_token)).
    fn selector_key(&self, token: &str) -> Option<String>;

    /// Every key `element` should be looked up under.
    fn element_keys<'e>(&self, element: &'e dyn Element) -> Vec<Cow<'e, str>>;
}

/// Keys `#name` tokens by `name`; elements by their id.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdClassifier;

impl Classifier for IdClassifier {
    fn name(&self) -> &'static str {
        "id"
    }

    fn selector_key(&self, token: &str) -> Option<String> {
        let caps = ID_PATTERN.captures(token)?;
        Some(unescape(&caps[1]).into_owned())
    }

    fn element_keys<'e>(&self, element: &'e dyn Element) -> Vec<Cow<'e, str>> {
        element.id().map(Cow::Borrowed).into_iter().collect()
    }
}

/// Keys `.name` tokens by their first class; elements by every class.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassClassifier;

impl Classifier for ClassClassifier {
    fn name(&self) -> &'static str {
        "class"
    }

    fn selector_key(&self, token: &str) -> Option<String> {
        let caps = CLASS_PATTERN.captures(token)?;
        Some(unescape(&caps[1]).into_owned())
    }

    fn element_keys<'e>(&self, element: &'e dyn Element) -> Vec<Cow<'e, str>> {
        element
            .class_names()
            .into_iter()
            .map(Cow::Borrowed)
            .collect()
    }
}

/// Keys tokens starting with a tag name by the upper-cased name.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagClassifier;

impl Classifier for TagClassifier {
    fn name(&self) -> &'static str {
        "tag"
    }

    fn selector_key(&self, token: &str) -> Option<String> {
        let name = TAG_PATTERN.captures(token)?.get(1)?;
        // `ns|tag`: the leading name is a namespace prefix, not the tag.
        if token[name.end()..].starts_with('|') {
            return None;
        }
        Some(unescape(name.as_str()).to_uppercase())
    }

    fn element_keys<'e>(&self, element: &'e dyn Element) -> Vec<Cow<'e, str>> {
        vec![Cow::Owned(element.tag_name().to_uppercase())]
    }
}

/// Catch-all: every token and every element maps to [`UNIVERSAL_KEY`].
///
/// Always consulted last, so every non-empty group is indexed somewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniversalClassifier;

impl Classifier for UniversalClassifier {
    fn name(&self) -> &'static str {
        "universal"
    }

    fn selector_key(&self, _token: &str) -> Option<String> {
        Some(UNIVERSAL_KEY.to_owned())
    }

    fn element_keys<'e>(&self, _element: &'e dyn Element) -> Vec<Cow<'e, str>> {
        vec![Cow::Borrowed(UNIVERSAL_KEY)]
    }
}

/// The built-in classifiers in priority order, without the universal fallback.
#[must_use]
pub fn default_classifiers() -> Vec<Box<dyn Classifier>> {
    vec![
        Box::new(IdClassifier),
        Box::new(ClassClassifier),
        Box::new(TagClassifier),
    ]
}

/// Decode CSS escapes in an identifier: `\:` → `:`, `\31 ` → `1`.
fn unescape(name: &str) -> Cow<'_, str> {
    if !name.contains('\\') {
        return Cow::Borrowed(name);
    }

    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let mut code = 0u32;
        let mut digits = 0;
        while digits < 6 {
            let Some(d) = chars.peek().and_then(|c| c.to_digit(16)) else {
                break;
            };
            code = code * 16 + d;
            digits += 1;
            chars.next();
        }

        if digits == 0 {
            if let Some(next) = chars.next() {
                out.push(next);
            }
            continue;
        }

        if chars.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            chars.next();
        }
        let decoded = char::from_u32(code).filter(|&c| c != '\0');
        out.push(decoded.unwrap_or(char::REPLACEMENT_CHARACTER));
    }

    Cow::Owned(out)
}
