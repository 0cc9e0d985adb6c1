//! Group splitting — comma groups, simple-selector tokens, bare tokens
//!
//! All three functions share one byte scanner. Parenthesized, bracketed and
//! quoted spans are opaque, as are backslash escapes (including CSS hex
//! escapes and their terminating whitespace). Delimiters are ASCII, so every
//! split point is a char boundary.
//!
//! # Malformed input
//!
//! The scan is a single pass and always terminates. An unclosed span swallows
//! the rest of the input; a stray `)` or `]` outside any span is dropped.

/// One comma-separated alternative of a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Group<'a> {
    /// The alternative's text, trimmed.
    pub text: &'a str,
    /// `true` for the final alternative of the selector.
    pub is_last: bool,
}

impl<'a> Group<'a> {
    /// The rightmost simple-selector token of this group.
    #[must_use]
    pub fn last_token(&self) -> Option<&'a str> {
        last_simple_token(self.text)
    }
}

/// Split a selector into its top-level comma groups.
///
/// Empty groups (from `"a,,b"` or a trailing comma) are skipped.
///
/// ```
/// use selset::split_groups;
///
/// let groups = split_groups("a[title='x, y'], :is(b, c) ,d");
/// let texts: Vec<_> = groups.iter().map(|g| g.text).collect();
/// assert_eq!(texts, vec!["a[title='x, y']", ":is(b, c)", "d"]);
/// assert!(groups[2].is_last);
/// ```
#[must_use]
pub fn split_groups(selector: &str) -> Vec<Group<'_>> {
    let mut groups = Vec::new();
    let mut scan = Scan::default();
    let mut start = 0;

    for (i, b) in selector.bytes().enumerate() {
        if scan.step(b) == Position::Top && b == b',' {
            push_group(&mut groups, &selector[start..i]);
            start = i + 1;
        }
    }
    push_group(&mut groups, &selector[start..]);

    if let Some(last) = groups.last_mut() {
        last.is_last = true;
    }
    groups
}

/// Split one group into simple-selector tokens.
///
/// Whitespace and the combinators `>`, `+`, `~` separate tokens; the
/// combinators themselves are dropped.
///
/// ```
/// use selset::tokens;
///
/// assert_eq!(tokens("ul > li.item+a[rel~=x]"), vec!["ul", "li.item", "a[rel~=x]"]);
/// ```
#[must_use]
pub fn tokens(group: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut scan = Scan::default();
    let mut start = 0;

    for (i, b) in group.bytes().enumerate() {
        if scan.step(b) == Position::Top && is_boundary(b) {
            push_token(&mut out, &group[start..i]);
            start = i + 1;
        }
    }
    push_token(&mut out, &group[start..]);
    out
}

/// The final simple-selector token of a group, if any.
#[must_use]
pub fn last_simple_token(group: &str) -> Option<&str> {
    tokens(group).pop()
}

/// A token with its opaque spans removed.
///
/// Classification runs on this form, so text inside attribute tests or
/// pseudo-class arguments never reads as an id, class or tag.
///
/// ```
/// use selset::bare_token;
///
/// assert_eq!(bare_token(r##"a[href="#top"]:not(.x)"##), "a:not");
/// assert_eq!(bare_token(r"#a\:b"), r"#a\:b");
/// ```
#[must_use]
pub fn bare_token(token: &str) -> String {
    let mut scan = Scan::default();
    let kept: Vec<u8> = token
        .bytes()
        .filter(|&b| scan.step(b) != Position::Opaque)
        .collect();
    // Opaque spans are delimited by ASCII bytes, so whole characters are kept or dropped.
    String::from_utf8_lossy(&kept).into_owned()
}

/// Whether the scan of `selector` ends outside every span and escape.
///
/// Only such a selector can be joined into a selector list without
/// swallowing the alternatives that follow it.
///
/// ```
/// use selset::is_self_contained;
///
/// assert!(is_self_contained("a[title='x'], #b"));
/// assert!(!is_self_contained("a[title='x"));
/// assert!(!is_self_contained(r"#foo\"));
/// ```
#[must_use]
pub fn is_self_contained(selector: &str) -> bool {
    let mut scan = Scan::default();
    for b in selector.bytes() {
        scan.step(b);
    }
    !scan.is_open() && scan.escape != Escape::Start
}

fn push_group<'a>(groups: &mut Vec<Group<'a>>, text: &'a str) {
    let text = text.trim();
    if !text.is_empty() {
        groups.push(Group {
            text,
            is_last: false,
        });
    }
}

fn push_token<'a>(tokens: &mut Vec<&'a str>, text: &'a str) {
    if !text.is_empty() {
        tokens.push(text);
    }
}

fn is_boundary(b: u8) -> bool {
    matches!(b, b'>' | b'+' | b'~') || b.is_ascii_whitespace()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Scanner
// ═══════════════════════════════════════════════════════════════════════════════

/// Where a byte sits relative to the opaque spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    /// Plain top-level byte: a candidate split point.
    Top,
    /// Part of a top-level escape sequence: kept, never split on.
    Escaped,
    /// Inside (or delimiting) a quoted, bracketed or parenthesized span.
    Opaque,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Escape {
    #[default]
    None,
    /// Just saw a backslash.
    Start,
    /// Inside a hex escape, with this many digits so far.
    Hex(u8),
}

#[derive(Debug, Default)]
struct Scan {
    parens: usize,
    brackets: usize,
    quote: Option<u8>,
    escape: Escape,
}

impl Scan {
    fn is_open(&self) -> bool {
        self.parens > 0 || self.brackets > 0 || self.quote.is_some()
    }

    fn escaped(&self) -> Position {
        if self.is_open() {
            Position::Opaque
        } else {
            Position::Escaped
        }
    }

    fn step(&mut self, b: u8) -> Position {
        match self.escape {
            Escape::Start => {
                self.escape = if b.is_ascii_hexdigit() {
                    Escape::Hex(1)
                } else {
                    Escape::None
                };
                return self.escaped();
            }
            Escape::Hex(n) => {
                if b.is_ascii_hexdigit() && n < 6 {
                    self.escape = Escape::Hex(n + 1);
                    return self.escaped();
                }
                self.escape = Escape::None;
                if b.is_ascii_whitespace() {
                    return self.escaped();
                }
            }
            Escape::None => {}
        }

        if b == b'\\' {
            self.escape = Escape::Start;
            return self.escaped();
        }

        if let Some(q) = self.quote {
            if b == q {
                self.quote = None;
            }
            return Position::Opaque;
        }

        match b {
            b'"' | b'\'' => {
                self.quote = Some(b);
                Position::Opaque
            }
            b'(' => {
                self.parens += 1;
                Position::Opaque
            }
            b'[' => {
                self.brackets += 1;
                Position::Opaque
            }
            b')' => {
                self.parens = self.parens.saturating_sub(1);
                Position::Opaque
            }
            b']' => {
                self.brackets = self.brackets.saturating_sub(1);
                Position::Opaque
            }
            _ if self.is_open() => Position::Opaque,
            _ => Position::Top,
        }
    }
}
