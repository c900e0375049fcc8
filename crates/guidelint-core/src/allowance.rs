//! Comment-based allowance directives.
//!
//! Supports directives like:
//! ```text
//! // guidelint: allow(smart_pointers) reason="ownership passed to C API"
//! ```
//!
//! A directive covers its own line and the line below it.

use crate::source::SourceFile;
use std::collections::{BTreeMap, HashSet};

/// Rule name that matches every rule.
const ALLOW_ALL: &str = "all";

/// Result of checking for allow directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowCheck {
    /// Rule is not allowed.
    Denied,
    /// Rule is allowed with optional reason.
    Allowed {
        /// The reason provided (if any).
        reason: Option<String>,
    },
}

impl AllowCheck {
    /// Returns true if allowed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Returns the reason if allowed.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed { reason } => reason.as_deref(),
            Self::Denied => None,
        }
    }
}

/// Parsed allowance directive.
#[derive(Debug, Clone)]
pub struct AllowDirective {
    /// Rule names that are allowed.
    pub rules: HashSet<String>,
    /// Optional reason for the allowance.
    pub reason: Option<String>,
}

impl AllowDirective {
    fn covers(&self, rule: &str) -> bool {
        self.rules.contains(rule) || self.rules.contains(ALLOW_ALL)
    }
}

/// All directives of one file, keyed by the line they are written on.
#[derive(Debug, Clone, Default)]
pub struct Allowances {
    directives: BTreeMap<usize, AllowDirective>,
}

impl Allowances {
    /// Collects the directives written in `source` comments.
    #[must_use]
    pub fn scan(source: &SourceFile) -> Self {
        let directives = source
            .lines()
            .filter_map(|(n, raw, code)| {
                line_comment(raw, code)
                    .and_then(parse_allow_directive)
                    .map(|d| (n, d))
            })
            .collect();
        Self { directives }
    }

    /// Returns true if the file has no directives.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Checks whether `rule` is allowed at a 1-based line.
    #[must_use]
    pub fn check(&self, line: usize, rule: &str) -> AllowCheck {
        for check_line in [line, line.saturating_sub(1)] {
            if check_line == 0 {
                continue;
            }
            if let Some(directive) = self.directives.get(&check_line) {
                if directive.covers(rule) {
                    return AllowCheck::Allowed {
                        reason: directive.reason.clone(),
                    };
                }
            }
        }
        AllowCheck::Denied
    }
}

/// Returns the text after the `//` that starts a line comment, if any.
///
/// `code` is the masked line: a real comment leaves nothing but blanks
/// from its `//` onwards, while a `//` inside a string literal is followed
/// by the literal's closing quote.
fn line_comment<'a>(raw: &'a str, code: &str) -> Option<&'a str> {
    raw.match_indices("//").find_map(|(byte, _)| {
        let column = raw[..byte].chars().count();
        let rest_is_blank = code.chars().skip(column).all(char::is_whitespace);
        rest_is_blank.then(|| &raw[byte + 2..])
    })
}

/// Parses an allowance directive from comment text (after `//`).
fn parse_allow_directive(comment: &str) -> Option<AllowDirective> {
    let comment = comment.trim_start_matches(['/', '!']).trim();

    let directive = comment.strip_prefix("guidelint:")?.trim();
    let allow_content = directive.strip_prefix("allow(")?.trim();

    let paren_end = allow_content.find(')')?;
    let rules: HashSet<String> = allow_content[..paren_end]
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if rules.is_empty() {
        return None;
    }

    let rest = allow_content[paren_end + 1..].trim();
    let reason = rest
        .strip_prefix("reason=")
        .map(str::trim)
        .and_then(|r| r.strip_prefix('"'))
        .and_then(|r| r.find('"').map(|end| r[..end].to_string()));

    Some(AllowDirective { rules, reason })
}
