//! Matcher for per-line layout rules.
//!
//! These look at raw text and never at brace structure, so they run on
//! files whose braces do not balance.

use crate::pattern::is_include;
use guidelint_core::model::{Detection, StructuralCheck};
use guidelint_core::{FileContext, Matcher, MatcherError, Rule, Violation};

/// Matcher name for formatting rules.
pub const NAME: &str = "formatting";

/// Line length, trailing whitespace and tab indentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormattingMatcher;

impl FormattingMatcher {
    /// Creates the matcher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Matcher for FormattingMatcher {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Line length, trailing whitespace and tab indentation"
    }

    fn handles(&self, detection: &Detection) -> bool {
        matches!(
            detection,
            Detection::Structural(
                StructuralCheck::LineLength { .. }
                    | StructuralCheck::TrailingWhitespace
                    | StructuralCheck::TabIndentation
            )
        )
    }

    fn check(&self, ctx: &FileContext<'_>, rule: &Rule) -> Result<Vec<Violation>, MatcherError> {
        let check = match rule.detection() {
            Detection::Structural(
                check @ (StructuralCheck::LineLength { .. }
                | StructuralCheck::TrailingWhitespace
                | StructuralCheck::TabIndentation),
            ) => *check,
            other => {
                return Err(MatcherError::Unsupported {
                    matcher: NAME,
                    detection: other.kind(),
                })
            }
        };

        let mut violations = Vec::new();
        for (n, raw, code) in ctx.source.lines() {
            let detail = match check {
                StructuralCheck::LineLength { max } => {
                    let length = raw.chars().count();
                    let exempt =
                        ctx.source.is_comment_only(n) || is_include(code) || has_url(raw);
                    if length <= max || exempt {
                        continue;
                    }
                    Some(format!("Line is {length} characters (limit {max})"))
                }
                StructuralCheck::TrailingWhitespace => {
                    if raw.trim().is_empty() || !raw.ends_with([' ', '\t']) {
                        continue;
                    }
                    None
                }
                // tab_indentation
                _ => {
                    let indent = &raw[..raw.len() - raw.trim_start().len()];
                    if !indent.contains('\t') {
                        continue;
                    }
                    None
                }
            };
            violations.push(ctx.violation(rule, n, detail));
        }
        Ok(violations)
    }
}

fn has_url(raw: &str) -> bool {
    raw.contains("http://") || raw.contains("https://")
}
