//! Matcher for line-level regex and keyword rules.
//!
//! # Detection
//!
//! Every line is tested on its own. By default the masked code is used, so
//! text inside comments and string literals never matches; rules declared
//! with `match_on = "raw"` see the line as written. A line that also matches
//! the rule's `unless` counter-pattern is safe.
//!
//! A line yields at most one violation per rule. `#include` lines are not
//! code for this purpose: `#include <new>` names a header.

use guidelint_core::model::{Detection, MatchTarget, Pattern};
use guidelint_core::{FileContext, Matcher, MatcherError, Rule, Violation};

/// Matcher name for pattern and keyword rules.
pub const NAME: &str = "pattern";

/// Flags lines matching a forbidden pattern or keyword.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternMatcher;

impl PatternMatcher {
    /// Creates the matcher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Matcher for PatternMatcher {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Flags lines matching a forbidden pattern or keyword"
    }

    fn handles(&self, detection: &Detection) -> bool {
        matches!(
            detection,
            Detection::Pattern { .. } | Detection::Keywords { .. }
        )
    }

    fn check(&self, ctx: &FileContext<'_>, rule: &Rule) -> Result<Vec<Violation>, MatcherError> {
        let (pattern, unless, target) = match rule.detection() {
            Detection::Pattern {
                pattern,
                unless,
                target,
            } => (pattern, unless.as_ref(), *target),
            Detection::Keywords {
                matcher,
                unless,
                target,
                ..
            } => (matcher, unless.as_ref(), *target),
            other => {
                return Err(MatcherError::Unsupported {
                    matcher: NAME,
                    detection: other.kind(),
                })
            }
        };

        Ok(ctx
            .source
            .lines()
            .filter(|(_, raw, code)| {
                let text = match target {
                    MatchTarget::Code if is_include(code) => return false,
                    MatchTarget::Code => code,
                    MatchTarget::Raw => raw,
                };
                violates(text, pattern, unless)
            })
            .map(|(n, _, _)| ctx.violation(rule, n, None))
            .collect())
    }
}

fn violates(text: &str, pattern: &Pattern, unless: Option<&Pattern>) -> bool {
    pattern.is_match(text) && !unless.is_some_and(|u| u.is_match(text))
}

/// True for `#include` lines (masked code).
pub(crate) fn is_include(code: &str) -> bool {
    code.trim_start()
        .strip_prefix('#')
        .is_some_and(|rest| rest.trim_start().starts_with("include"))
}
