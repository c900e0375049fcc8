//! Matcher trait: turns a file plus a rule into violations.

use crate::context::FileContext;
use crate::model::{Detection, Rule};
use crate::types::Violation;

/// A per-file checker for one family of detections.
///
/// A matcher is stateless: everything it needs for a file arrives through
/// [`FileContext`], and it never mutates shared state, so the analyzer can
/// run files in parallel.
///
/// # Example
///
/// ```ignore
/// use guidelint_core::{FileContext, Matcher, MatcherError, Rule, Violation};
/// use guidelint_core::model::{Detection, StructuralCheck};
///
/// pub struct EmptyFile;
///
/// impl Matcher for EmptyFile {
///     fn name(&self) -> &'static str { "empty-file" }
///
///     fn handles(&self, detection: &Detection) -> bool {
///         matches!(detection, Detection::Structural(StructuralCheck::IncludeGuard))
///     }
///
///     fn check(&self, ctx: &FileContext<'_>, rule: &Rule) -> Result<Vec<Violation>, MatcherError> {
///         if ctx.source.line_count() == 0 {
///             return Ok(vec![ctx.violation(rule, 1, None)]);
///         }
///         Ok(vec![])
///     }
/// }
/// ```
pub trait Matcher: Send + Sync {
    /// Returns the kebab-case name of this matcher (e.g., "naming").
    fn name(&self) -> &'static str;

    /// Returns a brief description of what this matcher checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Whether this matcher evaluates rules with the given detection.
    fn handles(&self, detection: &Detection) -> bool;

    /// Checks one file against one rule.
    ///
    /// # Errors
    ///
    /// Returns [`MatcherError`] when the file cannot be evaluated for this
    /// rule. The analyzer records that as a note and continues.
    fn check(&self, ctx: &FileContext<'_>, rule: &Rule) -> Result<Vec<Violation>, MatcherError>;
}

/// Type alias for boxed Matcher trait objects.
pub type MatcherBox = Box<dyn Matcher>;

/// A rule could not be evaluated for a file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatcherError {
    /// Braces do not balance, so block extents are unknown.
    #[error("unbalanced braces near line {line}")]
    Unbalanced {
        /// First line where balance was lost.
        line: usize,
    },

    /// The matcher was handed a detection it does not evaluate.
    #[error("matcher `{matcher}` cannot evaluate {detection} rules")]
    Unsupported {
        /// Matcher name.
        matcher: &'static str,
        /// Detection kind.
        detection: &'static str,
    },
}
