//! # guidelint-rules
//!
//! Built-in matchers for guidelint.
//!
//! Rules themselves are data (see `guidelint_core::model`); a matcher is the
//! code that evaluates one family of rule detections against a file.
//!
//! ## Available Matchers
//!
//! | Name | Detections | Checks |
//! |------|------------|--------|
//! | `naming` | `construct` + `pattern` | Class, function, variable, member, constant, global and namespace casing |
//! | `pattern` | `pattern`, `keywords` | Forbidden regexes and whole-word keywords per line, with `unless` counter-patterns |
//! | `structure` | `check` | Include guards, function length and parameters, Doxygen comments, explicit constructors |
//! | `formatting` | `check` | Line length, trailing whitespace, tab indentation |
//!
//! ## Usage
//!
//! ```ignore
//! use guidelint_core::Analyzer;
//!
//! let analyzer = Analyzer::builder()
//!     .matchers(guidelint_rules::default_matchers())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod decl;
mod formatting;
mod naming;
mod pattern;
mod structure;

#[cfg(test)]
mod test_support;

pub use formatting::FormattingMatcher;
pub use naming::NamingMatcher;
pub use pattern::PatternMatcher;
pub use structure::StructureMatcher;

/// Re-export core types for convenience.
pub use guidelint_core::{Matcher, MatcherBox, Severity, Violation};

/// Every built-in matcher. Together they handle every detection a rule
/// document can declare.
#[must_use]
pub fn default_matchers() -> Vec<MatcherBox> {
    vec![
        Box::new(NamingMatcher::new()),
        Box::new(PatternMatcher::new()),
        Box::new(StructureMatcher::new()),
        Box::new(FormattingMatcher::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use guidelint_core::RuleModel;

    #[test]
    fn every_builtin_rule_has_exactly_one_matcher() {
        let model = RuleModel::builtin().unwrap();
        let matchers = default_matchers();
        for rule in model.iter() {
            let handlers = matchers
                .iter()
                .filter(|m| m.handles(rule.detection()))
                .count();
            let expected = usize::from(!matches!(
                rule.detection(),
                guidelint_core::model::Detection::Structural(c) if c.is_engine_note()
            ));
            assert_eq!(handlers, expected, "{}", rule.id());
        }
    }

    #[test]
    fn matcher_names_are_unique() {
        let mut names: Vec<_> = default_matchers().iter().map(|m| m.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names, vec!["formatting", "naming", "pattern", "structure"]);
    }
}
