//! Helpers shared by the matcher unit tests.

use guidelint_core::model::FileKind;
use guidelint_core::{FileContext, Matcher, Rule, RuleModel, SourceFile, Violation};
use std::path::Path;

/// Runs one built-in rule through `matcher` over `src`.
pub(crate) fn run(matcher: &dyn Matcher, rule_id: &str, path: &str, src: &str) -> Vec<Violation> {
    let model = RuleModel::builtin().unwrap();
    let rule = model.get(rule_id).unwrap();
    run_rule(matcher, rule, path, src)
}

/// Runs an arbitrary rule through `matcher` over `src`.
pub(crate) fn run_rule(matcher: &dyn Matcher, rule: &Rule, path: &str, src: &str) -> Vec<Violation> {
    let source = SourceFile::parse(src);
    let kind = if path.ends_with(".h") || path.ends_with(".hpp") {
        FileKind::Header
    } else {
        FileKind::Source
    };
    let ctx = FileContext::new(Path::new(path), kind, &source);
    assert!(matcher.handles(rule.detection()));
    matcher.check(&ctx, rule).unwrap()
}

/// Line numbers of the violations, in emission order.
pub(crate) fn lines(violations: &[Violation]) -> Vec<usize> {
    violations.iter().map(|v| v.line_number).collect()
}
