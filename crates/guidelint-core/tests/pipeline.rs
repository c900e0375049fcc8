//! Integration test: rule document → model → scope → analyzer → report.
//!
//! Uses a small keyword matcher defined here so the engine is exercised
//! without the built-in matcher crate.

use guidelint_core::model::{Detection, DocumentFormat, FileKind};
use guidelint_core::report::{render, ReportFormat};
use guidelint_core::scope::DiffTarget;
use guidelint_core::{
    compute_scope, load_rules, AnalysisResult, Analyzer, ConfigError, FileContext, Matcher,
    MatcherError, Rule, RuleSource, ScopeError, ScopeMode, Severity, VersionControl, Violation,
};
use std::path::Path;

const DOCUMENT: &str = r#"
base = "empty"

[[rule]]
id = "no_goto"
category = "best_practice"
description = "Avoid goto"
severity = "warning"
keywords = ["goto"]
suggestion = "Use structured control flow"
"#;

const SOURCE: &str = "\
void Retry() {
  goto start;
start:
  goto done;
done:
  return;
}
";

/// Flags lines containing one of the rule's keywords.
struct Keywords;

impl Matcher for Keywords {
    fn name(&self) -> &'static str {
        "keywords"
    }

    fn handles(&self, detection: &Detection) -> bool {
        matches!(detection, Detection::Keywords { .. })
    }

    fn check(&self, ctx: &FileContext<'_>, rule: &Rule) -> Result<Vec<Violation>, MatcherError> {
        let Detection::Keywords { matcher, .. } = rule.detection() else {
            return Err(MatcherError::Unsupported {
                matcher: "keywords",
                detection: rule.detection().kind(),
            });
        };
        Ok(ctx
            .source
            .lines()
            .filter(|(_, _, code)| matcher.is_match(code))
            .map(|(n, _, _)| ctx.violation(rule, n, None))
            .collect())
    }
}

struct FakeGit(&'static str);

impl VersionControl for FakeGit {
    fn diff(&self, target: DiffTarget<'_>) -> Result<String, ScopeError> {
        match target {
            DiffTarget::Ref("main") | DiffTarget::Staged => Ok(self.0.to_string()),
            other => Err(ScopeError::Resolution {
                reference: other.to_string(),
                message: "unknown revision".to_string(),
            }),
        }
    }
}

fn model() -> guidelint_core::RuleModel {
    load_rules(RuleSource::Document {
        content: DOCUMENT,
        format: DocumentFormat::Toml,
    })
    .unwrap()
}

#[test]
fn document_rules_run_unscoped() {
    let analyzer = Analyzer::builder()
        .model(model())
        .matcher(Keywords)
        .build()
        .unwrap();

    let violations = analyzer.analyze_source(Path::new("src/retry.cpp"), FileKind::Source, SOURCE);
    let lines: Vec<usize> = violations.iter().map(|v| v.line_number).collect();
    assert_eq!(lines, vec![2, 4]);
    assert_eq!(violations[0].severity, Severity::Warning);
    assert_eq!(violations[0].suggestion, "Use structured control flow");
    assert_eq!(violations[0].line_content, "goto start;");
}

#[test]
fn diff_scope_keeps_added_lines_only() {
    let diff = "\
diff --git a/src/retry.cpp b/src/retry.cpp
--- a/src/retry.cpp
+++ b/src/retry.cpp
@@ -3,0 +4,2 @@ start:
+  goto done;
+done:
";
    let scope = compute_scope(&ScopeMode::DiffAgainst("main".into()), &FakeGit(diff)).unwrap();
    let analyzer = Analyzer::builder()
        .model(model())
        .matcher(Keywords)
        .scope(scope)
        .build()
        .unwrap();

    let violations = analyzer.analyze_source(Path::new("src/retry.cpp"), FileKind::Source, SOURCE);
    let lines: Vec<usize> = violations.iter().map(|v| v.line_number).collect();
    assert_eq!(lines, vec![4]);

    let elsewhere = analyzer.analyze_source(Path::new("src/other.cpp"), FileKind::Source, SOURCE);
    assert!(elsewhere.is_empty());
}

#[test]
fn unknown_reference_is_a_scope_error() {
    let err = compute_scope(&ScopeMode::DiffAgainst("nope".into()), &FakeGit("")).unwrap_err();
    assert!(matches!(err, ScopeError::Resolution { ref reference, .. } if reference == "nope"));
}

#[test]
fn rule_without_matcher_becomes_a_note() {
    let analyzer = Analyzer::builder().model(model()).build().unwrap();
    let violations = analyzer.analyze_source(Path::new("src/retry.cpp"), FileKind::Source, SOURCE);

    assert_eq!(violations.len(), 1);
    let note = &violations[0];
    assert_eq!(note.rule, "matcher_failure");
    assert_eq!(note.severity, Severity::Info);
    assert_eq!(note.line_number, 1);
    assert_eq!(
        note.suggestion,
        "Rule 'no_goto' skipped: no matcher for keywords rules"
    );
}

#[test]
fn invalid_document_fails_before_scanning() {
    let doc = r#"
[[rule]]
id = "broken"
category = "naming"
description = "Broken pattern"
severity = "warning"
construct = "class"
pattern = "(unclosed"
"#;
    let err = load_rules(RuleSource::Document {
        content: doc,
        format: DocumentFormat::Toml,
    })
    .unwrap_err();
    assert!(matches!(err, ConfigError::Rules(_)), "{err}");
}

#[test]
fn reports_render_from_the_same_result() {
    let analyzer = Analyzer::builder()
        .model(model())
        .matcher(Keywords)
        .build()
        .unwrap();
    let violations = analyzer.analyze_source(Path::new("src/retry.cpp"), FileKind::Source, SOURCE);
    let result = AnalysisResult::new(violations, 1);

    let compact = render(&result, ReportFormat::Compact).unwrap();
    insta::assert_snapshot!(compact.lines().next().unwrap(), @"src/retry.cpp:2: warning [no_goto] Avoid goto");

    let markdown = render(&result, ReportFormat::Markdown).unwrap();
    assert!(markdown.contains("⚠️ Review required"));

    let text = render(&result, ReportFormat::Text).unwrap();
    assert!(text.contains("  WARNING line 4: Avoid goto"));
}
