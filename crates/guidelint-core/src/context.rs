//! Context types for matcher execution.

use crate::model::{FileKind, Rule};
use crate::source::SourceFile;
use crate::types::{excerpt, Violation};
use std::path::Path;

/// Context provided to matchers for one file.
///
/// Holds the per-file lexical state; it lives only while that file's
/// matchers run.
#[derive(Debug, Clone, Copy)]
pub struct FileContext<'a> {
    /// Path as handed to the analyzer.
    pub path: &'a Path,
    /// Header or source.
    pub kind: FileKind,
    /// Lexical model of the file.
    pub source: &'a SourceFile,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(path: &'a Path, kind: FileKind, source: &'a SourceFile) -> Self {
        Self { path, kind, source }
    }

    /// Path rendered the way reports show it (`/`-separated).
    #[must_use]
    pub fn display_path(&self) -> String {
        display_path(self.path)
    }

    /// Builds a violation of `rule` at a 1-based line.
    ///
    /// Severity, description and category are copied from the rule. The
    /// rule's own suggestion wins over `detail`.
    #[must_use]
    pub fn violation(&self, rule: &Rule, line: usize, detail: Option<String>) -> Violation {
        let line = line.clamp(1, self.source.line_count().max(1));
        Violation {
            rule: rule.id().to_string(),
            description: rule.description().to_string(),
            file_path: self.display_path(),
            line_number: line,
            line_content: excerpt(self.source.raw_line(line)),
            severity: rule.severity(),
            suggestion: rule
                .suggestion()
                .map(String::from)
                .or(detail)
                .unwrap_or_default(),
            category: rule.category(),
        }
    }
}

/// Renders a path with `/` separators and without leading `./`.
#[must_use]
pub fn display_path(path: &Path) -> String {
    let s = path.to_string_lossy().replace('\\', "/");
    s.strip_prefix("./").map_or_else(|| s.clone(), String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Detection, RuleId, StructuralCheck};
    use crate::types::Severity;

    fn rule(suggestion: Option<&str>) -> Rule {
        Rule::new(
            RuleId::new("trailing_whitespace").unwrap(),
            Category::Formatting,
            "No trailing whitespace".to_string(),
            Severity::Info,
            Detection::Structural(StructuralCheck::TrailingWhitespace),
        )
        .with_suggestion(suggestion.map(String::from))
    }

    #[test]
    fn violation_copies_rule_fields() {
        let source = SourceFile::parse("int x;  \n");
        let ctx = FileContext::new(Path::new("./src/a.cpp"), FileKind::Source, &source);
        let v = ctx.violation(&rule(None), 1, Some("Remove it".into()));
        assert_eq!(v.rule, "trailing_whitespace");
        assert_eq!(v.file_path, "src/a.cpp");
        assert_eq!(v.line_content, "int x;");
        assert_eq!(v.severity, Severity::Info);
        assert_eq!(v.suggestion, "Remove it");
        assert_eq!(v.category, Category::Formatting);
    }

    #[test]
    fn rule_suggestion_wins_over_detail() {
        let source = SourceFile::parse("int x;\n");
        let ctx = FileContext::new(Path::new("a.cpp"), FileKind::Source, &source);
        let v = ctx.violation(&rule(Some("Configured")), 1, Some("Detail".into()));
        assert_eq!(v.suggestion, "Configured");
    }

    #[test]
    fn line_is_clamped_to_file() {
        let source = SourceFile::parse("a\nb\n");
        let ctx = FileContext::new(Path::new("a.cpp"), FileKind::Source, &source);
        assert_eq!(ctx.violation(&rule(None), 99, None).line_number, 2);
        assert_eq!(ctx.violation(&rule(None), 0, None).line_number, 1);
    }

    #[test]
    fn display_path_normalizes_separators() {
        assert_eq!(display_path(Path::new("./a/b.h")), "a/b.h");
        assert_eq!(display_path(Path::new("a\\b.h")), "a/b.h");
    }
}
