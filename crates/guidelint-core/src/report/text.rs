//! Plain text report, grouped by file.

use super::group_by_file;
use crate::types::{AnalysisResult, Severity};
use std::fmt::Write;

const TITLE: &str = "C/C++ Guideline Report";

/// Renders the human-readable report.
#[must_use]
pub fn render_text(result: &AnalysisResult) -> String {
    if result.violations.is_empty() {
        return format!(
            "No guideline violations found ({} files analyzed).\n",
            result.files_analyzed
        );
    }

    let s = &result.summary;
    let mut out = String::new();
    let _ = writeln!(out, "{TITLE}");
    let _ = writeln!(out, "{}", "=".repeat(TITLE.len()));
    let _ = writeln!(out);
    let _ = writeln!(out, "Summary:");
    let _ = writeln!(out, "  Errors:   {}", s.errors);
    let _ = writeln!(out, "  Warnings: {}", s.warnings);
    let _ = writeln!(out, "  Info:     {}", s.info);
    let _ = writeln!(out, "  Total:    {}", s.total_violations);
    let _ = writeln!(out, "  Files:    {}", result.files_analyzed);

    for (path, violations) in group_by_file(&result.violations) {
        let _ = writeln!(out);
        let _ = writeln!(out, "{path}");
        let _ = writeln!(out, "{}", "-".repeat(path.chars().count()));
        for v in violations {
            let _ = writeln!(
                out,
                "  {} line {}: {}",
                label(v.severity),
                v.line_number,
                v.description
            );
            if !v.line_content.is_empty() {
                let _ = writeln!(out, "    code: {}", v.line_content);
            }
            if !v.suggestion.is_empty() {
                let _ = writeln!(out, "    hint: {}", v.suggestion);
            }
        }
    }
    out
}

fn label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "ERROR",
        Severity::Warning => "WARNING",
        Severity::Info => "INFO",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures;

    #[test]
    fn empty_result_is_one_line() {
        let out = render_text(&AnalysisResult::new(Vec::new(), 2));
        insta::assert_snapshot!(out.trim_end(), @"No guideline violations found (2 files analyzed).");
    }

    #[test]
    fn summary_then_files() {
        let out = render_text(&fixtures::sample());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], TITLE);
        assert!(lines.contains(&"  Errors:   1"));
        assert!(lines.contains(&"  Files:    3"));

        let header = lines.iter().position(|l| *l == "src/a.cpp").unwrap();
        assert_eq!(lines[header + 1], "---------");
        assert_eq!(lines[header + 2], "  WARNING line 4: class_names description");
        assert_eq!(lines[header + 3], "    code: class myClass {");
        assert_eq!(lines[header + 4], "    hint: fix class_names");
        assert!(out.find("inc/a.h").unwrap() < out.find("src/a.cpp").unwrap());
    }
}
