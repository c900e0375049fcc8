//! Markdown fragment for a pull-request comment.

use super::group_by_file;
use crate::model::Category;
use crate::types::{AnalysisResult, Severity, Violation};
use std::fmt::Write;

/// Files listed in the details block.
const MAX_FILES: usize = 5;
/// Violations listed per file in the details block.
const MAX_PER_FILE: usize = 10;

/// Renders the review-comment body.
#[must_use]
pub fn render_markdown(result: &AnalysisResult) -> String {
    if result.violations.is_empty() {
        return format!(
            "## ✅ Guideline Analysis Complete\n\nNo guideline violations found in {} analyzed files.\n",
            result.files_analyzed
        );
    }

    let s = &result.summary;
    let mut out = String::new();
    let _ = writeln!(out, "## 📋 Guideline Analysis Report");
    let _ = writeln!(out);
    let _ = writeln!(out, "**Files analyzed:** {}", result.files_analyzed);
    let _ = writeln!(out);
    let _ = writeln!(out, "### Summary");
    let _ = writeln!(out, "- 🔴 **Errors:** {}", s.errors);
    let _ = writeln!(out, "- 🟡 **Warnings:** {}", s.warnings);
    let _ = writeln!(out, "- 🔵 **Info:** {}", s.info);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", status_line(result));
    let _ = writeln!(out);

    write_details(&mut out, result);
    write_remediation(&mut out);

    let _ = writeln!(out);
    let _ = writeln!(out, "---");
    let _ = writeln!(out, "*Generated by guidelint.*");
    out
}

/// Blocking if any error, review required if any warning, pass otherwise.
fn status_line(result: &AnalysisResult) -> &'static str {
    match result.summary.worst() {
        Some(Severity::Error) => "**Status:** ❌ Blocking: fix the errors before merging.",
        Some(Severity::Warning) => "**Status:** ⚠️ Review required: warnings found.",
        _ => "**Status:** ✅ Pass",
    }
}

fn write_details(out: &mut String, result: &AnalysisResult) {
    let groups = group_by_file(&result.violations);

    let _ = writeln!(out, "<details>");
    let _ = writeln!(
        out,
        "<summary>Issues found ({})</summary>",
        result.summary.total_violations
    );
    let _ = writeln!(out);

    for (path, violations) in groups.iter().take(MAX_FILES) {
        let _ = writeln!(out, "#### 📁 `{path}`");
        let _ = writeln!(out);

        let mut sorted: Vec<&Violation> = violations.iter().collect();
        sorted.sort_by(|a, b| b.severity.cmp(&a.severity));

        for v in sorted.iter().take(MAX_PER_FILE) {
            let _ = writeln!(
                out,
                "- {} **Line {}** `{}`: {}",
                icon(v.severity),
                v.line_number,
                v.rule,
                v.description
            );
            if !v.suggestion.is_empty() {
                let _ = writeln!(out, "  - 💡 *{}*", v.suggestion);
            }
        }
        if sorted.len() > MAX_PER_FILE {
            let _ = writeln!(
                out,
                "- ... and {} more issues in this file",
                sorted.len() - MAX_PER_FILE
            );
        }
        let _ = writeln!(out);
    }
    if groups.len() > MAX_FILES {
        let _ = writeln!(out, "... and {} more files", groups.len() - MAX_FILES);
        let _ = writeln!(out);
    }
    let _ = writeln!(out, "</details>");
}

fn write_remediation(out: &mut String) {
    let _ = writeln!(out);
    let _ = writeln!(out, "### Remediation tips");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Category | Tip |");
    let _ = writeln!(out, "|----------|-----|");
    for category in Category::ALL {
        let _ = writeln!(out, "| {} | {} |", category, tip(category));
    }
}

fn tip(category: Category) -> &'static str {
    match category {
        Category::Naming => {
            "PascalCase types and functions, camelCase locals, `m_` members, `k` constants, `g_` globals"
        }
        Category::BestPractice => {
            "Prefer `std::make_unique`/`std::make_shared`, `nullptr`, explicit lambda captures and `explicit` constructors"
        }
        Category::Structure => {
            "Guard every header, keep functions short with few parameters, document public declarations"
        }
        Category::Formatting => {
            "Stay within the line limit, indent with spaces, strip trailing whitespace"
        }
    }
}

fn icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "🔴",
        Severity::Warning => "🟡",
        Severity::Info => "🔵",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::{sample, violation};

    #[test]
    fn empty_result_is_short_success() {
        let out = render_markdown(&AnalysisResult::new(Vec::new(), 4));
        assert!(out.starts_with("## ✅"));
        assert!(out.contains("4 analyzed files"));
        assert!(!out.contains("<details>"));
    }

    #[test]
    fn status_follows_worst_severity() {
        assert!(render_markdown(&sample()).contains("❌ Blocking"));

        let warnings = AnalysisResult::new(
            vec![violation("a.cpp", 1, "r", Severity::Warning, Category::Naming)],
            1,
        );
        assert!(render_markdown(&warnings).contains("⚠️ Review required"));

        let info = AnalysisResult::new(
            vec![violation("a.cpp", 1, "r", Severity::Info, Category::Formatting)],
            1,
        );
        assert!(render_markdown(&info).contains("✅ Pass"));
    }

    #[test]
    fn details_and_remediation_table() {
        let out = render_markdown(&sample());
        assert!(out.contains("- 🔴 **Errors:** 1"));
        assert!(out.contains("<summary>Issues found (3)</summary>"));
        assert!(out.contains("#### 📁 `src/a.cpp`"));
        assert!(out.contains("- 🟡 **Line 4** `class_names`: class_names description"));
        assert!(out.contains("| Category | Tip |"));
        for category in Category::ALL {
            assert!(out.contains(&format!("| {category} |")));
        }
    }

    #[test]
    fn details_are_truncated() {
        let mut violations = Vec::new();
        for f in 0..7 {
            for line in 1..=12 {
                violations.push(violation(
                    &format!("f{f}.cpp"),
                    line,
                    "r",
                    Severity::Info,
                    Category::Formatting,
                ));
            }
        }
        let out = render_markdown(&AnalysisResult::new(violations, 7));
        assert_eq!(out.matches("- ... and 2 more issues in this file").count(), 5);
        assert!(out.contains("... and 2 more files"));
        assert!(!out.contains("`f5.cpp`"));
    }

    #[test]
    fn errors_listed_first_within_file() {
        let result = AnalysisResult::new(
            vec![
                violation("a.cpp", 1, "info_rule", Severity::Info, Category::Formatting),
                violation("a.cpp", 2, "error_rule", Severity::Error, Category::Structure),
            ],
            1,
        );
        let out = render_markdown(&result);
        assert!(out.find("error_rule").unwrap() < out.find("info_rule").unwrap());
    }
}
