//! Renders an [`AnalysisResult`] into text, JSON, markdown or compact form.
//!
//! Every renderer is a pure function of the result: nothing is re-read and
//! no matcher runs again.

mod json;
mod markdown;
mod text;

pub use json::{render_json, JsonReport};
pub use markdown::render_markdown;
pub use text::render_text;

use crate::types::{AnalysisResult, Violation};
use std::fmt;
use std::str::FromStr;

/// Output encoding of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable, grouped by file.
    #[default]
    Text,
    /// Summary plus the full violation list.
    Json,
    /// Fragment for a review-comment body.
    Markdown,
    /// One line per violation.
    Compact,
}

impl ReportFormat {
    /// All formats, in help order.
    pub const ALL: [Self; 4] = [Self::Text, Self::Json, Self::Markdown, Self::Compact];

    /// Returns the command-line spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Markdown => "markdown",
            Self::Compact => "compact",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "markdown" | "pr-comment" => Ok(Self::Markdown),
            "compact" => Ok(Self::Compact),
            other => Err(format!(
                "unknown format `{other}` (expected text, json, markdown or compact)"
            )),
        }
    }
}

/// Renders `result` in the requested format.
///
/// # Errors
///
/// Returns an error only if JSON serialization fails.
pub fn render(result: &AnalysisResult, format: ReportFormat) -> Result<String, serde_json::Error> {
    Ok(match format {
        ReportFormat::Text => render_text(result),
        ReportFormat::Json => render_json(result)?,
        ReportFormat::Markdown => render_markdown(result),
        ReportFormat::Compact => render_compact(result),
    })
}

/// One `path:line: severity [rule] description` line per violation.
#[must_use]
pub fn render_compact(result: &AnalysisResult) -> String {
    result
        .violations
        .iter()
        .map(|v| format!("{}\n", v.compact()))
        .collect()
}

/// Splits violations already in report order into per-file runs.
pub(crate) fn group_by_file(violations: &[Violation]) -> Vec<(&str, &[Violation])> {
    let mut groups: Vec<(&str, &[Violation])> = Vec::new();
    let mut start = 0;
    for i in 1..=violations.len() {
        if i == violations.len() || violations[i].file_path != violations[start].file_path {
            groups.push((violations[start].file_path.as_str(), &violations[start..i]));
            start = i;
        }
    }
    groups
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::model::Category;
    use crate::types::{AnalysisResult, Severity, Violation};

    pub(crate) fn violation(
        file: &str,
        line: usize,
        rule: &str,
        severity: Severity,
        category: Category,
    ) -> Violation {
        Violation {
            rule: rule.to_string(),
            description: format!("{rule} description"),
            file_path: file.to_string(),
            line_number: line,
            line_content: "class myClass {".to_string(),
            severity,
            suggestion: format!("fix {rule}"),
            category,
        }
    }

    pub(crate) fn sample() -> AnalysisResult {
        AnalysisResult::new(
            vec![
                violation("inc/a.h", 1, "include_guards", Severity::Error, Category::Structure),
                violation("src/a.cpp", 4, "class_names", Severity::Warning, Category::Naming),
                violation("src/a.cpp", 9, "trailing_whitespace", Severity::Info, Category::Formatting),
            ],
            3,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parses_cli_spellings() {
        assert_eq!("json".parse::<ReportFormat>(), Ok(ReportFormat::Json));
        assert_eq!("pr-comment".parse::<ReportFormat>(), Ok(ReportFormat::Markdown));
        assert!("xml".parse::<ReportFormat>().is_err());
        for format in ReportFormat::ALL {
            assert_eq!(format.as_str().parse::<ReportFormat>(), Ok(format));
        }
    }

    #[test]
    fn groups_follow_file_runs() {
        let result = fixtures::sample();
        let groups = group_by_file(&result.violations);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "inc/a.h");
        assert_eq!(groups[1].1.len(), 2);
        assert!(group_by_file(&[]).is_empty());
    }

    #[test]
    fn compact_has_one_line_per_violation() {
        let out = render_compact(&fixtures::sample());
        assert_eq!(out.lines().count(), 3);
        insta::assert_snapshot!(out.lines().nth(1).unwrap_or_default(), @"src/a.cpp:4: warning [class_names] class_names description");
    }

    #[test]
    fn render_is_pure() {
        let result = fixtures::sample();
        for format in ReportFormat::ALL {
            assert_eq!(render(&result, format).unwrap(), render(&result, format).unwrap());
        }
    }
}
