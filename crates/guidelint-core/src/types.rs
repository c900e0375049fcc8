//! Core types for guideline violations and analysis results.

use crate::model::Category;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of characters kept in a violation's line excerpt.
pub const EXCERPT_LIMIT: usize = 120;

/// Severity level for guideline violations.
///
/// Ordered so that `Info < Warning < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory message, never fails a run.
    Info,
    /// Should be addressed before merging.
    Warning,
    /// Blocking; must be fixed.
    Error,
}

impl Severity {
    /// Parses the textual form used in rule documents.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            "info" => Some(Self::Info),
            _ => None,
        }
    }

    /// Returns the lowercase name of this severity.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One concrete breach of a rule at a specific file and line.
///
/// Violations are pure data: created by exactly one matcher invocation and
/// never mutated afterwards. Field order is the JSON field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Identifier of the rule that fired.
    #[serde(rename = "rule_name")]
    pub rule: String,
    /// Human-readable description of the rule.
    pub description: String,
    /// File path as handed to the analyzer (normalized, `/`-separated).
    pub file_path: String,
    /// 1-based line number.
    pub line_number: usize,
    /// Bounded excerpt of the offending line.
    pub line_content: String,
    /// Severity copied from the rule at match time.
    pub severity: Severity,
    /// Remediation hint.
    pub suggestion: String,
    /// Category of the rule, for grouping in reports.
    #[serde(skip)]
    pub category: Category,
}

impl Violation {
    /// Formats the violation as a single compact line.
    #[must_use]
    pub fn compact(&self) -> String {
        format!(
            "{}:{}: {} [{}] {}",
            self.file_path, self.line_number, self.severity, self.rule, self.description
        )
    }

    /// Ordering used by the aggregator: file, line, then rule identifier.
    #[must_use]
    pub fn report_order(&self, other: &Self) -> std::cmp::Ordering {
        self.file_path
            .cmp(&other.file_path)
            .then(self.line_number.cmp(&other.line_number))
            .then_with(|| self.rule.cmp(&other.rule))
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compact())
    }
}

/// Trims a source line and bounds it to [`EXCERPT_LIMIT`] characters.
#[must_use]
pub fn excerpt(line: &str) -> String {
    let trimmed = line.trim();
    if trimmed.chars().count() <= EXCERPT_LIMIT {
        return trimmed.to_string();
    }
    let mut out: String = trimmed.chars().take(EXCERPT_LIMIT).collect();
    out.push_str("...");
    out
}

/// Counts of violations per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of `error` violations.
    pub errors: usize,
    /// Number of `warning` violations.
    pub warnings: usize,
    /// Number of `info` violations.
    pub info: usize,
    /// Total number of violations.
    pub total_violations: usize,
}

impl Summary {
    /// Counts the given violations by severity.
    #[must_use]
    pub fn from_violations(violations: &[Violation]) -> Self {
        let mut summary = Self::default();
        for v in violations {
            match v.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => summary.info += 1,
            }
        }
        summary.total_violations = violations.len();
        summary
    }

    /// Status derived from the counts: the highest severity present, if any.
    #[must_use]
    pub fn worst(&self) -> Option<Severity> {
        if self.errors > 0 {
            Some(Severity::Error)
        } else if self.warnings > 0 {
            Some(Severity::Warning)
        } else if self.info > 0 {
            Some(Severity::Info)
        } else {
            None
        }
    }
}

/// Terminal aggregate of one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisResult {
    /// All violations, ordered by file, line and rule.
    pub violations: Vec<Violation>,
    /// Counts derived from `violations`.
    pub summary: Summary,
    /// Number of files the engine scanned.
    pub files_analyzed: usize,
}

impl AnalysisResult {
    /// Builds a result from already ordered violations.
    #[must_use]
    pub fn new(violations: Vec<Violation>, files_analyzed: usize) -> Self {
        let summary = Summary::from_violations(&violations);
        Self {
            violations,
            summary,
            files_analyzed,
        }
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }

    /// Checks if any violations meet or exceed the given severity threshold.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.violations.iter().any(|v| v.severity >= severity)
    }

    /// Returns violations filtered by severity.
    #[must_use]
    pub fn by_severity(&self, severity: Severity) -> Vec<&Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == severity)
            .collect()
    }
}
