//! Structured JSON encoding.

use crate::types::{AnalysisResult, Summary, Violation};
use serde::Serialize;

/// The JSON document: summary first, then the ordered violations.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    /// Counts per severity.
    pub summary: &'a Summary,
    /// Every violation in report order.
    pub violations: &'a [Violation],
}

impl<'a> From<&'a AnalysisResult> for JsonReport<'a> {
    fn from(result: &'a AnalysisResult) -> Self {
        Self {
            summary: &result.summary,
            violations: &result.violations,
        }
    }
}

/// Renders the pretty-printed JSON document.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(result: &AnalysisResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonReport::from(result))
}
