//! Writes a rendered report to stdout or a file.

use anyhow::{Context, Result};
use guidelint_core::report::{render, ReportFormat};
use guidelint_core::AnalysisResult;
use std::io::Write;
use std::path::Path;

/// Renders `result` and writes it to `output`, or stdout when `None`.
pub fn emit(result: &AnalysisResult, format: ReportFormat, output: Option<&Path>) -> Result<()> {
    let mut report = render(result, format).context("Failed to render report")?;
    if !report.ends_with('\n') {
        report.push('\n');
    }

    match output {
        Some(path) => {
            std::fs::write(path, &report)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            tracing::info!("Wrote {format} report to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(report.as_bytes())
                .context("Failed to write report to stdout")?;
            stdout.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_report_file_with_trailing_newline() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("report.json");
        let result = AnalysisResult::new(Vec::new(), 0);

        emit(&result, ReportFormat::Json, Some(&path)).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["summary"]["total_violations"], 0);
    }
}
