//! Run-level configuration: failure threshold and analyzer settings.
//!
//! The same document also carries rule definitions; those are read by
//! [`crate::model::load_rules`].

use crate::model::{DocumentFormat, FileKind, LoadError};
use crate::types::Severity;
use miette::Diagnostic;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Severity at or above which a run fails (default: error).
    #[serde(default)]
    pub fail_on: Option<Severity>,

    /// Analyzer configuration.
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Rule-set keys, read by [`crate::model::load_rules`].
    #[serde(default, skip_serializing)]
    pub base: Option<IgnoredAny>,

    /// Rule definitions, read by [`crate::model::load_rules`].
    #[serde(default, skip_serializing)]
    pub rule: Option<IgnoredAny>,

    /// Rule overrides, read by [`crate::model::load_rules`].
    #[serde(default, skip_serializing)]
    pub rules: Option<IgnoredAny>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML or JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = read_document(path)?;
        Self::parse(&content, DocumentFormat::from_path(path))
    }

    /// Parses configuration from document text.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is invalid.
    pub fn parse(content: &str, format: DocumentFormat) -> Result<Self, ConfigError> {
        match format {
            DocumentFormat::Toml => toml::from_str(content).map_err(|e| ConfigError::Parse {
                message: e.to_string(),
            }),
            DocumentFormat::Json => serde_json::from_str(content).map_err(|e| ConfigError::Parse {
                message: e.to_string(),
            }),
        }
    }

    /// Effective failure threshold.
    #[must_use]
    pub fn fail_threshold(&self) -> Severity {
        self.fail_on.unwrap_or(Severity::Error)
    }
}

/// Analyzer-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Extensions (without dot) of files to analyze.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Extensions treated as headers. Must also appear in `extensions`.
    #[serde(default = "default_header_extensions")]
    pub header_extensions: Vec<String>,

    /// Glob patterns to exclude from analysis.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Worker threads; `None` uses the available parallelism.
    #[serde(default)]
    pub workers: Option<usize>,

    /// Keep only the most severe violation per file and line.
    #[serde(default)]
    pub dedupe_same_line: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            header_extensions: default_header_extensions(),
            exclude: default_exclude(),
            workers: None,
            dedupe_same_line: false,
        }
    }
}

impl AnalyzerConfig {
    /// Classifies a path by extension, or `None` if it is not analyzed.
    #[must_use]
    pub fn classify(&self, path: &Path) -> Option<FileKind> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if self.header_extensions.iter().any(|e| *e == ext) {
            Some(FileKind::Header)
        } else if self.extensions.iter().any(|e| *e == ext) {
            Some(FileKind::Source)
        } else {
            None
        }
    }
}

fn default_extensions() -> Vec<String> {
    ["cpp", "cc", "cxx", "c", "h", "hpp", "hxx", "hh"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_header_extensions() -> Vec<String> {
    ["h", "hpp", "hxx", "hh"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_exclude() -> Vec<String> {
    vec!["**/build/**".to_string(), "**/third_party/**".to_string()]
}

/// Reads a rule-set or configuration document from disk.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read.
pub fn read_document(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Configuration errors. Always fatal: raised before any file is scanned.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    #[diagnostic(code(guidelint::config::io))]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    #[diagnostic(
        code(guidelint::config::parse),
        help("rule documents are TOML, or JSON when the file ends in .json")
    )]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// The rule set failed validation.
    #[error("Invalid rule set: {0}")]
    #[diagnostic(
        code(guidelint::config::rules),
        help("run `guidelint list-rules` against the built-in set to see valid rule definitions")
    )]
    Rules(#[from] LoadError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.fail_threshold(), Severity::Error);
        assert!(!config.analyzer.dedupe_same_line);
        assert!(config.analyzer.workers.is_none());
        assert_eq!(config.analyzer.exclude.len(), 2);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
fail_on = "warning"

[analyzer]
exclude = ["**/generated/**"]
workers = 2
dedupe_same_line = true

[rules.function_length]
max = 80

[[rule]]
id = "no_goto"
category = "best_practice"
description = "Avoid goto"
severity = "warning"
keywords = ["goto"]
"#;

        let config = Config::parse(toml, DocumentFormat::Toml).expect("Failed to parse");
        assert_eq!(config.fail_threshold(), Severity::Warning);
        assert_eq!(config.analyzer.exclude, vec!["**/generated/**"]);
        assert_eq!(config.analyzer.workers, Some(2));
        assert!(config.analyzer.dedupe_same_line);
        // Defaults survive partial sections.
        assert!(config.analyzer.extensions.contains(&"cpp".to_string()));
    }

    #[test]
    fn test_unknown_fail_on_is_rejected() {
        let err = Config::parse("fail_on = \"fatal\"", DocumentFormat::Toml).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_misspelt_analyzer_key_is_rejected() {
        let err = Config::parse("[analyzer]\nworker = 2\n", DocumentFormat::Toml).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        let err = Config::parse("fail_onn = \"warning\"\n", DocumentFormat::Toml).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_classify_by_extension() {
        let analyzer = AnalyzerConfig::default();
        assert_eq!(
            analyzer.classify(Path::new("src/a.cpp")),
            Some(FileKind::Source)
        );
        assert_eq!(
            analyzer.classify(Path::new("include/a.HPP")),
            Some(FileKind::Header)
        );
        assert_eq!(analyzer.classify(Path::new("a.h")), Some(FileKind::Header));
        assert_eq!(analyzer.classify(Path::new("README.md")), None);
        assert_eq!(analyzer.classify(Path::new("Makefile")), None);
    }

    #[test]
    fn test_json_config() {
        let config = Config::parse(
            r#"{"fail_on": "error", "analyzer": {"workers": 1}}"#,
            DocumentFormat::Json,
        )
        .unwrap();
        assert_eq!(config.analyzer.workers, Some(1));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
