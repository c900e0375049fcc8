//! Core analyzer: runs matchers over files and aggregates the result.

use crate::allowance::Allowances;
use crate::config::{Config, ConfigError};
use crate::context::{display_path, FileContext};
use crate::model::{FileKind, Rule, RuleModel, MATCHER_FAILURE, UNREADABLE_FILE};
use crate::rule::{Matcher, MatcherBox};
use crate::scope::ChangeScope;
use crate::source::SourceFile;
use crate::types::{AnalysisResult, Violation};

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while setting up an analysis.
///
/// Nothing that happens while scanning one file surfaces here; those
/// failures become notes in the result.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Glob pattern error.
    #[error("Invalid exclude pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// The worker pool could not be created.
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Builder for configuring an [`Analyzer`].
#[derive(Default)]
pub struct AnalyzerBuilder {
    matchers: Vec<MatcherBox>,
    model: Option<RuleModel>,
    config: Option<Config>,
    scope: ChangeScope,
    exclude_patterns: Vec<String>,
    workers: Option<usize>,
}

impl AnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a matcher to the analyzer.
    #[must_use]
    pub fn matcher<M: Matcher + 'static>(mut self, matcher: M) -> Self {
        self.matchers.push(Box::new(matcher));
        self
    }

    /// Adds boxed matchers to the analyzer.
    #[must_use]
    pub fn matchers<I>(mut self, matchers: I) -> Self
    where
        I: IntoIterator<Item = MatcherBox>,
    {
        self.matchers.extend(matchers);
        self
    }

    /// Sets the rule model. Defaults to the built-in set.
    #[must_use]
    pub fn model(mut self, model: RuleModel) -> Self {
        self.model = Some(model);
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Restricts reported violations to a change scope.
    #[must_use]
    pub fn scope(mut self, scope: ChangeScope) -> Self {
        self.scope = scope;
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Sets the number of worker threads, overriding the configuration.
    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Builds the analyzer.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in rule set fails to load, an exclude
    /// pattern is invalid, or the worker pool cannot be started.
    pub fn build(self) -> Result<Analyzer, AnalyzerError> {
        let config = self.config.unwrap_or_default();
        let model = match self.model {
            Some(model) => model,
            None => RuleModel::builtin()?,
        };

        let mut exclude_patterns = self.exclude_patterns;
        exclude_patterns.extend(config.analyzer.exclude.iter().cloned());
        let exclude = exclude_patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        let workers = self.workers.or(config.analyzer.workers).unwrap_or(0);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("guidelint-worker-{i}"))
            .build()?;

        Ok(Analyzer {
            matchers: self.matchers,
            model,
            config,
            scope: self.scope,
            exclude,
            pool,
        })
    }
}

/// Runs every applicable rule over a list of files.
///
/// Use [`Analyzer::builder()`] to construct an instance.
pub struct Analyzer {
    matchers: Vec<MatcherBox>,
    model: RuleModel,
    config: Config,
    scope: ChangeScope,
    exclude: Vec<glob::Pattern>,
    pool: rayon::ThreadPool,
}

impl Analyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Returns the rule model in use.
    #[must_use]
    pub fn model(&self) -> &RuleModel {
        &self.model
    }

    /// Returns the number of worker threads.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Analyzes the given files and returns the aggregated result.
    ///
    /// Files with an unknown extension, matching an exclude pattern, or
    /// outside the change scope are skipped. A file that cannot be read, or
    /// a rule that cannot be evaluated for a file, yields an info note and
    /// never stops the run.
    #[must_use]
    pub fn analyze(&self, files: &[PathBuf]) -> AnalysisResult {
        let selected: Vec<(&Path, FileKind)> = files
            .iter()
            .filter_map(|path| self.select(path).map(|kind| (path.as_path(), kind)))
            .collect();

        info!(
            "Analyzing {} of {} files with {} workers",
            selected.len(),
            files.len(),
            self.workers()
        );

        let per_file: Vec<Vec<Violation>> = self.pool.install(|| {
            selected
                .par_iter()
                .map(|(path, kind)| self.analyze_file(path, *kind))
                .collect()
        });

        let mut violations: Vec<Violation> = per_file.into_iter().flatten().collect();
        violations.sort_by(Violation::report_order);
        if self.config.analyzer.dedupe_same_line {
            violations = dedupe_same_line(violations);
        }

        let result = AnalysisResult::new(violations, selected.len());
        info!(
            "Analysis complete: {} violations in {} files",
            result.summary.total_violations, result.files_analyzed
        );
        result
    }

    /// Analyzes in-memory content as if it were read from `path`.
    ///
    /// Scope and allowance directives apply; exclude patterns do not.
    #[must_use]
    pub fn analyze_source(&self, path: &Path, kind: FileKind, content: &str) -> Vec<Violation> {
        let source = SourceFile::parse(content);
        let mut violations = self.run_rules(&FileContext::new(path, kind, &source));
        violations.sort_by(Violation::report_order);
        violations
    }

    /// Returns the kind of `path` if it should be analyzed.
    fn select(&self, path: &Path) -> Option<FileKind> {
        let Some(kind) = self.config.analyzer.classify(path) else {
            debug!("Skipping (extension): {}", path.display());
            return None;
        };
        if self.should_exclude(path) {
            debug!("Excluding: {}", path.display());
            return None;
        }
        if !self.scope.covers_file(path) {
            debug!("Skipping (out of scope): {}", path.display());
            return None;
        }
        Some(kind)
    }

    fn analyze_file(&self, path: &Path, kind: FileKind) -> Vec<Violation> {
        debug!("Analyzing: {}", path.display());

        match read_text(path) {
            Ok(content) => self.analyze_source(path, kind, &content),
            Err(reason) => {
                warn!("Skipping {}: {}", path.display(), reason);
                let empty = SourceFile::parse("");
                let ctx = FileContext::new(path, kind, &empty);
                self.note(&ctx, UNREADABLE_FILE, reason)
                    .into_iter()
                    .collect()
            }
        }
    }

    /// Runs every rule that applies to the file, then drops allowed and
    /// out-of-scope violations.
    fn run_rules(&self, ctx: &FileContext<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for rule in self.model.rules_for(ctx.kind) {
            match self.check_rule(ctx, rule) {
                Ok(found) => violations.extend(found),
                Err(reason) => {
                    warn!("{}: {}", ctx.display_path(), reason);
                    violations.extend(self.note(ctx, MATCHER_FAILURE, reason));
                }
            }
        }

        let allowances = Allowances::scan(ctx.source);
        violations.retain(|v| {
            let check = allowances.check(v.line_number, &v.rule);
            if let Some(reason) = check.reason() {
                debug!("{}: {} allowed: {}", v.file_path, v.rule, reason);
            }
            !check.is_allowed()
        });

        violations.retain(|v| self.in_scope(ctx.path, v));
        violations
    }

    fn check_rule(&self, ctx: &FileContext<'_>, rule: &Rule) -> Result<Vec<Violation>, String> {
        let matcher = self
            .matchers
            .iter()
            .find(|m| m.handles(rule.detection()))
            .ok_or_else(|| {
                format!(
                    "Rule '{}' skipped: no matcher for {} rules",
                    rule.id(),
                    rule.detection().kind()
                )
            })?;

        debug!("{}: {} via {}", ctx.display_path(), rule.id(), matcher.name());
        matcher
            .check(ctx, rule)
            .map_err(|e| format!("Rule '{}' skipped: {e}", rule.id()))
    }

    /// Builds an engine note at line 1, if the note rule is in the model.
    fn note(&self, ctx: &FileContext<'_>, id: &str, detail: String) -> Option<Violation> {
        let Some(rule) = self.model.get(id) else {
            debug!("Note {} is disabled", id);
            return None;
        };
        Some(ctx.violation(rule, 1, Some(detail)))
    }

    fn in_scope(&self, path: &Path, violation: &Violation) -> bool {
        let is_note = violation.rule == UNREADABLE_FILE || violation.rule == MATCHER_FAILURE;
        if is_note {
            return self.scope.covers_file(path);
        }
        self.scope.contains(path, violation.line_number)
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let path_str = display_path(path);
        self.exclude.iter().any(|pattern| {
            if pattern.matches(&path_str) {
                return true;
            }
            // "**/build/**" also excludes a top-level "build/"
            let inner = pattern.as_str().replace("**/", "").replace("/**", "/");
            inner.ends_with('/')
                && !inner.contains('*')
                && (path_str.starts_with(&inner) || path_str.contains(&format!("/{inner}")))
        })
    }
}

/// Reads a file as UTF-8 text, dropping a leading byte-order mark.
fn read_text(path: &Path) -> Result<String, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("Could not read file: {e}"))?;
    if bytes.contains(&0) {
        return Err("File appears to be binary".to_string());
    }
    let mut text =
        String::from_utf8(bytes).map_err(|_| "File is not valid UTF-8 text".to_string())?;
    if text.starts_with('\u{feff}') {
        text.remove(0);
    }
    Ok(text)
}

/// Keeps, per file and line, the most severe violation; ties go to the
/// lowest rule id. Input must be in report order.
fn dedupe_same_line(violations: Vec<Violation>) -> Vec<Violation> {
    let mut out: Vec<Violation> = Vec::with_capacity(violations.len());
    for v in violations {
        match out.last_mut() {
            Some(last) if last.file_path == v.file_path && last.line_number == v.line_number => {
                if v.severity > last.severity {
                    *last = v;
                }
            }
            _ => out.push(v),
        }
    }
    out
}
