//! Check command implementation.

use anyhow::{Context, Result};
use guidelint_core::report::ReportFormat;
use guidelint_core::scope::normalize;
use guidelint_core::{compute_scope, Analyzer, ChangeScope, GitCli, ScopeMode, Severity};
use guidelint_rules::default_matchers;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::config_resolver::{self, ConfigSource, Settings};
use crate::github::{self, PullRequestRef};

/// Arguments of `guidelint check`.
#[derive(Debug, Default, clap::Args)]
pub struct CheckArgs {
    /// Files or directories to analyze
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Output format: text, json, markdown (alias pr-comment) or compact
    #[arg(short, long, default_value = "text")]
    pub format: ReportFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Only report lines changed since REF (compared as REF...HEAD)
    #[arg(long, value_name = "REF", num_args = 0..=1, default_missing_value = "main")]
    pub diff: Option<String>,

    /// Only report lines changed in the staged index
    #[arg(long, conflicts_with = "diff")]
    pub staged: bool,

    /// Only analyze files touched by a GitHub pull request (OWNER/REPO/NUMBER)
    #[arg(long, value_name = "PR", conflicts_with_all = ["diff", "staged"])]
    pub pr: Option<PullRequestRef>,

    /// GitHub token for --pr
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Analyze full files when the change scope cannot be computed
    #[arg(long)]
    pub fallback_full: bool,

    /// Worker threads (default: available parallelism)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Exclude patterns (can be specified multiple times)
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Fail on warnings as well as errors
    #[arg(long)]
    pub fail_on_warnings: bool,
}

/// Result of a completed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing at or above the failure threshold.
    Pass,
    /// At least one violation at or above the failure threshold.
    PolicyFailure,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Pass => ExitCode::SUCCESS,
            Outcome::PolicyFailure => ExitCode::from(1),
        }
    }
}

/// Runs the check command.
pub fn run(args: &CheckArgs, config: Option<&Path>) -> Result<Outcome> {
    let source = config_resolver::resolve(Path::new("."), config);
    execute(args, &source)
}

fn execute(args: &CheckArgs, source: &ConfigSource) -> Result<Outcome> {
    let Settings { model, mut config } = config_resolver::load(source)?;
    if args.fail_on_warnings {
        config.fail_on = Some(Severity::Warning);
    }
    let threshold = config.fail_threshold();

    let scope = change_scope(args)?;
    let files = match scope.files() {
        Some(listed) => within_paths(listed, &args.paths),
        None => discover(&args.paths)?,
    };

    let mut builder = Analyzer::builder()
        .model(model)
        .matchers(default_matchers())
        .config(config)
        .scope(scope);
    for pattern in &args.exclude {
        builder = builder.exclude(pattern.clone());
    }
    if let Some(workers) = args.workers {
        builder = builder.workers(workers);
    }
    let analyzer = builder.build().context("Failed to build analyzer")?;

    info!(
        "Checking {} candidate files against {} rules",
        files.len(),
        analyzer.model().len()
    );
    let result = analyzer.analyze(&files);

    super::output::emit(&result, args.format, args.output.as_deref())?;

    if result.has_violations_at(threshold) {
        info!("Violations at or above `{threshold}` found");
        Ok(Outcome::PolicyFailure)
    } else {
        Ok(Outcome::Pass)
    }
}

/// Computes the change scope, falling back to full files when allowed.
fn change_scope(args: &CheckArgs) -> Result<ChangeScope> {
    match scoped(args) {
        Ok(scope) => Ok(scope),
        Err(err) if args.fallback_full => {
            warn!("{err:#}; analyzing full files instead");
            Ok(ChangeScope::Unscoped)
        }
        Err(err) => Err(err.context("Failed to compute change scope")),
    }
}

fn scoped(args: &CheckArgs) -> Result<ChangeScope> {
    let mode = if let Some(pr) = &args.pr {
        if args.github_token.is_none() {
            warn!("No GitHub token; unauthenticated requests are rate limited");
        }
        let files = github::pull_request_files(pr, args.github_token.as_deref())?;
        ScopeMode::FileList(files)
    } else if let Some(reference) = &args.diff {
        ScopeMode::DiffAgainst(reference.clone())
    } else if args.staged {
        ScopeMode::Staged
    } else {
        ScopeMode::Unscoped
    };
    Ok(compute_scope(&mode, &GitCli::new())?)
}

/// Keeps scoped files that still exist and lie under one of `paths`.
fn within_paths(listed: Vec<PathBuf>, paths: &[PathBuf]) -> Vec<PathBuf> {
    let roots: Vec<PathBuf> = paths.iter().map(|p| normalize(p)).collect();
    listed
        .into_iter()
        .filter(|file| file.is_file())
        .filter(|file| roots.iter().any(|root| normalize(file).starts_with(root)))
        .collect()
}

/// Walks `paths`, honouring `.gitignore`. Extension and exclude filtering
/// happen in the analyzer.
fn discover(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let Some((first, rest)) = paths.split_first() else {
        return Ok(Vec::new());
    };

    let mut builder = ignore::WalkBuilder::new(first);
    for path in rest {
        builder.add(path);
    }
    builder.hidden(false).git_ignore(true).require_git(false);

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry.context("Failed to walk source tree")?;
        if entry.file_type().is_some_and(|t| t.is_file()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}
