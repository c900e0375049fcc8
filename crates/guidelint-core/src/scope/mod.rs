//! Change filter: restricts a report to the files and lines a change touched.
//!
//! ```text
//! ScopeMode ──▶ VersionControl (unified diff) ──▶ parse_unified_diff ──▶ ChangeScope
//! ```

mod diff;
mod git;

pub use diff::parse_unified_diff;
pub use git::GitCli;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Lines of one file that are in scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineSelection {
    /// Every line.
    All,
    /// Only the listed 1-based lines (possibly none).
    Lines(BTreeSet<usize>),
}

impl LineSelection {
    /// Tests whether a line is selected.
    #[must_use]
    pub fn contains(&self, line: usize) -> bool {
        match self {
            Self::All => true,
            Self::Lines(lines) => lines.contains(&line),
        }
    }
}

/// Restriction applied to violations before aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ChangeScope {
    /// Full files; nothing is filtered.
    #[default]
    Unscoped,
    /// Only listed files, and within them only the selected lines.
    /// Files absent from the map are entirely out of scope.
    Scoped(BTreeMap<PathBuf, LineSelection>),
}

impl ChangeScope {
    /// Scope covering every line of the given files.
    pub fn from_files<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self::Scoped(
            files
                .into_iter()
                .map(|p| (normalize(p.as_ref()), LineSelection::All))
                .collect(),
        )
    }

    /// Scope covering the given lines per file.
    #[must_use]
    pub fn from_lines(lines: BTreeMap<PathBuf, BTreeSet<usize>>) -> Self {
        Self::Scoped(
            lines
                .into_iter()
                .map(|(p, l)| (normalize(&p), LineSelection::Lines(l)))
                .collect(),
        )
    }

    /// True unless this is [`ChangeScope::Unscoped`].
    #[must_use]
    pub fn is_scoped(&self) -> bool {
        matches!(self, Self::Scoped(_))
    }

    /// Tests whether a violation at `path:line` survives the filter.
    #[must_use]
    pub fn contains(&self, path: &Path, line: usize) -> bool {
        match self {
            Self::Unscoped => true,
            Self::Scoped(files) => files
                .get(&normalize(path))
                .is_some_and(|sel| sel.contains(line)),
        }
    }

    /// Tests whether any line of `path` is in scope.
    #[must_use]
    pub fn covers_file(&self, path: &Path) -> bool {
        match self {
            Self::Unscoped => true,
            Self::Scoped(files) => match files.get(&normalize(path)) {
                Some(LineSelection::All) => true,
                Some(LineSelection::Lines(lines)) => !lines.is_empty(),
                None => false,
            },
        }
    }

    /// Files listed by a scoped filter, in path order.
    #[must_use]
    pub fn files(&self) -> Option<Vec<PathBuf>> {
        match self {
            Self::Unscoped => None,
            Self::Scoped(files) => Some(files.keys().cloned().collect()),
        }
    }
}

/// Removes `.` components so `./src/a.cpp` and `src/a.cpp` compare equal.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// How the run is scoped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeMode {
    /// Analyze full files.
    Unscoped,
    /// Lines added or modified relative to a reference (`REF...HEAD`).
    DiffAgainst(String),
    /// Lines added or modified in the staged index.
    Staged,
    /// Every line of an explicit file list.
    FileList(Vec<PathBuf>),
}

/// What a version-control collaborator is asked to diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffTarget<'a> {
    /// Changes of `HEAD` since it diverged from this reference.
    Ref(&'a str),
    /// Changes in the staged index.
    Staged,
}

impl std::fmt::Display for DiffTarget<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ref(r) => f.write_str(r),
            Self::Staged => f.write_str("staged changes"),
        }
    }
}

/// Source of unified diffs.
pub trait VersionControl {
    /// Returns a zero-context unified diff for `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError`] if the target cannot be resolved.
    fn diff(&self, target: DiffTarget<'_>) -> Result<String, ScopeError>;
}

/// Errors while computing a [`ChangeScope`].
///
/// Recoverable: the driver may fall back to unscoped analysis.
#[derive(Debug, Error)]
pub enum ScopeError {
    /// The reference could not be resolved (unknown branch, no repository).
    #[error("cannot resolve `{reference}`: {message}")]
    Resolution {
        /// What was being resolved.
        reference: String,
        /// Collaborator message.
        message: String,
    },

    /// The version-control tool could not be run.
    #[error("failed to run version control: {0}")]
    Vcs(#[from] std::io::Error),
}

/// Computes the change scope for a mode.
///
/// # Errors
///
/// Returns [`ScopeError`] if the diff cannot be obtained. No retry is attempted.
pub fn compute_scope(
    mode: &ScopeMode,
    vcs: &dyn VersionControl,
) -> Result<ChangeScope, ScopeError> {
    let scope = match mode {
        ScopeMode::Unscoped => ChangeScope::Unscoped,
        ScopeMode::FileList(files) => ChangeScope::from_files(files),
        ScopeMode::DiffAgainst(reference) => {
            ChangeScope::from_lines(parse_unified_diff(&vcs.diff(DiffTarget::Ref(reference))?))
        }
        ScopeMode::Staged => {
            ChangeScope::from_lines(parse_unified_diff(&vcs.diff(DiffTarget::Staged)?))
        }
    };
    if let ChangeScope::Scoped(files) = &scope {
        debug!("Change scope covers {} files", files.len());
    }
    Ok(scope)
}
