//! `git` command-line collaborator.

use super::{DiffTarget, ScopeError, VersionControl};
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Obtains diffs by running `git diff -U0`.
#[derive(Debug, Clone, Default)]
pub struct GitCli {
    workdir: Option<PathBuf>,
}

impl GitCli {
    /// Creates a collaborator running in the current directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs git in `workdir` instead of the current directory.
    #[must_use]
    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(workdir.into());
        self
    }

    fn args(target: DiffTarget<'_>) -> Vec<String> {
        let mut args = vec![
            "diff".to_string(),
            "-U0".to_string(),
            "--no-color".to_string(),
            "--no-ext-diff".to_string(),
            "--relative".to_string(),
        ];
        match target {
            DiffTarget::Ref(reference) => args.push(format!("{reference}...HEAD")),
            DiffTarget::Staged => args.push("--cached".to_string()),
        }
        args
    }
}

impl VersionControl for GitCli {
    fn diff(&self, target: DiffTarget<'_>) -> Result<String, ScopeError> {
        let args = Self::args(target);
        debug!("Running git {}", args.join(" "));

        let mut cmd = Command::new("git");
        cmd.args(&args);
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }
        let output = cmd.output()?;

        if !output.status.success() {
            return Err(ScopeError::Resolution {
                reference: target.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_args_for_ref_and_index() {
        let args = GitCli::args(DiffTarget::Ref("main"));
        assert_eq!(args.last().map(String::as_str), Some("main...HEAD"));
        assert!(args.contains(&"-U0".to_string()));

        let args = GitCli::args(DiffTarget::Staged);
        assert_eq!(args.last().map(String::as_str), Some("--cached"));
    }

    #[test]
    fn unknown_reference_outside_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        let git = GitCli::new().with_workdir(dir.path());
        // Either git is missing (Vcs) or the directory is not a repository.
        assert!(git.diff(DiffTarget::Ref("no-such-branch")).is_err());
    }
}
