//! Pull-request file list from the GitHub REST API.
//!
//! Only the list of changed files is fetched; line-level scoping for pull
//! requests goes through `--diff` against the base branch instead.

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

const API_ROOT: &str = "https://api.github.com";
const PER_PAGE: usize = 100;
const USER_AGENT: &str = concat!("guidelint/", env!("CARGO_PKG_VERSION"));

/// A pull request addressed as `owner/repo/number`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Pull request number.
    pub number: u64,
}

impl FromStr for PullRequestRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("expected OWNER/REPO/NUMBER, got `{s}`");
        let mut parts = s.split('/');
        let (Some(owner), Some(repo), Some(number), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        if owner.is_empty() || repo.is_empty() {
            return Err(invalid());
        }
        let number = number.parse().map_err(|_| invalid())?;
        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number,
        })
    }
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// Errors fetching a pull request's files.
#[derive(Debug, thiserror::Error)]
pub enum GithubError {
    /// Transport or decoding failure.
    #[error("GitHub request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("GitHub returned {status} for {url}")]
    Status {
        /// Response status.
        status: reqwest::StatusCode,
        /// Requested URL.
        url: String,
    },
}

#[derive(Debug, Deserialize)]
struct PullRequestFile {
    filename: String,
    status: String,
}

/// Lists the files a pull request touches, removed files excluded.
///
/// # Errors
///
/// Returns [`GithubError`] if any page cannot be fetched.
pub fn pull_request_files(
    pr: &PullRequestRef,
    token: Option<&str>,
) -> Result<Vec<PathBuf>, GithubError> {
    let client = reqwest::blocking::Client::new();
    let mut files = Vec::new();

    for page in 1.. {
        let url = page_url(pr, page);
        debug!("Fetching {url}");

        let mut request = client
            .get(&url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = token {
            request = request.header("Authorization", format!("token {token}"));
        }

        let response = request.send()?;
        if !response.status().is_success() {
            return Err(GithubError::Status {
                status: response.status(),
                url,
            });
        }

        let entries: Vec<PullRequestFile> = response.json()?;
        let last_page = entries.len() < PER_PAGE;
        files.extend(kept_files(entries));
        if last_page {
            break;
        }
    }

    debug!("{pr} touches {} files", files.len());
    Ok(files)
}

fn page_url(pr: &PullRequestRef, page: usize) -> String {
    format!(
        "{API_ROOT}/repos/{}/{}/pulls/{}/files?per_page={PER_PAGE}&page={page}",
        pr.owner, pr.repo, pr.number
    )
}

fn kept_files(entries: Vec<PullRequestFile>) -> impl Iterator<Item = PathBuf> {
    entries
        .into_iter()
        .filter(|f| f.status != "removed")
        .map(|f| PathBuf::from(f.filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_owner_repo_number() {
        let pr: PullRequestRef = "acme/engine/42".parse().unwrap();
        assert_eq!(pr.owner, "acme");
        assert_eq!(pr.repo, "engine");
        assert_eq!(pr.number, 42);
        assert_eq!(pr.to_string(), "acme/engine#42");
    }

    #[test]
    fn rejects_malformed_references() {
        for bad in ["acme/engine", "acme/engine/x", "/engine/1", "a/b/1/2", ""] {
            assert!(bad.parse::<PullRequestRef>().is_err(), "{bad}");
        }
    }

    #[test]
    fn page_urls_are_paginated() {
        let pr: PullRequestRef = "acme/engine/7".parse().unwrap();
        assert_eq!(
            page_url(&pr, 2),
            "https://api.github.com/repos/acme/engine/pulls/7/files?per_page=100&page=2"
        );
    }

    #[test]
    fn removed_files_are_dropped() {
        let entries: Vec<PullRequestFile> = serde_json::from_str(
            r#"[
                {"filename": "src/a.cpp", "status": "modified", "additions": 3},
                {"filename": "src/old.cpp", "status": "removed"},
                {"filename": "inc/b.h", "status": "added"}
            ]"#,
        )
        .unwrap();
        let files: Vec<PathBuf> = kept_files(entries).collect();
        assert_eq!(files, vec![PathBuf::from("src/a.cpp"), PathBuf::from("inc/b.h")]);
    }
}
