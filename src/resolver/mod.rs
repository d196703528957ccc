pub mod marker;
pub mod types;

pub use types::CommitToPort;

use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::ResolverConfig;
use crate::diff::{self, CommitDiffSummary, FileStatus};
use crate::github::batch::fetch_file_contents;
use crate::github::{CommitRecord, GitHubError, IssueState, RepoRef, RepositoryHost};
use marker::ProcessedCommits;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Failed to fetch commits from {repo}: {source}")]
    Commits { repo: String, source: GitHubError },

    #[error("Failed to fetch issues from {repo}: {source}")]
    Issues { repo: String, source: GitHubError },

    #[error("Failed to fetch diff for commit {sha}: {source}")]
    Diff { sha: String, source: GitHubError },
}

/// Finds source commits that still need porting.
///
/// One resolver is built per run; it carries the host handle and settings so
/// no state outlives the run.
pub struct Resolver<'a, H: RepositoryHost + ?Sized> {
    host: &'a H,
    settings: ResolverConfig,
}

impl<'a, H: RepositoryHost + ?Sized> Resolver<'a, H> {
    pub fn new(host: &'a H, settings: ResolverConfig) -> Self {
        Self { host, settings }
    }

    /// Find the oldest commit among the `max_items` most recent commits of
    /// `source` that no tracking issue among the `max_items` most recent issues
    /// of `target` refers to.
    ///
    /// Returns `Ok(None)` when there is nothing to port. Listing failures and
    /// a failed diff fetch for the selected commit are errors; a failed file
    /// content fetch only leaves that file's content empty.
    #[instrument(skip(self, source, target), fields(source = %source, target = %target))]
    pub async fn find_next_commit_to_port(
        &self,
        source: &RepoRef,
        target: &RepoRef,
        max_items: usize,
    ) -> Result<Option<CommitToPort>, ResolveError> {
        let commits = self
            .host
            .list_commits(source, max_items)
            .await
            .map_err(|error| ResolveError::Commits {
                repo: source.to_string(),
                source: error,
            })?;
        if commits.is_empty() {
            info!("source repository has no commits in the inspected window");
            return Ok(None);
        }

        let issues = self
            .host
            .list_issues(target, IssueState::All, max_items)
            .await
            .map_err(|error| ResolveError::Issues {
                repo: target.to_string(),
                source: error,
            })?;

        let processed = ProcessedCommits::from_titles(issues.iter().map(|i| i.title.as_str()));
        debug!(
            commits = commits.len(),
            issues = issues.len(),
            processed = processed.len(),
            "built processed commit set"
        );
        if processed.is_empty() {
            debug!("no issue title carries a commit marker");
        }

        let Some(commit) = oldest_unprocessed(commits, &processed) else {
            info!("every inspected commit already has a tracking issue");
            return Ok(None);
        };
        info!(sha = %commit.short_sha(), subject = %commit.subject(), "found commit to port");

        let summary = self.commit_diff(source, &commit.sha).await?;
        let contents = if self.settings.fetch_file_contents {
            self.fetch_contents(source, &commit.sha, &summary).await
        } else {
            HashMap::new()
        };

        Ok(Some(CommitToPort::new(commit, summary, contents)))
    }

    /// Fetch and summarize the diff of a single commit.
    #[instrument(skip(self, repo), fields(repo = %repo))]
    pub async fn commit_diff(
        &self,
        repo: &RepoRef,
        sha: &str,
    ) -> Result<CommitDiffSummary, ResolveError> {
        let raw_diff = self
            .host
            .fetch_commit_diff(repo, sha)
            .await
            .map_err(|error| ResolveError::Diff {
                sha: sha.to_string(),
                source: error,
            })?;

        let summary = diff::parse_diff(&raw_diff, self.settings.max_excerpt_lines);
        debug!(
            files = summary.total_files_changed,
            additions = summary.total_additions,
            deletions = summary.total_deletions,
            "parsed commit diff"
        );
        Ok(summary)
    }

    async fn fetch_contents(
        &self,
        repo: &RepoRef,
        sha: &str,
        summary: &CommitDiffSummary,
    ) -> HashMap<String, Option<String>> {
        let paths: Vec<String> = summary
            .files
            .iter()
            .filter(|file| file.status != FileStatus::Deleted)
            .map(|file| file.path.clone())
            .collect();

        fetch_file_contents(
            self.host,
            repo,
            &paths,
            Some(sha),
            self.settings.fetch_concurrency,
        )
        .await
        .into_iter()
        .map(|(path, fetched)| (path, fetched.ok()))
        .collect()
    }
}

/// Walk `commits` (newest first, as GitHub lists them) from the oldest end and
/// return the first one not yet claimed.
pub fn oldest_unprocessed(
    commits: Vec<CommitRecord>,
    processed: &ProcessedCommits,
) -> Option<CommitRecord> {
    commits
        .into_iter()
        .rev()
        .find(|commit| !processed.contains_commit(&commit.sha))
}
