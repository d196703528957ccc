pub mod batch;
pub mod types;

pub use types::{CommitRecord, IssueState, RepoRef, TrackingIssue};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{StatusCode, Url};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::Config;
use types::CommitPayload;

const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const DIFF_MEDIA_TYPE: &str = "application/vnd.github.diff";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("GitHub rejected the request with {status}; the token may be invalid")]
    Unauthorized { status: u16 },

    #[error("Not found on GitHub: {0}")]
    NotFound(String),

    #[error("GitHub API returned {status} for {path}")]
    Status { status: u16, path: String },

    #[error("Invalid repository reference '{0}', expected owner/repo")]
    InvalidRepo(String),

    #[error("Invalid GitHub API base URL: {0}")]
    InvalidBaseUrl(String),
}

/// The repository operations the resolver needs from a code host.
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// Most recent commits on the default branch, newest first.
    async fn list_commits(
        &self,
        repo: &RepoRef,
        per_page: usize,
    ) -> Result<Vec<CommitRecord>, GitHubError>;

    /// Most recent issues matching `state`, newest first.
    async fn list_issues(
        &self,
        repo: &RepoRef,
        state: IssueState,
        per_page: usize,
    ) -> Result<Vec<TrackingIssue>, GitHubError>;

    /// Unified diff of a single commit against its parent.
    async fn fetch_commit_diff(&self, repo: &RepoRef, sha: &str) -> Result<String, GitHubError>;

    /// File text at `git_ref`, or at the default branch when `git_ref` is `None`.
    async fn fetch_file_content(
        &self,
        repo: &RepoRef,
        path: &str,
        git_ref: Option<&str>,
    ) -> Result<String, GitHubError>;
}

/// GitHub REST client.
///
/// The token is held for the lifetime of the client and dropped as soon as
/// GitHub answers 401 or 403, so later calls go out unauthenticated instead
/// of repeating a rejected credential.
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: Url,
    token: Mutex<Option<String>>,
}

impl GitHubClient {
    pub fn new(
        api_base: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GitHubError> {
        let api_base =
            Url::parse(api_base).map_err(|_| GitHubError::InvalidBaseUrl(api_base.to_string()))?;
        if api_base.cannot_be_a_base() {
            return Err(GitHubError::InvalidBaseUrl(api_base.to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("commit-porter"));
        headers.insert("x-github-api-version", HeaderValue::from_static("2022-11-28"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        if token.is_none() {
            warn!("no GitHub token configured; requests are unauthenticated and rate limited");
        }

        Ok(Self {
            http,
            api_base,
            token: Mutex::new(token),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, GitHubError> {
        Self::new(
            &config.github.api_base,
            config.github_token(),
            Duration::from_secs(config.github.timeout_secs),
        )
    }

    pub fn has_token(&self) -> bool {
        self.token.lock().map(|token| token.is_some()).unwrap_or(false)
    }

    fn current_token(&self) -> Option<String> {
        self.token.lock().ok().and_then(|token| token.clone())
    }

    fn invalidate_token(&self) {
        if let Ok(mut token) = self.token.lock() {
            *token = None;
        }
    }

    fn repo_url<'a, I>(&self, repo: &RepoRef, tail: I) -> Result<Url, GitHubError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| GitHubError::InvalidBaseUrl(self.api_base.to_string()))?
            .pop_if_empty()
            .extend(["repos", repo.owner.as_str(), repo.name.as_str()])
            .extend(tail);
        Ok(url)
    }

    async fn get(
        &self,
        url: Url,
        accept: &'static str,
        query: &[(&str, String)],
    ) -> Result<reqwest::Response, GitHubError> {
        let path = url.path().to_string();
        let mut request = self.http.get(url).header(ACCEPT, accept).query(query);
        if let Some(token) = self.current_token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(%path, status = status.as_u16(), "GitHub response");

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!(%path, status = status.as_u16(), "GitHub rejected credentials, dropping token");
                self.invalidate_token();
                Err(GitHubError::Unauthorized {
                    status: status.as_u16(),
                })
            }
            StatusCode::NOT_FOUND => Err(GitHubError::NotFound(path)),
            status if !status.is_success() => Err(GitHubError::Status {
                status: status.as_u16(),
                path,
            }),
            _ => Ok(response),
        }
    }
}

#[async_trait]
impl RepositoryHost for GitHubClient {
    #[instrument(skip(self, repo), fields(repo = %repo))]
    async fn list_commits(
        &self,
        repo: &RepoRef,
        per_page: usize,
    ) -> Result<Vec<CommitRecord>, GitHubError> {
        let url = self.repo_url(repo, ["commits"])?;
        let payload = self
            .get(url, JSON_MEDIA_TYPE, &[("per_page", per_page.to_string())])
            .await?
            .json::<Vec<CommitPayload>>()
            .await?;
        debug!(commits = payload.len(), "received commit listing");
        Ok(payload.into_iter().map(CommitRecord::from).collect())
    }

    #[instrument(skip(self, repo), fields(repo = %repo))]
    async fn list_issues(
        &self,
        repo: &RepoRef,
        state: IssueState,
        per_page: usize,
    ) -> Result<Vec<TrackingIssue>, GitHubError> {
        let url = self.repo_url(repo, ["issues"])?;
        let issues = self
            .get(
                url,
                JSON_MEDIA_TYPE,
                &[
                    ("state", state.as_query().to_string()),
                    ("per_page", per_page.to_string()),
                ],
            )
            .await?
            .json::<Vec<TrackingIssue>>()
            .await?;
        debug!(issues = issues.len(), "received issue listing");
        Ok(issues)
    }

    #[instrument(skip(self, repo), fields(repo = %repo))]
    async fn fetch_commit_diff(&self, repo: &RepoRef, sha: &str) -> Result<String, GitHubError> {
        let url = self.repo_url(repo, ["commits", sha])?;
        let diff = self.get(url, DIFF_MEDIA_TYPE, &[]).await?.text().await?;
        debug!(diff_bytes = diff.len(), "received commit diff");
        Ok(diff)
    }

    #[instrument(skip(self, repo), fields(repo = %repo))]
    async fn fetch_file_content(
        &self,
        repo: &RepoRef,
        path: &str,
        git_ref: Option<&str>,
    ) -> Result<String, GitHubError> {
        let url = self.repo_url(
            repo,
            std::iter::once("contents").chain(path.split('/').filter(|s| !s.is_empty())),
        )?;
        let query: Vec<(&str, String)> = git_ref
            .map(|r| vec![("ref", r.to_string())])
            .unwrap_or_default();
        let content = self.get(url, RAW_MEDIA_TYPE, &query).await?.text().await?;
        Ok(content)
    }
}
