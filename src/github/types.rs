use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::GitHubError;

/// Length of the abbreviated commit id used in tracking-issue markers.
///
/// Collisions inside one inspected window are not detected.
pub const SHORT_SHA_LEN: usize = 7;

/// Abbreviate a commit sha to [`SHORT_SHA_LEN`] characters.
pub fn short_sha(sha: &str) -> &str {
    sha.get(..SHORT_SHA_LEN).unwrap_or(sha)
}

/// An `owner/name` repository reference.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl FromStr for RepoRef {
    type Err = GitHubError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let (owner, name) = trimmed
            .split_once('/')
            .ok_or_else(|| GitHubError::InvalidRepo(raw.to_string()))?;
        let owner = owner.trim();
        let name = name.trim();
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(GitHubError::InvalidRepo(raw.to_string()));
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl TryFrom<String> for RepoRef {
    type Error = GitHubError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Issue state, used both as a listing filter and as the state of a fetched issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
    All,
}

impl IssueState {
    pub fn as_query(self) -> &'static str {
        match self {
            IssueState::Open => "open",
            IssueState::Closed => "closed",
            IssueState::All => "all",
        }
    }
}

/// Who made a commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitAuthor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// ISO-8601 author date as reported by GitHub
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// GitHub login, when the author is linked to an account
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
}

/// A commit from the source repository's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
    pub sha: String,
    pub message: String,
    pub author: CommitAuthor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
}

impl CommitRecord {
    pub fn short_sha(&self) -> &str {
        short_sha(&self.sha)
    }

    /// First line of the commit message.
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("").trim()
    }
}

/// An issue in the target repository. Titles carrying a `[commit:<sha>]`
/// marker record which source commits already have a port under way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingIssue {
    pub number: u64,
    pub title: String,
    pub state: IssueState,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

// Wire shapes of GET /repos/{owner}/{repo}/commits entries.

#[derive(Debug, Deserialize)]
pub(super) struct CommitPayload {
    sha: String,
    commit: CommitDetail,
    #[serde(default)]
    author: Option<UserPayload>,
    #[serde(default)]
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    message: String,
    #[serde(default)]
    author: Option<GitIdentity>,
}

#[derive(Debug, Deserialize)]
struct GitIdentity {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    login: String,
}

impl From<CommitPayload> for CommitRecord {
    fn from(payload: CommitPayload) -> Self {
        let identity = payload.commit.author;
        let author = CommitAuthor {
            name: identity
                .as_ref()
                .and_then(|id| id.name.clone())
                .unwrap_or_default(),
            email: identity.as_ref().and_then(|id| id.email.clone()),
            date: identity.and_then(|id| id.date),
            login: payload.author.map(|user| user.login),
        };

        CommitRecord {
            sha: payload.sha,
            message: payload.commit.message,
            author,
            html_url: payload.html_url,
        }
    }
}
