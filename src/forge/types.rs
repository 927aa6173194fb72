use chrono::{DateTime, Utc};

/// Milestone grouping the issues and pull requests of a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Milestone {
    pub number: u64,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueState {
    Open,
    Closed,
}

/// Links present when an issue is actually a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestLinks {
    pub html_url: String,
    pub patch_url: String,
}

/// Snapshot of an issue (or pull request viewed as an issue).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub state: IssueState,
    pub closed_at: Option<DateTime<Utc>>,
    pub pull_request: Option<PullRequestLinks>,
}

impl Issue {
    pub fn is_closed(&self) -> bool {
        self.state == IssueState::Closed
    }

    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

/// Pull request details needed to resolve what landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    pub merged: bool,
    /// Number of commits on the pull request branch.
    pub commits: u64,
    pub html_url: String,
    pub patch_url: String,
}

/// Normalized commit returned from the forge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForgeCommit {
    pub sha: String,
    pub authored_at: DateTime<Utc>,
    pub message: String,
    pub parents: Vec<String>,
    /// API URL of the commit.
    pub url: String,
    /// Web URL of the commit.
    pub html_url: String,
}

impl ForgeCommit {
    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }
}

/// Entry of an issue or pull request event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueEvent {
    pub event: String,
    pub commit_id: Option<String>,
    pub commit_url: Option<String>,
}

/// Pull request reported by the forge as closing an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosingReference {
    pub permalink: String,
    pub merge_commit: Option<String>,
}
