use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    PatchesError, Result,
    forge::types::{
        ForgeCommit, Issue, IssueEvent, IssueState, Milestone, PullRequest,
        PullRequestLinks,
    },
};

#[derive(Debug, Deserialize)]
pub struct GithubMilestone {
    pub number: u64,
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct GithubIssuePullRequest {
    pub html_url: Option<String>,
    pub patch_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GithubIssue {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub closed_at: Option<DateTime<Utc>>,
    pub pull_request: Option<GithubIssuePullRequest>,
}

#[derive(Debug, Deserialize)]
pub struct GithubPullRequest {
    pub number: u64,
    pub merged: Option<bool>,
    pub commits: Option<u64>,
    pub html_url: String,
    pub patch_url: String,
}

#[derive(Debug, Deserialize)]
pub struct GithubGitAuthor {
    pub date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct GithubCommitDetail {
    pub author: Option<GithubGitAuthor>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct GithubParent {
    pub sha: String,
}

#[derive(Debug, Deserialize)]
pub struct GithubCommit {
    pub sha: String,
    pub url: String,
    pub html_url: String,
    pub commit: GithubCommitDetail,
    pub parents: Vec<GithubParent>,
}

#[derive(Debug, Deserialize)]
pub struct GithubIssueEvent {
    pub event: String,
    pub commit_id: Option<String>,
    pub commit_url: Option<String>,
}

impl From<GithubMilestone> for Milestone {
    fn from(milestone: GithubMilestone) -> Self {
        Self {
            number: milestone.number,
            title: milestone.title,
        }
    }
}

impl From<GithubIssue> for Issue {
    fn from(issue: GithubIssue) -> Self {
        let state = if issue.state == "closed" {
            IssueState::Closed
        } else {
            IssueState::Open
        };

        let pull_request = issue.pull_request.map(|pr| PullRequestLinks {
            html_url: pr.html_url.unwrap_or_default(),
            patch_url: pr.patch_url.unwrap_or_default(),
        });

        Self {
            number: issue.number,
            title: issue.title,
            state,
            closed_at: issue.closed_at,
            pull_request,
        }
    }
}

impl From<GithubPullRequest> for PullRequest {
    fn from(pr: GithubPullRequest) -> Self {
        Self {
            number: pr.number,
            merged: pr.merged.unwrap_or(false),
            commits: pr.commits.unwrap_or_default(),
            html_url: pr.html_url,
            patch_url: pr.patch_url,
        }
    }
}

impl From<GithubIssueEvent> for IssueEvent {
    fn from(event: GithubIssueEvent) -> Self {
        Self {
            event: event.event,
            commit_id: event.commit_id,
            commit_url: event.commit_url,
        }
    }
}

impl TryFrom<GithubCommit> for ForgeCommit {
    type Error = PatchesError;

    fn try_from(commit: GithubCommit) -> Result<Self> {
        let author = commit.commit.author.ok_or_else(|| {
            PatchesError::forge(format!(
                "commit {} has no author information",
                commit.sha
            ))
        })?;

        Ok(Self {
            sha: commit.sha,
            authored_at: author.date,
            message: commit.commit.message,
            parents: commit.parents.into_iter().map(|p| p.sha).collect(),
            url: commit.url,
            html_url: commit.html_url,
        })
    }
}
