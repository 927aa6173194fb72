//! Traits related to remote git forges
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::{
    Result,
    forge::types::{
        ClosingReference, ForgeCommit, Issue, IssueEvent, Milestone,
        PullRequest,
    },
};

/// Read-only view of the forge operations the release tooling consumes.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Forge: Send + Sync {
    /// Repository name, used in log output.
    fn repo_name(&self) -> String;

    async fn get_milestone(&self, number: u64) -> Result<Milestone>;

    /// All closed issues (pull requests included) attached to a milestone.
    async fn list_closed_issues(&self, milestone: u64) -> Result<Vec<Issue>>;

    async fn get_pull_request(&self, number: u64) -> Result<PullRequest>;

    /// Commits on the pull request branch, oldest first.
    async fn list_pr_commits(&self, number: u64) -> Result<Vec<ForgeCommit>>;

    /// Event log of an issue or pull request in chronological order.
    async fn list_issue_events(&self, number: u64) -> Result<Vec<IssueEvent>>;

    async fn get_commit(&self, sha: &str) -> Result<ForgeCommit>;

    /// Up to `limit` commits of history starting at `sha`, newest first.
    async fn list_commits(
        &self,
        sha: &str,
        limit: u64,
    ) -> Result<Vec<ForgeCommit>>;

    /// Pull requests the forge links as closing the issue.
    async fn closing_references(
        &self,
        issue: u64,
    ) -> Result<Vec<ClosingReference>>;

    /// Raw text behind a patch URL. Non-success responses are
    /// [`crate::PatchesError::Transport`] errors.
    async fn fetch_patch(&self, url: &str) -> Result<String>;
}
