//! Loads a milestone and splits its closed entries into issues and pull
//! requests.
use log::*;

use crate::{
    PatchesError, Result,
    forge::{
        traits::Forge,
        types::{Issue, Milestone, PullRequest},
    },
};

/// A merged pull request together with its issue view, which carries the
/// close timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestonePull {
    pub issue: Issue,
    pub pr: PullRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneContents {
    pub milestone: Milestone,
    /// Closed issues that are not pull requests, ordered by close time.
    pub issues: Vec<Issue>,
    /// Merged pull requests, ordered by close time.
    pub pulls: Vec<MilestonePull>,
}

impl MilestoneContents {
    pub fn pull_requests(&self) -> Vec<PullRequest> {
        self.pulls.iter().map(|p| p.pr.clone()).collect()
    }
}

/// Fetch a milestone's closed issues and pull requests.
///
/// A pull request that was closed without being merged has no commits to
/// carry over and is reported as a fatal configuration problem.
pub async fn load_milestone(
    forge: &dyn Forge,
    number: u64,
) -> Result<MilestoneContents> {
    let milestone = forge.get_milestone(number).await?;
    info!(
        "loading milestone {:?} from {}",
        milestone.title,
        forge.repo_name()
    );

    let mut closed = forge.list_closed_issues(number).await?;
    closed.sort_by_key(|issue| (issue.closed_at, issue.number));

    let mut issues = vec![];
    let mut pulls = vec![];

    for issue in closed {
        if !issue.is_pull_request() {
            issues.push(issue);
            continue;
        }

        let pr = forge.get_pull_request(issue.number).await?;
        if !pr.merged {
            return Err(PatchesError::UnmergedPullRequest {
                pr: pr.number,
                url: pr.html_url,
            });
        }

        pulls.push(MilestonePull { issue, pr });
    }

    info!(
        "milestone {:?}: {} issues, {} pull requests",
        milestone.title,
        issues.len(),
        pulls.len()
    );

    Ok(MilestoneContents {
        milestone,
        issues,
        pulls,
    })
}
