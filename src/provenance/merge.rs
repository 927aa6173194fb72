//! Resolves the commits a pull request contributed to the target branch.
//!
//! The forge only records the SHA of the event that merged a pull request.
//! Depending on how it was merged that SHA is:
//!
//! - a merge commit whose second parent is the tip of the merged branch,
//! - the last of the rebased commits, or
//! - a single squash commit.
//!
//! History is walked back from the branch tip for as many commits as the pull
//! request had, and each walked commit is matched against the pull request's
//! own commits by [`CommitIdentity`]. If nothing matches the pull request was
//! squashed and only the squash commit can be attributed to it.
use log::*;

use crate::{
    Result,
    error::IntegrityError,
    forge::{traits::Forge, types::PullRequest},
    provenance::{
        guard::RepositoryGuard,
        identity::{CommitIdentity, IdentityIndex},
    },
    warning::Warning,
};

/// Event kind recorded when a pull request is merged.
pub const MERGED_EVENT: &str = "merged";

/// How a pull request reached the target branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// A two-parent merge commit.
    Merge,
    /// Commits replayed on top of the target branch.
    Rebase,
    /// All commits collapsed into one.
    Squash,
}

/// Landed commits attributed to one pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommits {
    pub pr: u64,
    pub strategy: MergeStrategy,
    /// Landed SHAs, oldest first.
    pub shas: Vec<String>,
    /// Walked commits whose identity could not be confirmed.
    pub warnings: Vec<Warning>,
}

pub struct MergeResolver<'a> {
    forge: &'a dyn Forge,
    guard: &'a RepositoryGuard,
}

impl<'a> MergeResolver<'a> {
    pub fn new(forge: &'a dyn Forge, guard: &'a RepositoryGuard) -> Self {
        Self { forge, guard }
    }

    /// SHA recorded on the pull request's `merged` event.
    pub async fn merge_sha(&self, pr: u64) -> Result<String> {
        let events = self.forge.list_issue_events(pr).await?;

        let merged = events
            .into_iter()
            .find(|e| e.event == MERGED_EVENT)
            .ok_or(IntegrityError::NotMerged { pr })?;

        let (commit_id, commit_url) =
            match (merged.commit_id, merged.commit_url) {
                (Some(id), Some(url)) if !id.is_empty() && !url.is_empty() => {
                    (id, url)
                }
                _ => {
                    let err = IntegrityError::MergeWithoutCommit { pr };
                    return Err(err.into());
                }
            };

        self.guard.check_api_commit_url(
            &commit_url,
            &format!("merged event for PR #{pr}"),
        )?;

        Ok(commit_id)
    }

    pub async fn resolve(&self, pr: &PullRequest) -> Result<ResolvedCommits> {
        let pr_commits = self.forge.list_pr_commits(pr.number).await?;
        let index = IdentityIndex::from_commits(&pr_commits);

        for (identity, shas) in index.collisions() {
            debug!(
                "PR #{}: commits {:?} share author date {} and message {:?}",
                pr.number,
                shas,
                identity.authored_at(),
                identity.message().lines().next().unwrap_or_default(),
            );
        }

        let merge_sha = self.merge_sha(pr.number).await?;
        let merge_commit = self.forge.get_commit(&merge_sha).await?;

        let (top_sha, is_merge_commit) = match merge_commit.parents.as_slice()
        {
            // the first parent is the previous tip of the target branch
            [_, branch_tip] => {
                debug!("PR #{} was merged", pr.number);
                (branch_tip.clone(), true)
            }
            parents => {
                if parents.len() > 2 {
                    warn!(
                        "PR #{}: merge commit {merge_sha} has {} parents, treating it as the top commit",
                        pr.number,
                        parents.len()
                    );
                }
                (merge_sha.clone(), false)
            }
        };

        let count = if pr.commits > 0 {
            pr.commits
        } else {
            pr_commits.len() as u64
        };

        let walked = self.forge.list_commits(&top_sha, count).await?;

        let mut warnings = vec![];
        let mut confirmed = 0;
        let mut shas = Vec::with_capacity(walked.len());

        for commit in walked.iter() {
            if index.contains(&CommitIdentity::of(commit)) {
                confirmed += 1;
            } else {
                warnings.push(
                    Warning::UnconfirmedCommit {
                        pr: pr.number,
                        sha: commit.sha.clone(),
                        summary: commit.summary().to_string(),
                    }
                    .emit(),
                );
            }
            shas.push(commit.sha.clone());
        }

        if confirmed == 0 {
            debug!("PR #{} was squashed", pr.number);
            return Ok(ResolvedCommits {
                pr: pr.number,
                strategy: MergeStrategy::Squash,
                shas: vec![top_sha],
                warnings,
            });
        }

        let strategy = if is_merge_commit {
            MergeStrategy::Merge
        } else {
            debug!("PR #{} was rebased + merged", pr.number);
            MergeStrategy::Rebase
        };

        // walked newest first, applied oldest first
        shas.reverse();

        Ok(ResolvedCommits {
            pr: pr.number,
            strategy,
            shas,
            warnings,
        })
    }
}
