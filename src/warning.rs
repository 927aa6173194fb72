//! Non-fatal findings surfaced to the operator for manual follow-up.
use std::fmt;

/// Something that could not be confirmed but does not stop the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A commit walked from the merge point did not match any commit on the
    /// pull request branch by author date and message.
    UnconfirmedCommit { pr: u64, sha: String, summary: String },
    /// The issue is closed but nothing in the repository claims to close it.
    ClosedWithoutReference { issue: u64 },
    /// The issue's closing commit does not belong to any milestoned PR.
    UncoveredIssue { issue: u64, sha: String },
}

impl Warning {
    /// Log this warning and hand it back, so call sites can log and collect
    /// in one step.
    pub fn emit(self) -> Self {
        log::warn!("{self}");
        self
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnconfirmedCommit { pr, sha, summary } => write!(
                f,
                "could not find commit {sha} ({summary:?}) from PR #{pr}: squashed?"
            ),
            Warning::ClosedWithoutReference { issue } => write!(
                f,
                "issue #{issue} was closed, but could not find associated PR"
            ),
            Warning::UncoveredIssue { issue, sha } => write!(
                f,
                "could not find a PR that closed issue #{issue} ({sha})"
            ),
        }
    }
}
