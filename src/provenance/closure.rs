//! Finds the commit that closed an issue.
use async_trait::async_trait;
use clap::ValueEnum;
use log::*;
use std::{iter::Peekable, vec::IntoIter};

use crate::{
    Result,
    error::IntegrityError,
    forge::{
        traits::Forge,
        types::{Issue, IssueEvent},
    },
    provenance::guard::RepositoryGuard,
    warning::Warning,
};

/// Event kind recorded when an issue is closed.
pub const CLOSED_EVENT: &str = "closed";

/// Outcome of looking up an issue's closing commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClosingCommit {
    Found(String),
    /// Closed, but nothing links it to a commit. The warning has already been
    /// logged.
    Missing(Warning),
}

impl ClosingCommit {
    pub fn sha(&self) -> Option<&str> {
        match self {
            ClosingCommit::Found(sha) => Some(sha),
            ClosingCommit::Missing(_) => None,
        }
    }
}

#[async_trait]
pub trait ClosingCommitResolver: Send + Sync {
    async fn resolve_closing_commit(&self, issue: &Issue)
    -> Result<ClosingCommit>;
}

/// Source used to find closing commits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ClosingStrategy {
    /// Pull requests the forge links as closing the issue
    #[default]
    References,
    /// The issue's own event log
    Events,
}

impl ClosingStrategy {
    pub fn resolver<'a>(
        self,
        forge: &'a dyn Forge,
        guard: &'a RepositoryGuard,
    ) -> Box<dyn ClosingCommitResolver + 'a> {
        match self {
            ClosingStrategy::References => {
                Box::new(ClosingReferenceClosure::new(forge, guard))
            }
            ClosingStrategy::Events => {
                Box::new(EventLogClosure::new(forge, guard))
            }
        }
    }
}

/// Forward-only cursor over an event log with one event of lookahead.
pub struct EventCursor {
    events: Peekable<IntoIter<IssueEvent>>,
}

impl EventCursor {
    pub fn new(events: Vec<IssueEvent>) -> Self {
        Self {
            events: events.into_iter().peekable(),
        }
    }

    /// Consume events up to and including the first one of `kind`.
    pub fn seek(&mut self, kind: &str) -> Option<IssueEvent> {
        self.events.by_ref().find(|e| e.event == kind)
    }

    /// The event after the last one consumed.
    pub fn peek(&mut self) -> Option<&IssueEvent> {
        self.events.peek()
    }
}

fn has_commit(event: &IssueEvent) -> bool {
    event.commit_id.as_deref().is_some_and(|id| !id.is_empty())
}

/// Reads the `closed` event of the issue's event log.
///
/// When the issue is closed from a pull request the `closed` event carries no
/// commit, and the commit appears on the event that follows it.
pub struct EventLogClosure<'a> {
    forge: &'a dyn Forge,
    guard: &'a RepositoryGuard,
}

impl<'a> EventLogClosure<'a> {
    pub fn new(forge: &'a dyn Forge, guard: &'a RepositoryGuard) -> Self {
        Self { forge, guard }
    }
}

#[async_trait]
impl ClosingCommitResolver for EventLogClosure<'_> {
    async fn resolve_closing_commit(
        &self,
        issue: &Issue,
    ) -> Result<ClosingCommit> {
        if !issue.is_closed() {
            return Err(IntegrityError::IssueNotClosed {
                issue: issue.number,
            }
            .into());
        }

        let events = self.forge.list_issue_events(issue.number).await?;
        let mut cursor = EventCursor::new(events);

        let closed = cursor.seek(CLOSED_EVENT).ok_or(
            IntegrityError::IssueNotClosed {
                issue: issue.number,
            },
        )?;

        let chosen = if has_commit(&closed) {
            closed
        } else {
            cursor.peek().cloned().ok_or(
                IntegrityError::ClosedWithoutCommit {
                    issue: issue.number,
                },
            )?
        };

        let (sha, url) = match (chosen.commit_id, chosen.commit_url) {
            (Some(sha), Some(url)) if !sha.is_empty() && !url.is_empty() => {
                (sha, url)
            }
            _ => {
                return Err(IntegrityError::ClosedWithoutCommit {
                    issue: issue.number,
                }
                .into());
            }
        };

        self.guard.check_api_commit_url(
            &url,
            &format!("closed event for issue #{}", issue.number),
        )?;

        debug!("issue #{} closed by {sha}", issue.number);

        Ok(ClosingCommit::Found(sha))
    }
}

/// Asks the forge which pull requests closed the issue and takes the merge
/// commit of the first merged one.
pub struct ClosingReferenceClosure<'a> {
    forge: &'a dyn Forge,
    guard: &'a RepositoryGuard,
}

impl<'a> ClosingReferenceClosure<'a> {
    pub fn new(forge: &'a dyn Forge, guard: &'a RepositoryGuard) -> Self {
        Self { forge, guard }
    }
}

#[async_trait]
impl ClosingCommitResolver for ClosingReferenceClosure<'_> {
    async fn resolve_closing_commit(
        &self,
        issue: &Issue,
    ) -> Result<ClosingCommit> {
        let references = self.forge.closing_references(issue.number).await?;

        let context = format!("closing reference for issue #{}", issue.number);
        for reference in references.iter() {
            self.guard.check_pull_url(&reference.permalink, &context)?;
        }

        let found = references
            .into_iter()
            .find_map(|reference| reference.merge_commit);

        if let Some(sha) = found {
            debug!("issue #{} closed by {sha}", issue.number);
            return Ok(ClosingCommit::Found(sha));
        }

        if !issue.is_closed() {
            return Err(IntegrityError::IssueNotClosed {
                issue: issue.number,
            }
            .into());
        }

        Ok(ClosingCommit::Missing(
            Warning::ClosedWithoutReference {
                issue: issue.number,
            }
            .emit(),
        ))
    }
}
