//! Commit identity that survives rebasing.
//!
//! Rebasing or merging rewrites a commit's SHA but keeps its author date and
//! message, so the pair is used to recognise a pull request commit after it
//! landed. The pair is not unique: two distinct commits with the same author
//! timestamp and message (bulk-generated "chore" commits, for example) share
//! an identity. [`IdentityIndex`] keeps every SHA per identity so such
//! collisions stay visible instead of one SHA silently replacing another.
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::forge::types::ForgeCommit;

/// Author timestamp and full message of a commit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitIdentity {
    authored_at: DateTime<Utc>,
    message: String,
}

impl CommitIdentity {
    pub fn new(authored_at: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self {
            authored_at,
            message: message.into(),
        }
    }

    pub fn of(commit: &ForgeCommit) -> Self {
        Self::new(commit.authored_at, commit.message.clone())
    }

    pub fn authored_at(&self) -> DateTime<Utc> {
        self.authored_at
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Identities of the commits on a pull request branch.
#[derive(Debug, Default, Clone)]
pub struct IdentityIndex {
    entries: HashMap<CommitIdentity, Vec<String>>,
}

impl IdentityIndex {
    pub fn from_commits(commits: &[ForgeCommit]) -> Self {
        let mut index = Self::default();
        for commit in commits {
            index.insert(CommitIdentity::of(commit), commit.sha.clone());
        }
        index
    }

    fn insert(&mut self, identity: CommitIdentity, sha: impl Into<String>) {
        self.entries.entry(identity).or_default().push(sha.into());
    }

    pub fn contains(&self, identity: &CommitIdentity) -> bool {
        self.entries.contains_key(identity)
    }

    /// Identities shared by more than one commit.
    pub fn collisions(
        &self,
    ) -> impl Iterator<Item = (&CommitIdentity, &[String])> {
        self.entries
            .iter()
            .filter(|(_, shas)| shas.len() > 1)
            .map(|(identity, shas)| (identity, shas.as_slice()))
    }
}
