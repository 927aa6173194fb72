//! Common test helper functions shared across test modules.
//!
//! [`TestRepository`] describes a small forge repository in memory and turns
//! it into a [`MockForge`] that answers every read the tool makes.
use chrono::{DateTime, Duration, TimeZone, Utc};
use secrecy::SecretString;
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use crate::{
    PatchesError,
    forge::{
        config::RemoteConfig,
        traits::MockForge,
        types::{
            ClosingReference, ForgeCommit, Issue, IssueEvent, IssueState,
            Milestone, PullRequest, PullRequestLinks,
        },
    },
    milestone::MilestonePull,
    provenance::guard::RepositoryGuard,
};

const API_COMMITS: &str = "https://api.github.com/repos/test/repo/commits";
const WEB_BASE: &str = "https://github.com/test/repo";

/// Creates a test RemoteConfig for `https://github.com/test/repo`.
pub fn create_test_remote_config() -> RemoteConfig {
    RemoteConfig {
        host: "github.com".to_string(),
        scheme: "https".to_string(),
        owner: "test".to_string(),
        repo: "repo".to_string(),
        token: SecretString::from("test-token".to_string()),
    }
}

pub fn create_test_guard() -> RepositoryGuard {
    RepositoryGuard::new(&create_test_remote_config())
}

/// 2024-03-01T00:00:00Z plus `minutes`.
pub fn timestamp(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        + Duration::minutes(minutes)
}

/// A commit of the test repository authored `minutes` into the test epoch.
pub fn commit(
    sha: &str,
    minutes: i64,
    message: &str,
    parents: &[&str],
) -> ForgeCommit {
    ForgeCommit {
        sha: sha.to_string(),
        authored_at: timestamp(minutes),
        message: message.to_string(),
        parents: parents.iter().map(|p| p.to_string()).collect(),
        url: format!("{API_COMMITS}/{sha}"),
        html_url: format!("{WEB_BASE}/commit/{sha}"),
    }
}

/// A merged pull request with `commits` commits.
pub fn pull_request(number: u64, commits: u64) -> PullRequest {
    PullRequest {
        number,
        merged: true,
        commits,
        html_url: format!("{WEB_BASE}/pull/{number}"),
        patch_url: format!("{WEB_BASE}/pull/{number}.patch"),
    }
}

/// A closed issue that is not a pull request.
pub fn issue(number: u64, closed_minutes: i64) -> Issue {
    Issue {
        number,
        title: format!("Issue {number}"),
        state: IssueState::Closed,
        closed_at: Some(timestamp(closed_minutes)),
        pull_request: None,
    }
}

/// The issue view of a closed pull request.
pub fn pull_issue(number: u64, closed_minutes: i64) -> Issue {
    Issue {
        title: format!("PR {number}"),
        pull_request: Some(PullRequestLinks {
            html_url: format!("{WEB_BASE}/pull/{number}"),
            patch_url: format!("{WEB_BASE}/pull/{number}.patch"),
        }),
        ..issue(number, closed_minutes)
    }
}

pub fn milestone_pull(
    number: u64,
    commits: u64,
    closed_minutes: i64,
) -> MilestonePull {
    MilestonePull {
        issue: pull_issue(number, closed_minutes),
        pr: pull_request(number, commits),
    }
}

pub fn event(kind: &str) -> IssueEvent {
    IssueEvent {
        event: kind.to_string(),
        commit_id: None,
        commit_url: None,
    }
}

pub fn merged_event(sha: &str) -> IssueEvent {
    IssueEvent {
        event: "merged".to_string(),
        commit_id: Some(sha.to_string()),
        commit_url: Some(format!("{API_COMMITS}/{sha}")),
    }
}

pub fn closed_event(sha: Option<&str>) -> IssueEvent {
    IssueEvent {
        event: "closed".to_string(),
        commit_id: sha.map(String::from),
        commit_url: sha.map(|sha| format!("{API_COMMITS}/{sha}")),
    }
}

pub fn reference(pr: u64, merge_commit: Option<&str>) -> ClosingReference {
    ClosingReference {
        permalink: format!("{WEB_BASE}/pull/{pr}"),
        merge_commit: merge_commit.map(String::from),
    }
}

/// Minimal `git format-patch` output for a one line change.
pub fn patch_text(subject: &str) -> String {
    format!(
        "From 0000000000000000000000000000000000000000 Mon Sep 17 00:00:00 2001\n\
         From: Dev <dev@example.com>\n\
         Date: Fri, 1 Mar 2024 00:00:00 +0000\n\
         Subject: [PATCH] {subject}\n\
         \n\
         Details about {subject}.\n\
         ---\n \
         notes.txt | 1 +\n \
         1 file changed, 1 insertion(+)\n\
         \n\
         diff --git a/notes.txt b/notes.txt\n\
         --- a/notes.txt\n\
         +++ b/notes.txt\n\
         @@ -0,0 +1 @@\n\
         +{subject}\n\
         -- \n\
         2.43.0\n"
    )
}

/// In-memory repository served through a [`MockForge`].
#[derive(Default, Clone)]
pub struct TestRepository {
    milestones: HashMap<u64, Milestone>,
    issues: Vec<Issue>,
    commits: HashMap<String, ForgeCommit>,
    pulls: HashMap<u64, PullRequest>,
    pr_commits: HashMap<u64, Vec<ForgeCommit>>,
    events: HashMap<u64, Vec<IssueEvent>>,
    references: HashMap<u64, Vec<ClosingReference>>,
    patches: HashMap<String, String>,
    fetches: Option<Arc<AtomicUsize>>,
}

impl TestRepository {
    pub fn with_milestone(mut self, number: u64, title: &str) -> Self {
        self.milestones.insert(
            number,
            Milestone {
                number,
                title: title.to_string(),
            },
        );
        self
    }

    /// Closed issues and pull requests returned for every milestone.
    pub fn with_issues(mut self, issues: Vec<Issue>) -> Self {
        self.issues.extend(issues);
        self
    }

    /// Commits on the target branch.
    pub fn with_commits(mut self, commits: Vec<ForgeCommit>) -> Self {
        for commit in commits {
            self.commits.insert(commit.sha.clone(), commit);
        }
        self
    }

    pub fn with_pull(
        mut self,
        pr: PullRequest,
        commits: Vec<ForgeCommit>,
        events: Vec<IssueEvent>,
    ) -> Self {
        self.pr_commits.insert(pr.number, commits);
        self.events.insert(pr.number, events);
        self.pulls.insert(pr.number, pr);
        self
    }

    pub fn with_issue_events(
        mut self,
        number: u64,
        events: Vec<IssueEvent>,
    ) -> Self {
        self.events.insert(number, events);
        self
    }

    pub fn with_closing_references(
        mut self,
        issue: u64,
        references: Vec<ClosingReference>,
    ) -> Self {
        self.references.insert(issue, references);
        self
    }

    /// Patch text served at the web URL of commit `sha`. Commits without
    /// patch text answer with a 404.
    pub fn with_patch(mut self, sha: &str, text: String) -> Self {
        self.patches
            .insert(format!("{WEB_BASE}/commit/{sha}.patch"), text);
        self
    }

    /// Make the download of commit `sha` answer with a 404.
    pub fn without_patch(mut self, sha: &str) -> Self {
        self.patches.remove(&format!("{WEB_BASE}/commit/{sha}.patch"));
        self
    }

    /// Count every patch download in `counter`.
    pub fn counting_fetches(mut self, counter: Arc<AtomicUsize>) -> Self {
        self.fetches = Some(counter);
        self
    }

    pub fn into_mock(self) -> MockForge {
        let mut mock = MockForge::new();

        mock.expect_repo_name().returning(|| "test/repo".to_string());

        let milestones = self.milestones;
        mock.expect_get_milestone().returning(move |number| {
            milestones.get(&number).cloned().ok_or_else(|| {
                PatchesError::forge(format!("no milestone {number}"))
            })
        });

        let issues = self.issues;
        mock.expect_list_closed_issues()
            .returning(move |_| Ok(issues.clone()));

        let pulls = self.pulls;
        mock.expect_get_pull_request().returning(move |number| {
            pulls
                .get(&number)
                .cloned()
                .ok_or_else(|| PatchesError::forge(format!("no PR #{number}")))
        });

        let pr_commits = self.pr_commits;
        mock.expect_list_pr_commits().returning(move |number| {
            Ok(pr_commits.get(&number).cloned().unwrap_or_default())
        });

        let events = self.events;
        mock.expect_list_issue_events().returning(move |number| {
            Ok(events.get(&number).cloned().unwrap_or_default())
        });

        let commits = Arc::new(self.commits);

        let lookup = commits.clone();
        mock.expect_get_commit().returning(move |sha| {
            lookup
                .get(sha)
                .cloned()
                .ok_or_else(|| PatchesError::forge(format!("no commit {sha}")))
        });

        // first-parent history, newest first
        let history = commits;
        mock.expect_list_commits().returning(move |sha, limit| {
            let mut walked = vec![];
            let mut next = history.get(sha);
            while let Some(commit) = next {
                if walked.len() as u64 >= limit {
                    break;
                }
                walked.push(commit.clone());
                next = commit.parents.first().and_then(|p| history.get(p));
            }
            Ok(walked)
        });

        let references = self.references;
        mock.expect_closing_references().returning(move |issue| {
            Ok(references.get(&issue).cloned().unwrap_or_default())
        });

        let patches = self.patches;
        let fetches = self.fetches;
        mock.expect_fetch_patch().returning(move |url| {
            if let Some(counter) = &fetches {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            patches
                .get(url)
                .cloned()
                .ok_or_else(|| PatchesError::transport(404, url))
        });

        mock
    }
}
