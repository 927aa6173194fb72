//! Cross-checks a milestone's closed issues against its merged pull requests.
use log::*;
use std::collections::{BTreeMap, btree_map::Entry};

use crate::{
    Result,
    error::IntegrityError,
    forge::{
        traits::Forge,
        types::{Issue, PullRequest},
    },
    provenance::{
        closure::{ClosingCommit, ClosingCommitResolver, ClosingStrategy},
        guard::RepositoryGuard,
        merge::{MergeResolver, ResolvedCommits},
    },
    warning::Warning,
};

/// Landed commit SHA to the pull request that contributed it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvenanceMapping {
    owners: BTreeMap<String, u64>,
}

impl ProvenanceMapping {
    /// Record that `pr` landed `sha`. A SHA can only be claimed once.
    pub fn claim(&mut self, sha: &str, pr: u64) -> Result<()> {
        match self.owners.entry(sha.to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(pr);
                Ok(())
            }
            Entry::Occupied(entry) => Err(IntegrityError::DuplicateCommit {
                sha: sha.to_string(),
                first_pr: *entry.get(),
                second_pr: pr,
            }
            .into()),
        }
    }

    pub fn owner(&self, sha: &str) -> Option<u64> {
        self.owners.get(sha).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.owners.iter().map(|(sha, pr)| (sha.as_str(), *pr))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageReport {
    pub mapping: ProvenanceMapping,
    /// Resolved commits per pull request, by ascending PR number.
    pub resolved: Vec<ResolvedCommits>,
    pub warnings: Vec<Warning>,
}

impl CoverageReport {
    pub fn resolved_for(&self, pr: u64) -> Option<&ResolvedCommits> {
        self.resolved.iter().find(|r| r.pr == pr)
    }
}

pub struct CoverageVerifier<'a> {
    merges: MergeResolver<'a>,
    closures: Box<dyn ClosingCommitResolver + 'a>,
}

impl<'a> CoverageVerifier<'a> {
    pub fn new(
        forge: &'a dyn Forge,
        guard: &'a RepositoryGuard,
        strategy: ClosingStrategy,
    ) -> Self {
        Self {
            merges: MergeResolver::new(forge, guard),
            closures: strategy.resolver(forge, guard),
        }
    }

    pub async fn verify(
        &self,
        issues: &[Issue],
        pulls: &[PullRequest],
    ) -> Result<CoverageReport> {
        let mut pulls = pulls.iter().collect::<Vec<_>>();
        pulls.sort_by_key(|pr| pr.number);

        let mut issues = issues.iter().collect::<Vec<_>>();
        issues.sort_by_key(|issue| issue.number);

        let mut mapping = ProvenanceMapping::default();
        let mut resolved = Vec::with_capacity(pulls.len());
        let mut warnings = vec![];

        for pr in pulls {
            let commits = self.merges.resolve(pr).await?;
            for sha in commits.shas.iter() {
                mapping.claim(sha, pr.number)?;
            }
            warnings.extend(commits.warnings.iter().cloned());
            resolved.push(commits);
        }

        for (sha, pr) in mapping.iter() {
            debug!("{sha} -> PR #{pr}");
        }

        for issue in issues {
            let sha = match self.closures.resolve_closing_commit(issue).await? {
                ClosingCommit::Found(sha) => sha,
                ClosingCommit::Missing(warning) => {
                    warnings.push(warning);
                    continue;
                }
            };

            match mapping.owner(&sha) {
                Some(pr) => {
                    debug!("issue #{} covered by PR #{pr}", issue.number)
                }
                None => warnings.push(
                    Warning::UncoveredIssue {
                        issue: issue.number,
                        sha,
                    }
                    .emit(),
                ),
            }
        }

        Ok(CoverageReport {
            mapping,
            resolved,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        TestRepository, commit, create_test_guard, issue, merged_event,
        pull_request, reference,
    };

    fn rebased_milestone() -> TestRepository {
        TestRepository::default()
            .with_commits(vec![
                commit("base", 0, "Base", &[]),
                commit("a1", 1, "First", &["base"]),
                commit("a2", 2, "Second", &["a1"]),
                commit("a3", 3, "Third", &["a2"]),
                commit("b1", 4, "Fourth", &["a3"]),
            ])
            .with_pull(
                pull_request(55, 3),
                vec![
                    commit("p1", 1, "First", &[]),
                    commit("p2", 2, "Second", &["p1"]),
                    commit("p3", 3, "Third", &["p2"]),
                ],
                vec![merged_event("a3")],
            )
            .with_pull(
                pull_request(61, 1),
                vec![commit("q1", 4, "Fourth", &[])],
                vec![merged_event("b1")],
            )
            .with_closing_references(100, vec![reference(55, Some("a3"))])
    }

    #[test]
    fn mapping_rejects_second_claim() {
        let mut mapping = ProvenanceMapping::default();
        mapping.claim("abc", 1).unwrap();
        mapping.claim("def", 1).unwrap();

        let err = mapping.claim("abc", 2).unwrap_err();

        assert_eq!(
            err.as_integrity(),
            Some(&IntegrityError::DuplicateCommit {
                sha: "abc".into(),
                first_pr: 1,
                second_pr: 2,
            })
        );
        assert_eq!(mapping.owner("abc"), Some(1));
        assert_eq!(
            mapping.iter().collect::<Vec<_>>(),
            vec![("abc", 1), ("def", 1)]
        );
    }

    #[tokio::test]
    async fn issue_closed_by_rebased_commit_is_covered() {
        let forge = rebased_milestone().into_mock();
        let guard = create_test_guard();
        let verifier =
            CoverageVerifier::new(&forge, &guard, ClosingStrategy::References);

        let report = verifier
            .verify(
                &[issue(100, 10)],
                &[pull_request(61, 1), pull_request(55, 3)],
            )
            .await
            .unwrap();

        assert!(report.warnings.is_empty());
        assert_eq!(report.mapping.owner("a1"), Some(55));
        assert_eq!(report.mapping.owner("a3"), Some(55));
        assert_eq!(report.mapping.owner("b1"), Some(61));
        assert_eq!(report.resolved[0].pr, 55);
        assert_eq!(
            report.resolved_for(55).unwrap().shas,
            vec!["a1", "a2", "a3"]
        );
    }

    #[tokio::test]
    async fn verification_is_repeatable() {
        let forge = rebased_milestone()
            .with_closing_references(101, vec![reference(99, Some("zzz"))])
            .into_mock();
        let guard = create_test_guard();
        let verifier =
            CoverageVerifier::new(&forge, &guard, ClosingStrategy::References);

        let issues = [issue(101, 11), issue(100, 10)];
        let pulls = [pull_request(55, 3), pull_request(61, 1)];

        let first = verifier.verify(&issues, &pulls).await.unwrap();
        let second = verifier
            .verify(&[issue(100, 10), issue(101, 11)], &pulls)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(
            first.warnings,
            vec![Warning::UncoveredIssue {
                issue: 101,
                sha: "zzz".into(),
            }]
        );
    }

    #[tokio::test]
    async fn overlapping_pull_requests_abort_verification() {
        // both PRs report a3 as their merge point
        let forge = rebased_milestone()
            .with_pull(
                pull_request(62, 1),
                vec![commit("r1", 3, "Third", &[])],
                vec![merged_event("a3")],
            )
            .into_mock();
        let guard = create_test_guard();
        let verifier =
            CoverageVerifier::new(&forge, &guard, ClosingStrategy::References);

        let err = verifier
            .verify(&[], &[pull_request(62, 1), pull_request(55, 3)])
            .await
            .unwrap_err();

        assert_eq!(
            err.as_integrity(),
            Some(&IntegrityError::DuplicateCommit {
                sha: "a3".into(),
                first_pr: 55,
                second_pr: 62,
            })
        );
    }

    #[tokio::test]
    async fn closed_without_reference_is_carried_into_report() {
        let forge = rebased_milestone()
            .with_closing_references(102, vec![])
            .into_mock();
        let guard = create_test_guard();
        let verifier =
            CoverageVerifier::new(&forge, &guard, ClosingStrategy::References);

        let report = verifier
            .verify(&[issue(102, 12)], &[pull_request(55, 3)])
            .await
            .unwrap();

        assert_eq!(
            report.warnings,
            vec![Warning::ClosedWithoutReference { issue: 102 }]
        );
    }
}
