//! Common test utilities for pipeline tests.
use std::{path::Path, rc::Rc};

use crate::{
    forge::traits::{Forge, MockForge},
    patch::naming::NamingScheme,
    pipeline::Pipeline,
    provenance::closure::ClosingStrategy,
    test_helpers::{
        TestRepository, commit, create_test_guard, issue, merged_event,
        patch_text, pull_issue, pull_request, reference,
    },
};

pub const MILESTONE: u64 = 7;

/// Milestone 7: issue #100 fixed by PR #55 (rebased as a1..a3) and PR #60
/// merged with a merge commit on top of it.
pub fn milestone_repository() -> TestRepository {
    TestRepository::default()
        .with_milestone(MILESTONE, "1.4.1")
        .with_issues(vec![
            issue(100, 20),
            pull_issue(60, 40),
            pull_issue(55, 10),
        ])
        .with_commits(vec![
            commit("base", 0, "Base", &[]),
            commit("a1", 1, "Parse flags", &["base"]),
            commit("a2", 2, "Validate flags", &["a1"]),
            commit("a3", 3, "Document flags", &["a2"]),
            commit("b1", 30, "Speed up lookup", &["a3"]),
            commit("m1", 31, "Merge pull request #60", &["a3", "b1"]),
        ])
        .with_pull(
            pull_request(55, 3),
            vec![
                commit("p1", 1, "Parse flags", &[]),
                commit("p2", 2, "Validate flags", &["p1"]),
                commit("p3", 3, "Document flags", &["p2"]),
            ],
            vec![merged_event("a3")],
        )
        .with_pull(
            pull_request(60, 1),
            vec![commit("b1", 30, "Speed up lookup", &["p3"])],
            vec![merged_event("m1")],
        )
        .with_closing_references(100, vec![reference(55, Some("a3"))])
        .with_patch("a1", patch_text("Parse flags"))
        .with_patch("a2", patch_text("Validate flags"))
        .with_patch("a3", patch_text("Document flags"))
        .with_patch("b1", patch_text("Speed up lookup"))
}

pub fn create_test_pipeline(
    mock: MockForge,
    output_dir: &Path,
    verify: bool,
) -> Pipeline {
    let forge: Rc<dyn Forge> = Rc::new(mock);

    Pipeline::builder()
        .forge(forge)
        .guard(create_test_guard())
        .output_dir(output_dir)
        .naming(NamingScheme::Sequence)
        .closing_strategy(ClosingStrategy::References)
        .verify(verify)
        .build()
        .unwrap()
}
