//! Checks that every patch moved to `done/` actually landed on a stable
//! branch since its last release tag.
use color_eyre::eyre::eyre;
use git2::{Repository, Sort};
use log::*;
use regex::Regex;
use std::{
    collections::{BTreeMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use crate::{PatchesError, Result, patch::naming::DONE_DIR};

/// A done patch whose subject matches no commit on the branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnappliedPatch {
    pub subject: String,
    pub path: PathBuf,
}

/// Most recent tag named `<branch>.*`.
fn baseline_tag(repo: &Repository, branch: &str) -> Result<String> {
    let pattern = format!("{branch}.*");
    let tags = repo.tag_names(Some(&pattern))?;

    let mut names = tags.iter().flatten().collect::<Vec<&str>>();
    names.sort();

    names
        .last()
        .map(|name| name.to_string())
        .ok_or_else(|| PatchesError::Other(eyre!("no tags match {pattern}")))
}

/// Summaries of the commits in `<tag>..<branch>`.
fn branch_summaries(
    repo: &Repository,
    tag: &str,
    branch: &str,
) -> Result<HashSet<String>> {
    let from = repo.revparse_single(tag)?.peel_to_commit()?;
    let to = repo.revparse_single(branch)?.peel_to_commit()?;

    let mut walk = repo.revwalk()?;
    walk.set_sorting(Sort::TOPOLOGICAL)?;
    walk.push(to.id())?;
    walk.hide(from.id())?;

    let mut summaries = HashSet::new();
    for oid in walk {
        let commit = repo.find_commit(oid?)?;
        if let Some(summary) = commit.summary() {
            summaries.insert(summary.to_string());
        }
    }

    Ok(summaries)
}

/// Subjects of every `*.patch` in `done_dir`, mapped to the patch they came
/// from.
fn patch_subjects(done_dir: &Path) -> Result<BTreeMap<String, PathBuf>> {
    let subject = Regex::new(r"^Subject: \[PATCH[0-9/ ]*\] (.*)$")?;

    let mut paths = fs::read_dir(done_dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<PathBuf>>>()?;
    paths.retain(|p| p.extension().is_some_and(|ext| ext == "patch"));
    paths.sort();

    if paths.is_empty() {
        return Err(PatchesError::Other(eyre!(
            "no patches found in {}",
            done_dir.display()
        )));
    }

    let mut subjects = BTreeMap::new();
    for path in paths {
        let contents = fs::read_to_string(&path)?;
        for line in contents.lines() {
            if let Some(caps) = subject.captures(line) {
                subjects.insert(caps[1].to_string(), path.clone());
            }
        }
    }

    Ok(subjects)
}

/// List the done patches of `patches_dir` that are missing from `branch` in
/// the repository at `repo_dir`.
///
/// `git format-patch` truncates long subjects, so a subject also counts as
/// applied when it is contained in a commit summary.
pub fn verify_applied(
    repo_dir: &Path,
    branch: &str,
    patches_dir: &Path,
) -> Result<Vec<UnappliedPatch>> {
    let repo = Repository::open(repo_dir)?;

    let tag = baseline_tag(&repo, branch)?;
    info!("checking {tag}..{branch} in {}", repo_dir.display());

    let summaries = branch_summaries(&repo, &tag, branch)?;
    let subjects = patch_subjects(&patches_dir.join(DONE_DIR))?;

    let mut unapplied = vec![];

    for (subject, path) in subjects {
        let applied = summaries.contains(&subject)
            || summaries.iter().any(|s| s.contains(&subject));

        if !applied {
            warn!("{subject} in {}", path.display());
            unapplied.push(UnappliedPatch { subject, path });
        }
    }

    Ok(unapplied)
}
