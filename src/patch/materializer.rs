//! Fetches and writes the patch file of one pull request.
use log::*;
use std::path::PathBuf;

use crate::{
    PatchesError, Result,
    forge::traits::Forge,
    milestone::MilestonePull,
    patch::{
        ledger::PatchDir,
        naming::{NamingScheme, patch_file_name},
        trailer::append_cherry_pick_trailer,
    },
    provenance::guard::RepositoryGuard,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterializeOutcome {
    Written(PathBuf),
    /// A patch with this name already exists, pending or done.
    Skipped(PathBuf),
    /// A patch could not be downloaded. Nothing was written.
    Failed { url: String, reason: String },
}

pub struct PatchMaterializer<'a> {
    forge: &'a dyn Forge,
    guard: &'a RepositoryGuard,
    dir: PatchDir,
    naming: NamingScheme,
}

impl<'a> PatchMaterializer<'a> {
    pub fn new(
        forge: &'a dyn Forge,
        guard: &'a RepositoryGuard,
        dir: PatchDir,
        naming: NamingScheme,
    ) -> Self {
        Self {
            forge,
            guard,
            dir,
            naming,
        }
    }

    /// Path of the patch already written for `pull`, pending or done.
    pub async fn existing(
        &self,
        pull: &MilestonePull,
        position: usize,
    ) -> Result<Option<PathBuf>> {
        let name = patch_file_name(self.naming, pull, position)?;
        self.dir.existing(&name).await
    }

    /// Write the patches of `shas`, oldest first, into one file for the pull
    /// request at `position` in close order.
    pub async fn materialize(
        &self,
        pull: &MilestonePull,
        position: usize,
        shas: &[String],
    ) -> Result<MaterializeOutcome> {
        let name = patch_file_name(self.naming, pull, position)?;

        if let Some(existing) = self.dir.existing(&name).await? {
            info!("{name} already exists, skipping");
            return Ok(MaterializeOutcome::Skipped(existing));
        }

        info!("fetching patch for PR #{}", pull.pr.number);

        let mut parts = Vec::with_capacity(shas.len() * 2);

        for sha in shas {
            let commit = self.forge.get_commit(sha).await?;
            let url = format!("{}.patch", commit.html_url);

            self.guard.check_web_commit_url(
                &url,
                &format!("patch for PR #{}", pull.pr.number),
            )?;

            let text = match self.forge.fetch_patch(&url).await {
                Ok(text) => text,
                Err(PatchesError::Transport { status, .. }) => {
                    return Ok(failed(url, format!("status {status}")));
                }
                Err(PatchesError::NetworkError(reason)) => {
                    return Ok(failed(url, reason));
                }
                Err(err) => return Err(err),
            };

            parts.push(append_cherry_pick_trailer(&text, sha)?);
            parts.push(String::new());
        }

        let contents = parts.join("\n") + "\n";
        let path = self.dir.write_atomic(&name, &contents).await?;

        info!("wrote {}", path.display());

        Ok(MaterializeOutcome::Written(path))
    }
}

fn failed(url: String, reason: String) -> MaterializeOutcome {
    error!("failed: {reason} ({url})");
    MaterializeOutcome::Failed { url, reason }
}
