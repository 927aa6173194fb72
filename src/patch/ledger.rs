//! The output directory doubles as the record of which pull requests were
//! already fetched, so an interrupted run can be resumed.
use log::*;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::{Result, patch::naming::DONE_DIR};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchDir {
    root: PathBuf,
}

impl PatchDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn done_dir(&self) -> PathBuf {
        self.root.join(DONE_DIR)
    }

    /// Path of an existing patch named `name`, pending or done.
    pub async fn existing(&self, name: &str) -> Result<Option<PathBuf>> {
        for candidate in [self.root.join(name), self.done_dir().join(name)] {
            if fs::try_exists(&candidate).await? {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    pub async fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Write `contents` to `name` through a temporary sibling and a rename, so
    /// a partial file never carries the final name.
    pub async fn write_atomic(
        &self,
        name: &str,
        contents: &str,
    ) -> Result<PathBuf> {
        self.ensure().await?;

        let target = self.root.join(name);
        let temp = self.root.join(format!(".{name}.tmp"));

        if let Err(err) = fs::write(&temp, contents).await {
            let _ = fs::remove_file(&temp).await;
            return Err(err.into());
        }
        fs::rename(&temp, &target).await?;

        debug!("wrote {}", target.display());

        Ok(target)
    }
}
