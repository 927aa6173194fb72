//! Verify-applied command implementation.
use color_eyre::eyre::eyre;
use log::*;
use std::path::Path;

use crate::{
    PatchesError, Result, applied::verify_applied, cli::Args, config::Config,
};

pub async fn execute(args: &Args, repo_dir: &Path, branch: &str) -> Result<()> {
    let config = Config::load(&args.config).await?;
    let patches_dir = args.output_dir(&config);

    let unapplied = verify_applied(repo_dir, branch, &patches_dir)?;

    if !unapplied.is_empty() {
        return Err(PatchesError::Other(eyre!(
            "{} patches are not applied to {branch}",
            unapplied.len()
        )));
    }

    info!("All checked!");

    Ok(())
}
