//! Deterministic patch file names.
use clap::ValueEnum;
use url::Url;

use crate::{PatchesError, Result, milestone::MilestonePull};

/// Subdirectory holding patches that were already applied.
pub const DONE_DIR: &str = "done";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum NamingScheme {
    /// `<closed at>--PR<number>.patch`
    #[default]
    Timestamp,
    /// `<position>-<number>.patch`, numbered in close order from 1
    Sequence,
}

/// Last path segment of a URL, e.g. `55.patch`.
fn basename(url: &str) -> Result<String> {
    let parsed = Url::parse(url)?;

    parsed
        .path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .map(String::from)
        .ok_or_else(|| PatchesError::forge(format!("no file name in {url}")))
}

/// File name for the pull request at 1-based `position` in close order.
pub fn patch_file_name(
    scheme: NamingScheme,
    pull: &MilestonePull,
    position: usize,
) -> Result<String> {
    let base = basename(&pull.pr.patch_url)?;

    match scheme {
        NamingScheme::Timestamp => {
            let closed_at = pull.issue.closed_at.ok_or_else(|| {
                PatchesError::forge(format!(
                    "PR #{} has no close timestamp",
                    pull.pr.number
                ))
            })?;
            Ok(format!("{}--PR{base}", closed_at.format("%Y-%m-%dT%H%M%S")))
        }
        NamingScheme::Sequence => Ok(format!("{position:04}-{base}")),
    }
}
