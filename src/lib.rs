//! Collects the commits every merged pull request of a GitHub milestone
//! landed on the target branch and writes them as cherry-pick ready patches.
pub mod applied;
pub mod cli;
pub mod command;
pub mod config;
pub mod coverage;
pub mod error;
pub mod forge;
pub mod milestone;
pub mod patch;
pub mod pipeline;
pub mod provenance;
pub mod warning;

pub use cli::{Args, Command};
pub use error::{IntegrityError, PatchesError, Result};
pub use pipeline::{Pipeline, RunSummary};

#[cfg(test)]
pub mod test_helpers;
