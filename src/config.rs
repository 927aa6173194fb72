//! Loading and parsing of `milestone-patches.toml`.
use log::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::Result;

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "milestone-patches.toml";
/// Default directory patches are written to.
pub const DEFAULT_OUTPUT_DIR: &str = "patches";

/// Root configuration. Every key is optional and command line flags take
/// precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub access token.
    #[serde(alias = "api-token")]
    pub api_token: Option<String>,
    /// `owner/name` or a repository URL.
    pub repo: Option<String>,
    /// Forge host used with the `owner/name` form.
    pub host: Option<String>,
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Read `path`, falling back to defaults when it does not exist.
    pub async fn load(path: &Path) -> Result<Self> {
        if !fs::try_exists(path).await? {
            debug!("{} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;

        debug!("loaded configuration from {}", path.display());

        Ok(config)
    }
}
