//! CLI argument parsing and forge configuration.
use clap::{Parser, Subcommand};
use git_url_parse::GitUrl;
use secrecy::SecretString;
use std::{env, path::PathBuf};

use crate::{
    PatchesError, Result,
    config::{Config, DEFAULT_CONFIG_FILE, DEFAULT_OUTPUT_DIR},
    forge::config::{DEFAULT_HOST, DEFAULT_SCHEME, RemoteConfig},
    patch::naming::NamingScheme,
    provenance::closure::ClosingStrategy,
};

/// Global CLI arguments for forge configuration and debugging.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    /// Path to the TOML configuration file.
    pub config: PathBuf,

    #[arg(long, default_value = "", global = true)]
    /// GitHub repository, as owner/name or https://github.com/owner/name.
    pub github_repo: String,

    #[arg(long, default_value = "", global = true)]
    /// GitHub personal access token. Falls back to the configuration file,
    /// then the GITHUB_TOKEN env var.
    pub github_token: String,

    #[arg(long, global = true)]
    /// Directory patches are written to [default: patches].
    pub output_dir: Option<PathBuf>,

    #[arg(long, default_value_t = false, global = true)]
    /// Enable debug logging.
    pub debug: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Write a patch file for every merged pull request of a milestone.
    Fetch {
        /// Milestone number.
        milestone: u64,

        #[arg(long, default_value_t = false)]
        /// Skip checking that every closed issue is fixed by a milestoned
        /// pull request.
        no_verify: bool,

        #[arg(long, value_enum, default_value_t)]
        /// How the commit that closed an issue is found.
        closing_strategy: ClosingStrategy,

        #[arg(long, value_enum, default_value_t)]
        /// Patch file naming scheme.
        naming: NamingScheme,
    },

    /// Check that every patch in `<output-dir>/done` landed on a branch.
    VerifyApplied {
        /// Path to a local clone of the repository.
        repo_dir: PathBuf,
        /// Stable branch, also the prefix of its release tags.
        branch: String,
    },
}

impl Args {
    /// Resolve the remote repository from flags, the configuration file and
    /// the environment.
    pub fn get_remote(&self, config: &Config) -> Result<RemoteConfig> {
        let repo = if !self.github_repo.is_empty() {
            self.github_repo.clone()
        } else {
            config.repo.clone().unwrap_or_default()
        };

        if repo.is_empty() {
            return Err(PatchesError::invalid_config(
                "must configure a repository with --github-repo or repo",
            ));
        }

        let (mut remote, url_token) = if repo.contains("://") {
            parse_repo_url(&repo)?
        } else {
            parse_repo_path(&repo, config.host.as_deref())?
        };

        let mut token = self.github_token.clone();

        if token.is_empty()
            && let Some(config_token) = &config.api_token
        {
            token = config_token.clone();
        }

        if token.is_empty()
            && let Some(url_token) = url_token
        {
            token = url_token;
        }

        if token.is_empty()
            && let Ok(env_var_token) = env::var("GITHUB_TOKEN")
        {
            token = env_var_token;
        }

        if token.is_empty() {
            return Err(PatchesError::invalid_config("must set github token"));
        }

        remote.token = SecretString::from(token);

        Ok(remote)
    }

    pub fn output_dir(&self, config: &Config) -> PathBuf {
        self.output_dir
            .clone()
            .or_else(|| config.output_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }
}

/// Parse `https://host/owner/name`, returning any token embedded in the URL.
fn parse_repo_url(repo: &str) -> Result<(RemoteConfig, Option<String>)> {
    let parsed = GitUrl::parse(repo)?;

    match parsed.scheme {
        git_url_parse::Scheme::Http | git_url_parse::Scheme::Https => {}
        _ => {
            return Err(PatchesError::invalid_config(
                "only http and https schemes are supported for repo urls",
            ));
        }
    }

    let host = parsed.host.ok_or_else(|| {
        PatchesError::invalid_config("unable to parse host from github repo")
    })?;

    let owner = parsed.owner.ok_or_else(|| {
        PatchesError::invalid_config("unable to parse owner from github repo")
    })?;

    let remote = RemoteConfig {
        host,
        scheme: parsed.scheme.to_string(),
        owner,
        repo: parsed.name,
        ..RemoteConfig::default()
    };

    Ok((remote, parsed.token))
}

/// Parse the `owner/name` shorthand.
fn parse_repo_path(
    repo: &str,
    host: Option<&str>,
) -> Result<(RemoteConfig, Option<String>)> {
    let (owner, name) = repo
        .split_once('/')
        .filter(|(o, n)| !o.is_empty() && !n.is_empty() && !n.contains('/'))
        .ok_or_else(|| {
            PatchesError::invalid_config(format!(
                "expected owner/name or a repository url, got {repo}"
            ))
        })?;

    let remote = RemoteConfig {
        host: host.unwrap_or(DEFAULT_HOST).to_string(),
        scheme: DEFAULT_SCHEME.to_string(),
        owner: owner.to_string(),
        repo: name.to_string(),
        ..RemoteConfig::default()
    };

    Ok((remote, None))
}
