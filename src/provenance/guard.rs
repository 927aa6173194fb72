//! Guards against data from another repository leaking into a run.
//!
//! Every commit, merge and closing pull request URL read from the forge must
//! start with a prefix bound to the configured repository.
use crate::{error::IntegrityError, forge::config::RemoteConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryGuard {
    api_commit_prefix: String,
    web_commit_prefix: String,
    pull_prefix: String,
}

impl RepositoryGuard {
    pub fn new(config: &RemoteConfig) -> Self {
        let web_base = config.web_base();
        Self {
            api_commit_prefix: format!(
                "{}/repos/{}/{}/commits/",
                config.api_base(),
                config.owner,
                config.repo
            ),
            web_commit_prefix: format!("{web_base}/commit/"),
            pull_prefix: format!("{web_base}/pull/"),
        }
    }

    /// Validate an API commit URL, as found on merged and closed events.
    pub fn check_api_commit_url(
        &self,
        url: &str,
        context: &str,
    ) -> Result<(), IntegrityError> {
        check_prefix(&self.api_commit_prefix, url, context)
    }

    /// Validate a web commit URL, the base of downloadable patches.
    pub fn check_web_commit_url(
        &self,
        url: &str,
        context: &str,
    ) -> Result<(), IntegrityError> {
        check_prefix(&self.web_commit_prefix, url, context)
    }

    /// Validate a pull request permalink.
    pub fn check_pull_url(
        &self,
        url: &str,
        context: &str,
    ) -> Result<(), IntegrityError> {
        check_prefix(&self.pull_prefix, url, context)
    }
}

fn check_prefix(
    prefix: &str,
    url: &str,
    context: &str,
) -> Result<(), IntegrityError> {
    if url.starts_with(prefix) {
        return Ok(());
    }

    Err(IntegrityError::ForeignRepository {
        context: context.to_string(),
        url: url.to_string(),
    })
}
