//! Configuration for the GitHub forge connection.
use secrecy::SecretString;

use crate::{
    Result,
    forge::{github::Github, traits::Forge},
};

/// Default page size for paginated REST queries
pub const DEFAULT_PAGE_SIZE: u8 = 100;
/// Default forge host.
pub const DEFAULT_HOST: &str = "github.com";
/// Default URL scheme.
pub const DEFAULT_SCHEME: &str = "https";

/// Remote repository connection configuration for authenticating and
/// interacting with the forge.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Remote forge host (e.g., "github.com").
    pub host: String,
    /// URL scheme (http or https).
    pub scheme: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Access token for authentication.
    pub token: SecretString,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            scheme: DEFAULT_SCHEME.to_string(),
            owner: "".to_string(),
            repo: "".to_string(),
            token: SecretString::from("".to_string()),
        }
    }
}

impl RemoteConfig {
    /// Base URI of the REST and GraphQL API.
    pub fn api_base(&self) -> String {
        format!("{}://api.{}", self.scheme, self.host)
    }

    /// Base URI of the web interface for this repository.
    pub fn web_base(&self) -> String {
        format!("{}://{}/{}/{}", self.scheme, self.host, self.owner, self.repo)
    }

    /// Create the forge client for this repository.
    pub fn get_forge(&self) -> Result<Box<dyn Forge>> {
        let forge = Github::new(self.clone())?;
        Ok(Box::new(forge))
    }
}
