//! Error types for milestone-patches.
//!
//! Integrity violations are kept in their own enum so callers can tell a
//! provenance inconsistency apart from a transport or configuration problem.

use thiserror::Error;

/// A provenance or repository consistency violation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("PR #{pr} is not merged, double-check")]
    NotMerged { pr: u64 },

    #[error("PR #{pr} was merged but no commit was associated")]
    MergeWithoutCommit { pr: u64 },

    #[error("issue #{issue} is not closed, double-check")]
    IssueNotClosed { issue: u64 },

    #[error("issue #{issue} was closed but no commit was associated")]
    ClosedWithoutCommit { issue: u64 },

    #[error("{context} has a url to a different repo: {url}")]
    ForeignRepository { context: String, url: String },

    #[error(
        "tried to add commit {sha} from PR #{second_pr}, but already have the same commit from PR #{first_pr}"
    )]
    DuplicateCommit {
        sha: String,
        first_pr: u64,
        second_pr: u64,
    },
}

/// Main error type for milestone-patches operations.
#[derive(Error, Debug)]
pub enum PatchesError {
    #[error("Integrity check failed: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("Failed to fetch {url}: status {status}")]
    Transport { status: u16, url: String },

    #[error(
        "Pull request #{pr} ({url}) was closed, not merged. Remove it from the milestone."
    )]
    UnmergedPullRequest { pr: u64, url: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Forge operation failed: {0}")]
    ForgeError(String),

    #[error("Network request failed: {0}")]
    NetworkError(String),

    #[error("API rate limit exceeded")]
    RateLimitExceeded,

    #[error("Git URL parse error: {0}")]
    GitUrlError(#[from] git_url_parse::GitUrlParseError),

    #[error("Git operation failed: {0}")]
    GitError(#[from] git2::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("Regular expression error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] log::SetLoggerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Result type alias using PatchesError
pub type Result<T> = std::result::Result<T, PatchesError>;

impl PatchesError {
    /// Create a forge error with context
    pub fn forge(msg: impl Into<String>) -> Self {
        Self::ForgeError(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a transport failure for a non-success response
    pub fn transport(status: u16, url: impl Into<String>) -> Self {
        Self::Transport {
            status,
            url: url.into(),
        }
    }

    /// Returns the integrity violation wrapped by this error, if any.
    pub fn as_integrity(&self) -> Option<&IntegrityError> {
        match self {
            Self::Integrity(err) => Some(err),
            _ => None,
        }
    }
}

// Implement From for reqwest errors (raw patch transport)
impl From<reqwest::Error> for PatchesError {
    fn from(err: reqwest::Error) -> Self {
        match (err.status(), err.url()) {
            (Some(status), Some(url)) => {
                Self::transport(status.as_u16(), url.as_str())
            }
            _ => Self::NetworkError(err.to_string()),
        }
    }
}

// Implement From for octocrab errors (GitHub API)
impl From<octocrab::Error> for PatchesError {
    fn from(err: octocrab::Error) -> Self {
        match &err {
            octocrab::Error::GitHub { source, .. }
                if source.message.contains("rate limit") =>
            {
                Self::RateLimitExceeded
            }
            _ => Self::ForgeError(format!("GitHub API error: {}", err)),
        }
    }
}
