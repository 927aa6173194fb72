//! Interface to the forge hosting the repository.
//!
//! Provides token-based authentication and read access to milestones,
//! issues, pull requests, event logs and commit history.

/// Configuration and authentication for the forge.
pub mod config;

/// GitHub API client implementation.
pub mod github;

/// Common trait for forge access.
pub mod traits;

/// Shared data types for issues, pull requests and commits.
pub mod types;
