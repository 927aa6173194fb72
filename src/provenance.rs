//! Works out which commits actually landed for a pull request or closed an
//! issue, without the forge ever stating it directly.

/// Issue closing-commit lookup strategies.
pub mod closure;

/// Repository URL validation.
pub mod guard;

/// Best-effort commit identity across rebases.
pub mod identity;

/// Merge, rebase and squash detection for pull requests.
pub mod merge;
