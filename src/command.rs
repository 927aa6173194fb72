//! Command execution for milestone-patches.
//!
//! - **fetch**: write the patches of a milestone's merged pull requests
//! - **verify_applied**: check that done patches landed on a stable branch
pub mod fetch;
pub mod verify_applied;
