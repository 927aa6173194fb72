//! Turns resolved pull requests into patch files ready for `git am`.
pub mod ledger;
pub mod materializer;
pub mod naming;
pub mod trailer;
