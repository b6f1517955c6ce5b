//! git
//!
//! Single interface for all git operations.
//!
//! # Architecture
//!
//! This module is the **only doorway** to git. All repository reads and
//! writes flow through [`Git`]; no other module imports `git2`. We use the
//! `git2` crate exclusively (no shelling out to the git CLI).
//!
//! # Responsibilities
//!
//! - Shallow, single-branch clone
//! - Fetch and remote-tip resolution
//! - Force checkout (hard reset) of a commit
//! - Tree diffs between two commits
//! - Staging, committing, pushing
//! - HEAD queries (id, timestamp, branch)
//!
//! The transport concerns (credential callbacks, network-error
//! classification with remediation hints) live in [`transport`].

mod interface;
pub mod transport;

pub use interface::{Git, GitError};
