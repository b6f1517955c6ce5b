//! Vaultsync - offline-first git synchronization for a notes vault
//!
//! Vaultsync keeps a directory of notes in lockstep with a remote git
//! repository: it clones the remote onto local storage, records local edits
//! made while offline, reconciles them against remote changes, and pushes a
//! single consolidated commit per sync cycle.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - The sync state machine: clone / pull / commit+push / status
//! - [`core`] - Domain types, paths, and configuration
//! - [`git`] - Single interface for all git operations
//! - [`queue`] - Pending-change ledger (the Change Queue)
//! - [`vault`] - Working-tree filesystem adapter
//! - [`secrets`] - Secret storage abstraction
//! - [`ui`] - User interaction utilities
//!
//! # Correctness Invariants
//!
//! Vaultsync maintains the following invariants:
//!
//! 1. The Change Queue is cleared only after a provably successful push
//! 2. Locally dirty content is captured before any checkout can overwrite it
//! 3. Conflicts resolve local-wins, always, and are logged for audit
//! 4. A pull with nothing new from the remote never touches the working tree

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod queue;
pub mod secrets;
pub mod ui;
pub mod vault;
