//! engine
//!
//! The sync state machine and its driver.
//!
//! # Architecture
//!
//! [`SyncEngine`] owns the Change Queue, the credential reference, and the
//! clone; it exposes exactly four operations: `clone`, `pull`,
//! `commit_and_push`, and `status`. The CLI and the auto-sync driver are
//! thin callers.
//!
//! # Concurrency
//!
//! Engine operations are serialized two ways:
//! - in-process: callers share the engine behind `Arc<Mutex<_>>` (the
//!   auto-sync driver does exactly this)
//! - cross-process: mutating operations hold the [`SyncLock`] file lock
//!   for their full duration
//!
//! `status()` takes no lock; it is read-only and must never fail.

mod autosync;
mod lock;
mod sync;

pub use autosync::{AutoSync, AUTO_SYNC_MESSAGE};
pub use lock::{LockError, SyncLock};
pub use sync::{SyncEngine, SyncError};
