//! engine::lock
//!
//! Exclusive sync lock for the vault.
//!
//! # Architecture
//!
//! The sync lock ensures only one mutating sync operation can touch the
//! clone at a time, across processes. The in-process `Mutex` around the
//! engine covers concurrent calls within one app; this file lock covers a
//! second process pointed at the same vault.
//!
//! # Invariants
//!
//! - Lock is held for the entire mutating operation
//! - Lock is automatically released on drop (RAII pattern)
//! - Lock acquisition is non-blocking (fails fast if locked)

use std::fs::{File, OpenOptions};
use std::path::PathBuf;

use fs2::FileExt;
use thiserror::Error;

use crate::core::paths::VaultPaths;

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another process already holds the lock.
    #[error("vault is locked by another vaultsync process")]
    AlreadyLocked,

    /// Failed to create the lock file or its directory.
    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    /// I/O error during lock operations.
    #[error("lock i/o error: {0}")]
    IoError(#[from] std::io::Error),
}

/// An exclusive lock on the vault.
///
/// Released when dropped, even if the operation panics.
#[derive(Debug)]
pub struct SyncLock {
    /// Path to the lock file.
    path: PathBuf,
    /// Open handle holding the OS lock; Some while held.
    file: Option<File>,
}

impl SyncLock {
    /// Attempt to acquire the vault lock.
    ///
    /// Non-blocking: if another process holds the lock, returns
    /// [`LockError::AlreadyLocked`] immediately.
    pub fn acquire(paths: &VaultPaths) -> Result<Self, LockError> {
        paths
            .ensure_root()
            .map_err(|e| LockError::CreateFailed(e.to_string()))?;

        let path = paths.lock_path();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| LockError::CreateFailed(e.to_string()))?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                path,
                file: Some(file),
            }),
            Err(_) => Err(LockError::AlreadyLocked),
        }
    }

    /// Whether this guard currently holds the lock.
    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }

    /// Path of the lock file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Drop for SyncLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = fs2::FileExt::unlock(&file);
        }
    }
}
