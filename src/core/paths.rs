//! core::paths
//!
//! Centralized path routing for vaultsync storage locations.
//!
//! # Architecture
//!
//! All on-device storage locations are routed through [`VaultPaths`].
//! **Hard rule:** no other module may compute `<root>.join(...)` paths for
//! vault storage by hand. This keeps the layout in one place:
//!
//! - `repo/` - the single git clone (working tree + `.git`)
//! - `pending-changes.json` - persisted Change Queue
//! - `conflicts.log` - append-only conflict audit trail
//! - `config.toml` - vault configuration
//! - `lock` - exclusive sync lock file
//!
//! The conflict log and queue live *beside* the clone, not inside it, so
//! they are never themselves committed.
//!
//! # Example
//!
//! ```
//! use vaultsync::core::paths::VaultPaths;
//! use std::path::PathBuf;
//!
//! let paths = VaultPaths::new(PathBuf::from("/data/vault"));
//! assert_eq!(paths.repo_dir(), PathBuf::from("/data/vault/repo"));
//! assert_eq!(paths.conflict_log_path(), PathBuf::from("/data/vault/conflicts.log"));
//! ```

use std::path::{Path, PathBuf};

/// Name of the app-private directory skipped by tree listings.
pub const PRIVATE_DIR: &str = ".vaultsync";

/// Centralized path routing for vault storage.
///
/// # Invariants
///
/// - Exactly one clone lives under the root, at `repo/`
/// - Sidecar files (queue, conflict log, config, lock) live at the root,
///   outside the tracked tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultPaths {
    /// The vault root directory. Everything vaultsync stores lives under it.
    root: PathBuf,
}

impl VaultPaths {
    /// Create paths rooted at an explicit directory.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Create paths at the default location, `~/.vaultsync`.
    ///
    /// # Errors
    ///
    /// Returns `None` if the home directory cannot be determined.
    pub fn default_location() -> Option<Self> {
        dirs::home_dir().map(|home| Self::new(home.join(PRIVATE_DIR)))
    }

    /// The vault root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The clone directory (working tree + `.git`).
    pub fn repo_dir(&self) -> PathBuf {
        self.root.join("repo")
    }

    /// The `.git` metadata directory of the clone.
    pub fn git_dir(&self) -> PathBuf {
        self.repo_dir().join(".git")
    }

    /// The persisted Change Queue file.
    pub fn queue_path(&self) -> PathBuf {
        self.root.join("pending-changes.json")
    }

    /// The append-only conflict log.
    ///
    /// Lives beside the clone so it is never committed.
    pub fn conflict_log_path(&self) -> PathBuf {
        self.root.join("conflicts.log")
    }

    /// The vault configuration file.
    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    /// The exclusive sync lock file.
    pub fn lock_path(&self) -> PathBuf {
        self.root.join("lock")
    }

    /// Ensure the vault root exists.
    ///
    /// # Errors
    ///
    /// Returns an IO error if directory creation fails.
    pub fn ensure_root(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> VaultPaths {
        VaultPaths::new(PathBuf::from("/data/vault"))
    }

    #[test]
    fn repo_dir_under_root() {
        assert_eq!(paths().repo_dir(), PathBuf::from("/data/vault/repo"));
    }

    #[test]
    fn git_dir_under_repo() {
        assert_eq!(paths().git_dir(), PathBuf::from("/data/vault/repo/.git"));
    }

    #[test]
    fn sidecars_outside_clone() {
        let p = paths();
        for sidecar in [
            p.queue_path(),
            p.conflict_log_path(),
            p.config_path(),
            p.lock_path(),
        ] {
            assert!(
                !sidecar.starts_with(p.repo_dir()),
                "{} must live outside the clone",
                sidecar.display()
            );
        }
    }

    #[test]
    fn queue_path() {
        assert_eq!(
            paths().queue_path(),
            PathBuf::from("/data/vault/pending-changes.json")
        );
    }

    #[test]
    fn conflict_log_path() {
        assert_eq!(
            paths().conflict_log_path(),
            PathBuf::from("/data/vault/conflicts.log")
        );
    }

    #[test]
    fn ensure_root_creates_directory() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        let p = VaultPaths::new(temp.path().join("nested").join("vault"));
        p.ensure_root().expect("ensure root");
        assert!(p.root().exists());
    }
}
