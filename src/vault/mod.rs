//! vault
//!
//! Working-tree filesystem adapter.
//!
//! # Responsibilities
//!
//! Translates vault-relative path operations (read, write, delete, rename,
//! list, stat, ensure-directory) into operations on the device filesystem
//! rooted at the clone directory. The editor layer above never sees
//! absolute paths; the git layer below owns `.git` and is never touched
//! from here.
//!
//! # Guarantees
//!
//! - `write_file` is atomic from the caller's perspective: content lands in
//!   a sibling `path + ".tmp"` file first, then is renamed over the target.
//!   A failed rename deletes the temp file and leaves the target untouched,
//!   so a process killed mid-write cannot tear a tracked file.
//! - Missing-file errors surface as a distinguishable
//!   [`VaultError::NotFound`]; all other I/O errors are opaque.
//! - No silent retries at this layer. Retry policy belongs to the engine.
//!
//! # Listing cache
//!
//! `list_tree` results are cached per starting directory with a short TTL
//! to absorb rapid re-listing bursts. Any write, delete, or rename
//! invalidates the entire cache.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::core::paths::PRIVATE_DIR;

/// Errors from working-tree filesystem operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The path does not exist. Distinguished so callers can recover
    /// (e.g. treat a missing note as empty) without string matching.
    #[error("not found: {path}")]
    NotFound {
        /// Vault-relative path that was missing
        path: String,
    },

    /// Path escapes the vault root or is otherwise malformed.
    #[error("invalid path: {path}")]
    InvalidPath {
        /// The offending path
        path: String,
    },

    /// Any other I/O failure. Opaque by design.
    #[error("i/o error on {path}: {source}")]
    Io {
        /// Vault-relative path involved
        path: String,
        /// Underlying error
        source: std::io::Error,
    },
}

impl VaultError {
    fn from_io(path: &str, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            VaultError::NotFound { path: path.into() }
        } else {
            VaultError::Io {
                path: path.into(),
                source: err,
            }
        }
    }
}

/// Metadata for a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    /// Size in bytes (0 for directories).
    pub size: u64,
    /// Whether the path is a directory.
    pub is_dir: bool,
    /// Last modification time, if the platform reports one.
    pub modified: Option<DateTime<Utc>>,
}

/// One node in a recursive tree listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// Vault-relative path.
    pub path: String,
    /// Final path component.
    pub name: String,
    /// Whether this node is a directory.
    pub is_dir: bool,
    /// Last modification time, if available.
    pub modified: Option<DateTime<Utc>>,
    /// Children (empty for files). Directories first, then lexicographic.
    pub children: Vec<TreeNode>,
}

/// Filesystem adapter rooted at the clone directory.
///
/// Owns writes to tracked file content; never touches `.git`.
pub struct VaultFs {
    root: PathBuf,
    cache_ttl: Duration,
    /// start-dir -> (computed-at, listing)
    list_cache: Mutex<HashMap<String, (Instant, Vec<TreeNode>)>>,
}

impl VaultFs {
    /// Create an adapter rooted at `root` with the default 3 s listing TTL.
    pub fn new(root: PathBuf) -> Self {
        Self::with_cache_ttl(root, Duration::from_secs(3))
    }

    /// Create an adapter with an explicit listing cache TTL.
    pub fn with_cache_ttl(root: PathBuf, cache_ttl: Duration) -> Self {
        Self {
            root,
            cache_ttl,
            list_cache: Mutex::new(HashMap::new()),
        }
    }

    /// The absolute root this adapter is confined to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The listing cache TTL in effect.
    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Translate a vault-relative path to an absolute one, rejecting
    /// traversal outside the root.
    fn resolve(&self, path: &str) -> Result<PathBuf, VaultError> {
        let trimmed = path.trim_start_matches('/');
        let rel = Path::new(trimmed);
        if rel
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(VaultError::InvalidPath { path: path.into() });
        }
        Ok(self.root.join(rel))
    }

    /// Read a file's content.
    pub fn read_file(&self, path: &str) -> Result<Vec<u8>, VaultError> {
        let abs = self.resolve(path)?;
        fs::read(&abs).map_err(|e| VaultError::from_io(path, e))
    }

    /// Read a file as UTF-8 text.
    pub fn read_to_string(&self, path: &str) -> Result<String, VaultError> {
        let abs = self.resolve(path)?;
        fs::read_to_string(&abs).map_err(|e| VaultError::from_io(path, e))
    }

    /// Write a file atomically.
    ///
    /// Content goes to `path + ".tmp"` first, then the temp file is renamed
    /// over the target. If the rename fails, the temp file is removed and
    /// the original target (if any) is untouched.
    pub fn write_file(&self, path: &str, content: &[u8]) -> Result<(), VaultError> {
        let abs = self.resolve(path)?;
        if let Some(parent) = abs.parent() {
            fs::create_dir_all(parent).map_err(|e| VaultError::from_io(path, e))?;
        }

        let mut temp = abs.as_os_str().to_owned();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        fs::write(&temp, content).map_err(|e| VaultError::from_io(path, e))?;

        if let Err(e) = fs::rename(&temp, &abs) {
            let _ = fs::remove_file(&temp);
            return Err(VaultError::from_io(path, e));
        }

        self.invalidate_cache();
        Ok(())
    }

    /// Delete a file.
    pub fn delete_file(&self, path: &str) -> Result<(), VaultError> {
        let abs = self.resolve(path)?;
        fs::remove_file(&abs).map_err(|e| VaultError::from_io(path, e))?;
        self.invalidate_cache();
        Ok(())
    }

    /// Rename a file or directory within the vault.
    pub fn rename_file(&self, from: &str, to: &str) -> Result<(), VaultError> {
        let abs_from = self.resolve(from)?;
        let abs_to = self.resolve(to)?;
        if let Some(parent) = abs_to.parent() {
            fs::create_dir_all(parent).map_err(|e| VaultError::from_io(to, e))?;
        }
        fs::rename(&abs_from, &abs_to).map_err(|e| VaultError::from_io(from, e))?;
        self.invalidate_cache();
        Ok(())
    }

    /// Stat a path.
    pub fn stat(&self, path: &str) -> Result<FileStat, VaultError> {
        let abs = self.resolve(path)?;
        let meta = fs::metadata(&abs).map_err(|e| VaultError::from_io(path, e))?;
        Ok(FileStat {
            size: meta.len(),
            is_dir: meta.is_dir(),
            modified: meta.modified().ok().map(DateTime::<Utc>::from),
        })
    }

    /// Whether a path exists.
    pub fn exists(&self, path: &str) -> Result<bool, VaultError> {
        Ok(self.resolve(path)?.exists())
    }

    /// Ensure a directory (and its parents) exists.
    ///
    /// Already-existing directories are fine.
    pub fn ensure_dir(&self, path: &str) -> Result<(), VaultError> {
        let abs = self.resolve(path)?;
        fs::create_dir_all(&abs).map_err(|e| VaultError::from_io(path, e))
    }

    /// Recursively list the tree under `dir` (`""` for the whole vault).
    ///
    /// Skips the repository metadata directory and the app-private
    /// directory. Entries are sorted directories-first, then
    /// lexicographically by name. Results are cached per starting directory
    /// until the TTL elapses or any mutation invalidates the cache.
    pub fn list_tree(&self, dir: &str) -> Result<Vec<TreeNode>, VaultError> {
        {
            let cache = self.list_cache.lock().expect("cache lock poisoned");
            if let Some((at, listing)) = cache.get(dir) {
                if at.elapsed() < self.cache_ttl {
                    return Ok(listing.clone());
                }
            }
        }

        let abs = self.resolve(dir)?;
        let listing = self.walk(&abs, dir)?;

        let mut cache = self.list_cache.lock().expect("cache lock poisoned");
        cache.insert(dir.to_string(), (Instant::now(), listing.clone()));
        Ok(listing)
    }

    fn walk(&self, abs: &Path, rel: &str) -> Result<Vec<TreeNode>, VaultError> {
        let mut nodes = Vec::new();

        let entries = fs::read_dir(abs).map_err(|e| VaultError::from_io(rel, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| VaultError::from_io(rel, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == ".git" || name == PRIVATE_DIR {
                continue;
            }

            let child_rel = if rel.is_empty() {
                name.clone()
            } else {
                format!("{}/{}", rel, name)
            };
            let meta = entry
                .metadata()
                .map_err(|e| VaultError::from_io(&child_rel, e))?;
            let modified = meta.modified().ok().map(DateTime::<Utc>::from);

            let children = if meta.is_dir() {
                self.walk(&entry.path(), &child_rel)?
            } else {
                Vec::new()
            };

            nodes.push(TreeNode {
                path: child_rel,
                name,
                is_dir: meta.is_dir(),
                modified,
                children,
            });
        }

        nodes.sort_by(|a, b| {
            b.is_dir
                .cmp(&a.is_dir)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(nodes)
    }

    fn invalidate_cache(&self) {
        self.list_cache.lock().expect("cache lock poisoned").clear();
    }
}
