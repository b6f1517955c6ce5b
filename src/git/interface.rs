//! git::interface
//!
//! Git interface implementation using git2.
//!
//! The [`Git`] struct is the only way to interact with the clone. It wraps
//! exactly the operations the sync engine needs and normalizes git2
//! failures into typed [`GitError`] categories, with network and auth
//! failures carrying remediation hints from the transport layer.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{FetchOptions, PushOptions, Repository, ResetType, Signature};
use thiserror::Error;

use crate::core::types::{GitAuth, Oid};

use super::transport;

/// Identity used for commits when no username is configured.
const FALLBACK_AUTHOR: &str = "vaultsync";

/// Refspec mirroring all remote branches into remote-tracking refs.
const FETCH_REFSPEC: &str = "+refs/heads/*:refs/remotes/origin/*";

/// Object id of git's well-known empty tree.
const EMPTY_TREE_ID: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

/// Errors from git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// No repository at the given path.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// Transport-level failure (DNS, connection refused, timeout, 5xx).
    #[error("network error: {message} ({hint})")]
    Network {
        /// What failed
        message: String,
        /// Human-readable remediation hint
        hint: String,
    },

    /// Missing or rejected credentials.
    #[error("authentication error: {message} ({hint})")]
    Auth {
        /// What failed
        message: String,
        /// Human-readable remediation hint
        hint: String,
    },

    /// The remote refused the ref update.
    #[error("push rejected: {message}")]
    PushRejected {
        /// The remote's reason
        message: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => GitError::RefNotFound {
                refname: context.to_string(),
            },
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => GitError::RefNotFound {
                refname: err.message().to_string(),
            },
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: err.message().to_string(),
            },
            _ => GitError::Internal {
                message: err.message().to_string(),
            },
        }
    }
}

/// Whether a remote URL goes over the smart-HTTP transport.
fn is_smart_http(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// The single doorway to the clone.
pub struct Git {
    repo: Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git").finish_non_exhaustive()
    }
}

impl Git {
    /// Open an existing repository at `path`.
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = Repository::open(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;
        Ok(Self { repo })
    }

    /// Whether a repository exists at `path`.
    pub fn exists(path: &Path) -> bool {
        Repository::open(path).is_ok()
    }

    /// Shallow (depth 1), single-branch clone of `url` into `path`.
    ///
    /// The caller is responsible for deleting any pre-existing directory
    /// first; clone never resumes a partial clone. On failure, whatever
    /// git2 left behind stays on disk for the next clone to delete.
    pub fn clone(url: &str, path: &Path, auth: Option<&GitAuth>) -> Result<Self, GitError> {
        let mut fetch = FetchOptions::new();
        fetch.remote_callbacks(transport::remote_callbacks(auth));
        if is_smart_http(url) {
            // The local transport does not advertise the shallow
            // capability; depth is only requested over smart HTTP.
            fetch.depth(1);
        }

        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch);
        let repo = builder
            .clone(url, path)
            .map_err(|e| transport::classify_remote_error(e, "clone"))?;

        Ok(Self { repo })
    }

    /// The working directory of the clone.
    pub fn workdir(&self) -> Result<&Path, GitError> {
        self.repo.workdir().ok_or_else(|| GitError::Internal {
            message: "repository has no working directory".into(),
        })
    }

    /// Fetch all branches from `origin`.
    ///
    /// The only step of a pull that can fail due to connectivity.
    pub fn fetch(&self, auth: Option<&GitAuth>) -> Result<(), GitError> {
        let mut remote = self
            .repo
            .find_remote("origin")
            .map_err(|e| GitError::from_git2(e, "origin"))?;

        let mut options = FetchOptions::new();
        options.remote_callbacks(transport::remote_callbacks(auth));
        if remote.url().map(is_smart_http).unwrap_or(false) {
            options.depth(1);
        }

        remote
            .fetch(&[FETCH_REFSPEC], Some(&mut options), None)
            .map_err(|e| transport::classify_remote_error(e, "fetch"))?;
        Ok(())
    }

    /// Resolve the remote's default-branch tip after a fetch.
    ///
    /// Tries `origin/HEAD`, then `origin/main`, then `origin/master`;
    /// first successful resolution wins. Accommodates remotes that do not
    /// advertise a symbolic HEAD.
    pub fn remote_tip(&self) -> Result<Oid, GitError> {
        for name in [
            "refs/remotes/origin/HEAD",
            "refs/remotes/origin/main",
            "refs/remotes/origin/master",
        ] {
            if let Ok(oid) = self.repo.refname_to_id(name) {
                return Ok(Oid::new(oid.to_string()));
            }
        }
        Err(GitError::RefNotFound {
            refname: "refs/remotes/origin/{HEAD,main,master}".into(),
        })
    }

    /// The commit id HEAD points at.
    pub fn head_oid(&self) -> Result<Oid, GitError> {
        let head = self
            .repo
            .head()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;
        let commit = head
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;
        Ok(Oid::new(commit.id().to_string()))
    }

    /// Committer timestamp of the commit HEAD points at.
    pub fn head_time(&self) -> Result<DateTime<Utc>, GitError> {
        let head = self
            .repo
            .head()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;
        let commit = head
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;
        DateTime::from_timestamp(commit.time().seconds(), 0).ok_or_else(|| GitError::Internal {
            message: format!("commit {} has an out-of-range timestamp", commit.id()),
        })
    }

    /// Short name of the branch HEAD is on.
    pub fn current_branch(&self) -> Result<String, GitError> {
        let head = self
            .repo
            .head()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;
        head.shorthand()
            .map(str::to_string)
            .ok_or_else(|| GitError::Internal {
                message: "HEAD is not on a branch".into(),
            })
    }

    /// Force-checkout `oid`: hard reset of HEAD, index, and working tree.
    ///
    /// Unconditionally overwrites every tracked file, including files with
    /// uncommitted local edits. Callers must capture dirty content first.
    pub fn force_checkout(&self, oid: &Oid) -> Result<(), GitError> {
        let raw = git2::Oid::from_str(oid.as_str()).map_err(|_| GitError::InvalidOid {
            oid: oid.as_str().to_string(),
        })?;
        let object = self
            .repo
            .find_object(raw, None)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;

        let mut checkout = CheckoutBuilder::new();
        checkout.force();
        self.repo
            .reset(&object, ResetType::Hard, Some(&mut checkout))
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;
        Ok(())
    }

    /// Paths whose blob id differs between the trees of two commits.
    ///
    /// A full tree walk, not a remote changelist: additions, deletions,
    /// and content changes all count.
    pub fn changed_paths(&self, before: &Oid, after: &Oid) -> Result<Vec<String>, GitError> {
        let before_tree = self.commit_tree(before)?;
        let after_tree = self.commit_tree(after)?;

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&before_tree), Some(&after_tree), None)
            .map_err(|e| GitError::from_git2(e, "tree diff"))?;

        let mut paths = Vec::new();
        for delta in diff.deltas() {
            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path());
            if let Some(path) = path {
                paths.push(path.to_string_lossy().into_owned());
            }
        }
        Ok(paths)
    }

    fn commit_tree(&self, oid: &Oid) -> Result<git2::Tree<'_>, GitError> {
        let raw = git2::Oid::from_str(oid.as_str()).map_err(|_| GitError::InvalidOid {
            oid: oid.as_str().to_string(),
        })?;
        let commit = self
            .repo
            .find_commit(raw)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))?;
        commit
            .tree()
            .map_err(|e| GitError::from_git2(e, oid.as_str()))
    }

    /// Stage one path into the index: add/update for a live file, removal
    /// for a deleted one.
    pub fn stage(&self, path: &str, delete: bool) -> Result<(), GitError> {
        let mut index = self
            .repo
            .index()
            .map_err(|e| GitError::from_git2(e, "index"))?;

        if delete {
            // Removing a path git never knew about is a no-op, not an
            // error: the queue may hold deletes for never-pushed files.
            match index.remove_path(Path::new(path)) {
                Ok(()) => {}
                Err(e) if e.code() == git2::ErrorCode::NotFound => {}
                Err(e) => return Err(GitError::from_git2(e, path)),
            }
        } else {
            index
                .add_path(Path::new(path))
                .map_err(|e| GitError::from_git2(e, path))?;
        }

        index
            .write()
            .map_err(|e| GitError::from_git2(e, "index write"))?;
        Ok(())
    }

    /// Whether the staged index tree is identical to HEAD's tree.
    ///
    /// When true there is nothing to commit; committing anyway would
    /// create an empty commit.
    pub fn index_matches_head(&self) -> Result<bool, GitError> {
        let mut index = self
            .repo
            .index()
            .map_err(|e| GitError::from_git2(e, "index"))?;
        let index_tree = index
            .write_tree()
            .map_err(|e| GitError::from_git2(e, "index tree"))?;

        match self.repo.head() {
            Ok(head) => {
                let head_tree = head
                    .peel_to_tree()
                    .map_err(|e| GitError::from_git2(e, "HEAD tree"))?;
                Ok(head_tree.id() == index_tree)
            }
            // Unborn HEAD: only the empty tree counts as "nothing staged".
            Err(_) => Ok(index_tree.to_string() == EMPTY_TREE_ID),
        }
    }

    /// Create a commit from the staged index on the current branch.
    ///
    /// Authored as `author_name` (or a fixed fallback) with a synthesized
    /// local email address. Returns the new commit id.
    pub fn commit(&self, message: &str, author_name: Option<&str>) -> Result<Oid, GitError> {
        let name = author_name.unwrap_or(FALLBACK_AUTHOR);
        let email = format!("{}@vaultsync.local", name);
        let signature =
            Signature::now(name, &email).map_err(|e| GitError::from_git2(e, "signature"))?;

        let mut index = self
            .repo
            .index()
            .map_err(|e| GitError::from_git2(e, "index"))?;
        let tree_id = index
            .write_tree()
            .map_err(|e| GitError::from_git2(e, "index tree"))?;
        let tree = self
            .repo
            .find_tree(tree_id)
            .map_err(|e| GitError::from_git2(e, "index tree"))?;

        let parents = match self.repo.head() {
            Ok(head) => vec![head
                .peel_to_commit()
                .map_err(|e| GitError::from_git2(e, "HEAD"))?],
            Err(_) => Vec::new(),
        };
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();

        let oid = self
            .repo
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                message,
                &tree,
                &parent_refs,
            )
            .map_err(|e| GitError::from_git2(e, "commit"))?;
        Ok(Oid::new(oid.to_string()))
    }

    /// Push the current branch to `origin`.
    pub fn push(&self, auth: Option<&GitAuth>) -> Result<(), GitError> {
        let branch = self.current_branch()?;
        let refspec = format!("refs/heads/{0}:refs/heads/{0}", branch);

        let mut remote = self
            .repo
            .find_remote("origin")
            .map_err(|e| GitError::from_git2(e, "origin"))?;

        // The remote can accept the connection yet refuse the ref update;
        // that arrives via the per-ref status callback, not the result.
        let rejection = std::cell::RefCell::new(None::<String>);
        {
            let mut callbacks = transport::remote_callbacks(auth);
            callbacks.push_update_reference(|_refname, status| {
                if let Some(message) = status {
                    *rejection.borrow_mut() = Some(message.to_string());
                }
                Ok(())
            });

            let mut options = PushOptions::new();
            options.remote_callbacks(callbacks);

            remote
                .push(&[refspec.as_str()], Some(&mut options))
                .map_err(|e| transport::classify_remote_error(e, "push"))?;
        }

        if let Some(message) = rejection.into_inner() {
            return Err(GitError::PushRejected { message });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use tempfile::TempDir;

    fn run_git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args(args)
            .current_dir(dir)
            .status()
            .expect("run git");
        assert!(status.success(), "git {:?} failed", args);
    }

    fn test_repo() -> (TempDir, Git) {
        let dir = TempDir::new().expect("temp dir");
        run_git(dir.path(), &["init", "-b", "main"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test User"]);
        std::fs::write(dir.path().join("a.md"), "alpha\n").unwrap();
        run_git(dir.path(), &["add", "a.md"]);
        run_git(dir.path(), &["commit", "-m", "initial"]);
        let git = Git::open(dir.path()).expect("open");
        (dir, git)
    }

    #[test]
    fn open_missing_repo_is_not_a_repo() {
        let dir = TempDir::new().expect("temp dir");
        let err = Git::open(dir.path()).unwrap_err();
        assert!(matches!(err, GitError::NotARepo { .. }));
        assert!(!Git::exists(dir.path()));
    }

    #[test]
    fn head_queries_work() {
        let (_dir, git) = test_repo();
        let oid = git.head_oid().expect("head oid");
        assert_eq!(oid.as_str().len(), 40);
        assert_eq!(git.current_branch().expect("branch"), "main");
        assert!(git.head_time().is_ok());
    }

    #[test]
    fn stage_and_commit_advances_head() {
        let (dir, git) = test_repo();
        let before = git.head_oid().expect("before");

        std::fs::write(dir.path().join("b.md"), "beta\n").unwrap();
        git.stage("b.md", false).expect("stage");
        assert!(!git.index_matches_head().expect("dirty index"));

        let after = git.commit("add b", Some("tester")).expect("commit");
        assert_ne!(before, after);
        assert_eq!(git.head_oid().expect("head"), after);
        assert!(git.index_matches_head().expect("clean index"));
    }

    #[test]
    fn staging_nothing_leaves_index_matching_head() {
        let (_dir, git) = test_repo();
        assert!(git.index_matches_head().expect("clean"));
    }

    #[test]
    fn stage_delete_of_unknown_path_is_noop() {
        let (_dir, git) = test_repo();
        git.stage("never-existed.md", true).expect("noop remove");
        assert!(git.index_matches_head().expect("still clean"));
    }

    #[test]
    fn changed_paths_lists_blob_differences() {
        let (dir, git) = test_repo();
        let before = git.head_oid().expect("before");

        std::fs::write(dir.path().join("a.md"), "changed\n").unwrap();
        std::fs::write(dir.path().join("new.md"), "new\n").unwrap();
        git.stage("a.md", false).expect("stage a");
        git.stage("new.md", false).expect("stage new");
        let after = git.commit("edit", None).expect("commit");

        let mut changed = git.changed_paths(&before, &after).expect("diff");
        changed.sort();
        assert_eq!(changed, vec!["a.md", "new.md"]);
    }

    #[test]
    fn force_checkout_restores_tracked_content() {
        let (dir, git) = test_repo();
        let before = git.head_oid().expect("before");

        std::fs::write(dir.path().join("a.md"), "scribbled over\n").unwrap();
        git.force_checkout(&before).expect("checkout");

        let content = std::fs::read_to_string(dir.path().join("a.md")).unwrap();
        assert_eq!(content, "alpha\n");
    }
}
