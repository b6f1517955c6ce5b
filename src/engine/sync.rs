//! engine::sync
//!
//! The core sync state machine: clone / pull / commit+push / status.
//!
//! # Ordering guarantees
//!
//! Within a single operation, steps run strictly in sequence. In `pull`,
//! dirty-file capture always precedes the checkout that overwrites the
//! working tree; that ordering is what makes local-wins conflict
//! resolution possible at all.
//!
//! # Conflict policy
//!
//! Local-wins, fixed, non-negotiable. This is a single-user note vault:
//! the user's most recent on-device edit is definitionally current, and
//! silently discarding it for a remote version would be the worse failure
//! mode. The overwritten remote version stays reachable in history; every
//! resolution is appended to the conflict log for audit.
//!
//! # Failure semantics
//!
//! `clone`, `pull`, and `commit_and_push` propagate errors to the caller.
//! The Change Queue is cleared only after a provably successful push (or a
//! provable nothing-to-push), so a failed push leaves the next attempt
//! with the same staged changes: at-least-once delivery of local edits.
//! `status()` never fails; it folds inspection errors into its result.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;

use crate::core::config::Config;
use crate::core::paths::VaultPaths;
use crate::core::types::{ChangeAction, GitAuth, PullResult, SyncState, SyncStatus};
use crate::git::{Git, GitError};
use crate::queue::ChangeQueue;
use crate::secrets::CredentialStore;
use crate::ui::output::{self, Verbosity};
use crate::vault::{VaultError, VaultFs};

use super::lock::{LockError, SyncLock};

/// Errors from sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No clone exists yet; run `clone` first.
    #[error("no local clone exists; clone a repository first")]
    NotCloned,

    /// Git-level failure (includes network and auth errors with hints).
    #[error(transparent)]
    Git(#[from] GitError),

    /// Working-tree failure.
    #[error(transparent)]
    Vault(#[from] VaultError),

    /// Another sync operation holds the vault lock.
    #[error(transparent)]
    Lock(#[from] LockError),

    /// Filesystem failure outside the working tree.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// The sync engine.
///
/// One instance per vault, owning the Change Queue and the credential
/// reference. Constructed once per process and shared by handle; see the
/// module docs in [`crate::engine`] for the serialization story.
pub struct SyncEngine {
    paths: VaultPaths,
    queue: ChangeQueue,
    credentials: CredentialStore,
    /// Current credential bundle; lazily loaded from the store on first use.
    auth: Option<GitAuth>,
    /// TTL for working-tree listing caches handed out by [`Self::vault_fs`].
    list_cache_ttl: Duration,
    verbosity: Verbosity,
}

impl SyncEngine {
    /// Create an engine for the vault at `paths`.
    ///
    /// Loads the persisted Change Queue; does not touch the network.
    pub fn new(
        paths: VaultPaths,
        credentials: CredentialStore,
        verbosity: Verbosity,
    ) -> Result<Self, SyncError> {
        paths.ensure_root()?;
        let queue = ChangeQueue::load(paths.queue_path(), verbosity);
        Ok(Self {
            paths,
            queue,
            credentials,
            auth: None,
            list_cache_ttl: Duration::from_secs(Config::default().list_cache_ttl_secs),
            verbosity,
        })
    }

    /// The Change Queue. Edit handlers record local mutations through it.
    pub fn queue(&self) -> &ChangeQueue {
        &self.queue
    }

    /// The vault's path layout.
    pub fn paths(&self) -> &VaultPaths {
        &self.paths
    }

    /// A working-tree adapter rooted at the clone, carrying the
    /// configured listing cache TTL.
    pub fn vault_fs(&self) -> VaultFs {
        VaultFs::with_cache_ttl(self.paths.repo_dir(), self.list_cache_ttl)
    }

    /// Override the listing cache TTL (normally the configured
    /// `list_cache_ttl_secs`).
    pub fn set_list_cache_ttl(&mut self, ttl: Duration) {
        self.list_cache_ttl = ttl;
    }

    /// Set the credential bundle for subsequent operations.
    pub fn set_auth(&mut self, auth: GitAuth) {
        self.auth = Some(auth);
    }

    /// Resolve the current credential bundle: the stored value, else a
    /// lazy load from the credential store. `None` means operations
    /// proceed anonymously and fail at the transport on private remotes.
    fn resolve_auth(&mut self) -> Option<GitAuth> {
        if self.auth.is_none() {
            match self.credentials.get_token() {
                Ok(loaded) => self.auth = loaded,
                Err(e) => {
                    output::warn(
                        format!("could not load credentials: {}", e),
                        self.verbosity,
                    );
                }
            }
        }
        self.auth.clone()
    }

    /// Clone `repo_url` into the vault, from scratch.
    ///
    /// Any pre-existing directory at the clone target is recursively
    /// deleted first; clone is never incremental. On failure, state is
    /// whatever the git engine left behind, and the recovery path is to
    /// call `clone` again.
    pub fn clone(&mut self, repo_url: &str, auth: GitAuth) -> Result<(), SyncError> {
        self.auth = Some(auth);
        let _lock = SyncLock::acquire(&self.paths)?;

        let target = self.paths.repo_dir();
        if target.exists() {
            fs::remove_dir_all(&target)?;
        }
        fs::create_dir_all(&target)?;

        output::debug(format!("cloning into {}", target.display()), self.verbosity);
        Git::clone(repo_url, &target, self.auth.as_ref())?;
        Ok(())
    }

    /// Pull and reconcile remote changes.
    ///
    /// Steps, strictly in order:
    /// 1. Capture the on-disk content of every queued Add/Modify path
    ///    (the working tree's uncommitted state, before checkout can
    ///    overwrite it).
    /// 2. Record `HEAD` as the before-snapshot.
    /// 3. Fetch.
    /// 4. Resolve the remote tip; if it equals the before-snapshot,
    ///    return an empty result without touching the working tree.
    /// 5. Force-checkout the remote tip.
    /// 6. Diff the before/after trees into `updated`.
    /// 7. Re-write every captured path that appears in `updated` with its
    ///    captured local content (local wins), log it, report it in
    ///    `conflicts`.
    pub fn pull(&mut self) -> Result<PullResult, SyncError> {
        let auth = self.resolve_auth();
        let repo_dir = self.paths.repo_dir();
        if !Git::exists(&repo_dir) {
            return Err(SyncError::NotCloned);
        }

        let _lock = SyncLock::acquire(&self.paths)?;
        let vault = self.vault_fs();

        // Dirty capture before anything can rewrite the working tree.
        let mut dirty: HashMap<String, Vec<u8>> = HashMap::new();
        for entry in self.queue.entries() {
            if entry.action == ChangeAction::Delete {
                continue;
            }
            match vault.read_file(&entry.path) {
                Ok(content) => {
                    dirty.insert(entry.path.clone(), content);
                }
                // Queued but already gone from disk: nothing to protect.
                Err(VaultError::NotFound { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }

        let git = Git::open(&repo_dir)?;
        let before = git.head_oid()?;

        git.fetch(auth.as_ref())?;
        let tip = git.remote_tip()?;

        if before == tip {
            // Nothing new: pull must be a no-op so it can run on every
            // auto-sync tick without perturbing the working tree.
            output::debug("pull: already at remote tip", self.verbosity);
            return Ok(PullResult::unchanged());
        }

        git.force_checkout(&tip)?;
        let updated = git.changed_paths(&before, &tip)?;

        let mut conflicts = Vec::new();
        for path in &updated {
            if let Some(content) = dirty.get(path) {
                vault.write_file(path, content)?;
                self.log_conflict(path)?;
                conflicts.push(path.clone());
            }
        }

        output::debug(
            format!(
                "pull: {} -> {} ({} updated, {} conflicts)",
                before.short(7),
                tip.short(7),
                updated.len(),
                conflicts.len()
            ),
            self.verbosity,
        );
        Ok(PullResult { updated, conflicts })
    }

    /// Commit queued changes and push them to the remote.
    ///
    /// Never commits an empty changeset: if staging the queue leaves the
    /// index identical to `HEAD`, commit and push are skipped but the
    /// queue is still cleared (stale entries for already-synced paths
    /// must not linger). The queue is cleared after a successful push and
    /// only then; a failed push leaves it intact for the next attempt.
    pub fn commit_and_push(&mut self, message: &str) -> Result<(), SyncError> {
        let auth = self.resolve_auth();
        let repo_dir = self.paths.repo_dir();
        if !Git::exists(&repo_dir) {
            return Err(SyncError::NotCloned);
        }

        let _lock = SyncLock::acquire(&self.paths)?;
        let git = Git::open(&repo_dir)?;

        for entry in self.queue.entries() {
            git.stage(&entry.path, entry.action == ChangeAction::Delete)?;
        }

        if git.index_matches_head()? {
            output::debug("nothing to commit; clearing queue", self.verbosity);
            self.queue.clear();
            return Ok(());
        }

        let author = auth.as_ref().and_then(|a| a.username.as_deref());
        let oid = git.commit(message, author)?;
        output::debug(format!("committed {}", oid.short(7)), self.verbosity);

        git.push(auth.as_ref())?;
        self.queue.clear();
        Ok(())
    }

    /// Derive the current sync status. Never fails.
    ///
    /// `Offline` without a clone or credentials; `Error` if the credential
    /// store cannot be read or history inspection fails; otherwise
    /// `Pending` or `Synced` by queue emptiness, with `last_sync_at` from
    /// the most recent commit.
    pub fn status(&self) -> SyncStatus {
        let pending = self.queue.len();

        if !Git::exists(&self.paths.repo_dir()) {
            return SyncStatus::offline(pending, Some("no local clone".into()));
        }

        // A store that cannot be read is a fault, not an absence: report
        // it as Error so the user does not get told to re-authenticate
        // when the real problem is a broken secrets file.
        let has_auth = match (&self.auth, self.credentials.has_token()) {
            (Some(_), _) => true,
            (None, Ok(present)) => present,
            (None, Err(e)) => {
                return SyncStatus {
                    state: SyncState::Error,
                    pending_changes: pending,
                    last_sync_at: None,
                    error: Some(e.to_string()),
                };
            }
        };
        if !has_auth {
            return SyncStatus::offline(pending, Some("no credentials configured".into()));
        }

        let inspect = || -> Result<SyncStatus, GitError> {
            let git = Git::open(&self.paths.repo_dir())?;
            let last_sync_at = Some(git.head_time()?);
            let state = if pending > 0 {
                SyncState::Pending
            } else {
                SyncState::Synced
            };
            Ok(SyncStatus {
                state,
                pending_changes: pending,
                last_sync_at,
                error: None,
            })
        };

        inspect().unwrap_or_else(|e| SyncStatus {
            state: SyncState::Error,
            pending_changes: pending,
            last_sync_at: None,
            error: Some(e.to_string()),
        })
    }

    /// Append one line to the conflict audit log.
    ///
    /// Plain text, append-only, outside the tracked tree so it is never
    /// committed. Human-readable only; nothing parses it.
    fn log_conflict(&self, path: &str) -> Result<(), SyncError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.paths.conflict_log_path())?;
        writeln!(
            file,
            "{}: LWW conflict resolved for {} (local version kept)",
            Utc::now().to_rfc3339(),
            path
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::FileSecretStore;
    use tempfile::TempDir;

    fn engine() -> (TempDir, SyncEngine) {
        let temp = TempDir::new().expect("temp dir");
        let paths = VaultPaths::new(temp.path().join("vault"));
        let secrets = FileSecretStore::with_path(temp.path().join("secrets.toml"));
        let credentials = CredentialStore::new(Box::new(secrets));
        let engine =
            SyncEngine::new(paths, credentials, Verbosity::Quiet).expect("engine");
        (temp, engine)
    }

    #[test]
    fn status_without_clone_is_offline() {
        let (_temp, engine) = engine();
        let status = engine.status();
        assert_eq!(status.state, SyncState::Offline);
        assert_eq!(status.pending_changes, 0);
        assert_eq!(status.error.as_deref(), Some("no local clone"));
    }

    #[test]
    fn offline_status_still_counts_pending() {
        let (_temp, engine) = engine();
        engine.queue().add("a.md", ChangeAction::Add);
        engine.queue().add("b.md", ChangeAction::Modify);
        assert_eq!(engine.status().pending_changes, 2);
    }

    #[test]
    fn pull_without_clone_fails_fast() {
        let (_temp, mut engine) = engine();
        assert!(matches!(engine.pull(), Err(SyncError::NotCloned)));
    }

    #[test]
    fn push_without_clone_fails_fast() {
        let (_temp, mut engine) = engine();
        assert!(matches!(
            engine.commit_and_push("msg"),
            Err(SyncError::NotCloned)
        ));
    }

    #[test]
    fn set_auth_takes_precedence_over_store() {
        let (_temp, mut engine) = engine();
        engine.set_auth(GitAuth::pat("explicit"));
        let resolved = engine.resolve_auth().expect("auth");
        assert_eq!(resolved.token, "explicit");
    }

    #[test]
    fn auth_lazily_loaded_from_store() {
        let (_temp, mut engine) = engine();
        engine
            .credentials
            .store_token(&GitAuth::pat("stored"))
            .expect("store");
        let resolved = engine.resolve_auth().expect("auth");
        assert_eq!(resolved.token, "stored");
    }

    #[test]
    fn vault_fs_carries_configured_cache_ttl() {
        let (_temp, mut engine) = engine();
        assert_eq!(
            engine.vault_fs().cache_ttl(),
            Duration::from_secs(Config::default().list_cache_ttl_secs)
        );

        engine.set_list_cache_ttl(Duration::from_secs(42));
        assert_eq!(engine.vault_fs().cache_ttl(), Duration::from_secs(42));
    }

    #[test]
    fn conflict_log_lines_are_append_only() {
        let (_temp, engine) = engine();
        engine.log_conflict("notes/a.md").expect("log");
        engine.log_conflict("notes/b.md").expect("log");

        let content =
            fs::read_to_string(engine.paths().conflict_log_path()).expect("read log");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("LWW conflict resolved for notes/a.md"));
        assert!(lines[0].ends_with("(local version kept)"));
        assert!(lines[1].contains("notes/b.md"));
    }
}
