//! core::types
//!
//! Strong types for the sync domain.
//!
//! # Design
//!
//! These types cross every module boundary in the crate, so they are kept
//! small, owned, and serde-friendly. The queue persists
//! [`ChangeQueueEntry`] values as JSON; [`SyncStatus`] is rendered as JSON
//! by `status --json`; [`GitAuth`] is serialized into the credential store.
//!
//! # Security
//!
//! [`GitAuth`] is an opaque credential bundle. It must never be logged,
//! printed, or included in error messages. Its `Debug` implementation
//! redacts the token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A git object id, held as its 40-character hex form.
///
/// Strong type at the git boundary: no other module handles raw git2 ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Oid(String);

impl Oid {
    /// Wrap a hex object id string.
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// The full hex form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An abbreviated prefix for display.
    pub fn short(&self, len: usize) -> &str {
        &self.0[..len.min(self.0.len())]
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of local mutation recorded for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    /// Path was created since the last successful sync.
    Add,
    /// Path existed at the last sync and its content changed.
    Modify,
    /// Path was removed.
    Delete,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeAction::Add => write!(f, "add"),
            ChangeAction::Modify => write!(f, "modify"),
            ChangeAction::Delete => write!(f, "delete"),
        }
    }
}

/// One pending change in the Change Queue.
///
/// Keyed by `path`: the queue holds at most one entry per path. See
/// [`crate::queue::ChangeQueue`] for the merge/collapse rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeQueueEntry {
    /// Vault-relative path, forward slashes, no leading slash.
    pub path: String,
    /// What happened to the path.
    pub action: ChangeAction,
    /// When the entry was (last) queued.
    pub queued_at: DateTime<Utc>,
}

impl ChangeQueueEntry {
    /// Create an entry queued now.
    pub fn new(path: impl Into<String>, action: ChangeAction) -> Self {
        Self {
            path: path.into(),
            action,
            queued_at: Utc::now(),
        }
    }
}

/// High-level synchronization state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncState {
    /// Local tree matches the last pushed commit and the queue is empty.
    Synced,
    /// Local changes are queued but not yet pushed.
    Pending,
    /// No local clone exists, or no credentials are configured.
    Offline,
    /// The most recent status inspection failed.
    Error,
}

/// Derived snapshot of where the vault stands relative to the remote.
///
/// Never stored; computed on demand by the engine. `last_sync_at` is read
/// from the most recent commit's timestamp in local history, so it survives
/// app reinstall as long as the clone survives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    /// Current state.
    pub state: SyncState,
    /// Number of entries in the Change Queue.
    pub pending_changes: usize,
    /// Timestamp of the most recent local commit, if any.
    pub last_sync_at: Option<DateTime<Utc>>,
    /// Human-readable detail when `state` is `Offline` or `Error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncStatus {
    /// Status for a device with no usable clone or credentials.
    pub fn offline(pending_changes: usize, error: Option<String>) -> Self {
        Self {
            state: SyncState::Offline,
            pending_changes,
            last_sync_at: None,
            error,
        }
    }
}

/// Outcome of a `pull()` reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullResult {
    /// Paths whose blob content differs between the pre-pull and post-pull
    /// tree snapshots (full tree diff, not a remote changelist).
    pub updated: Vec<String>,
    /// Subset of `updated` that also had unsaved local edits queued at the
    /// moment pull was invoked. Resolved local-wins.
    pub conflicts: Vec<String>,
}

impl PullResult {
    /// The empty result returned by the fast-forward short-circuit.
    pub fn unchanged() -> Self {
        Self::default()
    }
}

/// Credential kind for the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthKind {
    /// OAuth access token.
    OAuth,
    /// Personal access token.
    Pat,
}

/// Opaque credential bundle attached to every transport operation.
///
/// The engine never inspects the token; it only hands it to the transport
/// layer's credentials callback. When `username` is absent, the transport
/// substitutes a fixed placeholder accepted by token-auth providers.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitAuth {
    /// How the token was obtained.
    pub kind: AuthKind,
    /// The secret. Never logged.
    pub token: String,
    /// Username for basic auth; placeholder substituted when absent.
    pub username: Option<String>,
    /// Remote URL this credential was configured for, if known.
    pub repo_url: Option<String>,
}

impl GitAuth {
    /// Create a personal-access-token credential.
    pub fn pat(token: impl Into<String>) -> Self {
        Self {
            kind: AuthKind::Pat,
            token: token.into(),
            username: None,
            repo_url: None,
        }
    }
}

// Redact the token: GitAuth values travel through error paths and debug
// output, and the secret must never leak there.
impl fmt::Debug for GitAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitAuth")
            .field("kind", &self.kind)
            .field("token", &"<redacted>")
            .field("username", &self.username)
            .field("repo_url", &self.repo_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_action_display() {
        assert_eq!(ChangeAction::Add.to_string(), "add");
        assert_eq!(ChangeAction::Modify.to_string(), "modify");
        assert_eq!(ChangeAction::Delete.to_string(), "delete");
    }

    #[test]
    fn entry_round_trips_through_json() {
        let entry = ChangeQueueEntry::new("notes/a.md", ChangeAction::Modify);
        let json = serde_json::to_string(&entry).expect("serialize");
        let back: ChangeQueueEntry = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(entry, back);
    }

    #[test]
    fn auth_debug_redacts_token() {
        let auth = GitAuth::pat("ghp_supersecret");
        let rendered = format!("{:?}", auth);
        assert!(!rendered.contains("supersecret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn offline_status_carries_pending_count() {
        let status = SyncStatus::offline(3, Some("no credentials".into()));
        assert_eq!(status.state, SyncState::Offline);
        assert_eq!(status.pending_changes, 3);
        assert!(status.last_sync_at.is_none());
    }

    #[test]
    fn status_json_omits_absent_error() {
        let status = SyncStatus {
            state: SyncState::Synced,
            pending_changes: 0,
            last_sync_at: None,
            error: None,
        };
        let json = serde_json::to_string(&status).expect("serialize");
        assert!(!json.contains("error"));
    }

    #[test]
    fn unchanged_pull_result_is_empty() {
        let result = PullResult::unchanged();
        assert!(result.updated.is_empty());
        assert!(result.conflicts.is_empty());
    }
}
