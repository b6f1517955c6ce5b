//! queue
//!
//! The Change Queue: an ordered, persisted ledger of local paths mutated
//! since the last successful sync.
//!
//! # Semantics
//!
//! - At most one entry per path.
//! - Inserting any action over an existing entry replaces the action and
//!   refreshes the timestamp, **except**: inserting `Delete` over a pending
//!   `Add` removes the entry entirely (net effect: the path never existed).
//! - Persisted order is insertion order; correctness does not depend on it,
//!   but it is preserved for debugging.
//!
//! # Persistence
//!
//! The queue is persisted as JSON at `<vault root>/pending-changes.json`
//! via an atomic temp-file-plus-rename write. The in-memory queue is
//! authoritative: a failed persist is logged, not surfaced, because the
//! caller's edit already happened and the queue must reflect it. A missing
//! or corrupt file on load yields an empty queue with a logged warning.
//!
//! # Concurrency
//!
//! The queue serializes its own read-modify-write internally (UI edit
//! handlers and the engine's clear-on-success both mutate it), so all
//! methods take `&self`.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

use crate::core::types::{ChangeAction, ChangeQueueEntry};
use crate::ui::output::{self, Verbosity};

/// Errors from explicit queue persistence operations.
///
/// Note that `add` never returns these; persistence failure on add is
/// logged and swallowed by contract.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("failed to persist change queue: {0}")]
    PersistFailed(String),
}

/// The pending-change ledger.
///
/// Sole source of truth for "what must still be synced". Cleared only by
/// the engine after a provably successful push (or a provable no-op).
#[derive(Debug)]
pub struct ChangeQueue {
    /// Where the queue is persisted.
    path: PathBuf,
    /// Ordered entries, guarded so add/collapse is a single atomic step.
    entries: Mutex<Vec<ChangeQueueEntry>>,
    /// Verbosity for persistence warnings.
    verbosity: Verbosity,
}

impl ChangeQueue {
    /// Load the queue from its persisted file, or start empty.
    ///
    /// A missing file is the normal first-run case. A corrupt file is
    /// logged and treated as empty rather than blocking startup.
    pub fn load(path: PathBuf, verbosity: Verbosity) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Vec<ChangeQueueEntry>>(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    output::warn(
                        format!("change queue file is corrupt, starting empty: {}", e),
                        verbosity,
                    );
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };

        Self {
            path,
            entries: Mutex::new(entries),
            verbosity,
        }
    }

    /// Insert or merge an entry for `path`.
    ///
    /// Merge rules (single atomic step under the internal lock):
    /// - `Delete` over a pending `Add` removes the entry entirely: the path
    ///   never made it into a pushed commit, so nothing must be synced.
    /// - `Modify` over a pending `Add` keeps the action `Add` (the path is
    ///   still new to the remote) and refreshes `queued_at`, so a later
    ///   `Delete` still collapses the whole chain.
    /// - Any other insert over an existing entry replaces the action and
    ///   refreshes `queued_at`, keeping the entry's position.
    /// - A new path appends at the end.
    ///
    /// Always succeeds from the caller's perspective; the best-effort
    /// persist logs on failure.
    pub fn add(&self, path: &str, action: ChangeAction) {
        {
            let mut entries = self.entries.lock().expect("queue lock poisoned");

            match entries.iter().position(|e| e.path == path) {
                Some(idx) => match (entries[idx].action, action) {
                    (ChangeAction::Add, ChangeAction::Delete) => {
                        entries.remove(idx);
                    }
                    (ChangeAction::Add, ChangeAction::Modify) => {
                        entries[idx] = ChangeQueueEntry::new(path, ChangeAction::Add);
                    }
                    _ => entries[idx] = ChangeQueueEntry::new(path, action),
                },
                None => entries.push(ChangeQueueEntry::new(path, action)),
            }
        }

        self.persist_best_effort();
    }

    /// Ordered snapshot of the current entries. Pure read.
    pub fn entries(&self) -> Vec<ChangeQueueEntry> {
        self.entries.lock().expect("queue lock poisoned").clone()
    }

    /// Number of pending entries.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("queue lock poisoned").len()
    }

    /// Whether the queue has no pending entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove the entry for `path`, if any.
    pub fn remove(&self, path: &str) {
        {
            let mut entries = self.entries.lock().expect("queue lock poisoned");
            entries.retain(|e| e.path != path);
        }
        self.persist_best_effort();
    }

    /// Empty the queue.
    ///
    /// Called by the engine only after a confirmed push (or a confirmed
    /// nothing-to-push).
    pub fn clear(&self) {
        self.entries.lock().expect("queue lock poisoned").clear();
        self.persist_best_effort();
    }

    /// Persist now, surfacing failure. Used by tests and shutdown paths
    /// that want a durability guarantee rather than best-effort.
    pub fn persist(&self) -> Result<(), QueueError> {
        let snapshot = self.entries();
        let content = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| QueueError::PersistFailed(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| QueueError::PersistFailed(e.to_string()))?;
        }

        // Atomic write: temp sibling, then rename over the target.
        let temp = self.path.with_extension("json.tmp");
        fs::write(&temp, content).map_err(|e| QueueError::PersistFailed(e.to_string()))?;
        fs::rename(&temp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp);
            QueueError::PersistFailed(e.to_string())
        })?;

        Ok(())
    }

    fn persist_best_effort(&self) {
        if let Err(e) = self.persist() {
            // In-memory state stays authoritative until the process dies.
            output::warn(e, self.verbosity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn queue() -> (TempDir, ChangeQueue) {
        let temp = TempDir::new().expect("temp dir");
        let q = ChangeQueue::load(temp.path().join("pending-changes.json"), Verbosity::Quiet);
        (temp, q)
    }

    #[test]
    fn starts_empty() {
        let (_temp, q) = queue();
        assert!(q.is_empty());
        assert_eq!(q.entries(), vec![]);
    }

    #[test]
    fn add_then_delete_collapses() {
        let (_temp, q) = queue();
        q.add("notes/new.md", ChangeAction::Add);
        q.add("notes/new.md", ChangeAction::Delete);
        assert!(q.is_empty(), "Add followed by Delete must vanish");
    }

    #[test]
    fn modify_then_delete_keeps_delete() {
        let (_temp, q) = queue();
        q.add("notes/a.md", ChangeAction::Modify);
        q.add("notes/a.md", ChangeAction::Delete);

        let entries = q.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, ChangeAction::Delete);
    }

    #[test]
    fn reinsert_replaces_action_in_place() {
        let (_temp, q) = queue();
        q.add("a.md", ChangeAction::Modify);
        q.add("b.md", ChangeAction::Add);
        q.add("a.md", ChangeAction::Delete);

        let entries = q.entries();
        assert_eq!(entries.len(), 2);
        // Position preserved
        assert_eq!(entries[0].path, "a.md");
        assert_eq!(entries[0].action, ChangeAction::Delete);
    }

    #[test]
    fn modify_over_add_stays_add() {
        let (_temp, q) = queue();
        q.add("new.md", ChangeAction::Add);
        q.add("new.md", ChangeAction::Modify);

        assert_eq!(q.entries()[0].action, ChangeAction::Add);

        // ...so the collapse still fires after intervening modifies.
        q.add("new.md", ChangeAction::Delete);
        assert!(q.is_empty());
    }

    #[test]
    fn at_most_one_entry_per_path() {
        let (_temp, q) = queue();
        q.add("a.md", ChangeAction::Add);
        q.add("a.md", ChangeAction::Modify);
        q.add("a.md", ChangeAction::Modify);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn remove_targets_single_path() {
        let (_temp, q) = queue();
        q.add("a.md", ChangeAction::Add);
        q.add("b.md", ChangeAction::Modify);
        q.remove("a.md");

        let entries = q.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "b.md");
    }

    #[test]
    fn clear_empties_queue() {
        let (_temp, q) = queue();
        q.add("a.md", ChangeAction::Add);
        q.add("b.md", ChangeAction::Delete);
        q.clear();
        assert!(q.is_empty());
    }

    #[test]
    fn persists_across_instances() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("pending-changes.json");

        {
            let q = ChangeQueue::load(path.clone(), Verbosity::Quiet);
            q.add("notes/a.md", ChangeAction::Modify);
            q.add("notes/b.md", ChangeAction::Add);
        }

        let q = ChangeQueue::load(path, Verbosity::Quiet);
        let entries = q.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, "notes/a.md");
        assert_eq!(entries[1].path, "notes/b.md");
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("pending-changes.json");
        fs::write(&path, "{not json").expect("write");

        let q = ChangeQueue::load(path, Verbosity::Quiet);
        assert!(q.is_empty());
    }

    proptest! {
        /// For any action sequence on one path, an Add eventually followed
        /// by a Delete (with no intervening sync) leaves no entry behind.
        #[test]
        fn collapse_invariant_holds(actions in prop::collection::vec(0..3usize, 1..20)) {
            let temp = TempDir::new().expect("temp dir");
            let q = ChangeQueue::load(
                temp.path().join("pending-changes.json"),
                Verbosity::Quiet,
            );

            // Reference model: the queued action for the path, if any.
            let mut model: Option<ChangeAction> = None;
            for a in actions {
                let action = [ChangeAction::Add, ChangeAction::Modify, ChangeAction::Delete][a];
                q.add("note.md", action);
                model = match (model, action) {
                    (Some(ChangeAction::Add), ChangeAction::Delete) => None,
                    (Some(ChangeAction::Add), ChangeAction::Modify) => Some(ChangeAction::Add),
                    _ => Some(action),
                };
            }

            prop_assert_eq!(q.len(), usize::from(model.is_some()));
            if let Some(expected) = model {
                prop_assert_eq!(q.entries()[0].action, expected);
            }
        }
    }
}
