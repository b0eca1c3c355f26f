//! Action history and batch reversal.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use tidyfile_core::{Action, ActionOp};

use crate::error::OpsResult;
use crate::executor::OperationExecutor;

/// Reason attached to undo steps for trashed or deleted files.
pub const CANNOT_RESTORE: &str = "Cannot restore deleted files";

/// The actions produced by one applied command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionBatch {
    /// Unique ID for this batch.
    pub id: u64,
    /// When the command was applied.
    pub created_at: DateTime<Utc>,
    /// Command that produced the batch ("organize", "clean", ...).
    pub command: String,
    /// Actions in the order they were applied.
    pub actions: Vec<Action>,
}

impl ActionBatch {
    /// Create a batch stamped with the current time.
    pub fn new(id: u64, command: impl Into<String>, actions: Vec<Action>) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            command: command.into(),
            actions,
        }
    }

    /// Number of actions in the batch.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Check if the batch has no actions.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// In-memory history of applied batches with a configurable depth.
#[derive(Debug)]
pub struct ActionLog {
    batches: VecDeque<ActionBatch>,
    max_batches: usize,
    next_id: u64,
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new(100)
    }
}

impl ActionLog {
    /// Create a log keeping at most `max_batches` batches (0 = unlimited).
    pub fn new(max_batches: usize) -> Self {
        Self {
            batches: VecDeque::with_capacity(max_batches.min(1000)),
            max_batches,
            next_id: 0,
        }
    }

    /// Record an applied batch.
    ///
    /// Empty batches are not stored. Returns the ID assigned otherwise.
    pub fn push(&mut self, command: impl Into<String>, actions: Vec<Action>) -> Option<u64> {
        if actions.is_empty() {
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;

        // Remove oldest batch if at capacity
        if self.max_batches > 0 && self.batches.len() >= self.max_batches {
            self.batches.pop_front();
        }

        self.batches.push_back(ActionBatch::new(id, command, actions));
        Some(id)
    }

    /// Get a batch by position (0 = oldest).
    pub fn get(&self, index: usize) -> Option<&ActionBatch> {
        self.batches.get(index)
    }

    /// Remove a batch by position.
    pub fn remove(&mut self, index: usize) -> Option<ActionBatch> {
        self.batches.remove(index)
    }

    /// Get the number of batches in the log.
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    /// Check if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Clear all batches from the log.
    pub fn clear(&mut self) {
        self.batches.clear();
    }

    /// Get an iterator over all batches (oldest first).
    pub fn iter(&self) -> impl Iterator<Item = &ActionBatch> {
        self.batches.iter()
    }
}

/// Reverse `actions` last-to-first through `executor`.
///
/// Moves go back to their original path (renamed if it is taken again), renames back to the
/// original name, and removed directories are recreated. Trashed and
/// deleted files yield an `undo_failed` action instead of an error.
pub fn undo_actions(executor: &mut OperationExecutor, actions: &[Action]) -> OpsResult<Vec<Action>> {
    let mut reversed = Vec::new();

    for action in actions.iter().rev() {
        let step = match (action.op(), action.dst()) {
            (ActionOp::Move | ActionOp::ArchiveDupe, Some(dst)) => executor.move_to(dst, action.src())?,
            (ActionOp::Rename, Some(dst)) => {
                let original = action
                    .src()
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                executor.rename(dst, &original)?
            }
            (ActionOp::Trash | ActionOp::Delete, _) => {
                Action::undo_failed(action.src(), CANNOT_RESTORE)
            }
            (ActionOp::Rmdir, _) => executor.make_dir(action.src())?,
            _ => continue,
        };
        debug!(%step, "undo step");
        reversed.push(step);
    }

    Ok(reversed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;

    use tempfile::TempDir;
    use tidyfile_core::META_REASON;

    use crate::trash::NoTrash;

    #[test]
    fn test_log_push_and_ids() {
        let mut log = ActionLog::new(10);

        assert_eq!(log.push("organize", vec![Action::moved("/a", "/b/a")]), Some(0));
        assert_eq!(log.push("clean", vec![Action::deleted("/c")]), Some(1));
        assert_eq!(log.len(), 2);
        assert_eq!(log.get(1).unwrap().command, "clean");
    }

    #[test]
    fn test_log_ignores_empty_batch() {
        let mut log = ActionLog::default();
        assert_eq!(log.push("rename", Vec::new()), None);
        assert!(log.is_empty());
    }

    #[test]
    fn test_log_max_batches() {
        let mut log = ActionLog::new(3);
        for i in 0..4 {
            log.push(format!("cmd{i}"), vec![Action::rmdir(format!("/d{i}"))]);
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.get(0).unwrap().command, "cmd1");
    }

    #[test]
    fn test_log_unlimited() {
        let mut log = ActionLog::new(0);
        for i in 0..150 {
            log.push("organize", vec![Action::rmdir(format!("/d{i}"))]);
        }
        assert_eq!(log.len(), 150);
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_undo_reverses_in_order() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir(root.join("src")).unwrap();
        fs::write(root.join("src/a.txt"), "a").unwrap();

        let mut exec = OperationExecutor::new(Arc::new(NoTrash), true);
        let mut batch = vec![
            exec.move_file(&root.join("src/a.txt"), &root.join("dst"))
                .unwrap(),
        ];
        batch.extend(exec.remove_empty_dirs(root).unwrap());
        assert!(!root.join("src").exists());

        let mut undo_exec = OperationExecutor::new(Arc::new(NoTrash), true);
        let steps = undo_actions(&mut undo_exec, &batch).unwrap();

        assert_eq!(steps[0].op(), ActionOp::Mkdir);
        assert_eq!(steps[1].op(), ActionOp::Move);
        assert_eq!(fs::read_to_string(root.join("src/a.txt")).unwrap(), "a");
    }

    #[test]
    fn test_undo_of_delete_is_reported() {
        let mut exec = OperationExecutor::new(Arc::new(NoTrash), true);
        let steps = undo_actions(
            &mut exec,
            &[Action::trashed("/x/a"), Action::dupe("/x/b", Path::new("/x/c"))],
        )
        .unwrap();

        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].op(), ActionOp::UndoFailed);
        assert_eq!(steps[0].meta(META_REASON), Some(CANNOT_RESTORE));
    }
}
