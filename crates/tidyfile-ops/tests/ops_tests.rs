use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use tidyfile_core::ActionOp;
use tidyfile_ops::{
    ActionLog, OperationExecutor, OpsResult, TrashCan, undo_actions, unique_path,
};

/// Trash double that records paths and removes them like a real trash.
#[derive(Default)]
struct RecordingTrash {
    trashed: Mutex<Vec<PathBuf>>,
}

impl TrashCan for RecordingTrash {
    fn can_trash(&self) -> bool {
        true
    }

    fn trash(&self, path: &Path) -> OpsResult<()> {
        fs::remove_file(path).map_err(|e| tidyfile_ops::OpsError::io(path, e))?;
        self.trashed.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

#[test]
fn test_trash_routing() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a.tmp");
    let b = temp.path().join("b.tmp");
    fs::write(&a, "a").unwrap();
    fs::write(&b, "b").unwrap();

    let trash = Arc::new(RecordingTrash::default());
    let mut exec = OperationExecutor::new(trash.clone(), true);

    let trashed = exec.delete(&a, true).unwrap();
    let deleted = exec.delete(&b, false).unwrap();

    assert_eq!(trashed.op(), ActionOp::Trash);
    assert_eq!(deleted.op(), ActionOp::Delete);
    assert_eq!(*trash.trashed.lock().unwrap(), vec![a.clone()]);
    assert!(!a.exists() && !b.exists());
}

#[test]
fn test_trash_preview_does_not_call_trash() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a.tmp");
    fs::write(&a, "a").unwrap();

    let trash = Arc::new(RecordingTrash::default());
    let action = OperationExecutor::new(trash.clone(), false)
        .delete(&a, true)
        .unwrap();

    assert_eq!(action.op(), ActionOp::Trash);
    assert!(trash.trashed.lock().unwrap().is_empty());
    assert!(a.exists());
}

#[test]
fn test_collision_safety_on_disk() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("one")).unwrap();
    fs::create_dir_all(root.join("two")).unwrap();
    fs::write(root.join("one/photo.jpg"), "first").unwrap();
    fs::write(root.join("two/photo.jpg"), "second").unwrap();

    let mut exec = OperationExecutor::new(Arc::new(RecordingTrash::default()), true);
    let a = exec.move_file(&root.join("one/photo.jpg"), &root.join("all")).unwrap();
    let b = exec.move_file(&root.join("two/photo.jpg"), &root.join("all")).unwrap();

    assert_ne!(a.dst(), b.dst());
    assert_eq!(fs::read_dir(root.join("all")).unwrap().count(), 2);
    assert_eq!(unique_path(&root.join("all/photo.jpg")), root.join("all/photo (2).jpg"));
}

#[test]
fn test_rename_round_trip_through_log() {
    let temp = TempDir::new().unwrap();
    let original = temp.path().join("report.txt");
    fs::write(&original, "quarterly").unwrap();

    let mut log = ActionLog::new(10);
    let mut exec = OperationExecutor::new(Arc::new(RecordingTrash::default()), true);
    let action = exec.rename(&original, "report_001.txt").unwrap();
    log.push("rename", vec![action]);
    assert!(!original.exists());

    let batch = log.remove(0).unwrap();
    let mut undo = OperationExecutor::new(Arc::new(RecordingTrash::default()), true);
    let steps = undo_actions(&mut undo, &batch.actions).unwrap();

    assert_eq!(steps.len(), 1);
    assert_eq!(fs::read_to_string(&original).unwrap(), "quarterly");
    assert!(log.is_empty());
}
