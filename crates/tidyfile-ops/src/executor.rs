//! Primitive mutating operations with preview support.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use jwalk::{Parallelism, WalkDir};
use tracing::{debug, warn};

use tidyfile_core::Action;

use crate::error::{OpsError, OpsResult};
use crate::resolver::{PathResolver, ensure_dir};
use crate::trash::TrashCan;

/// Runs the moves, renames and deletes of one command invocation.
///
/// With `apply` off every method still resolves names and returns the
/// [`Action`] it would produce, without touching the filesystem. The
/// executor's [`PathResolver`] makes both modes resolve collisions the
/// same way.
pub struct OperationExecutor {
    trash: Arc<dyn TrashCan>,
    resolver: PathResolver,
    apply: bool,
}

impl std::fmt::Debug for OperationExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationExecutor")
            .field("can_trash", &self.trash.can_trash())
            .field("apply", &self.apply)
            .finish()
    }
}

impl OperationExecutor {
    /// Create an executor for one batch.
    pub fn new(trash: Arc<dyn TrashCan>, apply: bool) -> Self {
        Self {
            trash,
            resolver: PathResolver::new(),
            apply,
        }
    }

    /// Move `src` into `dest_dir`, renaming on collision.
    pub fn move_file(&mut self, src: &Path, dest_dir: &Path) -> OpsResult<Action> {
        let target = dest_dir.join(file_name(src)?);
        let dst = self.relocate(src, &target)?;
        Ok(Action::moved(src, dst))
    }

    /// Move `src` to the exact path `target`, renaming on collision.
    pub fn move_to(&mut self, src: &Path, target: &Path) -> OpsResult<Action> {
        let dst = self.relocate(src, target)?;
        Ok(Action::moved(src, dst))
    }

    /// Move a duplicate into an archive directory.
    pub fn archive_dupe(&mut self, src: &Path, archive_dir: &Path, kept: &Path) -> OpsResult<Action> {
        let target = archive_dir.join(file_name(src)?);
        let dst = self.relocate(src, &target)?;
        Ok(Action::archived_dupe(src, dst, kept))
    }

    fn relocate(&mut self, src: &Path, target: &Path) -> OpsResult<PathBuf> {
        let dst = self.resolver.resolve(target);
        if let Some(path) = dst.parent().and_then(|p| self.resolver.blocking_ancestor(p)) {
            return Err(OpsError::NotADirectory { path });
        }

        if self.apply {
            if let Some(parent) = dst.parent() {
                ensure_dir(parent, true)?;
            }
            move_item(src, &dst)?;
        }
        debug!(src = %src.display(), dst = %dst.display(), apply = self.apply, "move");

        self.resolver.vacate(src);
        self.resolver.reserve(&dst);
        Ok(dst)
    }

    /// Rename `src` within its directory, renaming again on collision.
    pub fn rename(&mut self, src: &Path, new_name: &str) -> OpsResult<Action> {
        validate_filename(new_name)?;
        let parent = src.parent().unwrap_or(Path::new(""));
        let dst = self.resolver.resolve(&parent.join(new_name));

        if self.apply {
            fs::rename(src, &dst).map_err(|e| OpsError::io(src, e))?;
        }
        debug!(src = %src.display(), dst = %dst.display(), apply = self.apply, "rename");

        self.resolver.vacate(src);
        self.resolver.reserve(&dst);
        Ok(Action::renamed(src, dst))
    }

    /// Delete a file, through the trash when asked and available.
    pub fn delete(&mut self, path: &Path, use_trash: bool) -> OpsResult<Action> {
        let action = if use_trash && self.trash.can_trash() {
            if self.apply {
                self.trash.trash(path)?;
            }
            Action::trashed(path)
        } else {
            if self.apply {
                fs::remove_file(path).map_err(|e| OpsError::io(path, e))?;
            }
            Action::deleted(path)
        };
        debug!(path = %path.display(), op = %action.op(), apply = self.apply, "delete");

        self.resolver.vacate(path);
        Ok(action)
    }

    /// Create a directory and its parents.
    pub fn make_dir(&mut self, path: &Path) -> OpsResult<Action> {
        ensure_dir(path, self.apply)?;
        self.resolver.reserve_dir(path);
        Ok(Action::mkdir(path))
    }

    /// Remove every directory under `root` left empty by this batch,
    /// deepest first. `root` itself is kept.
    pub fn remove_empty_dirs(&mut self, root: &Path) -> OpsResult<Vec<Action>> {
        let mut dirs: Vec<PathBuf> = WalkDir::new(root)
            .parallelism(Parallelism::Serial)
            .sort(true)
            .skip_hidden(false)
            .follow_links(false)
            .min_depth(1)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) if e.file_type().is_dir() => Some(e.path()),
                Ok(_) => None,
                Err(err) => {
                    warn!(%err, "skipping unreadable entry");
                    None
                }
            })
            .collect();
        dirs.reverse();

        let mut actions = Vec::new();
        for dir in dirs {
            match self.resolver.is_empty_dir(&dir) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(err) => {
                    warn!(dir = %dir.display(), %err, "skipping unreadable directory");
                    continue;
                }
            }
            if self.apply
                && let Err(err) = fs::remove_dir(&dir)
            {
                warn!(dir = %dir.display(), %err, "failed to remove empty directory");
                continue;
            }
            debug!(dir = %dir.display(), apply = self.apply, "rmdir");
            self.resolver.vacate(&dir);
            actions.push(Action::rmdir(dir));
        }
        Ok(actions)
    }
}

fn file_name(path: &Path) -> OpsResult<&std::ffi::OsStr> {
    path.file_name()
        .ok_or_else(|| OpsError::invalid_name(path.to_string_lossy(), "path has no file name"))
}

/// Move a single file, copying across devices when rename fails.
fn move_item(src: &Path, dst: &Path) -> OpsResult<()> {
    // Fast path for same filesystem
    if fs::rename(src, dst).is_ok() {
        return Ok(());
    }
    if !src.exists() {
        return Err(OpsError::NotFound {
            path: src.to_path_buf(),
        });
    }

    let options = fs_extra::file::CopyOptions::new();
    fs_extra::file::move_file(src, dst, &options).map_err(|e| OpsError::CrossDevice {
        path: src.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(())
}

/// Validate a bare file name used as a rename target.
pub fn validate_filename(name: &str) -> OpsResult<()> {
    if name.is_empty() {
        return Err(OpsError::invalid_name(name, "name cannot be empty"));
    }

    if name.len() > 255 {
        return Err(OpsError::invalid_name(name, "name is too long (max 255 bytes)"));
    }

    for c in ['/', '\0'] {
        if name.contains(c) {
            return Err(OpsError::invalid_name(name, format!("name cannot contain {c:?}")));
        }
    }

    if name == "." || name == ".." {
        return Err(OpsError::invalid_name(name, "'.' and '..' are reserved names"));
    }

    Ok(())
}
