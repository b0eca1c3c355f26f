//! Collision-safe destination naming.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{OpsError, OpsResult};

/// Name tried for the `n`th collision: "stem (n).ext".
fn numbered(path: &Path, n: u64) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem} ({n}).{}", ext.to_string_lossy()),
        None => format!("{stem} ({n})"),
    };
    path.with_file_name(name)
}

fn first_free(dst: &Path, occupied: impl Fn(&Path) -> bool) -> PathBuf {
    if !occupied(dst) {
        return dst.to_path_buf();
    }
    (1..)
        .map(|n| numbered(dst, n))
        .find(|candidate| !occupied(candidate))
        .unwrap_or_else(|| dst.to_path_buf())
}

/// Return `dst` if nothing exists there, otherwise the first free
/// "stem (n).ext" sibling.
///
/// The result is free at the moment of the check only; nothing is locked.
pub fn unique_path(dst: &Path) -> PathBuf {
    first_free(dst, Path::exists)
}

/// Create `path` and its parents, only when `apply` is set.
pub fn ensure_dir(path: &Path, apply: bool) -> OpsResult<()> {
    if apply {
        fs::create_dir_all(path).map_err(|e| OpsError::io(path, e))?;
    }
    Ok(())
}

/// Collision resolver that sees the filesystem as one batch will leave it.
///
/// Each batch records the paths it fills (`reserve`) and empties
/// (`vacate`). A preview therefore picks the same "(n)" names as the real
/// run, even for collisions between files of the same batch.
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    reserved: HashSet<PathBuf>,
    vacated: HashSet<PathBuf>,
    dirs: HashSet<PathBuf>,
}

impl PathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `path` is (or will be) taken.
    pub fn occupied(&self, path: &Path) -> bool {
        self.reserved.contains(path) || (!self.vacated.contains(path) && path.exists())
    }

    /// Collision-free variant of `dst` against the planned state.
    pub fn resolve(&self, dst: &Path) -> PathBuf {
        first_free(dst, |p| self.occupied(p))
    }

    /// Mark `path` as filled by this batch.
    pub fn reserve(&mut self, path: &Path) {
        self.vacated.remove(path);
        self.reserved.insert(path.to_path_buf());
    }

    /// Mark `path` as a directory created by this batch.
    pub fn reserve_dir(&mut self, path: &Path) {
        self.reserve(path);
        self.dirs.insert(path.to_path_buf());
    }

    /// Mark `path` as emptied by this batch.
    pub fn vacate(&mut self, path: &Path) {
        self.reserved.remove(path);
        self.dirs.remove(path);
        self.vacated.insert(path.to_path_buf());
    }

    /// First ancestor of `dir` that will still be a non-directory once the
    /// batch is done, if any. Such a path cannot hold files.
    pub fn blocking_ancestor(&self, dir: &Path) -> Option<PathBuf> {
        for ancestor in dir.ancestors() {
            if self.vacated.contains(ancestor) {
                continue;
            }
            if self.reserved.contains(ancestor) {
                return (!self.dirs.contains(ancestor)).then(|| ancestor.to_path_buf());
            }
            match fs::metadata(ancestor) {
                Ok(meta) if meta.is_dir() => return None,
                Ok(_) => return Some(ancestor.to_path_buf()),
                Err(_) => continue,
            }
        }
        None
    }

    /// Whether a directory will have no children once the batch is done.
    ///
    /// On-disk children that were vacated are ignored, and anything the
    /// batch reserved below `dir` counts as content.
    pub fn is_empty_dir(&self, dir: &Path) -> OpsResult<bool> {
        let entries = fs::read_dir(dir).map_err(|e| OpsError::io(dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| OpsError::io(dir, e))?;
            if !self.vacated.contains(&entry.path()) {
                return Ok(false);
            }
        }

        Ok(!self
            .reserved
            .iter()
            .any(|p| p != dir && p.starts_with(dir)))
    }
}
