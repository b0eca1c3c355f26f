//! Filesystem effect records.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Metadata key naming the file kept in place of a duplicate.
pub const META_KEPT: &str = "kept";

/// Metadata key explaining why an undo step could not be performed.
pub const META_REASON: &str = "reason";

/// Kind of filesystem effect described by an [`Action`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionOp {
    /// File moved into another directory.
    Move,
    /// File renamed within its directory.
    Rename,
    /// File sent to the OS trash.
    Trash,
    /// File permanently deleted.
    Delete,
    /// Duplicate observed, nothing changed.
    Dupe,
    /// Duplicate moved into an archive directory.
    ArchiveDupe,
    /// Directory created.
    Mkdir,
    /// Empty directory removed.
    Rmdir,
    /// An undo step that could not be performed.
    UndoFailed,
}

impl ActionOp {
    /// Whether this op changes the filesystem when applied.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::Dupe | Self::UndoFailed)
    }
}

/// One filesystem effect, performed or previewed.
///
/// Fields are private so an action cannot change after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    op: ActionOp,
    src: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dst: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    meta: BTreeMap<String, String>,
}

impl Action {
    fn new(op: ActionOp, src: impl Into<PathBuf>, dst: Option<PathBuf>) -> Self {
        Self {
            op,
            src: src.into(),
            dst,
            meta: BTreeMap::new(),
        }
    }

    fn with_meta(mut self, key: &str, value: impl Into<String>) -> Self {
        self.meta.insert(key.to_string(), value.into());
        self
    }

    /// A file moved from `src` to `dst`.
    pub fn moved(src: impl Into<PathBuf>, dst: impl Into<PathBuf>) -> Self {
        Self::new(ActionOp::Move, src, Some(dst.into()))
    }

    /// A file renamed from `src` to `dst`.
    pub fn renamed(src: impl Into<PathBuf>, dst: impl Into<PathBuf>) -> Self {
        Self::new(ActionOp::Rename, src, Some(dst.into()))
    }

    /// A file sent to the trash.
    pub fn trashed(src: impl Into<PathBuf>) -> Self {
        Self::new(ActionOp::Trash, src, None)
    }

    /// A file deleted permanently.
    pub fn deleted(src: impl Into<PathBuf>) -> Self {
        Self::new(ActionOp::Delete, src, None)
    }

    /// A duplicate that was only observed.
    pub fn dupe(src: impl Into<PathBuf>, kept: &Path) -> Self {
        Self::new(ActionOp::Dupe, src, None).with_meta(META_KEPT, kept.to_string_lossy())
    }

    /// A duplicate moved into an archive directory.
    pub fn archived_dupe(src: impl Into<PathBuf>, dst: impl Into<PathBuf>, kept: &Path) -> Self {
        Self::new(ActionOp::ArchiveDupe, src, Some(dst.into()))
            .with_meta(META_KEPT, kept.to_string_lossy())
    }

    /// A directory created.
    pub fn mkdir(path: impl Into<PathBuf>) -> Self {
        Self::new(ActionOp::Mkdir, path, None)
    }

    /// An empty directory removed.
    pub fn rmdir(path: impl Into<PathBuf>) -> Self {
        Self::new(ActionOp::Rmdir, path, None)
    }

    /// An undo step that could not be carried out.
    pub fn undo_failed(src: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::new(ActionOp::UndoFailed, src, None).with_meta(META_REASON, reason)
    }

    pub fn op(&self) -> ActionOp {
        self.op
    }

    pub fn src(&self) -> &Path {
        &self.src
    }

    pub fn dst(&self) -> Option<&Path> {
        self.dst.as_deref()
    }

    /// Look up a metadata value.
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.dst {
            Some(dst) => write!(f, "{} {} -> {}", self.op, self.src.display(), dst.display()),
            None => write!(f, "{} {}", self.op, self.src.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_names() {
        assert_eq!(ActionOp::ArchiveDupe.to_string(), "archive_dupe");
        assert_eq!("undo_failed".parse::<ActionOp>().unwrap(), ActionOp::UndoFailed);
    }

    #[test]
    fn test_dupe_records_kept_file() {
        let action = Action::dupe("/a/copy.txt", Path::new("/a/orig.txt"));
        assert_eq!(action.op(), ActionOp::Dupe);
        assert_eq!(action.meta(META_KEPT), Some("/a/orig.txt"));
        assert!(action.dst().is_none());
        assert!(!action.op().is_mutation());
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(Action::moved("/a/x.txt", "/b/x.txt")).unwrap();
        assert_eq!(json["op"], "move");
        assert_eq!(json["dst"], "/b/x.txt");
        assert!(json.get("meta").is_none());

        let json = serde_json::to_value(Action::deleted("/a/x.txt")).unwrap();
        assert!(json.get("dst").is_none());
    }

    #[test]
    fn test_display() {
        let action = Action::renamed("/a/x.txt", "/a/y.txt");
        assert_eq!(action.to_string(), "rename /a/x.txt -> /a/y.txt");
    }
}
