//! Per-command option types.

use std::path::PathBuf;

use derive_builder::Builder;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use tidyfile_core::HashAlgorithm;
use tidyfile_scan::ScanOptions;

/// How organize buckets files.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OrganizeBy {
    /// Lowercased extension, or `noext`.
    #[default]
    Ext,
    /// Modification day, `YYYY-MM-DD` (UTC).
    Date,
    /// Modification month, `YYYY-MM` (UTC).
    Month,
}

/// What happens to each duplicate that is not kept.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DuplicateAction {
    /// Report only.
    #[default]
    List,
    /// Send to the OS trash.
    Trash,
    /// Delete permanently.
    Delete,
    /// Move into an archive directory.
    Archive,
}

/// Options for [`Engine::organize`](crate::Engine::organize).
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct OrganizeOptions {
    /// Directory whose files are organized.
    pub root: PathBuf,

    #[builder(default)]
    pub by: OrganizeBy,

    /// Base directory for buckets (defaults to `root`).
    #[builder(default, setter(into, strip_option))]
    pub dest: Option<PathBuf>,

    #[builder(default = "true")]
    pub recursive: bool,

    #[builder(default)]
    pub exclude: Vec<String>,

    #[builder(default)]
    pub include: Vec<String>,

    /// Remove directories left empty under `root`.
    #[builder(default)]
    pub remove_empty: bool,

    #[builder(default)]
    pub apply: bool,
}

impl OrganizeOptions {
    /// Create a new organize options builder.
    pub fn builder() -> OrganizeOptionsBuilder {
        OrganizeOptionsBuilder::default()
    }

    pub(crate) fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            root: self.root.clone(),
            recursive: self.recursive,
            exclude: self.exclude.clone(),
            include: self.include.clone(),
        }
    }
}

/// Options for [`Engine::rename`](crate::Engine::rename).
///
/// The new stem is built in a fixed order: regex substitution, counter,
/// prefix/suffix, case folding. Sanitizing then applies to the whole name.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct RenameOptions {
    pub root: PathBuf,

    /// Regex applied to the original stem.
    #[builder(default, setter(into, strip_option))]
    pub pattern: Option<String>,

    /// Replacement for `pattern` matches (`$1` refers to a group).
    #[builder(default)]
    pub replace: String,

    #[builder(default)]
    pub prefix: String,

    #[builder(default)]
    pub suffix: String,

    #[builder(default)]
    pub lower: bool,

    #[builder(default)]
    pub upper: bool,

    /// Replace characters outside `[A-Za-z0-9._ -]` with `_`.
    #[builder(default)]
    pub sanitize: bool,

    /// Append `_NNN` counters.
    #[builder(default)]
    pub enumerate: bool,

    #[builder(default = "1")]
    pub start: i64,

    #[builder(default = "1")]
    pub step: i64,

    /// Zero-padding width of the counter.
    #[builder(default = "3")]
    pub width: usize,

    /// Only rename files with this extension (case-insensitive, dot optional).
    #[builder(default, setter(into, strip_option))]
    pub ext_filter: Option<String>,

    #[builder(default = "true")]
    pub recursive: bool,

    #[builder(default)]
    pub exclude: Vec<String>,

    #[builder(default)]
    pub apply: bool,
}

impl RenameOptionsBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.enumerate == Some(true) && self.step == Some(0) {
            return Err("Enumeration step cannot be zero".to_string());
        }
        if let Some(Some(pattern)) = &self.pattern {
            Regex::new(pattern).map_err(|e| format!("Invalid pattern '{pattern}': {e}"))?;
        }
        Ok(())
    }
}

impl RenameOptions {
    /// Create a new rename options builder.
    pub fn builder() -> RenameOptionsBuilder {
        RenameOptionsBuilder::default()
    }

    pub(crate) fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            root: self.root.clone(),
            recursive: self.recursive,
            exclude: self.exclude.clone(),
            include: Vec::new(),
        }
    }
}

/// Options for [`Engine::clean`](crate::Engine::clean).
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct CleanOptions {
    pub root: PathBuf,

    /// Select files last modified more than this many days ago.
    #[builder(default, setter(into, strip_option))]
    pub older_than_days: Option<u64>,

    /// Select files of at least this many MiB.
    #[builder(default, setter(into, strip_option))]
    pub larger_than_mb: Option<u64>,

    /// Move selected files here instead of deleting them.
    #[builder(default, setter(into, strip_option))]
    pub archive_dir: Option<PathBuf>,

    #[builder(default = "true")]
    pub use_trash: bool,

    #[builder(default)]
    pub delete_permanently: bool,

    #[builder(default)]
    pub remove_empty: bool,

    #[builder(default = "true")]
    pub recursive: bool,

    #[builder(default)]
    pub exclude: Vec<String>,

    #[builder(default)]
    pub apply: bool,
}

impl CleanOptionsBuilder {
    fn validate(&self) -> Result<(), String> {
        let has_age = matches!(self.older_than_days, Some(Some(_)));
        let has_size = matches!(self.larger_than_mb, Some(Some(_)));
        if !has_age && !has_size {
            return Err("Clean needs an age or size filter".to_string());
        }
        Ok(())
    }
}

impl CleanOptions {
    /// Create a new clean options builder.
    pub fn builder() -> CleanOptionsBuilder {
        CleanOptionsBuilder::default()
    }

    /// Whether any selection criterion is set.
    pub fn has_filter(&self) -> bool {
        self.older_than_days.is_some() || self.larger_than_mb.is_some()
    }

    pub(crate) fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            root: self.root.clone(),
            recursive: self.recursive,
            exclude: self.exclude.clone(),
            include: Vec::new(),
        }
    }
}

/// Options for [`Engine::index`](crate::Engine::index).
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct IndexOptions {
    pub root: PathBuf,

    #[builder(default)]
    pub include_hash: bool,

    /// Digest algorithm (engine default when unset).
    #[builder(default, setter(into, strip_option))]
    pub hash_algo: Option<HashAlgorithm>,

    #[builder(default = "true")]
    pub recursive: bool,

    #[builder(default)]
    pub exclude: Vec<String>,
}

impl IndexOptions {
    /// Create a new index options builder.
    pub fn builder() -> IndexOptionsBuilder {
        IndexOptionsBuilder::default()
    }

    /// Recursive index of `root` without hashes.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            include_hash: false,
            hash_algo: None,
            recursive: true,
            exclude: Vec::new(),
        }
    }

    pub(crate) fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            root: self.root.clone(),
            recursive: self.recursive,
            exclude: self.exclude.clone(),
            include: Vec::new(),
        }
    }
}

/// Options for [`Engine::find_duplicates`](crate::Engine::find_duplicates).
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct DuplicateOptions {
    pub root: PathBuf,

    /// Digest algorithm (engine default when unset).
    #[builder(default, setter(into, strip_option))]
    pub hash_algo: Option<HashAlgorithm>,

    #[builder(default)]
    pub action: DuplicateAction,

    /// Destination for [`DuplicateAction::Archive`].
    #[builder(default, setter(into, strip_option))]
    pub archive_dir: Option<PathBuf>,

    #[builder(default = "true")]
    pub recursive: bool,

    #[builder(default)]
    pub exclude: Vec<String>,

    #[builder(default)]
    pub apply: bool,
}

impl DuplicateOptionsBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.action == Some(DuplicateAction::Archive)
            && !matches!(self.archive_dir, Some(Some(_)))
        {
            return Err("Archive action needs an archive directory".to_string());
        }
        Ok(())
    }
}

impl DuplicateOptions {
    /// Create a new duplicate options builder.
    pub fn builder() -> DuplicateOptionsBuilder {
        DuplicateOptionsBuilder::default()
    }

    /// List duplicates under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            hash_algo: None,
            action: DuplicateAction::List,
            archive_dir: None,
            recursive: true,
            exclude: Vec::new(),
            apply: false,
        }
    }

    pub(crate) fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            root: self.root.clone(),
            recursive: self.recursive,
            exclude: self.exclude.clone(),
            include: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organize_defaults() {
        let options = OrganizeOptions::builder().root("/tmp").build().unwrap();
        assert_eq!(options.by, OrganizeBy::Ext);
        assert!(options.recursive);
        assert!(!options.apply);
        assert!(options.dest.is_none());
    }

    #[test]
    fn test_rename_defaults_and_validation() {
        let options = RenameOptions::builder().root("/tmp").build().unwrap();
        assert_eq!((options.start, options.step, options.width), (1, 1, 3));

        assert!(
            RenameOptions::builder()
                .root("/tmp")
                .enumerate(true)
                .step(0)
                .build()
                .is_err()
        );
        assert!(
            RenameOptions::builder()
                .root("/tmp")
                .pattern("(unclosed")
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_clean_requires_filter() {
        assert!(CleanOptions::builder().root("/tmp").build().is_err());

        let options = CleanOptions::builder()
            .root("/tmp")
            .older_than_days(30u64)
            .build()
            .unwrap();
        assert!(options.use_trash);
        assert!(options.has_filter());
    }

    #[test]
    fn test_archive_requires_dir() {
        assert!(
            DuplicateOptions::builder()
                .root("/tmp")
                .action(DuplicateAction::Archive)
                .build()
                .is_err()
        );
        assert!(
            DuplicateOptions::builder()
                .root("/tmp")
                .action(DuplicateAction::Archive)
                .archive_dir("/tmp/archive")
                .build()
                .is_ok()
        );
    }

    #[test]
    fn test_enum_names() {
        assert_eq!("month".parse::<OrganizeBy>().unwrap(), OrganizeBy::Month);
        assert_eq!(DuplicateAction::Archive.to_string(), "archive");
    }
}
