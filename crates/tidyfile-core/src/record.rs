//! Index rows and duplicate groups.

use std::collections::BTreeMap;
use std::path::PathBuf;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::hash::HashAlgorithm;

/// One row of a file inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Absolute path to the file.
    pub path: PathBuf,
    /// Bare file name.
    pub name: CompactString,
    /// Size in bytes.
    pub size: u64,
    /// Modification time in whole seconds since the Unix epoch.
    pub modified: i64,
    /// Content digests keyed by algorithm; `None` marks a failed hash.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub hashes: BTreeMap<HashAlgorithm, Option<String>>,
}

impl FileRecord {
    /// Create a record without hashes.
    pub fn new(path: PathBuf, size: u64, modified: i64) -> Self {
        let name = path
            .file_name()
            .map(|n| CompactString::new(n.to_string_lossy()))
            .unwrap_or_default();
        Self {
            path,
            name,
            size,
            modified,
            hashes: BTreeMap::new(),
        }
    }

    /// Attach a digest (or a failed-hash marker) for `algo`.
    pub fn with_hash(mut self, algo: HashAlgorithm, digest: Option<String>) -> Self {
        self.hashes.insert(algo, digest);
        self
    }

    /// Get the digest for `algo`, if one was computed successfully.
    pub fn hash(&self, algo: HashAlgorithm) -> Option<&str> {
        self.hashes.get(&algo).and_then(|h| h.as_deref())
    }
}

/// Result of an index run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexReport {
    /// One record per indexed file, in scan order.
    pub files: Vec<FileRecord>,
    /// Number of records.
    pub total_files: u64,
    /// Sum of all record sizes.
    pub total_bytes: u64,
}

impl IndexReport {
    /// Build a report, computing totals from the records.
    pub fn from_records(files: Vec<FileRecord>) -> Self {
        let total_files = files.len() as u64;
        let total_bytes = files.iter().map(|f| f.size).sum();
        Self {
            files,
            total_files,
            total_bytes,
        }
    }
}

/// A group of files sharing size and content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Hex digest shared by every file in the group.
    pub hash: String,
    /// Algorithm that produced `hash`.
    pub algorithm: HashAlgorithm,
    /// Size of each file in bytes.
    pub size: u64,
    /// Number of files in the group, including the kept one.
    pub count: usize,
    /// File left untouched.
    pub keep: PathBuf,
    /// Every other file in the group.
    pub duplicates: Vec<PathBuf>,
    /// Bytes reclaimable by removing the duplicates: size * (count - 1).
    pub wasted_bytes: u64,
    /// What was done (or would be done) to each duplicate.
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl DuplicateGroup {
    /// Build a group from hash-equal paths in bucket order.
    ///
    /// The first path is kept. Returns `None` for fewer than two paths.
    pub fn new(
        hash: String,
        algorithm: HashAlgorithm,
        size: u64,
        mut paths: Vec<PathBuf>,
    ) -> Option<Self> {
        if paths.len() < 2 {
            return None;
        }
        let count = paths.len();
        let duplicates = paths.split_off(1);
        let keep = paths.pop()?;
        Some(Self {
            hash,
            algorithm,
            size,
            count,
            keep,
            duplicates,
            wasted_bytes: size * (count as u64 - 1),
            actions: Vec::new(),
        })
    }

    /// Number of files that could be removed while keeping one.
    pub fn deletable_count(&self) -> usize {
        self.duplicates.len()
    }
}

/// Results from duplicate detection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DuplicateReport {
    /// Duplicate groups in scan order.
    pub groups: Vec<DuplicateGroup>,
    /// Number of files scanned.
    pub files_scanned: u64,
    /// Number of files that shared a size with another file and were hashed.
    pub candidates: u64,
    /// Number of removable duplicates across all groups.
    pub total_duplicates: u64,
    /// Total reclaimable bytes across all groups.
    pub total_wasted_bytes: u64,
}

impl DuplicateReport {
    /// Build a report, computing totals from the groups.
    pub fn new(groups: Vec<DuplicateGroup>, files_scanned: u64, candidates: u64) -> Self {
        let total_duplicates = groups.iter().map(|g| g.deletable_count() as u64).sum();
        let total_wasted_bytes = groups.iter().map(|g| g.wasted_bytes).sum();
        Self {
            groups,
            files_scanned,
            candidates,
            total_duplicates,
            total_wasted_bytes,
        }
    }

    /// Check if any duplicates were found.
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Every action taken across all groups, in group order.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.groups.iter().flat_map(|g| g.actions.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_keeps_first_path() {
        let group = DuplicateGroup::new(
            "ab".repeat(32),
            HashAlgorithm::Sha256,
            100,
            vec!["/x/a".into(), "/x/b".into(), "/x/c".into()],
        )
        .unwrap();

        assert_eq!(group.keep, PathBuf::from("/x/a"));
        assert_eq!(group.duplicates.len(), 2);
        assert_eq!(group.count, 3);
        assert_eq!(group.wasted_bytes, 200);
        assert_eq!(group.deletable_count(), 2);
    }

    #[test]
    fn test_group_needs_two_paths() {
        assert!(DuplicateGroup::new("00".into(), HashAlgorithm::Md5, 1, vec!["/a".into()]).is_none());
    }

    #[test]
    fn test_record_hash_lookup() {
        let record = FileRecord::new("/tmp/notes.txt".into(), 12, 0)
            .with_hash(HashAlgorithm::Blake3, None);
        assert_eq!(record.name, "notes.txt");
        assert!(record.hash(HashAlgorithm::Blake3).is_none());
        assert!(record.hashes.contains_key(&HashAlgorithm::Blake3));
    }

    #[test]
    fn test_index_report_totals() {
        let report = IndexReport::from_records(vec![
            FileRecord::new("/a".into(), 10, 0),
            FileRecord::new("/b".into(), 32, 0),
        ]);
        assert_eq!(report.total_files, 2);
        assert_eq!(report.total_bytes, 42);
    }
}
