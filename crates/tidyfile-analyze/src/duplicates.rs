//! Duplicate file detection using content hashing.
//!
//! Two phases keep hashing work bounded:
//! 1. Group files by exact size (one `stat` per file)
//! 2. Hash only files whose size is shared, then group those by digest
//!
//! Buckets keep first-seen order, so the kept file of each group is the
//! first one the scan produced.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, warn};

use tidyfile_core::{DuplicateGroup, DuplicateReport, HashAlgorithm};

use crate::error::HashResult;
use crate::parallel::{FileHashes, ParallelHasher};

/// Scanned files grouped by byte size.
#[derive(Debug, Clone, Default)]
pub struct SizeBuckets {
    buckets: IndexMap<u64, Vec<PathBuf>>,
    files_scanned: u64,
}

impl SizeBuckets {
    /// Stat each path and bucket it by size. Files that cannot be stat'ed
    /// are skipped.
    pub fn from_paths<I>(paths: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut buckets: IndexMap<u64, Vec<PathBuf>> = IndexMap::new();
        let mut files_scanned = 0u64;

        for path in paths {
            files_scanned += 1;
            match fs::metadata(&path) {
                Ok(meta) => buckets.entry(meta.len()).or_default().push(path),
                Err(err) => warn!(path = %path.display(), %err, "skipping file"),
            }
        }

        Self {
            buckets,
            files_scanned,
        }
    }

    /// Build buckets from already-known sizes.
    pub fn from_sized<I>(files: I) -> Self
    where
        I: IntoIterator<Item = (PathBuf, u64)>,
    {
        let mut buckets: IndexMap<u64, Vec<PathBuf>> = IndexMap::new();
        let mut files_scanned = 0u64;
        for (path, size) in files {
            files_scanned += 1;
            buckets.entry(size).or_default().push(path);
        }
        Self {
            buckets,
            files_scanned,
        }
    }

    /// Number of files offered to the detector.
    pub fn files_scanned(&self) -> u64 {
        self.files_scanned
    }

    /// Files sharing their size with at least one other file, bucket by
    /// bucket.
    pub fn candidates(&self) -> Vec<PathBuf> {
        self.buckets
            .values()
            .filter(|paths| paths.len() > 1)
            .flat_map(|paths| paths.iter().cloned())
            .collect()
    }

    /// Group candidates by digest into a report.
    ///
    /// Files without a digest in `hashes` (failed or never hashed) are left
    /// out of every group.
    pub fn into_report(self, algorithm: HashAlgorithm, hashes: &FileHashes) -> DuplicateReport {
        let mut groups = Vec::new();
        let mut candidates = 0u64;

        for (size, paths) in self.buckets {
            if paths.len() < 2 {
                continue;
            }
            candidates += paths.len() as u64;

            let mut by_hash: IndexMap<&str, Vec<PathBuf>> = IndexMap::new();
            for path in paths {
                if let Some(Some(digest)) = hashes.get(&path) {
                    by_hash.entry(digest.as_str()).or_default().push(path);
                }
            }

            groups.extend(by_hash.into_iter().filter_map(|(digest, paths)| {
                DuplicateGroup::new(digest.to_string(), algorithm, size, paths)
            }));
        }

        debug!(groups = groups.len(), candidates, "grouped duplicates");
        DuplicateReport::new(groups, self.files_scanned, candidates)
    }
}

/// Duplicate file finder.
#[derive(Debug, Clone)]
pub struct DuplicateDetector {
    hasher: ParallelHasher,
}

impl DuplicateDetector {
    /// Create a detector hashing with `hasher`.
    pub fn new(hasher: ParallelHasher) -> Self {
        Self { hasher }
    }

    /// Find duplicate groups among `paths`.
    pub fn detect<I>(&self, paths: I) -> HashResult<DuplicateReport>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.detect_with_progress(paths, |_, _, _| {})
    }

    /// Find duplicate groups, reporting each finished hash.
    pub fn detect_with_progress<I, F>(&self, paths: I, on_progress: F) -> HashResult<DuplicateReport>
    where
        I: IntoIterator<Item = PathBuf>,
        F: FnMut(usize, usize, &Path) + Send,
    {
        // Phase 1: size buckets
        let buckets = SizeBuckets::from_paths(paths);
        let candidates = buckets.candidates();

        // Phase 2: hash only what could possibly match
        let hashes = self.hasher.hash_all_with_progress(&candidates, on_progress)?;

        Ok(buckets.into_report(self.hasher.algorithm(), &hashes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_files() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::write(root.join("file1.txt"), "duplicate content here").unwrap();
        fs::write(root.join("file2.txt"), "duplicate content here").unwrap();
        fs::write(root.join("file3.txt"), "unique content").unwrap();
        // Same size as the duplicates, different bytes
        fs::write(root.join("file5.txt"), "duplicate content HERE").unwrap();

        fs::create_dir(root.join("subdir")).unwrap();
        fs::write(root.join("subdir/file4.txt"), "duplicate content here").unwrap();

        temp
    }

    #[test]
    fn test_size_buckets_skip_unique_sizes() {
        let temp = create_test_files();
        let root = temp.path();
        let buckets = SizeBuckets::from_paths(vec![
            root.join("file1.txt"),
            root.join("file3.txt"),
            root.join("file2.txt"),
            root.join("missing.txt"),
        ]);

        assert_eq!(buckets.files_scanned(), 4);
        assert_eq!(
            buckets.candidates(),
            vec![root.join("file1.txt"), root.join("file2.txt")]
        );
    }

    #[test]
    fn test_detect_groups_by_content() {
        let temp = create_test_files();
        let root = temp.path();
        let paths = vec![
            root.join("file1.txt"),
            root.join("file2.txt"),
            root.join("file3.txt"),
            root.join("file5.txt"),
            root.join("subdir/file4.txt"),
        ];

        let detector = DuplicateDetector::new(ParallelHasher::new(HashAlgorithm::Sha256));
        let report = detector.detect(paths).unwrap();

        assert_eq!(report.groups.len(), 1);
        let group = &report.groups[0];
        assert_eq!(group.keep, root.join("file1.txt"));
        assert_eq!(
            group.duplicates,
            vec![root.join("file2.txt"), root.join("subdir/file4.txt")]
        );
        assert_eq!(group.wasted_bytes, 2 * 22);
        assert_eq!(report.files_scanned, 5);
        assert_eq!(report.candidates, 4);
    }

    #[test]
    fn test_failed_hash_excluded() {
        let paths = vec![PathBuf::from("/a"), PathBuf::from("/b"), PathBuf::from("/c")];
        let buckets = SizeBuckets::from_sized(paths.iter().cloned().map(|p| (p, 10)));

        let mut hashes = FileHashes::new();
        hashes.insert("/a".into(), Some("aa".to_string()));
        hashes.insert("/b".into(), None);
        hashes.insert("/c".into(), Some("aa".to_string()));

        let report = buckets.into_report(HashAlgorithm::Md5, &hashes);
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].keep, PathBuf::from("/a"));
        assert_eq!(report.groups[0].duplicates, vec![PathBuf::from("/c")]);
    }

    #[test]
    fn test_zero_byte_files_are_duplicates() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a"), "").unwrap();
        fs::write(temp.path().join("b"), "").unwrap();

        let detector = DuplicateDetector::new(ParallelHasher::new(HashAlgorithm::Blake3));
        let report = detector
            .detect(vec![temp.path().join("a"), temp.path().join("b")])
            .unwrap();

        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].wasted_bytes, 0);
    }
}
