//! JWalk-based filtered file discovery.

use std::path::PathBuf;

use derive_builder::Builder;
use jwalk::{Parallelism, WalkDir};
use tracing::{debug, warn};

use tidyfile_core::{ScanError, resolve_path};

use crate::filter::PatternFilter;

/// Options for a file scan.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanOptions {
    /// Root directory (or single file) to scan.
    pub root: PathBuf,

    /// Descend into subdirectories.
    #[builder(default = "true")]
    pub recursive: bool,

    /// Glob patterns removing matching files.
    #[builder(default)]
    pub exclude: Vec<String>,

    /// Glob patterns a file must match to be kept (empty = keep all).
    #[builder(default)]
    pub include: Vec<String>,
}

impl ScanOptionsBuilder {
    fn validate(&self) -> Result<(), String> {
        match &self.root {
            Some(root) if root.as_os_str().is_empty() => {
                Err("Root path cannot be empty".to_string())
            }
            Some(_) => Ok(()),
            None => Err("Root path is required".to_string()),
        }
    }
}

impl ScanOptions {
    /// Create a new scan options builder.
    pub fn builder() -> ScanOptionsBuilder {
        ScanOptionsBuilder::default()
    }

    /// Recursive scan of `root` with no patterns.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            recursive: true,
            exclude: Vec::new(),
            include: Vec::new(),
        }
    }
}

/// Lazy sequence of file paths produced by [`PathScanner::files`].
pub type FileIter = Box<dyn Iterator<Item = PathBuf>>;

/// Recursive file enumerator with include/exclude filtering.
#[derive(Debug, Clone)]
pub struct PathScanner {
    options: ScanOptions,
    filter: PatternFilter,
}

impl PathScanner {
    /// Create a scanner, compiling its glob patterns.
    pub fn new(options: ScanOptions) -> Result<Self, ScanError> {
        let filter = PatternFilter::new(&options.exclude, &options.include)?;
        Ok(Self { options, filter })
    }

    /// Options this scanner was built with.
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Lazily enumerate regular files under the root.
    ///
    /// A missing root yields nothing. A root that is itself a file yields
    /// just that file, without filtering. Unreadable entries are skipped.
    pub fn files(&self) -> FileIter {
        let root = match resolve_path(&self.options.root) {
            Ok(root) => root,
            Err(err) => {
                debug!(root = %self.options.root.display(), %err, "scan root not resolvable");
                return Box::new(std::iter::empty());
            }
        };

        if root.is_file() {
            return Box::new(std::iter::once(root));
        }
        if !root.is_dir() {
            return Box::new(std::iter::empty());
        }

        let max_depth = if self.options.recursive { usize::MAX } else { 1 };
        let walker = WalkDir::new(&root)
            .parallelism(Parallelism::Serial)
            .sort(true)
            .skip_hidden(false)
            .follow_links(false)
            .min_depth(1)
            .max_depth(max_depth);

        let filter = self.filter.clone();
        Box::new(walker.into_iter().filter_map(move |entry_result| {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(|p| p.to_path_buf()).unwrap_or_default();
                    warn!(path = %path.display(), %err, "skipping unreadable entry");
                    return None;
                }
            };

            // Symlinks are skipped; their targets are scanned where they live
            if !entry.file_type().is_file() {
                return None;
            }

            let path = entry.path();
            filter.accepts(&path).then_some(path)
        }))
    }

    /// Enumerate all matching files into a list.
    pub fn collect_files(&self) -> Vec<PathBuf> {
        self.files().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir(root.join("dir1")).unwrap();
        fs::create_dir(root.join("dir1/subdir")).unwrap();
        fs::create_dir(root.join("empty")).unwrap();

        fs::write(root.join("file1.txt"), "hello").unwrap();
        fs::write(root.join(".hidden"), "dot").unwrap();
        fs::write(root.join("dir1/file2.log"), "world world world").unwrap();
        fs::write(root.join("dir1/subdir/file3.txt"), "test").unwrap();

        temp
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_recursive_scan_lists_only_files() {
        let temp = create_test_tree();
        let scanner = PathScanner::new(ScanOptions::new(temp.path())).unwrap();
        let files = scanner.collect_files();

        assert_eq!(files.len(), 4);
        assert!(files.iter().all(|p| p.is_file()));
        assert!(names(&files).contains(&".hidden".to_string()));
    }

    #[test]
    fn test_non_recursive_scan() {
        let temp = create_test_tree();
        let options = ScanOptions::builder()
            .root(temp.path())
            .recursive(false)
            .build()
            .unwrap();
        let files = PathScanner::new(options).unwrap().collect_files();

        let mut found = names(&files);
        found.sort();
        assert_eq!(found, vec![".hidden", "file1.txt"]);
    }

    #[test]
    fn test_exclude_and_include() {
        let temp = create_test_tree();
        let options = ScanOptions::builder()
            .root(temp.path())
            .exclude(vec!["*.log".to_string()])
            .include(vec!["*.txt".to_string(), "*.log".to_string()])
            .build()
            .unwrap();
        let files = PathScanner::new(options).unwrap().collect_files();

        let mut found = names(&files);
        found.sort();
        assert_eq!(found, vec!["file1.txt", "file3.txt"]);
    }

    #[test]
    fn test_missing_root_is_empty() {
        let scanner = PathScanner::new(ScanOptions::new("/no/such/tidyfile/root")).unwrap();
        assert_eq!(scanner.files().count(), 0);
    }

    #[test]
    fn test_file_root_bypasses_filters() {
        let temp = create_test_tree();
        let options = ScanOptions::builder()
            .root(temp.path().join("dir1/file2.log"))
            .exclude(vec!["*.log".to_string()])
            .build()
            .unwrap();
        let files = PathScanner::new(options).unwrap().collect_files();
        assert_eq!(names(&files), vec!["file2.log"]);
    }

    #[test]
    fn test_scan_order_is_stable() {
        let temp = create_test_tree();
        let scanner = PathScanner::new(ScanOptions::new(temp.path())).unwrap();
        assert_eq!(scanner.collect_files(), scanner.collect_files());
    }

    #[test]
    fn test_empty_root_rejected() {
        assert!(ScanOptions::builder().root("").build().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_skipped() {
        let temp = create_test_tree();
        std::os::unix::fs::symlink(temp.path().join("file1.txt"), temp.path().join("link.txt"))
            .unwrap();
        std::os::unix::fs::symlink(temp.path().join("gone.txt"), temp.path().join("dangling.txt"))
            .unwrap();

        let files = PathScanner::new(ScanOptions::new(temp.path()))
            .unwrap()
            .collect_files();
        let found = names(&files);
        assert!(found.contains(&"file1.txt".to_string()));
        assert!(!found.contains(&"link.txt".to_string()));
        assert!(!found.contains(&"dangling.txt".to_string()));
    }
}
