//! Content hashing and duplicate detection for tidyfile.
//!
//! - **Hashing** - stream one file into an md5/sha256/sha512/blake3 digest
//! - **Parallel hashing** - hash many files on a bounded rayon pool
//! - **Duplicate detection** - size buckets first, digests second
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use tidyfile_analyze::{DuplicateDetector, ParallelHasher};
//! use tidyfile_core::HashAlgorithm;
//!
//! let files: Vec<PathBuf> = vec!["/data/a.jpg".into(), "/data/b.jpg".into()];
//! let detector = DuplicateDetector::new(ParallelHasher::new(HashAlgorithm::Sha256));
//! let report = detector.detect(files).unwrap();
//!
//! println!("Found {} duplicate groups", report.groups.len());
//! println!("Wasted space: {} bytes", report.total_wasted_bytes);
//! ```

mod duplicates;
mod error;
mod hash;
mod parallel;

pub use duplicates::{DuplicateDetector, SizeBuckets};
pub use error::{HashError, HashResult};
pub use hash::hash_file;
pub use parallel::{FileHashes, ParallelHasher};

// Re-export core types
pub use tidyfile_core::{DuplicateGroup, DuplicateReport, HashAlgorithm};
