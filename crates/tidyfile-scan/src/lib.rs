//! Filtered file discovery for tidyfile.
//!
//! This crate turns a root path plus glob patterns into a lazy sequence of
//! regular files, using jwalk for traversal and globset for matching.
//!
//! # Example
//!
//! ```rust,no_run
//! use tidyfile_scan::{PathScanner, ScanOptions};
//!
//! let options = ScanOptions::builder()
//!     .root("/path/to/scan")
//!     .exclude(vec!["*.tmp".to_string()])
//!     .build()
//!     .unwrap();
//!
//! for path in PathScanner::new(options).unwrap().files() {
//!     println!("{}", path.display());
//! }
//! ```
//!
//! Directory listings are sorted, so the same tree always yields files in
//! the same depth-first order.

mod filter;
mod scanner;

pub use filter::PatternFilter;
pub use scanner::{FileIter, PathScanner, ScanOptions, ScanOptionsBuilder};

// Re-export core types for convenience
pub use tidyfile_core::ScanError;
