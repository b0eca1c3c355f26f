//! Error types for scan setup.

use thiserror::Error;

/// Errors that can occur while setting up a scan.
///
/// Per-entry failures during traversal are skipped, not reported here.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A glob pattern could not be compiled.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}
