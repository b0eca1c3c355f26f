//! Error types for hashing.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while hashing a single file.
#[derive(Debug, Error)]
pub enum HashError {
    /// Permission denied reading a file.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// File vanished or never existed.
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Hashing thread pool could not be started.
    #[error("Failed to build hashing pool: {message}")]
    Pool { message: String },
}

impl HashError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Result type for hashing.
pub type HashResult<T> = Result<T, HashError>;
