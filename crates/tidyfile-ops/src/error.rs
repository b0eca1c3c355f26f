//! Error types for file operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a single filesystem mutation.
#[derive(Debug, Error)]
pub enum OpsError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Source path no longer exists.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Copy-then-delete fallback for a cross-device move failed.
    #[error("Failed to move {path} across devices: {message}")]
    CrossDevice { path: PathBuf, message: String },

    /// A destination directory is already taken by a file.
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// A rename target is not a usable file name.
    #[error("Invalid file name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// The OS trash refused the file.
    #[error("Failed to move {path} to trash: {message}")]
    Trash { path: PathBuf, message: String },
}

impl OpsError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Create an invalid name error.
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for file operations.
pub type OpsResult<T> = Result<T, OpsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_kind_mapping() {
        let err = OpsError::io(
            "/x",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, OpsError::NotFound { .. }));

        let err = OpsError::io("/x", std::io::Error::other("boom"));
        assert!(matches!(err, OpsError::Io { .. }));
        assert!(err.to_string().contains("boom"));

        let err = OpsError::NotADirectory { path: "/x/noext".into() };
        assert_eq!(err.to_string(), "Not a directory: /x/noext");
    }
}
