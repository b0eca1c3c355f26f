//! Error types for engine commands.

use thiserror::Error;

use tidyfile_analyze::HashError;
use tidyfile_core::ScanError;
use tidyfile_ops::OpsError;

/// Errors returned by [`Engine`](crate::Engine) commands.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Scanner setup failed.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Hashing pool failed.
    #[error(transparent)]
    Hash(#[from] HashError),

    /// A filesystem mutation failed; earlier mutations of the batch remain.
    #[error(transparent)]
    Ops(#[from] OpsError),

    /// Command options select nothing or contradict each other.
    #[error("Invalid options: {message}")]
    InvalidOptions { message: String },

    /// A rename pattern is not a valid regex.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Undo requested with no history.
    #[error("No actions to undo")]
    EmptyHistory,

    /// Undo requested for a batch that does not exist.
    #[error("No batch at index {index} (history holds {len})")]
    InvalidBatchIndex { index: usize, len: usize },
}

impl EngineError {
    pub(crate) fn invalid_options(message: impl Into<String>) -> Self {
        Self::InvalidOptions {
            message: message.into(),
        }
    }
}

/// Result type for engine commands.
pub type EngineResult<T> = Result<T, EngineError>;
