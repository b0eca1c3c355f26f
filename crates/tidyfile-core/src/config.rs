//! Engine configuration types.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::hash::HashAlgorithm;

/// Default read size for streaming a file into a digest (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Configuration shared by every command an engine runs.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct EngineConfig {
    /// Number of hashing threads (0 = available CPU count).
    #[builder(default = "0")]
    #[serde(default)]
    pub hash_workers: usize,

    /// Bytes read per chunk while hashing.
    #[builder(default = "DEFAULT_CHUNK_SIZE")]
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Algorithm used when a command does not name one.
    #[builder(default)]
    #[serde(default)]
    pub default_algorithm: HashAlgorithm,

    /// Maximum number of batches kept in history (0 = unlimited).
    #[builder(default = "100")]
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_history_limit() -> usize {
    100
}

impl EngineConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.chunk_size == Some(0) {
            return Err("Chunk size must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl EngineConfig {
    /// Create a new engine config builder.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Resolve the hashing worker count.
    pub fn effective_workers(&self) -> usize {
        resolve_workers(self.hash_workers)
    }
}

/// Worker count for a requested size, substituting the CPU count for 0.
pub fn resolve_workers(requested: usize) -> usize {
    match requested {
        0 => std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1),
        n => n,
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hash_workers: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
            default_algorithm: HashAlgorithm::default(),
            history_limit: 100,
        }
    }
}
