//! Bounded worker-pool hashing of many files.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use indexmap::IndexMap;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tracing::{debug, warn};

use tidyfile_core::{DEFAULT_CHUNK_SIZE, EngineConfig, HashAlgorithm, resolve_workers};

use crate::error::{HashError, HashResult};
use crate::hash::hash_file;

/// Digest per file in input order; `None` marks a file that failed to hash.
pub type FileHashes = IndexMap<PathBuf, Option<String>>;

/// Hashes files concurrently on a dedicated rayon pool.
#[derive(Debug, Clone)]
pub struct ParallelHasher {
    algorithm: HashAlgorithm,
    chunk_size: usize,
    workers: usize,
}

impl ParallelHasher {
    /// Create a hasher using all available CPUs.
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            chunk_size: DEFAULT_CHUNK_SIZE,
            workers: 0,
        }
    }

    /// Create a hasher sized by an engine config.
    pub fn from_config(config: &EngineConfig, algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            chunk_size: config.chunk_size,
            workers: config.effective_workers(),
        }
    }

    /// Set the number of worker threads (0 = available CPU count).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the read chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Algorithm this hasher computes.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Hash every file, returning digests in input order.
    pub fn hash_all(&self, files: &[PathBuf]) -> HashResult<FileHashes> {
        self.hash_all_with_progress(files, |_, _, _| {})
    }

    /// Hash every file, invoking `on_progress(completed, total, file)` once
    /// per finished file.
    ///
    /// Completions arrive in any order, but `completed` counts up from 1 to
    /// `total` without gaps. A file that fails to hash maps to `None`.
    pub fn hash_all_with_progress<F>(&self, files: &[PathBuf], on_progress: F) -> HashResult<FileHashes>
    where
        F: FnMut(usize, usize, &Path) + Send,
    {
        let total = files.len();
        if total == 0 {
            return Ok(FileHashes::new());
        }

        let workers = resolve_workers(self.workers);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("tidyfile-hash-{i}"))
            .build()
            .map_err(|e| HashError::Pool {
                message: e.to_string(),
            })?;

        debug!(files = total, workers, algorithm = %self.algorithm, "hashing");

        let progress = Mutex::new((0usize, on_progress));
        let digests: Vec<Option<String>> = pool.install(|| {
            files
                .par_iter()
                .map(|path| {
                    let digest = match hash_file(path, self.algorithm, self.chunk_size) {
                        Ok(d) => Some(d),
                        Err(err) => {
                            warn!(path = %path.display(), %err, "failed to hash file");
                            None
                        }
                    };

                    let mut state = progress.lock().unwrap_or_else(|e| e.into_inner());
                    state.0 += 1;
                    let completed = state.0;
                    (state.1)(completed, total, path);

                    digest
                })
                .collect()
        });

        Ok(files.iter().cloned().zip(digests).collect())
    }
}
