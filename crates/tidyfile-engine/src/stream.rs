//! Pull-based progress streams for index and duplicate detection.
//!
//! Each stream is an [`Iterator`] of [`ProgressEvent`]s that does one unit
//! of work per `next()` call. Dropping it cancels the remaining work.
//! [`spawn_stream`] moves any such iterator onto a blocking tokio worker
//! for async consumers.

use std::fs;
use std::mem;
use std::path::PathBuf;
use std::vec;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use tidyfile_analyze::{FileHashes, SizeBuckets, hash_file};
use tidyfile_core::{
    FileRecord, HashAlgorithm, IndexReport, Phase, ProgressEvent, StreamSummary, modified_epoch,
};
use tidyfile_scan::PathScanner;

/// Default channel buffer size for streamed progress events.
pub const STREAM_CHANNEL_SIZE: usize = 100;

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndexState {
    Start,
    Indexing,
    Done,
}

/// Streaming index: one `scanning` event, one `indexing` event per file,
/// then `complete` with the [`IndexReport`].
#[derive(Debug)]
pub struct IndexStream {
    state: IndexState,
    files: vec::IntoIter<PathBuf>,
    total: u64,
    position: u64,
    hash: Option<(HashAlgorithm, usize)>,
    records: Vec<FileRecord>,
}

impl IndexStream {
    /// Stream over an already scanned file list. `hash` carries the
    /// algorithm and chunk size when digests are wanted.
    pub fn new(files: Vec<PathBuf>, hash: Option<(HashAlgorithm, usize)>) -> Self {
        Self {
            state: IndexState::Start,
            total: files.len() as u64,
            files: files.into_iter(),
            position: 0,
            hash,
            records: Vec::new(),
        }
    }
}

impl Iterator for IndexStream {
    type Item = ProgressEvent;

    fn next(&mut self) -> Option<ProgressEvent> {
        match self.state {
            IndexState::Start => {
                self.state = IndexState::Indexing;
                Some(ProgressEvent::progress(Phase::Scanning, 0, self.total))
            }
            IndexState::Indexing => {
                for path in self.files.by_ref() {
                    self.position += 1;
                    let meta = match fs::metadata(&path) {
                        Ok(m) => m,
                        Err(err) => {
                            warn!(path = %path.display(), %err, "skipping file");
                            continue;
                        }
                    };

                    let name = file_name(&path);
                    let mut record = FileRecord::new(path, meta.len(), modified_epoch(&meta));
                    if let Some((algo, chunk_size)) = self.hash {
                        let digest = hash_file(&record.path, algo, chunk_size)
                            .map_err(|err| warn!(path = %record.path.display(), %err, "failed to hash file"))
                            .ok();
                        record = record.with_hash(algo, digest);
                    }
                    self.records.push(record);

                    return Some(
                        ProgressEvent::progress(Phase::Indexing, self.position, self.total)
                            .with_file(name),
                    );
                }

                self.state = IndexState::Done;
                let report = IndexReport::from_records(mem::take(&mut self.records));
                debug!(files = report.total_files, bytes = report.total_bytes, "index stream complete");
                Some(ProgressEvent::complete(StreamSummary::Index(report)))
            }
            IndexState::Done => None,
        }
    }
}

enum DuplicateState {
    Start(PathScanner),
    Scan(PathScanner),
    HashStart(SizeBuckets),
    Hashing {
        buckets: SizeBuckets,
        candidates: vec::IntoIter<PathBuf>,
        total: u64,
        position: u64,
        hashes: FileHashes,
    },
    Done,
}

/// Streaming duplicate detection with sequential hashing.
///
/// Emits `scanning` (message), `scanning` (file count), `hashing` 0/N
/// (message), one `hashing` event per candidate, then `complete` with the
/// [`DuplicateReport`](tidyfile_core::DuplicateReport).
pub struct DuplicateStream {
    state: DuplicateState,
    algorithm: HashAlgorithm,
    chunk_size: usize,
}

impl std::fmt::Debug for DuplicateStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateStream")
            .field("algorithm", &self.algorithm)
            .field("chunk_size", &self.chunk_size)
            .finish_non_exhaustive()
    }
}

impl DuplicateStream {
    /// Stream over the files `scanner` yields. Scanning starts on the
    /// second pull.
    pub fn new(scanner: PathScanner, algorithm: HashAlgorithm, chunk_size: usize) -> Self {
        Self {
            state: DuplicateState::Start(scanner),
            algorithm,
            chunk_size,
        }
    }
}

impl Iterator for DuplicateStream {
    type Item = ProgressEvent;

    fn next(&mut self) -> Option<ProgressEvent> {
        let (state, event) = match mem::replace(&mut self.state, DuplicateState::Done) {
            DuplicateState::Start(scanner) => (
                DuplicateState::Scan(scanner),
                ProgressEvent::progress(Phase::Scanning, 0, 0).with_message("Scanning files..."),
            ),
            DuplicateState::Scan(scanner) => {
                // Phase 1: size buckets
                let buckets = SizeBuckets::from_paths(scanner.files());
                let scanned = buckets.files_scanned();
                (
                    DuplicateState::HashStart(buckets),
                    ProgressEvent::progress(Phase::Scanning, scanned, scanned),
                )
            }
            DuplicateState::HashStart(buckets) => {
                let candidates = buckets.candidates();
                let total = candidates.len() as u64;
                (
                    DuplicateState::Hashing {
                        buckets,
                        candidates: candidates.into_iter(),
                        total,
                        position: 0,
                        hashes: FileHashes::new(),
                    },
                    ProgressEvent::progress(Phase::Hashing, 0, total)
                        .with_message(format!("Hashing {total} candidate files...")),
                )
            }
            DuplicateState::Hashing {
                buckets,
                mut candidates,
                total,
                mut position,
                mut hashes,
            } => match candidates.next() {
                // Phase 2: one digest per pull
                Some(path) => {
                    position += 1;
                    let digest = hash_file(&path, self.algorithm, self.chunk_size)
                        .map_err(|err| warn!(path = %path.display(), %err, "failed to hash file"))
                        .ok();
                    let event = ProgressEvent::progress(Phase::Hashing, position, total)
                        .with_file(file_name(&path));
                    hashes.insert(path, digest);
                    (
                        DuplicateState::Hashing {
                            buckets,
                            candidates,
                            total,
                            position,
                            hashes,
                        },
                        event,
                    )
                }
                None => {
                    let report = buckets.into_report(self.algorithm, &hashes);
                    debug!(groups = report.groups.len(), "duplicate stream complete");
                    (
                        DuplicateState::Done,
                        ProgressEvent::complete(StreamSummary::Duplicates(report)),
                    )
                }
            },
            DuplicateState::Done => return None,
        };

        self.state = state;
        Some(event)
    }
}

/// Run a progress stream on a blocking tokio worker.
///
/// Events pass through a bounded channel of [`STREAM_CHANNEL_SIZE`].
/// Dropping the returned stream stops the worker after its current unit of
/// work; a panicking worker ends the stream with an `error` event. Must be
/// called from within a tokio runtime.
pub fn spawn_stream<I>(events: I) -> ReceiverStream<ProgressEvent>
where
    I: Iterator<Item = ProgressEvent> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(STREAM_CHANNEL_SIZE);

    tokio::spawn(async move {
        let worker_tx = tx.clone();
        let worker = tokio::task::spawn_blocking(move || {
            for event in events {
                if worker_tx.blocking_send(event).is_err() {
                    debug!("stream receiver dropped, stopping");
                    break;
                }
            }
        });

        if let Err(err) = worker.await {
            let _ = tx
                .send(ProgressEvent::error(format!("Stream worker failed: {err}")))
                .await;
        }
    });

    ReceiverStream::new(rx)
}
