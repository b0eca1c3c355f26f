//! Core types and traits for tidyfile.
//!
//! This crate provides the data model shared by every tidyfile crate:
//! the immutable [`Action`] record produced by each filesystem effect,
//! index rows, duplicate groups, streaming progress events and the
//! engine configuration.

mod action;
mod config;
mod error;
mod event;
mod hash;
mod paths;
mod record;

pub use action::{Action, ActionOp, META_KEPT, META_REASON};
pub use config::{DEFAULT_CHUNK_SIZE, EngineConfig, EngineConfigBuilder, resolve_workers};
pub use error::ScanError;
pub use event::{Phase, ProgressEvent, StreamSummary};
pub use hash::HashAlgorithm;
pub use paths::{absolute_path, expand_home, modified_epoch, modified_utc, resolve_path};
pub use record::{DuplicateGroup, DuplicateReport, FileRecord, IndexReport};
