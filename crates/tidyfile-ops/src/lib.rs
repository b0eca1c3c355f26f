//! File operations for tidyfile.
//!
//! This crate provides the mutating primitives (move, rename, delete,
//! directory removal), collision-safe destination naming, the OS trash
//! capability, and the action history used for undo. Every primitive runs
//! in either preview or apply mode and returns the same
//! [`Action`](tidyfile_core::Action) in both.

mod error;
mod executor;
mod resolver;
mod trash;
mod undo;

pub use error::{OpsError, OpsResult};
pub use executor::{OperationExecutor, validate_filename};
pub use resolver::{PathResolver, ensure_dir, unique_path};
pub use trash::{NoTrash, SystemTrash, TrashCan, detect_trash};
pub use undo::{ActionBatch, ActionLog, CANNOT_RESTORE, undo_actions};
