//! Command engine for tidyfile.
//!
//! [`Engine`] ties scanning, hashing and file operations together into five
//! commands (organize, rename, clean, index, dupes) plus undo. Every
//! mutating command runs as a preview unless its options set `apply`, and
//! the preview returns exactly the actions an apply run would perform.
//!
//! ```rust,no_run
//! use tidyfile_engine::{Engine, OrganizeBy, OrganizeOptions};
//!
//! let mut engine = Engine::new();
//! let options = OrganizeOptions::builder()
//!     .root("/home/me/Downloads")
//!     .by(OrganizeBy::Month)
//!     .build()
//!     .unwrap();
//!
//! for action in engine.organize(&options).unwrap() {
//!     println!("{} {}", action.op(), action.src().display());
//! }
//! ```

mod engine;
mod error;
mod options;
mod stream;

pub use engine::{Engine, NO_EXTENSION, sanitize_filename};
pub use error::{EngineError, EngineResult};
pub use options::{
    CleanOptions, CleanOptionsBuilder, DuplicateAction, DuplicateOptions, DuplicateOptionsBuilder,
    IndexOptions, IndexOptionsBuilder, OrganizeBy, OrganizeOptions, OrganizeOptionsBuilder,
    RenameOptions, RenameOptionsBuilder,
};
pub use stream::{DuplicateStream, IndexStream, STREAM_CHANNEL_SIZE, spawn_stream};

// Re-export the types commands exchange
pub use tidyfile_core::{
    Action, ActionOp, DuplicateGroup, DuplicateReport, EngineConfig, FileRecord, HashAlgorithm,
    IndexReport, Phase, ProgressEvent, StreamSummary,
};
pub use tidyfile_ops::{ActionBatch, NoTrash, SystemTrash, TrashCan};
