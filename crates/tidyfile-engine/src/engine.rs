//! The command engine: organize, rename, clean, index, dedupe, undo.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use regex::Regex;
use tracing::{debug, info, warn};

use tidyfile_analyze::{DuplicateDetector, ParallelHasher};
use tidyfile_core::{
    Action, DuplicateReport, EngineConfig, FileRecord, HashAlgorithm, IndexReport, absolute_path,
    modified_epoch, modified_utc,
};
use tidyfile_ops::{
    ActionBatch, ActionLog, OperationExecutor, TrashCan, detect_trash, undo_actions,
};
use tidyfile_scan::PathScanner;

use crate::error::{EngineError, EngineResult};
use crate::options::{
    CleanOptions, DuplicateAction, DuplicateOptions, IndexOptions, OrganizeBy, OrganizeOptions,
    RenameOptions,
};
use crate::stream::{DuplicateStream, IndexStream};

/// Bucket name for files without an extension.
pub const NO_EXTENSION: &str = "noext";

const BYTES_PER_MB: u64 = 1024 * 1024;

/// File-management engine owning its configuration, trash capability and
/// action history.
///
/// Each mutating command runs with a fresh [`OperationExecutor`]; when it
/// applies, the resulting batch is appended to this engine's history.
pub struct Engine {
    config: EngineConfig,
    trash: Arc<dyn TrashCan>,
    log: ActionLog,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("can_trash", &self.trash.can_trash())
            .field("history", &self.log.len())
            .finish()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create an engine with default config and the detected trash.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine with custom config and the detected trash.
    pub fn with_config(config: EngineConfig) -> Self {
        let log = ActionLog::new(config.history_limit);
        Self {
            config,
            trash: detect_trash(),
            log,
        }
    }

    /// Replace the trash capability.
    pub fn with_trash(mut self, trash: Arc<dyn TrashCan>) -> Self {
        self.trash = trash;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether deletes can go to a trash.
    pub fn can_trash(&self) -> bool {
        self.trash.can_trash()
    }

    fn executor(&self, apply: bool) -> OperationExecutor {
        OperationExecutor::new(Arc::clone(&self.trash), apply)
    }

    fn algorithm(&self, requested: Option<HashAlgorithm>) -> HashAlgorithm {
        requested.unwrap_or(self.config.default_algorithm)
    }

    fn record(&mut self, command: &str, apply: bool, actions: &[Action]) {
        if !apply {
            debug!(command, actions = actions.len(), "preview");
            return;
        }
        if let Some(id) = self.log.push(command, actions.to_vec()) {
            info!(command, id, actions = actions.len(), "applied batch");
        }
    }

    /// Move files into per-extension, per-day or per-month directories.
    pub fn organize(&mut self, options: &OrganizeOptions) -> EngineResult<Vec<Action>> {
        let root = absolute_path(&options.root);
        let base = options.dest.as_deref().map(absolute_path).unwrap_or_else(|| root.clone());

        // Snapshot before mutating so moved files are not revisited
        let files = PathScanner::new(options.scan_options())?.collect_files();
        let mut executor = self.executor(options.apply);
        let mut actions = Vec::new();

        for file in files {
            let Some(key) = bucket_key(&file, options.by) else {
                continue;
            };
            let dest_dir = base.join(key);
            if file.parent() == Some(dest_dir.as_path()) {
                continue;
            }
            actions.push(executor.move_file(&file, &dest_dir)?);
        }

        if options.remove_empty && root.is_dir() {
            actions.extend(executor.remove_empty_dirs(&root)?);
        }

        self.record("organize", options.apply, &actions);
        Ok(actions)
    }

    /// Bulk rename with substitution, counters, affixes and case folding.
    pub fn rename(&mut self, options: &RenameOptions) -> EngineResult<Vec<Action>> {
        let regex = options
            .pattern
            .as_deref()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| EngineError::InvalidPattern {
                    pattern: pattern.to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()?;
        if options.enumerate && options.step == 0 {
            return Err(EngineError::invalid_options("enumeration step cannot be zero"));
        }

        let only_ext = options
            .ext_filter
            .as_deref()
            .map(|ext| ext.trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty());

        // Phase 1: select the files to rename
        let mut selected = Vec::new();
        for file in PathScanner::new(options.scan_options())?.collect_files() {
            let Some(name) = file.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            let ext = split_name(&name).1;
            if let Some(only) = &only_ext
                && ext.trim_start_matches('.').to_lowercase() != *only
            {
                continue;
            }
            selected.push((file, name));
        }

        // Phase 2: the whole counter range must fit before anything moves
        if options.enumerate && !selected.is_empty() {
            let last = (selected.len() as i64 - 1)
                .checked_mul(options.step)
                .and_then(|offset| offset.checked_add(options.start));
            if last.is_none() {
                return Err(EngineError::invalid_options(format!(
                    "enumerating {} files from {} by {} overflows the counter",
                    selected.len(),
                    options.start,
                    options.step
                )));
            }
        }

        // Phase 3: build and perform the renames
        let mut executor = self.executor(options.apply);
        let mut actions = Vec::new();
        let mut counter = options.start;
        let total = selected.len();

        for (index, (file, name)) in selected.into_iter().enumerate() {
            let (stem, ext) = split_name(&name);

            let mut new_stem = match &regex {
                Some(re) => re.replace_all(stem, options.replace.as_str()).into_owned(),
                None => stem.to_string(),
            };

            if options.enumerate {
                new_stem = format!("{new_stem}_{counter:0width$}", width = options.width);
                if index + 1 < total {
                    counter += options.step;
                }
            }

            new_stem = format!("{}{new_stem}{}", options.prefix, options.suffix);

            if options.lower && !options.upper {
                new_stem = new_stem.to_lowercase();
            } else if options.upper && !options.lower {
                new_stem = new_stem.to_uppercase();
            }

            let mut new_name = format!("{new_stem}{ext}");
            if options.sanitize {
                new_name = sanitize_filename(&new_name);
            }

            if new_name != name {
                actions.push(executor.rename(&file, &new_name)?);
            }
        }

        self.record("rename", options.apply, &actions);
        Ok(actions)
    }

    /// Archive or delete files selected by age and/or size.
    pub fn clean(&mut self, options: &CleanOptions) -> EngineResult<Vec<Action>> {
        if !options.has_filter() {
            return Err(EngineError::invalid_options(
                "clean needs older_than_days or larger_than_mb",
            ));
        }

        let root = absolute_path(&options.root);
        let archive = options.archive_dir.as_deref().map(absolute_path);
        let cutoff = options.older_than_days.map(age_cutoff);
        let min_size = options
            .larger_than_mb
            .map(|mb| mb.saturating_mul(BYTES_PER_MB));

        let files = PathScanner::new(options.scan_options())?.collect_files();
        let mut executor = self.executor(options.apply);
        let mut actions = Vec::new();

        for file in files {
            let meta = match fs::metadata(&file) {
                Ok(m) => m,
                Err(err) => {
                    warn!(path = %file.display(), %err, "skipping file");
                    continue;
                }
            };

            let old_enough = cutoff.is_none_or(|cutoff| modified_utc(&meta) < cutoff);
            let large_enough = min_size.is_none_or(|min| meta.len() >= min);
            if !(old_enough && large_enough) {
                continue;
            }

            let action = match &archive {
                Some(dir) => executor.move_file(&file, dir)?,
                None if options.delete_permanently => executor.delete(&file, false)?,
                None => executor.delete(&file, options.use_trash)?,
            };
            actions.push(action);
        }

        if options.remove_empty && root.is_dir() {
            actions.extend(executor.remove_empty_dirs(&root)?);
        }

        self.record("clean", options.apply, &actions);
        Ok(actions)
    }

    /// Build a file inventory, hashing in parallel when asked.
    pub fn index(&self, options: &IndexOptions) -> EngineResult<IndexReport> {
        let files = PathScanner::new(options.scan_options())?.collect_files();
        let algorithm = self.algorithm(options.hash_algo);

        let hashes = if options.include_hash {
            Some(ParallelHasher::from_config(&self.config, algorithm).hash_all(&files)?)
        } else {
            None
        };

        let records: Vec<FileRecord> = files
            .into_iter()
            .filter_map(|path| {
                let meta = fs::metadata(&path)
                    .map_err(|err| warn!(path = %path.display(), %err, "skipping file"))
                    .ok()?;
                let digest = hashes
                    .as_ref()
                    .map(|h| h.get(&path).cloned().flatten());
                let record = FileRecord::new(path, meta.len(), modified_epoch(&meta));
                Some(match digest {
                    Some(digest) => record.with_hash(algorithm, digest),
                    None => record,
                })
            })
            .collect();

        let report = IndexReport::from_records(records);
        info!(files = report.total_files, bytes = report.total_bytes, "indexed");
        Ok(report)
    }

    /// Streaming variant of [`index`](Self::index). Files are listed up
    /// front; metadata and hashes are read one per pull.
    pub fn index_stream(&self, options: &IndexOptions) -> EngineResult<IndexStream> {
        let files = PathScanner::new(options.scan_options())?.collect_files();
        let hash = options
            .include_hash
            .then(|| (self.algorithm(options.hash_algo), self.config.chunk_size));
        Ok(IndexStream::new(files, hash))
    }

    /// Find duplicate groups and apply the requested action to every
    /// duplicate but the kept one.
    pub fn find_duplicates(&mut self, options: &DuplicateOptions) -> EngineResult<DuplicateReport> {
        let archive = match (options.action, options.archive_dir.as_deref()) {
            (DuplicateAction::Archive, Some(dir)) => Some(absolute_path(dir)),
            (DuplicateAction::Archive, None) => {
                return Err(EngineError::invalid_options(
                    "archive action needs an archive directory",
                ));
            }
            _ => None,
        };

        let scanner = PathScanner::new(options.scan_options())?;
        let hasher =
            ParallelHasher::from_config(&self.config, self.algorithm(options.hash_algo));
        let mut report = DuplicateDetector::new(hasher).detect(scanner.files())?;

        let mut executor = self.executor(options.apply);
        let mut applied = Vec::new();

        for group in &mut report.groups {
            for duplicate in &group.duplicates {
                let action = match options.action {
                    DuplicateAction::List => Action::dupe(duplicate, &group.keep),
                    DuplicateAction::Trash => executor.delete(duplicate, true)?,
                    DuplicateAction::Delete => executor.delete(duplicate, false)?,
                    DuplicateAction::Archive => match &archive {
                        Some(dir) => executor.archive_dupe(duplicate, dir, &group.keep)?,
                        None => Action::dupe(duplicate, &group.keep),
                    },
                };
                group.actions.push(action);
            }
            applied.extend(group.actions.iter().filter(|a| a.op().is_mutation()).cloned());
        }

        info!(
            groups = report.groups.len(),
            wasted = report.total_wasted_bytes,
            action = %options.action,
            "duplicate scan finished"
        );
        self.record("dupes", options.apply, &applied);
        Ok(report)
    }

    /// Streaming variant of [`find_duplicates`](Self::find_duplicates) that
    /// only reports.
    pub fn find_duplicates_stream(&self, options: &DuplicateOptions) -> EngineResult<DuplicateStream> {
        let scanner = PathScanner::new(options.scan_options())?;
        Ok(DuplicateStream::new(
            scanner,
            self.algorithm(options.hash_algo),
            self.config.chunk_size,
        ))
    }

    /// Reverse a batch, the most recent one when `batch_index` is `None`.
    ///
    /// With `apply` set the reversal is performed and the batch leaves the
    /// history. The reversal itself is not recorded.
    pub fn undo(&mut self, batch_index: Option<usize>, apply: bool) -> EngineResult<Vec<Action>> {
        if self.log.is_empty() {
            return Err(EngineError::EmptyHistory);
        }
        let len = self.log.len();
        let index = batch_index.unwrap_or(len - 1);
        let batch = self
            .log
            .get(index)
            .ok_or(EngineError::InvalidBatchIndex { index, len })?;

        let mut executor = OperationExecutor::new(Arc::clone(&self.trash), apply);
        let reversed = undo_actions(&mut executor, &batch.actions)?;
        debug!(index, command = %batch.command, steps = reversed.len(), apply, "undo");

        if apply {
            self.log.remove(index);
        }
        Ok(reversed)
    }

    /// Applied batches, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &ActionBatch> {
        self.log.iter()
    }

    /// Forget every recorded batch.
    pub fn clear_history(&mut self) {
        self.log.clear();
    }
}

/// Bucket directory name for `file`, or `None` when its metadata is
/// unreadable.
fn bucket_key(file: &Path, by: OrganizeBy) -> Option<String> {
    match by {
        OrganizeBy::Ext => Some(
            file.extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| NO_EXTENSION.to_string()),
        ),
        OrganizeBy::Date | OrganizeBy::Month => {
            let meta = fs::metadata(file)
                .map_err(|err| warn!(path = %file.display(), %err, "skipping file"))
                .ok()?;
            let format = if by == OrganizeBy::Date { "%Y-%m-%d" } else { "%Y-%m" };
            Some(modified_utc(&meta).format(format).to_string())
        }
    }
}

/// Split a file name into stem and dotted extension (".txt" or "").
fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(0) | None => (name, ""),
        Some(i) if i + 1 == name.len() => (name, ""),
        Some(i) => name.split_at(i),
    }
}

/// Replace characters outside `[A-Za-z0-9._ -]` with `_`, collapse
/// whitespace runs and trim.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | ' ' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Oldest modification time a file may have and still be kept.
fn age_cutoff(days: u64) -> DateTime<Utc> {
    i64::try_from(days)
        .ok()
        .and_then(TimeDelta::try_days)
        .and_then(|age| Utc::now().checked_sub_signed(age))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_name() {
        assert_eq!(split_name("report.txt"), ("report", ".txt"));
        assert_eq!(split_name("archive.tar.gz"), ("archive.tar", ".gz"));
        assert_eq!(split_name("notes"), ("notes", ""));
        assert_eq!(split_name(".bashrc"), (".bashrc", ""));
        assert_eq!(split_name("odd."), ("odd.", ""));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("a  b.txt"), "a b.txt");
        assert_eq!(sanitize_filename("héllo wörld!.md"), "h_llo w_rld_.md");
        assert_eq!(sanitize_filename("  padded  "), "padded");
        assert_eq!(sanitize_filename("tab\there"), "tab_here");
    }

    #[test]
    fn test_bucket_key_ext() {
        assert_eq!(bucket_key(Path::new("/a/Photo.JPG"), OrganizeBy::Ext).unwrap(), "jpg");
        assert_eq!(bucket_key(Path::new("/a/notes"), OrganizeBy::Ext).unwrap(), NO_EXTENSION);
        assert_eq!(bucket_key(Path::new("/a/.env"), OrganizeBy::Ext).unwrap(), NO_EXTENSION);
    }

    #[test]
    fn test_age_cutoff_saturates() {
        assert_eq!(age_cutoff(u64::MAX), DateTime::<Utc>::MIN_UTC);
        assert!(age_cutoff(1) < Utc::now());
    }
}
