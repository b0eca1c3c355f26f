//! tidy - organize, rename, clean, index and deduplicate files.
//!
//! Usage:
//!   tidy organize [PATH]     Sort files into per-extension or per-date folders
//!   tidy rename [PATH]       Bulk rename with patterns and counters
//!   tidy clean [PATH]        Archive or delete old / large files
//!   tidy index [PATH]        List files with sizes and optional digests
//!   tidy dupes [PATH]        Find duplicate files
//!   tidy --help              Show help
//!
//! Every mutating command previews by default; pass `--apply` to act.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tidyfile_core::absolute_path;
use tidyfile_engine::{
    Action, CleanOptions, DuplicateAction, DuplicateOptions, DuplicateReport, Engine,
    EngineConfig, HashAlgorithm, IndexOptions, IndexReport, OrganizeBy, OrganizeOptions,
    ProgressEvent, RenameOptions, StreamSummary,
};

#[derive(Parser)]
#[command(
    name = "tidy",
    version,
    about = "Organize, rename, clean, index and deduplicate files",
    long_about = "tidy plans file operations and shows them before touching anything.\n\n\
                  Run a subcommand to preview its actions, then repeat it with \
                  --apply to perform them."
)]
struct Cli {
    /// Engine config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Hashing threads (0 = all cores)
    #[arg(short = 'j', long, global = true)]
    workers: Option<usize>,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct Walk {
    /// Directory to work on
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Only look at the top level
    #[arg(long)]
    no_recursive: bool,

    /// Glob patterns to skip
    #[arg(short = 'x', long)]
    exclude: Vec<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Sort files into folders by extension, day or month
    Organize {
        #[command(flatten)]
        walk: Walk,

        /// Bucketing scheme (ext, date, month)
        #[arg(short, long, default_value = "ext")]
        by: OrganizeBy,

        /// Base directory for the buckets (defaults to PATH)
        #[arg(short, long)]
        dest: Option<PathBuf>,

        /// Glob patterns a file must match
        #[arg(short, long)]
        include: Vec<String>,

        /// Remove directories left empty
        #[arg(long)]
        remove_empty: bool,

        /// Perform the moves instead of previewing them
        #[arg(long)]
        apply: bool,
    },

    /// Rename files in bulk
    Rename {
        #[command(flatten)]
        walk: Walk,

        /// Regex applied to each file stem
        #[arg(short, long)]
        pattern: Option<String>,

        /// Replacement for PATTERN matches ($1 for groups)
        #[arg(short, long, default_value = "")]
        replace: String,

        #[arg(long, default_value = "")]
        prefix: String,

        #[arg(long, default_value = "")]
        suffix: String,

        /// Lowercase the stem
        #[arg(long)]
        lower: bool,

        /// Uppercase the stem
        #[arg(long)]
        upper: bool,

        /// Replace unusual characters with '_'
        #[arg(long)]
        sanitize: bool,

        /// Append a _NNN counter
        #[arg(short, long)]
        enumerate: bool,

        #[arg(long, default_value = "1", allow_negative_numbers = true)]
        start: i64,

        #[arg(long, default_value = "1", allow_negative_numbers = true)]
        step: i64,

        /// Counter width
        #[arg(long, default_value = "3")]
        width: usize,

        /// Only rename files with this extension
        #[arg(long)]
        ext: Option<String>,

        /// Perform the renames instead of previewing them
        #[arg(long)]
        apply: bool,
    },

    /// Archive or delete files by age and size
    Clean {
        #[command(flatten)]
        walk: Walk,

        /// Select files not modified for this many days
        #[arg(long)]
        older_than: Option<u64>,

        /// Select files of at least this many MiB
        #[arg(long)]
        larger_than: Option<u64>,

        /// Move selected files here instead of deleting them
        #[arg(short, long)]
        archive: Option<PathBuf>,

        /// Delete permanently instead of using the trash
        #[arg(long)]
        permanent: bool,

        /// Remove directories left empty
        #[arg(long)]
        remove_empty: bool,

        /// Perform the cleanup instead of previewing it
        #[arg(long)]
        apply: bool,
    },

    /// List files with size, mtime and optional digest
    Index {
        #[command(flatten)]
        walk: Walk,

        /// Include a content digest per file
        #[arg(long)]
        hash: bool,

        /// Digest algorithm (md5, sha256, sha512, blake3)
        #[arg(long)]
        algo: Option<HashAlgorithm>,

        /// Print progress events as they arrive
        #[arg(long)]
        stream: bool,
    },

    /// Find duplicate files by content
    Dupes {
        #[command(flatten)]
        walk: Walk,

        /// Digest algorithm (md5, sha256, sha512, blake3)
        #[arg(long)]
        algo: Option<HashAlgorithm>,

        /// What to do with each extra copy (list, trash, delete, archive)
        #[arg(short, long, default_value = "list")]
        action: DuplicateAction,

        /// Archive directory for --action archive
        #[arg(long)]
        archive: Option<PathBuf>,

        /// Print progress events as they arrive
        #[arg(long, conflicts_with = "apply")]
        stream: bool,

        /// Perform the action instead of previewing it
        #[arg(long)]
        apply: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut engine = Engine::with_config(load_config(cli.config.as_deref(), cli.workers)?);
    let format = cli.format;

    match cli.command {
        Command::Organize {
            walk,
            by,
            dest,
            include,
            remove_empty,
            apply,
        } => {
            let options = OrganizeOptions {
                root: walk.path,
                by,
                dest,
                recursive: !walk.no_recursive,
                exclude: walk.exclude,
                include,
                remove_empty,
                apply,
            };
            let actions = engine.organize(&options).context("Organize failed")?;
            print_actions(&actions, apply, format)?;
        }
        Command::Rename {
            walk,
            pattern,
            replace,
            prefix,
            suffix,
            lower,
            upper,
            sanitize,
            enumerate,
            start,
            step,
            width,
            ext,
            apply,
        } => {
            let options = RenameOptions {
                root: walk.path,
                pattern,
                replace,
                prefix,
                suffix,
                lower,
                upper,
                sanitize,
                enumerate,
                start,
                step,
                width,
                ext_filter: ext,
                recursive: !walk.no_recursive,
                exclude: walk.exclude,
                apply,
            };
            let actions = engine.rename(&options).context("Rename failed")?;
            print_actions(&actions, apply, format)?;
        }
        Command::Clean {
            walk,
            older_than,
            larger_than,
            archive,
            permanent,
            remove_empty,
            apply,
        } => {
            let options = CleanOptions {
                root: walk.path,
                older_than_days: older_than,
                larger_than_mb: larger_than,
                archive_dir: archive,
                use_trash: !permanent,
                delete_permanently: permanent,
                remove_empty,
                recursive: !walk.no_recursive,
                exclude: walk.exclude,
                apply,
            };
            let actions = engine.clean(&options).context("Clean failed")?;
            print_actions(&actions, apply, format)?;
        }
        Command::Index {
            walk,
            hash,
            algo,
            stream,
        } => {
            let options = IndexOptions {
                root: walk.path,
                include_hash: hash,
                hash_algo: algo,
                recursive: !walk.no_recursive,
                exclude: walk.exclude,
            };
            if stream {
                run_stream(engine.index_stream(&options)?, format)?;
            } else {
                let report = engine.index(&options).context("Index failed")?;
                print_index(&report, format)?;
            }
        }
        Command::Dupes {
            walk,
            algo,
            action,
            archive,
            stream,
            apply,
        } => {
            let options = DuplicateOptions {
                root: walk.path,
                hash_algo: algo,
                action,
                archive_dir: archive,
                recursive: !walk.no_recursive,
                exclude: walk.exclude,
                apply,
            };
            if stream {
                run_stream(engine.find_duplicates_stream(&options)?, format)?;
            } else {
                let report = engine
                    .find_duplicates(&options)
                    .context("Duplicate scan failed")?;
                print_duplicates(&report, apply, format)?;
            }
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Read the engine config file, then apply command-line overrides.
fn load_config(path: Option<&Path>, workers: Option<usize>) -> Result<EngineConfig> {
    let mut config = match path {
        Some(path) => {
            let path = absolute_path(path);
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };
    if let Some(workers) = workers {
        config.hash_workers = workers;
    }
    debug!(?config, "engine config");
    Ok(config)
}

/// Pull a progress stream to completion, printing each event.
fn run_stream<I>(events: I, format: OutputFormat) -> Result<()>
where
    I: Iterator<Item = ProgressEvent>,
{
    for event in events {
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string(&event)?),
            OutputFormat::Text => match event {
                ProgressEvent::Progress {
                    phase,
                    current,
                    total,
                    current_file,
                    message,
                } => {
                    let detail = message.or(current_file).unwrap_or_default();
                    eprintln!("[{phase}] {current}/{total} {detail}");
                }
                ProgressEvent::Complete {
                    summary: StreamSummary::Index(report),
                } => print_index(&report, format)?,
                ProgressEvent::Complete {
                    summary: StreamSummary::Duplicates(report),
                } => print_duplicates(&report, false, format)?,
                ProgressEvent::Error { message } => {
                    color_eyre::eyre::bail!("Stream failed: {message}")
                }
            },
        }
    }
    Ok(())
}

fn print_actions(actions: &[Action], applied: bool, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            let verb = if applied { "Applied" } else { "Would apply" };
            for action in actions {
                println!("  {action}");
            }
            println!();
            println!(" {verb} {} action(s)", actions.len());
            if !applied && !actions.is_empty() {
                println!(" Re-run with --apply to perform them.");
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(actions)?);
        }
    }
    Ok(())
}

fn print_index(report: &IndexReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for file in &report.files {
                let digest = file
                    .hashes
                    .values()
                    .next()
                    .and_then(|d| d.as_deref())
                    .unwrap_or("");
                println!(
                    " {:>10}  {}  {}",
                    format_size(file.size),
                    file.path.display(),
                    digest
                );
            }
            println!();
            println!(
                " {} files, {}",
                report.total_files,
                format_size(report.total_bytes)
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
    }
    Ok(())
}

fn print_duplicates(report: &DuplicateReport, applied: bool, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!();
            println!("{}", "─".repeat(70));
            println!(" Duplicate File Report");
            println!("{}", "─".repeat(70));
            println!();

            if !report.has_duplicates() {
                println!(" No duplicate files found ({} scanned).", report.files_scanned);
                return Ok(());
            }

            println!(
                " Found {} duplicate groups ({} extra copies)",
                report.groups.len(),
                report.total_duplicates
            );
            println!(
                " Total wasted space: {}",
                format_size(report.total_wasted_bytes)
            );
            println!();

            for (i, group) in report.groups.iter().enumerate() {
                println!(
                    " Group {} ({} files, {} each, {} wasted)",
                    i + 1,
                    group.count,
                    format_size(group.size),
                    format_size(group.wasted_bytes)
                );
                println!("   keep {}", group.keep.display());
                for action in &group.actions {
                    println!("   {action}");
                }
                println!();
            }

            let mutating = report.actions().filter(|a| a.op().is_mutation()).count();
            if !applied && mutating > 0 {
                println!(" Re-run with --apply to perform {mutating} action(s).");
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
    }
    Ok(())
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
