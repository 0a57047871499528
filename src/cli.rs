//! Command-line interface definitions for dupefinder.
//!
//! Global options (verbosity, color, config selection) apply to every
//! subcommand. Scan options left unset fall back to the configuration file
//! and `DUPEFINDER_*` environment variables.
//!
//! # Example
//!
//! ```bash
//! # Exact duplicates, text report
//! dupefinder scan ~/Downloads
//!
//! # Near duplicates within 10 edits, JSON report with categories
//! dupefinder scan ~/notes --mode fuzzy --threshold 10 --output json
//!
//! # Move two copies to the trash, refusing anything outside ~/Downloads
//! dupefinder delete --base ~/Downloads ~/Downloads/a\ (1).txt ~/Downloads/b.txt
//!
//! # Replace the categorization rules
//! dupefinder rules set my-rules.json
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::duplicates::ClusterStrategy;
use crate::scanner::FingerprintMode;

/// Duplicate and near-duplicate file finder with keyword categorization.
#[derive(Debug, Parser)]
#[command(name = "dupefinder")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Named profile from the configuration file
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory for duplicate or similar files
    Scan(ScanArgs),
    /// Delete files, refusing any outside a base directory
    Delete(DeleteArgs),
    /// Show or replace the categorization rules
    Rules(RulesArgs),
    /// Print the beginning of a file
    Preview(PreviewArgs),
    /// List directories with no entries
    EmptyDirs(EmptyDirsArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory path to scan
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Fingerprint mode: exact content digest or fuzzy text distance
    #[arg(short, long, value_enum)]
    pub mode: Option<FingerprintMode>,

    /// Maximum edit distance for fuzzy mode
    #[arg(short, long, value_name = "N")]
    pub threshold: Option<usize>,

    /// Clustering strategy for fuzzy mode
    #[arg(long, value_enum)]
    pub strategy: Option<ClusterStrategy>,

    /// Number of I/O threads for fingerprinting
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Follow symbolic links during scan
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long, overrides_with = "no_follow_symlinks")]
    pub follow_symlinks: bool,

    /// Do not follow symbolic links (overrides the config file)
    #[arg(long, overrides_with = "follow_symlinks")]
    pub no_follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long, overrides_with = "no_skip_hidden")]
    pub skip_hidden: bool,

    /// Include hidden files (overrides the config file)
    #[arg(long, overrides_with = "skip_hidden")]
    pub no_skip_hidden: bool,

    /// Glob patterns to ignore (can be specified multiple times)
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Rules document used for categorization
    #[arg(long, value_name = "PATH")]
    pub rules: Option<PathBuf>,

    /// Skip categorization
    #[arg(long)]
    pub no_categorize: bool,

    /// Also list empty directories under PATH
    #[arg(long)]
    pub empty_dirs: bool,
}

/// Arguments for the delete subcommand.
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Directory every target must lie within
    #[arg(long, value_name = "DIR")]
    pub base: PathBuf,

    /// Files to delete
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Delete permanently instead of moving to the trash
    ///
    /// Warning: Files cannot be recovered after permanent deletion.
    #[arg(long)]
    pub permanent: bool,

    /// Output format (text or json)
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the rules subcommand.
#[derive(Debug, Args)]
pub struct RulesArgs {
    /// Rules document (defaults to the configured path)
    #[arg(long, value_name = "PATH")]
    pub rules: Option<PathBuf>,

    /// Action to perform
    #[command(subcommand)]
    pub action: RulesAction,
}

/// Rules subcommand actions.
#[derive(Debug, Subcommand)]
pub enum RulesAction {
    /// Print the current rules as JSON
    Show,
    /// Replace the rules with those in FILE
    Set {
        /// JSON array of {"category", "keywords"} objects
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

/// Arguments for the preview subcommand.
#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// File to preview
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Arguments for the empty-dirs subcommand.
#[derive(Debug, Args)]
pub struct EmptyDirsArgs {
    /// Directory to search
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Output format (text or json)
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON for scripting
    Json,
    /// CSV for spreadsheets (scan only)
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
