//! dupefinder - duplicate and near-duplicate file finder
//!
//! Scans a directory tree, fingerprints every regular file and groups the
//! files that are byte-identical (SHA-256 digest) or textually similar
//! (Levenshtein distance against a threshold). Files are also sorted into
//! user-defined categories by keywords in their names.
//!
//! The library is organized as:
//! - [`scanner`]: walking, fingerprinting, empty directories, path helpers
//! - [`duplicates`]: exact grouping, similarity clustering, the finder pipeline
//! - [`rules`]: categorization rules, their JSON document and the classifier
//! - [`actions`]: contained deletion and file preview
//! - [`output`]: text, JSON and CSV reports
//!
//! [`run_app`] drives all of it from a parsed [`cli::Cli`].

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod rules;
pub mod scanner;
pub mod signal;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::actions::{delete_within, preview_file, DeleteConfig, PreviewType};
use crate::cli::{
    Cli, Commands, DeleteArgs, EmptyDirsArgs, OutputFormat, PreviewArgs, RulesAction, RulesArgs,
    ScanArgs,
};
use crate::config::Config;
use crate::duplicates::DuplicateFinder;
use crate::error::ExitCode;
use crate::output::{CsvOutput, JsonOutput, ScanReport, TextOutput};
use crate::progress::{Progress, ProgressCallback};
use crate::rules::{read_rules, RuleStore};
use crate::scanner::find_empty_dirs;
use crate::scanner::path_utils::absolute_lexical;
use crate::signal::{install_handler, ShutdownHandler};

/// Run the command described by `cli` and return the process exit code.
///
/// # Errors
///
/// Returns an error for invalid input paths, a malformed rules document,
/// an interrupted scan, or a failure writing the output.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    log::debug!("Log level: {}", logging::current_level_name());

    let mut config = Config::load(cli.config.as_deref(), cli.profile.as_deref());
    config.merge_cli(&cli);

    match &cli.command {
        Commands::Scan(args) => {
            config.merge_scan_args(args);
            run_scan(args, &config, cli.quiet)
        }
        Commands::Delete(args) => run_delete(args),
        Commands::Rules(args) => run_rules(args, &config),
        Commands::Preview(args) => run_preview(args),
        Commands::EmptyDirs(args) => run_empty_dirs(args),
    }
}

fn shutdown_handler() -> ShutdownHandler {
    install_handler().unwrap_or_else(|e| {
        log::warn!("{e}; Ctrl+C will terminate immediately");
        ShutdownHandler::new()
    })
}

fn run_scan(args: &ScanArgs, config: &Config, quiet: bool) -> Result<ExitCode> {
    let root = absolute_lexical(&args.path).unwrap_or_else(|_| args.path.clone());
    let handler = shutdown_handler();

    let hide_progress = quiet || args.output != OutputFormat::Text;
    let progress: Arc<dyn ProgressCallback> = Arc::new(Progress::new(hide_progress));

    let finder = DuplicateFinder::new(
        config
            .finder_config()
            .with_shutdown_flag(handler.get_flag())
            .with_progress_callback(progress),
    );
    log::debug!("Finder configuration: {:?}", finder.config());

    let result = finder
        .scan(&root)
        .with_context(|| format!("Scan of {} failed", root.display()))?;

    let mut report = ScanReport::new(result.groups, result.summary);

    if !args.no_categorize {
        let rules_path = config.rules_path();
        let store = RuleStore::open(&rules_path).with_context(|| {
            format!("Failed to load categorization rules from {}", rules_path.display())
        })?;
        report = report.with_categories(store.classify(&result.records));
    }

    if args.empty_dirs {
        let flag = handler.get_flag();
        let folders = find_empty_dirs(&root, Some(flag.as_ref()))
            .with_context(|| format!("Empty directory search of {} failed", root.display()))?;
        report = report.with_empty_folders(folders);
    }

    if handler.is_shutdown_requested() {
        report.summary.interrupted = true;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.output {
        OutputFormat::Text => TextOutput::new(&report, !config.no_color).write_to(&mut out)?,
        OutputFormat::Json => JsonOutput::new(&report).write_to(&mut out, true)?,
        OutputFormat::Csv => CsvOutput::new(&report).write_to(&mut out)?,
    }
    out.flush()?;

    Ok(report.exit_code())
}

fn run_delete(args: &DeleteArgs) -> Result<ExitCode> {
    let delete_config = if args.permanent {
        DeleteConfig::permanent()
    } else {
        DeleteConfig::trash()
    };

    let result = delete_within(&args.base, &args.files, &delete_config)
        .with_context(|| format!("Refusing to delete under {}", args.base.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.output {
        OutputFormat::Json => {
            let failed: Vec<_> = result
                .failures
                .iter()
                .map(|(path, reason)| {
                    serde_json::json!({ "path": path.to_string_lossy(), "reason": reason })
                })
                .collect();
            let body = serde_json::json!({
                "deleted": result.deleted_paths(),
                "failed": failed,
                "bytes_freed": result.bytes_freed,
            });
            writeln!(out, "{}", serde_json::to_string_pretty(&body)?)?;
        }
        OutputFormat::Text | OutputFormat::Csv => {
            for path in result.deleted_paths() {
                writeln!(out, "deleted {}", path.display())?;
            }
            for line in result.failure_lines() {
                writeln!(out, "failed  {line}")?;
            }
            writeln!(out, "{}", result.summary())?;
        }
    }

    Ok(if result.all_succeeded() {
        ExitCode::Success
    } else {
        ExitCode::PartialSuccess
    })
}

fn run_rules(args: &RulesArgs, config: &Config) -> Result<ExitCode> {
    let path = args.rules.clone().unwrap_or_else(|| config.rules_path());
    let store = RuleStore::open(&path)
        .with_context(|| format!("Failed to load categorization rules from {}", path.display()))?;

    match &args.action {
        RulesAction::Show => {
            let json = serde_json::to_string_pretty(&*store.rules())?;
            println!("{json}");
        }
        RulesAction::Set { file } => {
            if !file.is_file() {
                bail!("Rules file {} does not exist", file.display());
            }
            let rules = read_rules(file)
                .with_context(|| format!("Failed to read rules from {}", file.display()))?;
            let unusable = rules.iter().filter(|r| !r.is_usable()).count();
            if unusable > 0 {
                log::warn!("{unusable} rule(s) have no category or keywords and will never match");
            }
            let count = rules.len();
            store
                .save(rules)
                .with_context(|| format!("Failed to save rules to {}", path.display()))?;
            println!("Saved {count} rule(s) to {}", path.display());
        }
    }
    Ok(ExitCode::Success)
}

fn run_preview(args: &PreviewArgs) -> Result<ExitCode> {
    let preview = preview_file(&args.file)
        .with_context(|| format!("Cannot preview {}", args.file.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match preview.preview_type {
        PreviewType::Text => writeln!(out, "{}", preview.content)?,
        PreviewType::Binary => write!(
            out,
            "Binary file ({})\n{}",
            bytesize::ByteSize(preview.file_size),
            preview.content
        )?,
        PreviewType::Empty => writeln!(out, "{}", preview.content)?,
    }
    if preview.truncated {
        log::info!("Preview truncated; {} is longer than shown", args.file.display());
    }
    Ok(ExitCode::Success)
}

fn run_empty_dirs(args: &EmptyDirsArgs) -> Result<ExitCode> {
    let handler = shutdown_handler();
    let root = absolute_lexical(&args.path).unwrap_or_else(|_| args.path.clone());
    let flag = handler.get_flag();
    let folders = find_empty_dirs(&root, Some(flag.as_ref()))
        .with_context(|| format!("Empty directory search of {} failed", root.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.output {
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(&folders)?)?;
        }
        OutputFormat::Text | OutputFormat::Csv => {
            for folder in &folders {
                writeln!(out, "{}", folder.display())?;
            }
        }
    }

    Ok(if handler.is_shutdown_requested() {
        ExitCode::Interrupted
    } else if folders.is_empty() {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    })
}
