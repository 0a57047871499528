//! Duplicate finder: walk, fingerprint, then group.
//!
//! # Overview
//!
//! [`DuplicateFinder`] runs the detection pipeline for one root directory:
//!
//! 1. **Walk** the tree and collect every regular file.
//! 2. **Fingerprint** each file on a bounded rayon pool. Results are
//!    collected in walk order, so grouping does not depend on scheduling.
//! 3. **Group** the records: by exact key in [`FingerprintMode::Exact`], by
//!    edit distance in [`FingerprintMode::Fuzzy`].
//!
//! Unreadable entries are logged, counted in the [`ScanSummary`], and left
//! out; they never abort the scan.
//!
//! # Example
//!
//! ```no_run
//! use dupefinder::duplicates::{DuplicateFinder, FinderConfig};
//! use dupefinder::scanner::FingerprintMode;
//! use std::path::Path;
//!
//! let config = FinderConfig::default()
//!     .with_mode(FingerprintMode::Fuzzy)
//!     .with_threshold(10);
//! let finder = DuplicateFinder::new(config);
//!
//! let (groups, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//! println!("{} groups, {} reclaimable", groups.len(), summary.reclaimable_display());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;

use super::similarity::{group_by_similarity, ClusterStrategy, SimilarityConfig, DEFAULT_THRESHOLD};
use super::{group_by_key, DuplicateGroup};
use crate::progress::ProgressCallback;
use crate::scanner::{
    FileRecord, FingerprintError, FingerprintMode, Fingerprinter, ScanError, ScannedFile, Walker,
    WalkerConfig,
};

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// How comparison keys are computed.
    pub mode: FingerprintMode,
    /// Edit-distance threshold for fuzzy mode.
    pub threshold: usize,
    /// Clustering strategy for fuzzy mode.
    pub strategy: ClusterStrategy,
    /// Number of I/O threads for parallel fingerprinting.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("mode", &self.mode)
            .field("threshold", &self.threshold)
            .field("strategy", &self.strategy)
            .field("io_threads", &self.io_threads)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            mode: FingerprintMode::Exact,
            threshold: DEFAULT_THRESHOLD,
            strategy: ClusterStrategy::Anchor,
            io_threads: 4,
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the fingerprint mode.
    #[must_use]
    pub fn with_mode(mut self, mode: FingerprintMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the edit-distance threshold used in fuzzy mode.
    #[must_use]
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the clustering strategy used in fuzzy mode.
    #[must_use]
    pub fn with_strategy(mut self, strategy: ClusterStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the I/O thread count (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Number of files fingerprinted successfully
    pub total_files: usize,
    /// Total size of those files in bytes
    pub total_size: u64,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Number of files beyond the first in each group
    pub duplicate_files: usize,
    /// Bytes that removing every non-first member would free
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Whether the scan was interrupted
    pub interrupted: bool,
    /// Entries the walker could not read
    pub scan_errors: Vec<ScanError>,
    /// Files that could not be fingerprinted
    pub fingerprint_errors: Vec<FingerprintError>,
}

impl ScanSummary {
    /// Number of per-item errors of either kind.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.scan_errors.len() + self.fingerprint_errors.len()
    }

    /// Percentage of scanned bytes held by duplicates.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize(self.total_size).to_string()
    }
}

/// Everything one scan produces: groups, the records they came from, and
/// the summary. The records feed the category classifier.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Duplicate or similar groups (2+ members each)
    pub groups: Vec<DuplicateGroup>,
    /// Every successfully fingerprinted file, in walk order
    pub records: Vec<FileRecord>,
    /// Scan statistics
    pub summary: ScanSummary,
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// No directory was given.
    #[error("No directory path provided")]
    EmptyPath,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred during scanning.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Duplicate finder that orchestrates walk, fingerprint and grouping.
pub struct DuplicateFinder {
    config: FinderConfig,
    fingerprinter: Fingerprinter,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut fingerprinter = Fingerprinter::new(config.mode);
        if let Some(ref flag) = config.shutdown_flag {
            fingerprinter = fingerprinter.with_shutdown_flag(flag.clone());
        }
        Self {
            config,
            fingerprinter,
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The configuration this finder runs with.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find duplicate groups under `path`.
    ///
    /// # Errors
    ///
    /// See [`DuplicateFinder::scan`].
    pub fn find_duplicates(
        &self,
        path: &Path,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let result = self.scan(path)?;
        Ok((result.groups, result.summary))
    }

    /// Run the full pipeline and keep the fingerprinted records.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path is empty, does not exist, or is not a directory
    /// - The scan is interrupted by shutdown signal
    pub fn scan(&self, path: &Path) -> Result<ScanResult, FinderError> {
        let start_time = Instant::now();
        validate_root(path)?;

        log::info!(
            "Starting {} scan of {}",
            self.config.mode,
            path.display()
        );

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let mut summary = ScanSummary::default();

        let files = self.walk(path, &mut summary);
        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let records = self.fingerprint_all(files, &mut summary);
        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        summary.total_files = records.len();
        summary.total_size = records.iter().map(|r| r.size_bytes).sum();

        let groups = self.group_records(&records)?;

        summary.duplicate_groups = groups.len();
        summary.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        summary.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} groups, {} duplicate files, {} reclaimable, {} errors",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display(),
            summary.error_count()
        );

        Ok(ScanResult {
            groups,
            records,
            summary,
        })
    }

    /// Group already fingerprinted records according to the configured mode.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Interrupted`] if clustering was stopped.
    pub fn group_records(
        &self,
        records: &[FileRecord],
    ) -> Result<Vec<DuplicateGroup>, FinderError> {
        match self.config.mode {
            FingerprintMode::Exact => {
                let (groups, _) = group_by_key(records);
                Ok(groups)
            }
            FingerprintMode::Fuzzy => {
                let mut config = SimilarityConfig::new(self.config.threshold)
                    .with_strategy(self.config.strategy);
                if let Some(ref flag) = self.config.shutdown_flag {
                    config = config.with_shutdown_flag(flag.clone());
                }
                if let Some(ref callback) = self.config.progress_callback {
                    config = config.with_progress_callback(callback.clone());
                }

                let (groups, stats) = group_by_similarity(records, &config);
                if stats.interrupted {
                    return Err(FinderError::Interrupted);
                }
                Ok(groups)
            }
        }
    }

    fn walk(&self, path: &Path, summary: &mut ScanSummary) -> Vec<ScannedFile> {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("walking", 0);
            callback.on_message(&format!("Walking {}", path.display()));
        }

        let mut walker = Walker::new(path, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }

        let mut files = Vec::new();
        for result in walker.walk() {
            match result {
                Ok(file) => {
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(files.len() + 1, &file.path.to_string_lossy());
                    }
                    files.push(file);
                }
                Err(e) => summary.scan_errors.push(e),
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("walking");
        }

        log::info!("Found {} files under {}", files.len(), path.display());
        files
    }

    fn fingerprint_all(
        &self,
        files: Vec<ScannedFile>,
        summary: &mut ScanSummary,
    ) -> Vec<FileRecord> {
        if files.is_empty() {
            return Vec::new();
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("fingerprint", files.len());
        }
        log::info!(
            "Fingerprinting {} files on {} threads",
            files.len(),
            self.config.io_threads
        );

        let completed = AtomicUsize::new(0);
        let work = || -> Vec<Result<FileRecord, FingerprintError>> {
            files
                .par_iter()
                .map(|file| {
                    if self.config.is_shutdown_requested() {
                        return Err(FingerprintError::Interrupted(file.path.clone()));
                    }
                    let result = self.fingerprinter.fingerprint(file);
                    if let Some(ref callback) = self.config.progress_callback {
                        let current = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        callback.on_progress(current, &file.path.to_string_lossy());
                        callback.on_item_completed(file.size);
                    }
                    result
                })
                .collect()
        };

        let results = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.io_threads)
            .build()
        {
            Ok(pool) => pool.install(work),
            Err(e) => {
                log::warn!(
                    "Failed to create I/O thread pool ({}), using global pool with {} threads",
                    e,
                    rayon::current_num_threads()
                );
                work()
            }
        };

        let mut records = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(record) => records.push(record),
                Err(FingerprintError::Interrupted(_)) => summary.interrupted = true,
                Err(e) => {
                    log::warn!("Failed to fingerprint: {}", e);
                    summary.fingerprint_errors.push(e);
                }
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("fingerprint");
        }

        records
    }
}

/// Reject roots that cannot be scanned before any work starts.
fn validate_root(path: &Path) -> Result<(), FinderError> {
    if path.as_os_str().is_empty() {
        return Err(FinderError::EmptyPath);
    }
    if !path.exists() {
        return Err(FinderError::PathNotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(FinderError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}
