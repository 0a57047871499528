//! Containment-checked file deletion.
//!
//! # Overview
//!
//! [`delete_within`] removes a batch of files that must all lie inside a
//! caller-supplied base directory:
//!
//! - The base and every target are made absolute and lexically normalized
//!   (see [`crate::scanner::path_utils`]) before comparison, so `..`
//!   segments cannot escape the base.
//! - Targets outside the base, missing targets, and non-regular files are
//!   rejected per entry; the rest of the batch still runs.
//! - Files are removed permanently or moved to the system trash, depending
//!   on [`DeleteConfig`].
//!
//! # Example
//!
//! ```no_run
//! use dupefinder::actions::delete::{delete_within, DeleteConfig};
//! use std::path::{Path, PathBuf};
//!
//! let result = delete_within(
//!     Path::new("/data/scans"),
//!     &[PathBuf::from("/data/scans/a/b.txt"), PathBuf::from("/etc/passwd")],
//!     &DeleteConfig::trash(),
//! )
//! .unwrap();
//!
//! println!("{}", result.summary());
//! for (path, reason) in &result.failures {
//!     eprintln!("{} ({})", path.display(), reason);
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::scanner::path_utils::{
    absolute_lexical, absolute_normalized, normalize_pathbuf, starts_with_component_wise,
};

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// No base directory was given.
    #[error("Invalid request: a base path is required")]
    EmptyBasePath,

    /// The target list was empty.
    #[error("Invalid request: at least one file to delete is required")]
    NoTargets,

    /// The base directory could not be resolved.
    #[error("Invalid base path {path}: {source}")]
    InvalidBase {
        /// Base path as given
        path: PathBuf,
        /// Resolution failure
        #[source]
        source: io::Error,
    },

    /// The target lies outside the base directory.
    #[error("Security error: Path is outside the allowed directory")]
    OutsideBase(PathBuf),

    /// The target does not exist or is not a regular file.
    #[error("File not found or is a directory")]
    NotARegularFile(PathBuf),

    /// The target could not be resolved to an absolute path.
    #[error("Invalid path format")]
    InvalidPath(PathBuf),

    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// Permanent delete operation failed.
    #[error("permanent delete failed for {path}: {message}")]
    PermanentDeleteFailed { path: PathBuf, message: String },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error (if any).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::OutsideBase(p)
            | Self::NotARegularFile(p)
            | Self::InvalidPath(p)
            | Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::InvalidBase { path: p, .. }
            | Self::TrashFailed { path: p, .. }
            | Self::PermanentDeleteFailed { path: p, .. }
            | Self::Io { path: p, .. } => Some(p),
            Self::EmptyBasePath | Self::NoTargets => None,
        }
    }

    /// Reason string reported for a failed batch entry.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::OutsideBase(_) | Self::NotARegularFile(_) | Self::InvalidPath(_) => {
                self.to_string()
            }
            _ => format!("Error: {self}"),
        }
    }

    fn from_io(path: &Path, e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: e,
            },
        }
    }
}

/// Result of a successful deletion operation.
#[derive(Debug, Clone)]
pub struct DeleteResult {
    /// Path that was deleted, as given by the caller.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// Whether deletion was permanent (true) or to trash (false).
    pub permanent: bool,
}

impl DeleteResult {
    /// Create a new delete result.
    #[must_use]
    pub fn new(path: PathBuf, size: u64, permanent: bool) -> Self {
        Self {
            path,
            size,
            permanent,
        }
    }
}

/// Results of a batch deletion operation.
#[derive(Debug, Clone, Default)]
pub struct BatchDeleteResult {
    /// Successfully deleted files.
    pub successes: Vec<DeleteResult>,
    /// Failed deletions with their reasons.
    pub failures: Vec<(PathBuf, String)>,
    /// Total bytes freed.
    pub bytes_freed: u64,
}

impl BatchDeleteResult {
    /// Number of successful deletions.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Total number of attempted deletions.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// Check if all deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Paths that were deleted.
    #[must_use]
    pub fn deleted_paths(&self) -> Vec<PathBuf> {
        self.successes.iter().map(|s| s.path.clone()).collect()
    }

    /// Failures rendered as `path (reason)`.
    #[must_use]
    pub fn failure_lines(&self) -> Vec<String> {
        self.failures
            .iter()
            .map(|(path, reason)| format!("{} ({})", path.display(), reason))
            .collect()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.all_succeeded() {
            format!(
                "Deleted {} file(s), freed {}",
                self.success_count(),
                bytesize::ByteSize(self.bytes_freed)
            )
        } else {
            format!(
                "Deleted {} file(s), {} failed, freed {}",
                self.success_count(),
                self.failure_count(),
                bytesize::ByteSize(self.bytes_freed)
            )
        }
    }
}

/// Configuration for deletion operations.
///
/// The default deletes permanently; use [`DeleteConfig::trash`] for
/// recoverable deletion.
#[derive(Debug, Clone)]
pub struct DeleteConfig {
    /// Use permanent deletion instead of trash.
    pub permanent: bool,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self::permanent()
    }
}

impl DeleteConfig {
    /// Create config for trash deletion.
    #[must_use]
    pub fn trash() -> Self {
        Self { permanent: false }
    }

    /// Create config for permanent deletion.
    #[must_use]
    pub fn permanent() -> Self {
        Self { permanent: true }
    }
}

/// Delete a single file to the system trash.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if its metadata cannot be read
/// - `TrashFailed` if the trash operation fails
pub fn delete_to_trash(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_io(path, e))?
        .len();

    trash::delete(path).map_err(|e| {
        log::error!("Trash operation failed for {}: {}", path.display(), e);
        DeleteError::TrashFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Moved to trash: {} ({} bytes)", path.display(), size);
    Ok(DeleteResult::new(path.to_path_buf(), size, false))
}

/// Permanently delete a single file.
///
/// **WARNING**: This operation cannot be undone.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if its metadata cannot be read
/// - `PermanentDeleteFailed` if the delete operation fails
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_io(path, e))?
        .len();

    fs::remove_file(path).map_err(|e| {
        log::error!("Permanent delete failed for {}: {}", path.display(), e);
        DeleteError::PermanentDeleteFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Permanently deleted: {} ({} bytes)", path.display(), size);
    Ok(DeleteResult::new(path.to_path_buf(), size, true))
}

/// Delete `targets`, each of which must lie inside `base`.
///
/// Every target is handled independently. A rejected or failed target is
/// recorded in [`BatchDeleteResult::failures`] with its reason:
///
/// - `Security error: Path is outside the allowed directory`
/// - `File not found or is a directory`
/// - `Error: ...` for I/O failures
///
/// # Errors
///
/// Fails as a whole only when the request itself is unusable: an empty
/// base, no targets, or a base that cannot be resolved.
pub fn delete_within<P: AsRef<Path>>(
    base: &Path,
    targets: &[P],
    config: &DeleteConfig,
) -> Result<BatchDeleteResult, DeleteError> {
    if base.as_os_str().is_empty() {
        return Err(DeleteError::EmptyBasePath);
    }
    if targets.is_empty() {
        return Err(DeleteError::NoTargets);
    }

    let safe_base = absolute_normalized(base).map_err(|source| DeleteError::InvalidBase {
        path: base.to_path_buf(),
        source,
    })?;
    log::debug!("Deleting {} file(s) within {}", targets.len(), safe_base.display());

    let mut result = BatchDeleteResult::default();

    for target in targets {
        let target = target.as_ref();
        match delete_contained(&safe_base, target, config) {
            Ok(size) => {
                result.bytes_freed += size;
                result
                    .successes
                    .push(DeleteResult::new(target.to_path_buf(), size, config.permanent));
            }
            Err(e) => {
                let reason = e.reason();
                log::warn!("Failed to delete {}: {}", target.display(), reason);
                result.failures.push((target.to_path_buf(), reason));
            }
        }
    }

    log::info!("{}", result.summary());
    Ok(result)
}

/// Resolve, check, and delete one target. Returns the bytes freed.
fn delete_contained(
    safe_base: &Path,
    target: &Path,
    config: &DeleteConfig,
) -> Result<u64, DeleteError> {
    let resolved =
        absolute_lexical(target).map_err(|_| DeleteError::InvalidPath(target.to_path_buf()))?;

    // NFC only for the containment test; the filesystem gets the bytes as given.
    if !starts_with_component_wise(&normalize_pathbuf(&resolved), safe_base) {
        return Err(DeleteError::OutsideBase(target.to_path_buf()));
    }

    match fs::metadata(&resolved) {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => return Err(DeleteError::NotARegularFile(target.to_path_buf())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(DeleteError::NotARegularFile(target.to_path_buf()))
        }
        Err(e) => return Err(DeleteError::from_io(&resolved, e)),
    }

    let deleted = if config.permanent {
        permanent_delete(&resolved)?
    } else {
        delete_to_trash(&resolved)?
    };
    Ok(deleted.size)
}
