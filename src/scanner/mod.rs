//! Scanner module for directory traversal and file fingerprinting.
//!
//! This module provides functionality for:
//! - Parallel directory walking using jwalk
//! - Content fingerprinting (SHA-256 digest or full decoded content)
//! - Empty directory discovery
//! - Path normalization and containment checks
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`fingerprint`]: Comparison-key computation for each discovered file
//! - [`empty_dirs`]: Directories with no entries
//! - [`path_utils`]: Absolute/lexical path normalization
//!
//! # Example
//!
//! ```no_run
//! use dupefinder::scanner::{Fingerprinter, FingerprintMode, Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! let fingerprinter = Fingerprinter::new(FingerprintMode::Exact);
//!
//! for entry in walker.walk() {
//!     match entry.map(|file| fingerprinter.fingerprint(&file)) {
//!         Ok(Ok(record)) => println!("{} {}", record.comparison_key(), record.path.display()),
//!         Ok(Err(e)) => eprintln!("Warning: {}", e),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod empty_dirs;
pub mod fingerprint;
pub mod path_utils;
pub mod walker;

use std::path::{Path, PathBuf};

// Re-export main types
pub use empty_dirs::find_empty_dirs;
pub use fingerprint::{
    digest_bytes, FingerprintMode, Fingerprinter, DIGEST_HEX_LEN, FUZZY_WARN_BYTES,
};
pub use walker::Walker;

/// A regular file discovered by the walker, before fingerprinting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// Path to the file as produced by the walk (rooted at the scan root)
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}

impl ScannedFile {
    /// Create a new ScannedFile.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self { path, size }
    }
}

/// A fingerprinted file, the unit consumed by the groupers and the classifier.
///
/// The comparison key is fixed at construction and only readable through
/// [`FileRecord::comparison_key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path to the file
    pub path: PathBuf,
    /// Base name of the file
    pub file_name: String,
    /// Size of the file content in bytes
    pub size_bytes: u64,
    /// Length of the comparison key (64 in exact mode, 0 in fuzzy mode)
    pub key_length: usize,
    comparison_key: String,
}

impl FileRecord {
    /// Create a new FileRecord.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the file
    /// * `comparison_key` - Digest (exact mode) or decoded content (fuzzy mode)
    /// * `size_bytes` - File size in bytes
    /// * `key_length` - Recorded key length (0 when the mode leaves it unset)
    #[must_use]
    pub fn new(path: PathBuf, comparison_key: String, size_bytes: u64, key_length: usize) -> Self {
        let file_name = file_name_of(&path);
        Self {
            path,
            file_name,
            size_bytes,
            key_length,
            comparison_key,
        }
    }

    /// The string compared by the duplicate and similarity groupers.
    #[must_use]
    pub fn comparison_key(&self) -> &str {
        &self.comparison_key
    }

    /// Path rendered as a string (lossy for non-UTF-8 paths).
    #[must_use]
    pub fn path_string(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

/// Base name of a path, falling back to the whole path when it has none.
fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Configuration for directory walking.
///
/// The default visits every regular file under the root.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Follow symbolic links during traversal.
    /// Warning: May cause infinite loops with symlink cycles.
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Glob patterns to ignore (gitignore-style).
    pub ignore_patterns: Vec<String>,
}

impl WalkerConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(follow_symlinks: bool, skip_hidden: bool, ignore_patterns: Vec<String>) -> Self {
        Self {
            follow_symlinks,
            skip_hidden,
            ignore_patterns,
        }
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while fingerprinting a file.
#[derive(thiserror::Error, Debug)]
pub enum FingerprintError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Reading stopped because shutdown was requested.
    #[error("Interrupted while reading: {0}")]
    Interrupted(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl FingerprintError {
    /// Classify an I/O error raised while reading `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_record_new() {
        let record = FileRecord::new(
            PathBuf::from("/test/photo.JPG"),
            "abc".to_string(),
            1024,
            3,
        );

        assert_eq!(record.path, PathBuf::from("/test/photo.JPG"));
        assert_eq!(record.file_name, "photo.JPG");
        assert_eq!(record.comparison_key(), "abc");
        assert_eq!(record.size_bytes, 1024);
        assert_eq!(record.key_length, 3);
    }

    #[test]
    fn test_file_record_name_fallback() {
        let record = FileRecord::new(PathBuf::from("/"), String::new(), 0, 0);
        assert_eq!(record.file_name, "/");
    }

    #[test]
    fn test_walker_config_default() {
        let config = WalkerConfig::default();

        assert!(!config.follow_symlinks);
        assert!(!config.skip_hidden);
        assert!(config.ignore_patterns.is_empty());
    }

    #[test]
    fn test_walker_config_new() {
        let config = WalkerConfig::new(true, true, vec!["*.tmp".to_string()]);

        assert!(config.follow_symlinks);
        assert!(config.skip_hidden);
        assert_eq!(config.ignore_patterns, vec!["*.tmp".to_string()]);
    }

    #[test]
    fn test_scan_error_display() {
        let err = ScanError::PermissionDenied(PathBuf::from("/test"));
        assert_eq!(err.to_string(), "Permission denied: /test");

        let err = ScanError::NotFound(PathBuf::from("/missing"));
        assert_eq!(err.to_string(), "Path not found: /missing");

        let err = ScanError::NotADirectory(PathBuf::from("/file.txt"));
        assert_eq!(err.to_string(), "Not a directory: /file.txt");
    }

    #[test]
    fn test_fingerprint_error_from_io() {
        let path = Path::new("/secret");
        let err = FingerprintError::from_io(
            path,
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "Permission denied: /secret");

        let err = FingerprintError::from_io(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.to_string(), "File not found: /secret");
    }
}
