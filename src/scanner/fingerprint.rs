//! Content fingerprinting for discovered files.
//!
//! # Overview
//!
//! A fingerprint is the *comparison key* the groupers work on. Two modes
//! are supported:
//!
//! - [`FingerprintMode::Exact`]: the file is streamed through SHA-256 and
//!   the key is the 64-character lowercase hex digest.
//! - [`FingerprintMode::Fuzzy`]: the whole file is decoded as UTF-8 (lossy)
//!   and the decoded text itself is the key. Memory use is proportional to
//!   file size; this mode is meant for small text files.
//!
//! # Example
//!
//! ```no_run
//! use dupefinder::scanner::{Fingerprinter, FingerprintMode, ScannedFile};
//! use std::path::PathBuf;
//!
//! let fingerprinter = Fingerprinter::new(FingerprintMode::Exact);
//! let file = ScannedFile::new(PathBuf::from("notes.txt"), 12);
//! let record = fingerprinter.fingerprint(&file).unwrap();
//! assert_eq!(record.comparison_key().len(), 64);
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{FileRecord, FingerprintError, ScannedFile};

/// Length of a hex-encoded SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Fuzzy-mode files above this size are logged as a memory hazard.
pub const FUZZY_WARN_BYTES: u64 = 1024 * 1024;

/// Read buffer for streaming digests.
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// How the comparison key of a file is computed.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintMode {
    /// SHA-256 content digest; groups byte-identical files
    #[default]
    Exact,
    /// Full decoded file content; groups files by edit distance
    Fuzzy,
}

impl std::fmt::Display for FingerprintMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Fuzzy => write!(f, "fuzzy"),
        }
    }
}

/// Computes [`FileRecord`]s from scanned files.
#[derive(Debug, Clone)]
pub struct Fingerprinter {
    mode: FingerprintMode,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Fingerprinter {
    /// Create a fingerprinter for the given mode.
    #[must_use]
    pub fn new(mode: FingerprintMode) -> Self {
        Self {
            mode,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag; a streaming digest stops at the next buffer.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// The configured mode.
    #[must_use]
    pub fn mode(&self) -> FingerprintMode {
        self.mode
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Fingerprint one scanned file.
    ///
    /// # Errors
    ///
    /// Returns [`FingerprintError`] if the file cannot be opened or read.
    /// Callers treat this as a per-file failure and continue with the rest.
    pub fn fingerprint(&self, file: &ScannedFile) -> Result<FileRecord, FingerprintError> {
        match self.mode {
            FingerprintMode::Exact => {
                let digest = self.digest_file(&file.path)?;
                let key_length = digest.len();
                Ok(FileRecord::new(
                    file.path.clone(),
                    digest,
                    file.size,
                    key_length,
                ))
            }
            FingerprintMode::Fuzzy => {
                if file.size > FUZZY_WARN_BYTES {
                    log::warn!(
                        "Loading {} bytes into memory for fuzzy comparison: {}",
                        file.size,
                        file.path.display()
                    );
                }
                let (content, size) = self.read_content(&file.path)?;
                Ok(FileRecord::new(file.path.clone(), content, size, 0))
            }
        }
    }

    /// Stream a file through SHA-256 and return the lowercase hex digest.
    ///
    /// # Errors
    ///
    /// Returns [`FingerprintError`] on I/O failure or shutdown.
    pub fn digest_file(&self, path: &Path) -> Result<String, FingerprintError> {
        let file = File::open(path).map_err(|e| FingerprintError::from_io(path, e))?;
        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; READ_BUFFER_SIZE];

        loop {
            if self.is_shutdown_requested() {
                return Err(FingerprintError::Interrupted(path.to_path_buf()));
            }
            let n = reader
                .read(&mut buffer)
                .map_err(|e| FingerprintError::from_io(path, e))?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }

        let digest = format!("{:x}", hasher.finalize());
        log::trace!("Digest {} for {}", digest, path.display());
        Ok(digest)
    }

    /// Read a whole file and decode it as UTF-8, replacing invalid sequences.
    ///
    /// Returns the decoded text and the number of bytes read.
    ///
    /// # Errors
    ///
    /// Returns [`FingerprintError`] on I/O failure.
    pub fn read_content(&self, path: &Path) -> Result<(String, u64), FingerprintError> {
        let bytes = std::fs::read(path).map_err(|e| FingerprintError::from_io(path, e))?;
        let size = bytes.len() as u64;
        let content = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        };
        Ok((content, size))
    }
}

/// SHA-256 of an in-memory buffer as lowercase hex.
#[must_use]
pub fn digest_bytes(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}
