//! JSON output for scan reports.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "generated_at": "2024-05-01T12:00:00+00:00",
//!   "duplicates": [
//!     {
//!       "kind": "exact",
//!       "hash": "9f86d081...",
//!       "wasted_space": 1024,
//!       "files": [
//!         { "path": "/data/a.txt", "size": 1024 },
//!         { "path": "/data/b.txt", "size": 1024 }
//!       ]
//!     }
//!   ],
//!   "categorized_files": { "Images": ["/data/photo.jpg"] },
//!   "empty_folders": ["/data/old"],
//!   "errors": ["Permission denied: /data/locked"],
//!   "summary": {
//!     "total_files": 100,
//!     "total_size": 1048576,
//!     "duplicate_groups": 5,
//!     "duplicate_files": 10,
//!     "reclaimable_space": 51200,
//!     "error_count": 1,
//!     "scan_duration_ms": 1234,
//!     "interrupted": false,
//!     "exit_code": 3,
//!     "exit_code_name": "DF003"
//!   }
//! }
//! ```
//!
//! `hash` is present for exact groups only. Similar groups are keyed by
//! file content, which is not repeated in the output.

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;

use super::ScanReport;
use crate::duplicates::{DuplicateGroup, GroupKind, ScanSummary};
use crate::error::ExitCode;

/// One file inside a JSON duplicate group.
#[derive(Debug, Clone, Serialize)]
pub struct JsonFile {
    /// Path as scanned
    pub path: String,
    /// Size in bytes
    pub size: u64,
}

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// `exact` or `similar`
    pub kind: GroupKind,
    /// SHA-256 hex digest shared by every member (exact groups only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// Bytes held by members beyond the first
    pub wasted_space: u64,
    /// Members in group order
    pub files: Vec<JsonFile>,
}

impl JsonDuplicateGroup {
    /// Convert a [`DuplicateGroup`].
    #[must_use]
    pub fn from_duplicate_group(group: &DuplicateGroup) -> Self {
        Self {
            kind: group.kind,
            hash: (group.kind == GroupKind::Exact).then(|| group.key.clone()),
            wasted_space: group.wasted_space(),
            files: group
                .files
                .iter()
                .map(|f| JsonFile {
                    path: f.path_string(),
                    size: f.size_bytes,
                })
                .collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Number of files fingerprinted
    pub total_files: usize,
    /// Total size of those files in bytes
    pub total_size: u64,
    /// Number of groups
    pub duplicate_groups: usize,
    /// Files beyond the first in each group
    pub duplicate_files: usize,
    /// Bytes freed by removing every non-first member
    pub reclaimable_space: u64,
    /// Entries that could not be scanned or read
    pub error_count: usize,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// Whether the scan was interrupted
    pub interrupted: bool,
    /// Process exit status for this report
    pub exit_code: i32,
    /// Machine-readable exit code, e.g. `DF000`
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a [`ScanSummary`] and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            total_size: summary.total_size,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            error_count: summary.error_count(),
            scan_duration_ms: u64::try_from(summary.scan_duration.as_millis()).unwrap_or(u64::MAX),
            interrupted: summary.interrupted,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// RFC 3339 generation time
    pub generated_at: String,
    /// Duplicate groups
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Category label → paths, labels sorted
    pub categorized_files: BTreeMap<String, Vec<String>>,
    /// Directories with no entries
    pub empty_folders: Vec<String>,
    /// Per-entry errors met during the scan
    pub errors: Vec<String>,
    /// Scan statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the JSON view of a report.
    ///
    /// ```
    /// use dupefinder::duplicates::ScanSummary;
    /// use dupefinder::output::{json::JsonOutput, ScanReport};
    ///
    /// let report = ScanReport::new(Vec::new(), ScanSummary::default());
    /// let output = JsonOutput::new(&report);
    /// assert!(output.duplicates.is_empty());
    /// assert_eq!(output.summary.exit_code_name, "DF002");
    /// ```
    #[must_use]
    pub fn new(report: &ScanReport) -> Self {
        let summary = &report.summary;
        let errors = summary
            .scan_errors
            .iter()
            .map(ToString::to_string)
            .chain(summary.fingerprint_errors.iter().map(ToString::to_string))
            .collect();

        Self {
            generated_at: report.generated_at.to_rfc3339(),
            duplicates: report
                .groups
                .iter()
                .map(JsonDuplicateGroup::from_duplicate_group)
                .collect(),
            categorized_files: report
                .categories
                .iter()
                .map(|(name, paths)| (name.clone(), paths.clone()))
                .collect(),
            empty_folders: report
                .empty_folders
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
            errors,
            summary: JsonSummary::from_scan_summary(summary, report.exit_code()),
        }
    }

    /// Serialize to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
