//! CSV output for scan reports.
//!
//! One row per grouped file.
//!
//! # Columns
//!
//! - `group_id`: 1-based group number
//! - `kind`: `exact` or `similar`
//! - `hash`: SHA-256 hex digest (empty for similar groups)
//! - `path`: file path
//! - `size`: size in bytes
//! - `category`: category assigned by the rules, empty when none matched
//! - `modified`: last modified time (RFC 3339), or `unknown`

use std::collections::HashMap;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use super::ScanReport;
use crate::duplicates::{DuplicateGroup, GroupKind};
use crate::rules::CategoryMap;

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    group_id: usize,
    kind: GroupKind,
    hash: &'a str,
    path: String,
    size: u64,
    category: &'a str,
    modified: String,
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    groups: &'a [DuplicateGroup],
    categories: HashMap<&'a str, &'a str>,
}

impl<'a> CsvOutput<'a> {
    /// Create a formatter over a report's groups and categories.
    #[must_use]
    pub fn new(report: &'a ScanReport) -> Self {
        Self {
            groups: &report.groups,
            categories: category_index(&report.categories),
        }
    }

    /// Write the CSV output to the given writer.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        for (idx, group) in self.groups.iter().enumerate() {
            let hash = match group.kind {
                GroupKind::Exact => group.key.as_str(),
                GroupKind::Similar => "",
            };

            for file in &group.files {
                let path = file.path_string();
                let category = self.categories.get(path.as_str()).copied().unwrap_or("");
                csv_writer.serialize(CsvRow {
                    group_id: idx + 1,
                    kind: group.kind,
                    hash,
                    category,
                    size: file.size_bytes,
                    modified: modified_time(&file.path),
                    path,
                })?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Render to a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

/// Path → category, inverted from the category map.
fn category_index(categories: &CategoryMap) -> HashMap<&str, &str> {
    categories
        .iter()
        .flat_map(|(name, paths)| paths.iter().map(move |p| (p.as_str(), name.as_str())))
        .collect()
}

fn modified_time(path: &Path) -> String {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(|m| DateTime::<Utc>::from(m).to_rfc3339())
        .unwrap_or_else(|_| "unknown".to_string())
}
