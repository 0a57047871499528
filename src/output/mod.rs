//! Rendering of scan results.
//!
//! A [`ScanReport`] bundles everything one `scan` produces: duplicate
//! groups, the category map, empty folders and the summary. It is written
//! out by one of:
//!
//! - [`text::TextOutput`]: colored, human-readable listing
//! - [`json::JsonOutput`]: a single JSON document for automation
//! - [`csv::CsvOutput`]: one row per grouped file for spreadsheets
//!
//! # Example
//!
//! ```no_run
//! use dupefinder::duplicates::DuplicateFinder;
//! use dupefinder::output::{json::JsonOutput, ScanReport};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (groups, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! let report = ScanReport::new(groups, summary);
//! let output = JsonOutput::new(&report);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod csv;
pub mod json;
pub mod text;

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::duplicates::{DuplicateGroup, ScanSummary};
use crate::error::ExitCode;
use crate::rules::CategoryMap;

pub use self::csv::CsvOutput;
pub use self::json::JsonOutput;
pub use self::text::TextOutput;

/// Everything a scan produced, ready for rendering.
#[derive(Debug)]
pub struct ScanReport {
    /// Duplicate or near-duplicate groups
    pub groups: Vec<DuplicateGroup>,
    /// Category label → file paths
    pub categories: CategoryMap,
    /// Directories with no entries
    pub empty_folders: Vec<PathBuf>,
    /// Scan statistics
    pub summary: ScanSummary,
    /// When the report was produced
    pub generated_at: DateTime<Utc>,
}

impl ScanReport {
    /// Create a report with no categories or empty folders.
    #[must_use]
    pub fn new(groups: Vec<DuplicateGroup>, summary: ScanSummary) -> Self {
        Self {
            groups,
            categories: CategoryMap::new(),
            empty_folders: Vec::new(),
            summary,
            generated_at: Utc::now(),
        }
    }

    /// Attach the categorization result.
    #[must_use]
    pub fn with_categories(mut self, categories: CategoryMap) -> Self {
        self.categories = categories;
        self
    }

    /// Attach the empty folder list.
    #[must_use]
    pub fn with_empty_folders(mut self, folders: Vec<PathBuf>) -> Self {
        self.empty_folders = folders;
        self
    }

    /// Category names sorted for stable rendering.
    #[must_use]
    pub fn sorted_categories(&self) -> Vec<(&str, &[String])> {
        let mut categories: Vec<_> = self
            .categories
            .iter()
            .map(|(name, paths)| (name.as_str(), paths.as_slice()))
            .collect();
        categories.sort_by(|a, b| a.0.cmp(b.0));
        categories
    }

    /// Exit code this report maps to.
    ///
    /// Interruption wins over per-file errors, which win over the
    /// found/not-found distinction.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        if self.summary.interrupted {
            ExitCode::Interrupted
        } else if self.summary.error_count() > 0 {
            ExitCode::PartialSuccess
        } else if self.groups.is_empty() {
            ExitCode::NoDuplicates
        } else {
            ExitCode::Success
        }
    }
}
