//! Duplicate groups and exact-key grouping.
//!
//! # Overview
//!
//! A [`DuplicateGroup`] is an ordered list of [`FileRecord`]s that were
//! found to share content. Exact groups share a full comparison key;
//! similar groups are built by [`super::similarity`] around an anchor.
//!
//! Groups of one file are never produced.
//!
//! # Example
//!
//! ```
//! use dupefinder::scanner::FileRecord;
//! use dupefinder::duplicates::group_by_key;
//! use std::path::PathBuf;
//!
//! let records = vec![
//!     FileRecord::new(PathBuf::from("/a.txt"), "k1".into(), 10, 2),
//!     FileRecord::new(PathBuf::from("/b.txt"), "k1".into(), 10, 2),
//!     FileRecord::new(PathBuf::from("/c.txt"), "k2".into(), 20, 2),
//! ];
//!
//! let (groups, stats) = group_by_key(&records);
//!
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].len(), 2);
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.eliminated_unique, 1);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::scanner::FileRecord;

/// How the members of a group were matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    /// All members have the same comparison key
    Exact,
    /// Every member is within the edit-distance threshold of the anchor
    Similar,
}

impl std::fmt::Display for GroupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Similar => write!(f, "similar"),
        }
    }
}

/// Confirmed group of duplicate or near-duplicate files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// How the members were matched
    pub kind: GroupKind,
    /// Shared key for exact groups, the anchor's key for similar groups
    pub key: String,
    /// Members in scan order; the anchor comes first in similar groups
    pub files: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Create an exact-match group.
    #[must_use]
    pub fn exact(key: String, files: Vec<FileRecord>) -> Self {
        Self {
            kind: GroupKind::Exact,
            key,
            files,
        }
    }

    /// Create a similarity group; the first file is the anchor.
    #[must_use]
    pub fn similar(files: Vec<FileRecord>) -> Self {
        let key = files
            .first()
            .map(|f| f.comparison_key().to_string())
            .unwrap_or_default();
        Self {
            kind: GroupKind::Similar,
            key,
            files,
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size_bytes).sum()
    }

    /// Total wasted space (all copies minus the first).
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        if self.files.len() > 1 {
            self.total_size().saturating_sub(self.files[0].size_bytes)
        } else {
            0
        }
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Get just the paths of files in this group.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}

/// Statistics from exact grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of records processed
    pub total_files: usize,
    /// Total size of all records in bytes
    pub total_size: u64,
    /// Number of distinct comparison keys
    pub unique_keys: usize,
    /// Number of records eliminated as unique (singleton keys)
    pub eliminated_unique: usize,
    /// Number of groups with 2+ records
    pub duplicate_groups: usize,
    /// Number of records that landed in a group
    pub grouped_files: usize,
}

impl GroupingStats {
    /// Percentage of records eliminated as unique.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group records by exact equality of their comparison key.
///
/// Only keys shared by two or more records produce a group. The full key is
/// compared; nothing is truncated. Members keep their input order and groups
/// come out in order of first occurrence, though callers should not rely on
/// the order of groups.
#[must_use]
pub fn group_by_key(records: &[FileRecord]) -> (Vec<DuplicateGroup>, GroupingStats) {
    let mut stats = GroupingStats::default();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut buckets: Vec<Vec<&FileRecord>> = Vec::new();

    for record in records {
        stats.total_files += 1;
        stats.total_size += record.size_bytes;

        let slot = *index.entry(record.comparison_key()).or_insert_with(|| {
            buckets.push(Vec::new());
            buckets.len() - 1
        });
        buckets[slot].push(record);
    }

    stats.unique_keys = buckets.len();

    let mut groups = Vec::new();
    for bucket in buckets {
        if bucket.len() < 2 {
            stats.eliminated_unique += bucket.len();
            continue;
        }
        stats.duplicate_groups += 1;
        stats.grouped_files += bucket.len();

        let key = bucket[0].comparison_key().to_string();
        log::debug!("Exact group {}: {} files", key, bucket.len());
        groups.push(DuplicateGroup::exact(
            key,
            bucket.into_iter().cloned().collect(),
        ));
    }

    log::info!(
        "Exact grouping complete: {} files → {} groups ({:.1}% unique)",
        stats.total_files,
        stats.duplicate_groups,
        stats.elimination_rate()
    );

    (groups, stats)
}
