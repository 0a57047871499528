//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Exact grouping by comparison key ([`groups`])
//! - Edit-distance clustering of near duplicates ([`similarity`])
//! - The walk → fingerprint → group pipeline ([`finder`])

pub mod finder;
pub mod groups;
pub mod similarity;

pub use finder::{DuplicateFinder, FinderConfig, FinderError, ScanResult, ScanSummary};
pub use groups::{group_by_key, DuplicateGroup, GroupKind, GroupingStats};
pub use similarity::{
    group_by_similarity, levenshtein, ClusterStrategy, SimilarityConfig, SimilarityStats,
    DEFAULT_THRESHOLD,
};
