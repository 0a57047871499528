//! Edit-distance clustering for near-duplicate detection.
//!
//! # Overview
//!
//! In fuzzy mode every record's comparison key is the decoded file text.
//! Records are clustered by Levenshtein distance against a threshold `T`.
//!
//! Two strategies are available:
//!
//! - [`ClusterStrategy::Anchor`] (default): greedy clustering around an
//!   anchor. Records are visited in scan order; each ungrouped record opens a
//!   candidate group and pulls in every later ungrouped record within `T` of
//!   *the anchor*. Membership is never checked between non-anchor members, so
//!   two members of one group can be further than `T` apart.
//! - [`ClusterStrategy::Linked`]: connected components of the graph whose
//!   edges join records within `T` of each other (single linkage via
//!   union-find). Groups are transitive closures and can be larger.
//!
//! Both strategies cost `O(n²)` distance computations in the worst case.
//! Pairs whose length difference already exceeds `T` are rejected without
//! running the distance, which never changes the result.
//!
//! # Example
//!
//! ```
//! use dupefinder::duplicates::{group_by_similarity, SimilarityConfig};
//! use dupefinder::scanner::FileRecord;
//! use std::path::PathBuf;
//!
//! let records = vec![
//!     FileRecord::new(PathBuf::from("/a.txt"), "hello world".into(), 11, 0),
//!     FileRecord::new(PathBuf::from("/b.txt"), "hello world!".into(), 12, 0),
//!     FileRecord::new(PathBuf::from("/c.txt"), "something else".into(), 14, 0),
//! ];
//!
//! let (groups, _) = group_by_similarity(&records, &SimilarityConfig::new(2));
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].len(), 2);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::DuplicateGroup;
use crate::progress::ProgressCallback;
use crate::scanner::FileRecord;

/// Default edit-distance threshold.
pub const DEFAULT_THRESHOLD: usize = 50;

/// How records within the threshold are merged into groups.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ClusterStrategy {
    /// Greedy groups built around the first ungrouped record
    #[default]
    Anchor,
    /// Connected components of the within-threshold graph
    Linked,
}

impl std::fmt::Display for ClusterStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anchor => write!(f, "anchor"),
            Self::Linked => write!(f, "linked"),
        }
    }
}

/// Levenshtein distance between two strings, counted in Unicode scalar values.
///
/// Uses two rolling rows sized by the shorter input.
///
/// # Example
///
/// ```
/// use dupefinder::duplicates::levenshtein;
///
/// assert_eq!(levenshtein("kitten", "sitting"), 3);
/// assert_eq!(levenshtein("", "abc"), 3);
/// assert_eq!(levenshtein("same", "same"), 0);
/// ```
#[must_use]
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    levenshtein_chars(&a, &b)
}

fn levenshtein_chars(a: &[char], b: &[char]) -> usize {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return long.len();
    }

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr = vec![0usize; short.len() + 1];

    for (i, lc) in long.iter().enumerate() {
        curr[0] = i + 1;
        for (j, sc) in short.iter().enumerate() {
            let cost = usize::from(lc != sc);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short.len()]
}

/// Configuration for similarity grouping.
#[derive(Clone, Default)]
pub struct SimilarityConfig {
    /// Maximum edit distance for two records to count as similar
    pub threshold: usize,
    /// Clustering strategy
    pub strategy: ClusterStrategy,
    /// Optional shutdown flag, checked between anchors
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for SimilarityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityConfig")
            .field("threshold", &self.threshold)
            .field("strategy", &self.strategy)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl SimilarityConfig {
    /// Anchor clustering with the given threshold.
    #[must_use]
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            ..Default::default()
        }
    }

    /// Set the clustering strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: ClusterStrategy) -> Self {
        self.strategy = strategy;
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

/// Statistics from similarity grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimilarityStats {
    /// Record pairs considered
    pub comparisons: usize,
    /// Pairs rejected on length difference alone
    pub skipped_by_length: usize,
    /// Groups emitted
    pub groups: usize,
    /// Records that landed in a group
    pub grouped_files: usize,
    /// Whether grouping stopped early on shutdown
    pub interrupted: bool,
}

/// Pairwise distance test with the length pre-check.
struct Matcher<'a> {
    keys: Vec<Vec<char>>,
    threshold: usize,
    stats: &'a mut SimilarityStats,
}

impl Matcher<'_> {
    fn within(&mut self, i: usize, j: usize) -> bool {
        self.stats.comparisons += 1;
        let (a, b) = (&self.keys[i], &self.keys[j]);
        if a.len().abs_diff(b.len()) > self.threshold {
            self.stats.skipped_by_length += 1;
            return false;
        }
        let distance = levenshtein_chars(a, b);
        log::trace!("distance({}, {}) = {}", i, j, distance);
        distance <= self.threshold
    }
}

/// Cluster records whose comparison keys are within the configured
/// edit-distance threshold.
///
/// Only groups of two or more records are returned. With
/// [`ClusterStrategy::Anchor`] the first member of each group is its
/// anchor and the rest follow in scan order.
///
/// If the shutdown flag is raised, grouping stops between anchors and the
/// stats report `interrupted`; the groups committed so far are returned.
#[must_use]
pub fn group_by_similarity(
    records: &[FileRecord],
    config: &SimilarityConfig,
) -> (Vec<DuplicateGroup>, SimilarityStats) {
    let mut stats = SimilarityStats::default();

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start("cluster", records.len());
    }

    log::info!(
        "Clustering {} files by edit distance (threshold {}, {} strategy)",
        records.len(),
        config.threshold,
        config.strategy
    );

    let keys = records
        .iter()
        .map(|r| r.comparison_key().chars().collect())
        .collect();
    let mut matcher = Matcher {
        keys,
        threshold: config.threshold,
        stats: &mut stats,
    };

    let member_sets = match config.strategy {
        ClusterStrategy::Anchor => anchor_clusters(records, config, &mut matcher),
        ClusterStrategy::Linked => linked_clusters(records, config, &mut matcher),
    };

    let groups: Vec<DuplicateGroup> = member_sets
        .into_iter()
        .map(|members| {
            DuplicateGroup::similar(members.into_iter().map(|i| records[i].clone()).collect())
        })
        .collect();

    stats.groups = groups.len();
    stats.grouped_files = groups.iter().map(DuplicateGroup::len).sum();

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end("cluster");
    }

    log::info!(
        "Clustering complete: {} groups, {} files, {} comparisons ({} skipped by length)",
        stats.groups,
        stats.grouped_files,
        stats.comparisons,
        stats.skipped_by_length
    );

    (groups, stats)
}

fn report_progress(config: &SimilarityConfig, index: usize, record: &FileRecord) {
    if let Some(ref callback) = config.progress_callback {
        callback.on_progress(index + 1, &record.path_string());
    }
}

fn anchor_clusters(
    records: &[FileRecord],
    config: &SimilarityConfig,
    matcher: &mut Matcher<'_>,
) -> Vec<Vec<usize>> {
    let n = records.len();
    let mut grouped = vec![false; n];
    let mut clusters = Vec::new();

    for i in 0..n {
        if config.is_shutdown_requested() {
            log::debug!("Clustering: shutdown requested at anchor {}", i);
            matcher.stats.interrupted = true;
            break;
        }
        report_progress(config, i, &records[i]);
        if grouped[i] {
            continue;
        }

        let mut members = vec![i];
        for j in (i + 1)..n {
            if !grouped[j] && matcher.within(i, j) {
                grouped[j] = true;
                members.push(j);
            }
        }

        if members.len() > 1 {
            grouped[i] = true;
            log::debug!(
                "Similar group anchored at {}: {} files",
                records[i].path.display(),
                members.len()
            );
            clusters.push(members);
        }
    }

    clusters
}

fn linked_clusters(
    records: &[FileRecord],
    config: &SimilarityConfig,
    matcher: &mut Matcher<'_>,
) -> Vec<Vec<usize>> {
    let n = records.len();
    let mut sets = DisjointSet::new(n);

    for i in 0..n {
        if config.is_shutdown_requested() {
            log::debug!("Clustering: shutdown requested at record {}", i);
            matcher.stats.interrupted = true;
            break;
        }
        report_progress(config, i, &records[i]);
        for j in (i + 1)..n {
            if sets.find(i) != sets.find(j) && matcher.within(i, j) {
                sets.union(i, j);
            }
        }
    }

    // Components ordered by their smallest member, members in scan order.
    let mut slot_of_root = vec![usize::MAX; n];
    let mut clusters: Vec<Vec<usize>> = Vec::new();
    for i in 0..n {
        let root = sets.find(i);
        if slot_of_root[root] == usize::MAX {
            slot_of_root[root] = clusters.len();
            clusters.push(Vec::new());
        }
        clusters[slot_of_root[root]].push(i);
    }
    clusters.retain(|members| members.len() > 1);
    clusters
}

/// Union-find with path halving and union by size.
struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }
}
