//! Keyword categorization rules.
//!
//! A rule pairs a category label with keywords. A file belongs to the
//! first rule with a keyword contained in its lowercased file name.
//!
//! - [`classifier`]: the matching logic over a rule slice
//! - [`store`]: the shared rule list and its JSON document
//!
//! The document is an ordered JSON array:
//!
//! ```json
//! [
//!   { "category": "Images", "keywords": ["jpg", "png"] },
//!   { "category": "Docs", "keywords": ["pdf"] }
//! ]
//! ```

pub mod classifier;
pub mod store;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use classifier::{categorize, categorize_name, CategoryMap};
pub use store::{read_rules, write_rules, RuleStore};

/// One categorization rule.
///
/// Missing fields deserialize as empty. A rule with an empty category or
/// no usable keyword is kept as-is and never matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizationRule {
    /// Label assigned to matching files
    #[serde(default)]
    pub category: String,
    /// Substrings tested against the lowercased file name
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl CategorizationRule {
    /// Create a rule from a category and keywords.
    #[must_use]
    pub fn new<I, S>(category: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            category: category.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether this rule can ever match.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.category.is_empty() && self.keywords.iter().any(|k| !k.is_empty())
    }
}

/// Errors raised while reading or writing the rules document.
#[derive(thiserror::Error, Debug)]
pub enum RulesError {
    /// The document could not be read or written.
    #[error("Rules I/O error for {path}: {source}")]
    Io {
        /// Path of the rules document
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The document exists but is not a valid rule array.
    #[error("Malformed rules document {path}: {source}")]
    Parse {
        /// Path of the rules document
        path: PathBuf,
        /// The underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The rules could not be serialized.
    #[error("Failed to serialize rules: {0}")]
    Serialize(#[source] serde_json::Error),
}
