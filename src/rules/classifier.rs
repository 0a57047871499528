//! First-match keyword classification.
//!
//! File names and keywords are compared in lowercase NFC form, so a
//! decomposed name from macOS matches a composed keyword. Rules are tried in
//! list order and the first rule with a matching keyword wins. Files that
//! match no rule are left out of the [`CategoryMap`] entirely; there is no
//! catch-all category.

use std::collections::HashMap;

use super::CategorizationRule;
use crate::scanner::path_utils::normalize_path_str;
use crate::scanner::FileRecord;

/// Category label → paths of the files assigned to it, in input order.
pub type CategoryMap = HashMap<String, Vec<String>>;

/// Rules with keywords lowercased once, unusable entries dropped.
struct PreparedRules<'r> {
    rules: Vec<(&'r str, Vec<String>)>,
}

impl<'r> PreparedRules<'r> {
    fn new(rules: &'r [CategorizationRule]) -> Self {
        let rules = rules
            .iter()
            .filter(|rule| !rule.category.is_empty())
            .map(|rule| {
                let keywords = rule
                    .keywords
                    .iter()
                    .filter(|k| !k.is_empty())
                    .map(|k| normalize_path_str(k).to_lowercase())
                    .collect::<Vec<_>>();
                (rule.category.as_str(), keywords)
            })
            .filter(|(_, keywords)| !keywords.is_empty())
            .collect();
        Self { rules }
    }

    fn category_of(&self, file_name: &str) -> Option<&'r str> {
        let name = normalize_path_str(file_name).to_lowercase();
        self.rules.iter().find_map(|(category, keywords)| {
            keywords
                .iter()
                .any(|k| name.contains(k.as_str()))
                .then_some(*category)
        })
    }
}

/// Category of a single file name, or `None` when no rule matches.
///
/// # Example
///
/// ```
/// use dupefinder::rules::{categorize_name, CategorizationRule};
///
/// let rules = vec![
///     CategorizationRule::new("Images", ["jpg", "png"]),
///     CategorizationRule::new("Docs", ["jpg", "pdf"]),
/// ];
///
/// assert_eq!(categorize_name(&rules, "Photo.JPG"), Some("Images"));
/// assert_eq!(categorize_name(&rules, "report.pdf"), Some("Docs"));
/// assert_eq!(categorize_name(&rules, "notes.txt"), None);
/// ```
#[must_use]
pub fn categorize_name<'r>(rules: &'r [CategorizationRule], file_name: &str) -> Option<&'r str> {
    PreparedRules::new(rules).category_of(file_name)
}

/// Assign every record to at most one category.
#[must_use]
pub fn categorize(rules: &[CategorizationRule], records: &[FileRecord]) -> CategoryMap {
    let mut map = CategoryMap::new();

    if rules.is_empty() {
        log::warn!("No categorization rules loaded; categorization skipped");
        return map;
    }

    let prepared = PreparedRules::new(rules);
    if prepared.rules.len() < rules.len() {
        log::debug!(
            "Ignoring {} rule(s) with no category or keywords",
            rules.len() - prepared.rules.len()
        );
    }

    for record in records {
        match prepared.category_of(&record.file_name) {
            Some(category) => {
                log::debug!("'{}' categorized as '{}'", record.file_name, category);
                map.entry(category.to_string())
                    .or_default()
                    .push(record.path_string());
            }
            None => log::trace!("'{}' matched no rule", record.file_name),
        }
    }

    log::info!(
        "Categorization complete: {} categories, {} files",
        map.len(),
        map.values().map(Vec::len).sum::<usize>()
    );
    map
}
