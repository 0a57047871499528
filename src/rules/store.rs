//! Shared rule list backed by a JSON document.
//!
//! [`RuleStore`] keeps the current rules behind `RwLock<Arc<Vec<_>>>`.
//! Readers clone the `Arc` and classify against that snapshot; [`RuleStore::save`]
//! writes the document first and then swaps in a new `Arc`, so a concurrent
//! classification sees either the old list or the new one, never a mix.
//! Writers are serialized, so the document always holds the list that was
//! swapped in last.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tempfile::NamedTempFile;

use super::{categorize, categorize_name, CategorizationRule, CategoryMap, RulesError};
use crate::scanner::FileRecord;

/// Thread-safe owner of the categorization rules.
#[derive(Debug)]
pub struct RuleStore {
    path: PathBuf,
    rules: RwLock<Arc<Vec<CategorizationRule>>>,
    writer: Mutex<()>,
}

impl RuleStore {
    /// Open the store and load the document at `path`.
    ///
    /// An absent or blank document yields an empty rule list.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::Parse`] if the document is malformed and
    /// [`RulesError::Io`] if it exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RulesError> {
        let path = path.into();
        let rules = read_rules(&path)?;
        log::info!(
            "Loaded {} categorization rule(s) from {}",
            rules.len(),
            path.display()
        );
        Ok(Self {
            path,
            rules: RwLock::new(Arc::new(rules)),
            writer: Mutex::new(()),
        })
    }

    /// Create a store with the given rules without touching the filesystem.
    #[must_use]
    pub fn with_rules(path: impl Into<PathBuf>, rules: Vec<CategorizationRule>) -> Self {
        Self {
            path: path.into(),
            rules: RwLock::new(Arc::new(rules)),
            writer: Mutex::new(()),
        }
    }

    /// Location of the rules document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the document and replace the in-memory list.
    ///
    /// # Errors
    ///
    /// Same as [`RuleStore::open`]; on error the current list is kept.
    pub fn load(&self) -> Result<Arc<Vec<CategorizationRule>>, RulesError> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let rules = Arc::new(read_rules(&self.path)?);
        self.replace(Arc::clone(&rules));
        Ok(rules)
    }

    /// Persist `rules` and make them current.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError`] if the document cannot be written; the
    /// in-memory list is then left unchanged.
    pub fn save(&self, rules: Vec<CategorizationRule>) -> Result<(), RulesError> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        write_rules(&self.path, &rules)?;
        log::info!(
            "Saved {} categorization rule(s) to {}",
            rules.len(),
            self.path.display()
        );
        self.replace(Arc::new(rules));
        Ok(())
    }

    /// Snapshot of the current rules.
    #[must_use]
    pub fn rules(&self) -> Arc<Vec<CategorizationRule>> {
        Arc::clone(&self.rules.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Categorize records against a snapshot of the current rules.
    #[must_use]
    pub fn classify(&self, records: &[FileRecord]) -> CategoryMap {
        categorize(&self.rules(), records)
    }

    /// Category of one file name under the current rules.
    #[must_use]
    pub fn categorize_file(&self, file_name: &str) -> Option<String> {
        categorize_name(&self.rules(), file_name).map(str::to_string)
    }

    fn replace(&self, rules: Arc<Vec<CategorizationRule>>) {
        *self.rules.write().unwrap_or_else(PoisonError::into_inner) = rules;
    }
}

/// Read a rules document.
///
/// A missing file, a zero-length file, or one holding only whitespace
/// yields an empty list.
///
/// # Errors
///
/// Returns [`RulesError::Io`] on read failure and [`RulesError::Parse`]
/// if the content is not a JSON array of rules.
pub fn read_rules(path: &Path) -> Result<Vec<CategorizationRule>, RulesError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!(
                "Rules document {} not found; using an empty rule list",
                path.display()
            );
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(RulesError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        log::warn!(
            "Rules document {} is empty; using an empty rule list",
            path.display()
        );
        return Ok(Vec::new());
    }

    serde_json::from_slice(&bytes).map_err(|source| RulesError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a rules document as pretty JSON.
///
/// The parent directory is created if needed. Content goes to a sibling
/// temporary file which is then renamed over `path`, so readers never see
/// a half-written document.
///
/// # Errors
///
/// Returns [`RulesError`] if serialization or any filesystem step fails.
pub fn write_rules(path: &Path, rules: &[CategorizationRule]) -> Result<(), RulesError> {
    let io_err = |source| RulesError::Io {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent).map_err(io_err)?;
            parent
        }
        None => Path::new("."),
    };

    let mut json = serde_json::to_vec_pretty(rules).map_err(RulesError::Serialize)?;
    json.push(b'\n');

    // A uniquely named temp file per write; dropped (and removed) on error.
    let mut tmp = NamedTempFile::new_in(parent).map_err(io_err)?;
    tmp.write_all(&json).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
