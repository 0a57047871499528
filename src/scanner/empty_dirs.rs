//! Empty directory discovery.
//!
//! Uses single-threaded `walkdir`; the per-directory `read_dir` probe
//! dominates and does not benefit from jwalk's parallel readers.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use walkdir::WalkDir;

use super::ScanError;

/// Find every directory under `root` that has no entries at all.
///
/// Only descendants are candidates: the root itself is never reported, even
/// when it is empty, so an empty root yields an empty list. Directories that
/// cannot be read are logged and skipped. Symbolic links are not followed.
///
/// # Errors
///
/// Returns [`ScanError::NotADirectory`] or [`ScanError::NotFound`] when the
/// root is unusable.
///
/// # Example
///
/// ```no_run
/// use dupefinder::scanner::find_empty_dirs;
/// use std::path::Path;
///
/// for dir in find_empty_dirs(Path::new("."), None).unwrap() {
///     println!("{}", dir.display());
/// }
/// ```
pub fn find_empty_dirs(
    root: &Path,
    shutdown_flag: Option<&AtomicBool>,
) -> Result<Vec<PathBuf>, ScanError> {
    if !root.exists() {
        return Err(ScanError::NotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let mut empty = Vec::new();

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        if shutdown_flag.is_some_and(|f| f.load(Ordering::SeqCst)) {
            log::debug!("Empty directory search: shutdown requested");
            break;
        }

        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Could not check directory: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        match std::fs::read_dir(entry.path()) {
            Ok(mut children) => {
                if children.next().is_none() {
                    empty.push(entry.into_path());
                }
            }
            Err(e) => log::warn!("Could not check directory {}: {}", entry.path().display(), e),
        }
    }

    log::debug!("Found {} empty directories under {}", empty.len(), root.display());
    Ok(empty)
}
