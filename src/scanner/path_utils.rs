//! Path normalization utilities for containment checks.
//!
//! Deletion must decide whether a target lies inside a base directory
//! before touching the filesystem. Both paths are brought to the same form
//! first:
//!
//! 1. made absolute against the current directory,
//! 2. lexically normalized (`.` dropped, `..` pops the previous component),
//! 3. NFC-normalized, because macOS reports decomposed (NFD) names while
//!    users usually type composed (NFC) ones.
//!
//! The NFC step is for comparison only. On Linux a composed and a
//! decomposed name are two different files, so anything that touches the
//! filesystem uses [`absolute_lexical`] instead.
//!
//! No symlinks are resolved and the paths need not exist.
//!
//! # Example
//!
//! ```
//! use dupefinder::scanner::path_utils::is_within;
//! use std::path::Path;
//!
//! assert!(is_within(Path::new("/data/scans"), Path::new("/data/scans/a/b.txt")).unwrap());
//! assert!(!is_within(Path::new("/data/scans"), Path::new("/data/scans/../secrets")).unwrap());
//! assert!(!is_within(Path::new("/data/scans"), Path::new("/data/scans2/x")).unwrap());
//! ```

use std::io;
use std::path::{Component, Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

/// Normalize a path string to NFC (Composed) form.
///
/// # Example
///
/// ```
/// use dupefinder::scanner::path_utils::normalize_path_str;
///
/// let nfd = "cafe\u{0301}.txt";
/// assert_eq!(normalize_path_str(nfd), "café.txt");
/// ```
#[must_use]
pub fn normalize_path_str(s: &str) -> String {
    s.nfc().collect()
}

/// Normalize a [`Path`] to NFC form.
///
/// Paths that are not valid UTF-8 are returned unchanged.
#[must_use]
pub fn normalize_pathbuf(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(normalize_path_str(s)),
        None => path.to_path_buf(),
    }
}

/// Remove `.` components and resolve `..` against the preceding component.
///
/// `..` at the root stays at the root, as in `/../etc` → `/etc`. For a
/// relative path a leading `..` that has nothing to pop is kept.
#[must_use]
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = match out.components().next_back() {
                    Some(Component::Normal(_)) => out.pop(),
                    Some(Component::RootDir | Component::Prefix(_)) => true,
                    _ => false,
                };
                if !popped {
                    out.push("..");
                }
            }
            Component::Normal(name) => out.push(name),
        }
    }
    out
}

/// Absolute, lexically normalized form of `path`, with its name bytes kept
/// as given. Safe to open or delete.
///
/// # Errors
///
/// Returns an error if `path` is empty or the current directory cannot be
/// determined for a relative path.
pub fn absolute_lexical(path: &Path) -> io::Result<PathBuf> {
    Ok(normalize_lexically(&std::path::absolute(path)?))
}

/// Absolute, lexically normalized, NFC form of `path`. Only for comparing
/// paths; never hand the result to the filesystem.
///
/// # Errors
///
/// Same as [`absolute_lexical`].
pub fn absolute_normalized(path: &Path) -> io::Result<PathBuf> {
    Ok(normalize_pathbuf(&absolute_lexical(path)?))
}

/// Whether `target` lies inside `base` (or is `base` itself) after both are
/// brought to absolute normalized form.
///
/// The comparison is component-wise, so `/data/scans2` is not inside
/// `/data/scans`. On Windows the comparison ignores case.
///
/// # Errors
///
/// Returns an error if either path cannot be made absolute.
pub fn is_within(base: &Path, target: &Path) -> io::Result<bool> {
    let base = absolute_normalized(base)?;
    let target = absolute_normalized(target)?;
    Ok(starts_with_component_wise(&target, &base))
}

/// Component-wise prefix test on paths already in absolute normalized form.
///
/// Case-insensitive on Windows.
#[must_use]
pub fn starts_with_component_wise(path: &Path, prefix: &Path) -> bool {
    if cfg!(windows) {
        let p = PathBuf::from(path.to_string_lossy().to_lowercase());
        let r = PathBuf::from(prefix.to_string_lossy().to_lowercase());
        p.starts_with(r)
    } else {
        path.starts_with(prefix)
    }
}
