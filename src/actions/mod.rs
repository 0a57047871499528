//! File actions module.
//!
//! This module provides functionality for:
//! - Contained deletion of scan results under a base directory
//! - Bounded file preview (text or hex dump)
//!
//! # Deletion
//!
//! Every target is checked against the base directory before anything is
//! removed. Targets outside the base, missing files, and directories are
//! reported per file; the rest of the batch still runs.
//!
//! ```no_run
//! use dupefinder::actions::delete::{delete_within, DeleteConfig};
//! use std::path::Path;
//!
//! let result =
//!     delete_within(Path::new("/data"), &["/data/copy.txt"], &DeleteConfig::trash()).unwrap();
//! println!("{}", result.summary());
//! ```
//!
//! # Preview
//!
//! ```no_run
//! use dupefinder::actions::preview::preview_file;
//! use std::path::Path;
//!
//! let preview = preview_file(Path::new("example.txt")).unwrap();
//! println!("{}", preview.content);
//! ```

pub mod delete;
pub mod preview;

pub use delete::{
    delete_to_trash, delete_within, permanent_delete, BatchDeleteResult, DeleteConfig,
    DeleteError, DeleteResult,
};

pub use preview::{preview_file, PreviewContent, PreviewError, PreviewType, MAX_PREVIEW_LINES};
