//! Bounded file preview.
//!
//! - Text files: the first 500 lines
//! - Binary files: hex dump of the first 256 bytes
//! - Empty files: a placeholder
//!
//! Binary detection samples the first 512 bytes: a NUL byte, or more than
//! 10% control characters, marks the file as binary.
//!
//! # Example
//!
//! ```no_run
//! use dupefinder::actions::preview::{preview_file, PreviewType};
//! use std::path::Path;
//!
//! let preview = preview_file(Path::new("notes.txt")).unwrap();
//! if preview.preview_type == PreviewType::Text {
//!     println!("{}", preview.content);
//! }
//! ```

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use thiserror::Error;

/// Maximum lines shown for a text preview.
pub const MAX_PREVIEW_LINES: usize = 500;

/// Bytes shown in a hex dump preview.
const HEX_DUMP_BYTES: usize = 256;

/// Bytes sampled for binary detection.
const BINARY_DETECT_BYTES: usize = 512;

/// Errors that can occur during file preview.
#[derive(Debug, Error)]
pub enum PreviewError {
    /// No path was given.
    #[error("file path is required")]
    EmptyPath,

    /// File was not found.
    #[error("file not found: {0}")]
    NotFound(String),

    /// The path exists but is not a regular file.
    #[error("not a regular file: {0}")]
    NotAFile(String),

    /// Permission was denied when reading the file.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// An I/O error occurred.
    #[error("could not read file preview: {0}")]
    Io(#[from] io::Error),
}

/// Type of preview content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewType {
    /// Text file content.
    Text,
    /// Binary file hex dump.
    Binary,
    /// Empty file.
    Empty,
}

/// Preview content with type information.
#[derive(Debug, Clone)]
pub struct PreviewContent {
    /// The preview type.
    pub preview_type: PreviewType,
    /// The preview content string.
    pub content: String,
    /// File size in bytes.
    pub file_size: u64,
    /// Lines shown (text previews only).
    pub line_count: usize,
    /// Whether the file continues past what is shown.
    pub truncated: bool,
}

impl PreviewContent {
    /// Create a new text preview.
    #[must_use]
    pub fn text(content: String, file_size: u64, line_count: usize, truncated: bool) -> Self {
        Self {
            preview_type: PreviewType::Text,
            content,
            file_size,
            line_count,
            truncated,
        }
    }

    /// Create a new binary preview with hex dump.
    #[must_use]
    pub fn binary(hex_dump: String, file_size: u64) -> Self {
        Self {
            preview_type: PreviewType::Binary,
            content: hex_dump,
            file_size,
            line_count: 0,
            truncated: file_size > HEX_DUMP_BYTES as u64,
        }
    }

    /// Create an empty file preview.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            preview_type: PreviewType::Empty,
            content: "(empty file)".to_string(),
            file_size: 0,
            line_count: 0,
            truncated: false,
        }
    }
}

/// Preview a file, detecting whether it is text or binary.
///
/// # Errors
///
/// Returns `PreviewError` if the path is empty, missing, not a regular
/// file, or unreadable.
pub fn preview_file(path: &Path) -> Result<PreviewContent, PreviewError> {
    if path.as_os_str().is_empty() {
        return Err(PreviewError::EmptyPath);
    }

    let metadata = fs::metadata(path).map_err(|e| map_open_error(path, e))?;
    if !metadata.is_file() {
        return Err(PreviewError::NotAFile(path.display().to_string()));
    }

    let file_size = metadata.len();
    if file_size == 0 {
        return Ok(PreviewContent::empty());
    }

    let mut file = File::open(path).map_err(|e| map_open_error(path, e))?;
    let mut sample = Vec::with_capacity(BINARY_DETECT_BYTES);
    (&mut file)
        .take(BINARY_DETECT_BYTES as u64)
        .read_to_end(&mut sample)?;

    if is_binary(&sample) {
        log::debug!("Previewing {} as binary", path.display());
        Ok(preview_binary(&sample, file_size))
    } else {
        preview_text(sample.as_slice().chain(file), file_size)
    }
}

/// First [`MAX_PREVIEW_LINES`] lines, decoding each line lossily.
fn preview_text(reader: impl Read, file_size: u64) -> Result<PreviewContent, PreviewError> {
    let mut reader = BufReader::new(reader);
    let mut lines = Vec::new();
    let mut buffer = Vec::new();
    let mut truncated = false;

    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 {
            break;
        }
        if lines.len() == MAX_PREVIEW_LINES {
            truncated = true;
            break;
        }
        while matches!(buffer.last(), Some(b'\n' | b'\r')) {
            buffer.pop();
        }
        lines.push(String::from_utf8_lossy(&buffer).into_owned());
    }

    let shown = lines.len();
    Ok(PreviewContent::text(lines.join("\n"), file_size, shown, truncated))
}

/// Hex dump of the leading bytes; the detection sample already covers them.
fn preview_binary(head: &[u8], file_size: u64) -> PreviewContent {
    let shown = &head[..head.len().min(HEX_DUMP_BYTES)];
    PreviewContent::binary(format_hex_dump(shown), file_size)
}

/// Check if data appears to be binary.
fn is_binary(data: &[u8]) -> bool {
    if data.is_empty() {
        return false;
    }
    if data.contains(&0) {
        return true;
    }

    let non_text_count = data
        .iter()
        .filter(|&&b| !matches!(b, 0x09 | 0x0A | 0x0D | 0x20..=0x7E | 0x80..=0xFF))
        .count();

    non_text_count > data.len() / 10
}

fn map_open_error(path: &Path, e: io::Error) -> PreviewError {
    match e.kind() {
        io::ErrorKind::NotFound => PreviewError::NotFound(path.display().to_string()),
        io::ErrorKind::PermissionDenied => {
            PreviewError::PermissionDenied(path.display().to_string())
        }
        _ => PreviewError::Io(e),
    }
}

/// Format bytes as a hex dump with ASCII representation.
fn format_hex_dump(data: &[u8]) -> String {
    let mut output = String::new();
    let bytes_per_line = 16;

    for (i, chunk) in data.chunks(bytes_per_line).enumerate() {
        output.push_str(&format!("{:08X}  ", i * bytes_per_line));

        for (j, byte) in chunk.iter().enumerate() {
            output.push_str(&format!("{:02X} ", byte));
            if j == 7 {
                output.push(' ');
            }
        }

        // Pad an incomplete last line so the ASCII column lines up
        let padding = bytes_per_line - chunk.len();
        for j in 0..padding {
            output.push_str("   ");
            if chunk.len() + j == 7 {
                output.push(' ');
            }
        }

        output.push_str(" |");
        for byte in chunk {
            if byte.is_ascii_graphic() || *byte == b' ' {
                output.push(*byte as char);
            } else {
                output.push('.');
            }
        }
        output.push_str("|\n");
    }

    output
}
