use dupefinder::actions::{preview_file, PreviewError, PreviewType, MAX_PREVIEW_LINES};
use std::fmt::Write as _;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_preview_text_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "first line\r\nsecond line\nthird").unwrap();

    let preview = preview_file(&path).unwrap();

    assert_eq!(preview.preview_type, PreviewType::Text);
    assert_eq!(preview.content, "first line\nsecond line\nthird");
    assert_eq!(preview.line_count, 3);
    assert!(!preview.truncated);
}

#[test]
fn test_preview_long_file_is_truncated() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("long.log");
    let mut text = String::new();
    for i in 0..(MAX_PREVIEW_LINES + 20) {
        writeln!(text, "line {i}").unwrap();
    }
    fs::write(&path, &text).unwrap();

    let preview = preview_file(&path).unwrap();

    assert_eq!(preview.line_count, MAX_PREVIEW_LINES);
    assert!(preview.truncated);
    assert!(preview.content.ends_with(&format!("line {}", MAX_PREVIEW_LINES - 1)));
}

#[test]
fn test_preview_exactly_max_lines_is_not_truncated() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("exact.txt");
    let text: String = (0..MAX_PREVIEW_LINES).map(|i| format!("{i}\n")).collect();
    fs::write(&path, text).unwrap();

    let preview = preview_file(&path).unwrap();

    assert_eq!(preview.line_count, MAX_PREVIEW_LINES);
    assert!(!preview.truncated);
}

#[test]
fn test_preview_binary_and_empty() {
    let dir = tempdir().unwrap();
    let binary = dir.path().join("blob.bin");
    fs::write(&binary, [0u8, 1, 2, 3, 0xFF, 0x00, b'A']).unwrap();
    let empty = dir.path().join("empty.txt");
    fs::write(&empty, b"").unwrap();

    let preview = preview_file(&binary).unwrap();
    assert_eq!(preview.preview_type, PreviewType::Binary);
    assert_eq!(preview.file_size, 7);
    assert!(preview.content.starts_with("00000000"));

    let preview = preview_file(&empty).unwrap();
    assert_eq!(preview.preview_type, PreviewType::Empty);
    assert_eq!(preview.file_size, 0);
}

#[test]
fn test_preview_errors() {
    let dir = tempdir().unwrap();

    assert!(matches!(
        preview_file(&dir.path().join("nope.txt")),
        Err(PreviewError::NotFound(_))
    ));
    assert!(matches!(
        preview_file(dir.path()),
        Err(PreviewError::NotAFile(_))
    ));
}
