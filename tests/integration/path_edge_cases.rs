use dupefinder::actions::{delete_within, DeleteConfig};
use dupefinder::duplicates::DuplicateFinder;
use dupefinder::rules::{categorize, CategorizationRule};
use dupefinder::scanner::path_utils::{normalize_lexically, starts_with_component_wise};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;
use unicode_normalization::UnicodeNormalization;

fn write(path: &Path, content: &[u8]) {
    File::create(path).unwrap().write_all(content).unwrap();
}

#[test]
fn test_paths_with_spaces_and_unicode() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("my report (copy).txt"), b"content");
    write(&dir.path().join("résumé – final.txt"), b"content");
    write(&dir.path().join("日本語.txt"), b"content");

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files.len(), 3);
    assert!(groups[0]
        .files
        .iter()
        .any(|f| f.file_name == "日本語.txt"));
}

#[test]
fn test_paths_with_quotes() {
    let dir = tempdir().unwrap();

    // Windows does not allow double quotes in filenames.
    if cfg!(not(windows)) {
        write(&dir.path().join("file_with_\"quote\".txt"), b"content");
        write(&dir.path().join("duplicate.txt"), b"content");

        let (groups, _) = DuplicateFinder::with_defaults()
            .find_duplicates(dir.path())
            .unwrap();

        assert_eq!(groups.len(), 1);
        assert!(groups[0]
            .files
            .iter()
            .any(|f| f.path.to_string_lossy().contains('"')));
    }
}

#[test]
fn test_decomposed_name_is_categorized() {
    let dir = tempdir().unwrap();
    let nfd: String = "café-menu.txt".nfd().collect();
    write(&dir.path().join(&nfd), b"menu");

    let result = DuplicateFinder::with_defaults().scan(dir.path()).unwrap();
    let rules = vec![CategorizationRule::new("Food", ["café"])];
    let categories = categorize(&rules, &result.records);

    assert_eq!(categories.get("Food").map(Vec::len), Some(1));
}

#[test]
fn test_lexical_normalization() {
    assert_eq!(
        normalize_lexically(Path::new("/a/b/../c/./d")),
        Path::new("/a/c/d")
    );
    assert!(starts_with_component_wise(
        Path::new("/data/sub/file"),
        Path::new("/data")
    ));
    assert!(!starts_with_component_wise(
        Path::new("/data2/file"),
        Path::new("/data")
    ));
}

#[test]
fn test_delete_with_relative_dot_segments_inside_base() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    let target = dir.path().join("target.txt");
    write(&target, b"bye");

    let roundabout = sub.join("..").join("target.txt");
    let result = delete_within(dir.path(), &[&roundabout], &DeleteConfig::permanent()).unwrap();

    assert!(result.all_succeeded());
    assert!(!target.exists());
}
