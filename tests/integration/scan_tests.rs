use dupefinder::duplicates::{
    ClusterStrategy, DuplicateFinder, FinderConfig, FinderError, GroupKind,
};
use dupefinder::scanner::{digest_bytes, FingerprintMode, WalkerConfig};
use std::fs::{self, File};
use std::io::Write;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::tempdir;

fn write(dir: &std::path::Path, name: &str, content: &[u8]) {
    File::create(dir.join(name))
        .unwrap()
        .write_all(content)
        .unwrap();
}

fn fuzzy(threshold: usize) -> DuplicateFinder {
    DuplicateFinder::new(
        FinderConfig::default()
            .with_mode(FingerprintMode::Fuzzy)
            .with_threshold(threshold),
    )
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"content a");
    write(dir.path(), "b.txt", b"content b");
    write(dir.path(), "c.txt", b"content c");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.total_size, 27);
}

#[test]
fn test_scan_exact_duplicates() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"duplicate");
    write(dir.path(), "b.txt", b"duplicate");
    write(dir.path(), "c.txt", b"unique");

    let result = DuplicateFinder::with_defaults().scan(dir.path()).unwrap();

    assert_eq!(result.records.len(), 3);
    assert_eq!(result.groups.len(), 1);
    let group = &result.groups[0];
    assert_eq!(group.kind, GroupKind::Exact);
    assert_eq!(group.key, digest_bytes(b"duplicate"));
    assert_eq!(group.key.len(), 64);
    assert_eq!(group.files.len(), 2);

    assert_eq!(result.summary.duplicate_groups, 1);
    assert_eq!(result.summary.duplicate_files, 1);
    assert_eq!(result.summary.reclaimable_space, 9);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("subdir").join("deeper");
    fs::create_dir_all(&sub).unwrap();

    write(dir.path(), "top.txt", b"same bytes");
    write(&sub, "bottom.txt", b"same bytes");

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert!(groups[0].files.iter().any(|f| f.path.ends_with("bottom.txt")));
}

#[test]
fn test_scan_empty_files_form_a_group() {
    let dir = tempdir().unwrap();
    File::create(dir.path().join("empty1.txt")).unwrap();
    File::create(dir.path().join("empty2.txt")).unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].key, digest_bytes(b""));
    assert_eq!(summary.reclaimable_space, 0);
}

#[test]
fn test_scan_multiple_groups_in_walk_order() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a1.txt", b"first");
    write(dir.path(), "a2.txt", b"first");
    write(dir.path(), "b1.txt", b"second");
    write(dir.path(), "b2.txt", b"second");
    write(dir.path(), "b3.txt", b"second");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(groups.len(), 2);
    let mut sizes: Vec<_> = groups.iter().map(|g| g.files.len()).collect();
    sizes.sort_unstable();
    assert_eq!(sizes, vec![2, 3]);
    assert_eq!(summary.duplicate_files, 3);
}

#[test]
fn test_fuzzy_scan_groups_near_duplicates() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"the quick brown fox");
    write(dir.path(), "b.txt", b"the quick brown fox!");
    write(dir.path(), "c.txt", b"completely different text here");

    let result = fuzzy(2).scan(dir.path()).unwrap();

    assert_eq!(result.groups.len(), 1);
    let group = &result.groups[0];
    assert_eq!(group.kind, GroupKind::Similar);
    assert_eq!(group.key, "the quick brown fox");
    assert!(group.files[0].path.ends_with("a.txt"));
    assert!(group.files[1].path.ends_with("b.txt"));
    assert_eq!(result.summary.reclaimable_space, 20);
}

#[test]
fn test_fuzzy_threshold_zero_requires_identical_text() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"abc");
    write(dir.path(), "b.txt", b"abd");
    write(dir.path(), "c.txt", b"abc");

    let result = fuzzy(0).scan(dir.path()).unwrap();

    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].files.len(), 2);
}

#[test]
fn test_fuzzy_strategies_differ_on_chains() {
    let dir = tempdir().unwrap();
    // a-b and b-c are within 1 edit, a-c is 2 apart.
    write(dir.path(), "a.txt", b"aaaa");
    write(dir.path(), "b.txt", b"aaab");
    write(dir.path(), "c.txt", b"aabb");

    let anchor = fuzzy(1).scan(dir.path()).unwrap();
    assert_eq!(anchor.groups.len(), 1);
    assert_eq!(anchor.groups[0].files.len(), 2);

    let linked = DuplicateFinder::new(
        FinderConfig::default()
            .with_mode(FingerprintMode::Fuzzy)
            .with_threshold(1)
            .with_strategy(ClusterStrategy::Linked),
    )
    .scan(dir.path())
    .unwrap();
    assert_eq!(linked.groups.len(), 1);
    assert_eq!(linked.groups[0].files.len(), 3);
}

#[test]
fn test_fuzzy_invalid_utf8_is_replaced() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.bin", &[b'h', b'i', 0xFF]);
    write(dir.path(), "b.bin", &[b'h', b'i', 0xFE]);

    let result = fuzzy(0).scan(dir.path()).unwrap();

    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].key, "hi\u{FFFD}");
    assert_eq!(result.records[0].size_bytes, 3);
}

#[test]
fn test_scan_ignore_patterns() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("node_modules")).unwrap();
    write(dir.path(), "keep.txt", b"same");
    write(&dir.path().join("node_modules"), "dep.txt", b"same");
    write(dir.path(), "scratch.tmp", b"same");

    let config = FinderConfig::default().with_walker_config(WalkerConfig::new(
        false,
        false,
        vec!["node_modules".to_string(), "*.tmp".to_string()],
    ));
    let (groups, summary) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[test]
fn test_scan_skip_hidden() {
    let dir = tempdir().unwrap();
    write(dir.path(), "visible.txt", b"same");
    write(dir.path(), ".hidden.txt", b"same");

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(groups.len(), 1);

    let config =
        FinderConfig::default().with_walker_config(WalkerConfig::new(false, true, Vec::new()));
    let (groups, summary) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();
    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[test]
fn test_scan_rejects_invalid_roots() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file.txt");
    write(dir.path(), "file.txt", b"x");

    let finder = DuplicateFinder::with_defaults();
    assert!(matches!(
        finder.scan(std::path::Path::new("")),
        Err(FinderError::EmptyPath)
    ));
    assert!(matches!(
        finder.scan(&dir.path().join("missing")),
        Err(FinderError::PathNotFound(_))
    ));
    assert!(matches!(
        finder.scan(&file),
        Err(FinderError::NotADirectory(_))
    ));
}

#[test]
fn test_scan_interrupted_before_start() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"x");

    let flag = Arc::new(AtomicBool::new(true));
    let finder = DuplicateFinder::new(FinderConfig::default().with_shutdown_flag(flag));

    assert!(matches!(
        finder.scan(dir.path()),
        Err(FinderError::Interrupted)
    ));
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_counted_and_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"same");
    write(dir.path(), "b.txt", b"same");
    let locked = dir.path().join("locked.txt");
    write(dir.path(), "locked.txt", b"same");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root ignores permission bits, so only assert when the file is really unreadable.
    let unreadable = File::open(&locked).is_err();
    let result = DuplicateFinder::with_defaults().scan(dir.path()).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    if unreadable {
        assert_eq!(result.summary.fingerprint_errors.len(), 1);
        assert_eq!(result.groups[0].files.len(), 2);
    } else {
        assert_eq!(result.groups[0].files.len(), 3);
    }
}
