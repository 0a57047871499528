use dupefinder::actions::{delete_within, DeleteConfig, DeleteError};
use dupefinder::duplicates::DuplicateFinder;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_scan_then_delete_duplicates() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"same content").unwrap();
    fs::write(dir.path().join("b.txt"), b"same content").unwrap();
    fs::write(dir.path().join("c.txt"), b"same content").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();
    assert_eq!(groups.len(), 1);

    // Keep the first member, delete the rest.
    let extra: Vec<PathBuf> = groups[0].paths().into_iter().skip(1).collect();
    let result = delete_within(dir.path(), &extra, &DeleteConfig::permanent()).unwrap();

    assert!(result.all_succeeded());
    assert_eq!(result.success_count(), 2);
    assert_eq!(result.bytes_freed, 24);
    assert!(groups[0].files[0].path.exists());

    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();
    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[test]
fn test_delete_rejects_escapes_and_continues() {
    let root = tempdir().unwrap();
    let base = root.path().join("base");
    fs::create_dir(&base).unwrap();
    let inside = base.join("inside.txt");
    let outside = root.path().join("outside.txt");
    fs::write(&inside, b"in").unwrap();
    fs::write(&outside, b"out").unwrap();

    let sneaky = base.join("..").join("outside.txt");
    let missing = base.join("missing.txt");
    let targets = vec![sneaky.clone(), inside.clone(), missing.clone(), base.clone()];

    let result = delete_within(&base, &targets, &DeleteConfig::permanent()).unwrap();

    assert_eq!(result.deleted_paths(), vec![inside.clone()]);
    assert_eq!(result.failures.len(), 3);
    assert_eq!(result.failures[0].0, sneaky);
    assert_eq!(
        result.failures[0].1,
        "Security error: Path is outside the allowed directory"
    );
    assert_eq!(result.failures[1].1, "File not found or is a directory");
    assert_eq!(result.failures[2].1, "File not found or is a directory");

    assert!(!inside.exists());
    assert!(outside.exists());
    assert!(result.summary().contains("3 failed"));
}

#[test]
fn test_delete_sibling_with_shared_prefix_is_outside() {
    let root = tempdir().unwrap();
    let base = root.path().join("data");
    let sibling = root.path().join("data-backup");
    fs::create_dir(&base).unwrap();
    fs::create_dir(&sibling).unwrap();
    let target = sibling.join("file.txt");
    fs::write(&target, b"keep me").unwrap();

    let result = delete_within(&base, &[&target], &DeleteConfig::permanent()).unwrap();

    assert_eq!(result.failure_count(), 1);
    assert!(target.exists());
}

#[test]
fn test_delete_request_validation() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("a.txt");
    fs::write(&file, b"a").unwrap();

    assert!(matches!(
        delete_within(std::path::Path::new(""), &[&file], &DeleteConfig::permanent()),
        Err(DeleteError::EmptyBasePath)
    ));
    assert!(matches!(
        delete_within(dir.path(), &Vec::<PathBuf>::new(), &DeleteConfig::permanent()),
        Err(DeleteError::NoTargets)
    ));
    assert!(file.exists());
}
