//! End-to-end tests through `run_app`, checking exit codes and side effects.

use crate::ENV_MUTEX;
use clap::Parser;
use dupefinder::cli::Cli;
use dupefinder::error::ExitCode;
use dupefinder::rules::{read_rules, CategorizationRule};
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

/// Run the app with an isolated config file and rules document.
fn run(home: &Path, args: &[&str]) -> anyhow::Result<ExitCode> {
    let config = home.join("config.toml");
    let mut full = vec![
        "dupefinder".to_string(),
        "--quiet".to_string(),
        "--config".to_string(),
        config.to_string_lossy().into_owned(),
    ];
    full.extend(args.iter().map(|a| a.to_string()));
    dupefinder::run_app(Cli::try_parse_from(full).unwrap())
}

fn rules_arg(home: &TempDir) -> String {
    home.path().join("rules.json").to_string_lossy().into_owned()
}

#[test]
fn test_scan_exit_codes() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir().unwrap();
    let data = tempdir().unwrap();
    let root = data.path().to_str().unwrap();
    let rules = rules_arg(&home);

    fs::write(data.path().join("unique.txt"), b"unique").unwrap();
    let code = run(home.path(), &["scan", root, "--rules", &rules, "-o", "json"]).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);

    fs::write(data.path().join("copy.txt"), b"unique").unwrap();
    let code = run(home.path(), &["scan", root, "--rules", &rules, "-o", "csv"]).unwrap();
    assert_eq!(code, ExitCode::Success);

    let code = run(
        home.path(),
        &["scan", root, "--rules", &rules, "--empty-dirs", "--mode", "fuzzy"],
    )
    .unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_scan_missing_directory_is_general_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir().unwrap();
    let missing = home.path().join("does-not-exist");

    let err = run(
        home.path(),
        &["scan", missing.to_str().unwrap(), "--no-categorize"],
    )
    .unwrap_err();

    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    assert!(format!("{err:#}").contains("Path not found"));
}

#[test]
fn test_scan_with_malformed_rules_fails() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir().unwrap();
    let data = tempdir().unwrap();
    let rules = home.path().join("rules.json");
    fs::write(&rules, "{ not json").unwrap();
    fs::write(data.path().join("a.txt"), b"a").unwrap();

    let result = run(
        home.path(),
        &[
            "scan",
            data.path().to_str().unwrap(),
            "--rules",
            rules.to_str().unwrap(),
        ],
    );
    assert!(result.is_err());

    let code = run(
        home.path(),
        &["scan", data.path().to_str().unwrap(), "--no-categorize"],
    )
    .unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);
}

#[cfg(unix)]
#[test]
fn test_scan_with_unreadable_file_is_partial_success() {
    use std::os::unix::fs::PermissionsExt;

    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir().unwrap();
    let data = tempdir().unwrap();
    fs::write(data.path().join("a.txt"), b"dup").unwrap();
    fs::write(data.path().join("b.txt"), b"dup").unwrap();
    let locked = data.path().join("locked.txt");
    fs::write(&locked, b"secret").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    let unreadable = fs::File::open(&locked).is_err();

    let code = run(
        home.path(),
        &[
            "scan",
            data.path().to_str().unwrap(),
            "--no-categorize",
            "-o",
            "json",
        ],
    )
    .unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    if unreadable {
        assert_eq!(code, ExitCode::PartialSuccess);
    } else {
        assert_eq!(code, ExitCode::Success);
    }
}

#[test]
fn test_rules_set_then_show() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir().unwrap();
    let rules = rules_arg(&home);
    let new_rules = home.path().join("new.json");
    fs::write(
        &new_rules,
        r#"[{"category": "Docs", "keywords": ["pdf", "doc"]}]"#,
    )
    .unwrap();

    let code = run(
        home.path(),
        &["rules", "--rules", &rules, "set", new_rules.to_str().unwrap()],
    )
    .unwrap();
    assert_eq!(code, ExitCode::Success);
    assert_eq!(
        read_rules(Path::new(&rules)).unwrap(),
        vec![CategorizationRule::new("Docs", ["pdf", "doc"])]
    );

    let code = run(home.path(), &["rules", "--rules", &rules, "show"]).unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_rules_set_rejects_missing_or_malformed_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir().unwrap();
    let rules = rules_arg(&home);
    fs::write(&rules, r#"[{"category": "Keep", "keywords": ["k"]}]"#).unwrap();

    let missing = home.path().join("missing.json");
    assert!(run(
        home.path(),
        &["rules", "--rules", &rules, "set", missing.to_str().unwrap()],
    )
    .is_err());

    let bad = home.path().join("bad.json");
    fs::write(&bad, "[1, 2, 3]").unwrap();
    assert!(run(
        home.path(),
        &["rules", "--rules", &rules, "set", bad.to_str().unwrap()],
    )
    .is_err());

    assert_eq!(
        read_rules(Path::new(&rules)).unwrap(),
        vec![CategorizationRule::new("Keep", ["k"])]
    );
}

#[test]
fn test_delete_command_partial_success() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir().unwrap();
    let data = tempdir().unwrap();
    let keep = data.path().join("keep.txt");
    let gone = data.path().join("gone.txt");
    fs::write(&keep, b"k").unwrap();
    fs::write(&gone, b"g").unwrap();
    let outside = home.path().join("outside.txt");
    fs::write(&outside, b"o").unwrap();

    let code = run(
        home.path(),
        &[
            "delete",
            "--permanent",
            "--base",
            data.path().to_str().unwrap(),
            gone.to_str().unwrap(),
            outside.to_str().unwrap(),
            "-o",
            "json",
        ],
    )
    .unwrap();

    assert_eq!(code, ExitCode::PartialSuccess);
    assert!(!gone.exists());
    assert!(keep.exists());
    assert!(outside.exists());
}

#[test]
fn test_preview_and_empty_dirs_commands() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir().unwrap();
    let data = tempdir().unwrap();
    let file = data.path().join("notes.txt");
    fs::write(&file, "hello\nworld\n").unwrap();

    let code = run(home.path(), &["preview", file.to_str().unwrap()]).unwrap();
    assert_eq!(code, ExitCode::Success);
    assert!(run(home.path(), &["preview", data.path().to_str().unwrap()]).is_err());

    let root = data.path().to_str().unwrap();
    let code = run(home.path(), &["empty-dirs", root]).unwrap();
    assert_eq!(code, ExitCode::NoDuplicates);

    fs::create_dir_all(data.path().join("a").join("b")).unwrap();
    let code = run(home.path(), &["empty-dirs", root, "-o", "json"]).unwrap();
    assert_eq!(code, ExitCode::Success);
}

#[cfg(target_os = "linux")]
#[test]
fn test_commands_accept_decomposed_root_name() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let home = tempdir().unwrap();
    let data = tempdir().unwrap();
    let root = data.path().join("cafe\u{0301}");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("a.txt"), b"same").unwrap();
    fs::write(root.join("b.txt"), b"same").unwrap();
    let root_arg = root.to_str().unwrap();

    let code = run(
        home.path(),
        &["scan", root_arg, "--no-categorize", "-o", "json"],
    )
    .unwrap();
    assert_eq!(code, ExitCode::Success);

    fs::create_dir(root.join("empty")).unwrap();
    let code = run(home.path(), &["empty-dirs", root_arg]).unwrap();
    assert_eq!(code, ExitCode::Success);
}
