use crate::ENV_MUTEX;
use clap::Parser;
use dupefinder::cli::{Cli, Commands};
use dupefinder::config::{Config, ENV_PREFIX};
use dupefinder::duplicates::ClusterStrategy;
use dupefinder::scanner::FingerprintMode;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn clear_env() {
    for (key, _) in std::env::vars() {
        if key.starts_with(ENV_PREFIX) {
            std::env::remove_var(key);
        }
    }
}

fn scan_cli(args: &[&str]) -> Cli {
    let mut full = vec!["dupefinder", "scan", "/data"];
    full.extend_from_slice(args);
    Cli::try_parse_from(full).unwrap()
}

#[test]
fn test_cli_overrides_every_layer() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
mode = "fuzzy"
threshold = 30
follow_symlinks = true
ignore_patterns = ["*.bak"]

[profile.strict]
threshold = 2
"#,
    )
    .unwrap();

    std::env::set_var("DUPEFINDER_IO_THREADS", "3");
    let mut config = Config::load_from_path(path, Some("strict"));
    std::env::remove_var("DUPEFINDER_IO_THREADS");

    assert_eq!(config.threshold, 2);
    assert_eq!(config.io_threads, 3);

    let cli = scan_cli(&[
        "--threshold",
        "9",
        "--mode",
        "exact",
        "--no-follow-symlinks",
        "--ignore",
        "*.tmp",
        "--rules",
        "/tmp/r.json",
    ]);
    let Commands::Scan(args) = &cli.command else {
        panic!("Expected Scan command");
    };
    config.merge_cli(&cli);
    config.merge_scan_args(args);

    assert_eq!(config.mode, FingerprintMode::Exact);
    assert_eq!(config.threshold, 9);
    assert!(!config.follow_symlinks);
    assert_eq!(config.ignore_patterns, vec!["*.bak", "*.tmp"]);
    assert_eq!(config.rules_path(), PathBuf::from("/tmp/r.json"));

    let finder = config.finder_config();
    assert_eq!(finder.threshold, 9);
    assert_eq!(finder.io_threads, 3);
    assert!(!finder.walker_config.follow_symlinks);
}

#[test]
fn test_unset_cli_flags_keep_file_values() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "strategy = \"linked\"\nskip_hidden = true\nno_color = true\n",
    )
    .unwrap();

    let mut config = Config::load_from_path(path, None);
    let cli = scan_cli(&[]);
    let Commands::Scan(args) = &cli.command else {
        panic!("Expected Scan command");
    };
    config.merge_cli(&cli);
    config.merge_scan_args(args);

    assert_eq!(config.strategy, ClusterStrategy::Linked);
    assert!(config.skip_hidden);
    assert!(config.no_color);
}

#[test]
fn test_unknown_profile_keeps_base_values() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "threshold = 12\n[profile.docs]\nthreshold = 1\n").unwrap();

    let config = Config::load_from_path(path, Some("photos"));

    assert_eq!(config.threshold, 12);
    assert_eq!(config.profile_names(), vec!["docs"]);
}

#[test]
fn test_env_selects_mode_and_rules_path() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let rules = dir.path().join("env-rules.json");

    std::env::set_var("DUPEFINDER_MODE", "fuzzy");
    std::env::set_var("DUPEFINDER_RULES_PATH", &rules);
    let config = Config::load_from_path(dir.path().join("missing.toml"), None);
    clear_env();

    assert_eq!(config.mode, FingerprintMode::Fuzzy);
    assert_eq!(config.rules_path(), rules);
}

#[test]
fn test_invalid_env_value_is_ignored() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "threshold = 4\n").unwrap();

    std::env::set_var("DUPEFINDER_THRESHOLD", "lots");
    let config = Config::load_from_path(path, None);
    clear_env();

    assert_eq!(config.threshold, 4);
}
